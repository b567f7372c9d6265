//! In-memory declaration tree implementing [`DeclarationNode`].
//!
//! Serves hosts that build their own model of a source tree, and tests
//! that need to observe or sabotage individual mutations.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{bare_marker_name, Marker, Qualifier};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{DeclarationNode, MemberKind};

#[derive(Debug, Clone, Default)]
pub struct MemoryDeclaration {
    label: String,
    markers: Vec<Marker>,
    qualifiers: Vec<Qualifier>,
    fields: Vec<MemoryDeclaration>,
    methods: Vec<MemoryDeclaration>,
    constructors: Vec<MemoryDeclaration>,
    inner: Vec<MemoryDeclaration>,
    /// Qualified names of the markers this node has seen, keyed by text
    known_names: HashMap<String, String>,
    rejected_texts: HashSet<String>,
    invalid_after: Option<usize>,
    fail_removals: bool,
    mutations: usize,
    valid: bool,
}

impl MemoryDeclaration {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            valid: true,
            ..Default::default()
        }
    }

    pub fn with_marker(mut self, qualified_name: &str, text: &str) -> Self {
        self.known_names
            .insert(text.to_string(), qualified_name.to_string());
        self.markers.push(Marker::new(qualified_name, text));
        self
    }

    pub fn with_qualifier(mut self, name: &str) -> Self {
        self.qualifiers.push(Qualifier::new(name));
        self
    }

    pub fn with_member(mut self, kind: MemberKind, member: MemoryDeclaration) -> Self {
        self.group_mut(kind).push(member);
        self
    }

    /// Make `add_marker` fail to parse this exact text.
    pub fn rejecting_marker_text(mut self, text: &str) -> Self {
        self.rejected_texts.insert(text.to_string());
        self
    }

    /// Invalidate the node once `mutations` mutating calls have succeeded.
    pub fn invalidated_after(mut self, mutations: usize) -> Self {
        self.invalid_after = Some(mutations);
        self
    }

    /// Make every `remove_marker` call fail with an unexpected error.
    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn members(&self, kind: MemberKind) -> &[MemoryDeclaration] {
        match kind {
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
            MemberKind::Constructor => &self.constructors,
            MemberKind::Inner => &self.inner,
        }
    }

    /// Number of successful mutating calls on this node (children excluded).
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    fn group_mut(&mut self, kind: MemberKind) -> &mut Vec<MemoryDeclaration> {
        match kind {
            MemberKind::Field => &mut self.fields,
            MemberKind::Method => &mut self.methods,
            MemberKind::Constructor => &mut self.constructors,
            MemberKind::Inner => &mut self.inner,
        }
    }

    fn check_valid(&self) -> DomainResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::InvalidNode(self.label.clone()))
        }
    }

    fn record_mutation(&mut self) {
        self.mutations += 1;
        if self.invalid_after.is_some_and(|limit| self.mutations >= limit) {
            self.valid = false;
        }
    }

    fn attach(&mut self, qualified_name: String, text: String) -> Marker {
        let marker = Marker::new(qualified_name, text);
        self.markers.push(marker.clone());
        self.record_mutation();
        marker
    }
}

impl DeclarationNode for MemoryDeclaration {
    type Snapshot = (Vec<Marker>, Vec<Qualifier>);

    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn markers(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    fn qualifiers(&self) -> Vec<Qualifier> {
        self.qualifiers.clone()
    }

    fn remove_marker(&mut self, marker: &Marker) -> DomainResult<()> {
        self.check_valid()?;
        if self.fail_removals {
            return Err(DomainError::rewrite_failed(
                &self.label,
                format!("cannot remove {}", marker),
            ));
        }
        let idx = self
            .markers
            .iter()
            .position(|m| m == marker)
            .ok_or_else(|| {
                DomainError::rewrite_failed(&self.label, format!("{} is not attached", marker))
            })?;
        self.markers.remove(idx);
        self.record_mutation();
        Ok(())
    }

    fn add_marker(&mut self, text: &str) -> DomainResult<Marker> {
        self.check_valid()?;
        if self.rejected_texts.contains(text) || !text.starts_with('@') {
            return Err(DomainError::marker_parse(text, "rejected by host"));
        }
        let name = self
            .known_names
            .get(text)
            .cloned()
            .unwrap_or_else(|| bare_marker_name(text).to_string());
        Ok(self.attach(name, text.to_string()))
    }

    fn add_bare_marker(&mut self, name: &str) -> DomainResult<Marker> {
        self.check_valid()?;
        let qualified = self
            .known_names
            .values()
            .find(|known| known.as_str() == name || known.ends_with(&format!(".{}", name)))
            .cloned()
            .unwrap_or_else(|| name.to_string());
        Ok(self.attach(qualified, format!("@{}", name)))
    }

    fn set_qualifier(&mut self, qualifier: &Qualifier, value: bool) -> DomainResult<()> {
        self.check_valid()?;
        let present = self.qualifiers.iter().position(|q| q == qualifier);
        match (present, value) {
            (None, true) => self.qualifiers.push(qualifier.clone()),
            (Some(idx), false) => {
                self.qualifiers.remove(idx);
            }
            _ => return Ok(()),
        }
        self.record_mutation();
        Ok(())
    }

    fn snapshot(&self) -> Self::Snapshot {
        (self.markers.clone(), self.qualifiers.clone())
    }

    fn restore(&mut self, (markers, qualifiers): Self::Snapshot) {
        self.markers = markers;
        self.qualifiers = qualifiers;
    }

    fn members_mut(&mut self, kind: MemberKind) -> Vec<&mut Self> {
        self.group_mut(kind).iter_mut().collect()
    }
}
