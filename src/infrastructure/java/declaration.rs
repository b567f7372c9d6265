//! Owned declaration model over a parsed Java unit.
//!
//! Each declaration keeps its modifier list as an editable sequence of
//! items plus the original byte span, so edits can be spliced back into
//! the unit without reformatting anything else.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::domain::{DeclarationNode, DomainError, DomainResult, Marker, MemberKind, Qualifier};
use crate::infrastructure::java::names::NameResolver;

/// Syntactic kind of a Java declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
    Field,
    EnumConstant,
    Method,
    AnnotationElement,
    Constructor,
}

impl JavaKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        Some(match kind {
            "class_declaration" => Self::Class,
            "interface_declaration" => Self::Interface,
            "enum_declaration" => Self::Enum,
            "record_declaration" => Self::Record,
            "annotation_type_declaration" => Self::AnnotationType,
            "field_declaration" | "constant_declaration" => Self::Field,
            "enum_constant" => Self::EnumConstant,
            "method_declaration" => Self::Method,
            "annotation_type_element_declaration" => Self::AnnotationElement,
            "constructor_declaration" | "compact_constructor_declaration" => Self::Constructor,
            _ => return None,
        })
    }

    /// Child group this kind belongs to inside a type body.
    pub fn member_kind(self) -> MemberKind {
        match self {
            Self::Field | Self::EnumConstant => MemberKind::Field,
            Self::Method | Self::AnnotationElement => MemberKind::Method,
            Self::Constructor => MemberKind::Constructor,
            _ => MemberKind::Inner,
        }
    }

    pub fn is_type(self) -> bool {
        self.member_kind() == MemberKind::Inner
    }
}

impl fmt::Display for JavaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
            Self::AnnotationType => "@interface",
            Self::Field => "field",
            Self::EnumConstant => "enum constant",
            Self::Method => "method",
            Self::AnnotationElement => "element",
            Self::Constructor => "constructor",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierItem {
    Marker(Marker),
    Qualifier(Qualifier),
}

impl ModifierItem {
    fn text(&self) -> &str {
        match self {
            Self::Marker(m) => m.text(),
            Self::Qualifier(q) => q.name(),
        }
    }
}

/// Editable modifier list of one declaration.
#[derive(Debug, Clone)]
pub struct ModifierList {
    /// Source bytes covered by the items; empty at the insertion point when there are none
    span: Range<usize>,
    /// Original text between consecutive items, comments included
    gaps: Vec<String>,
    items: Vec<ModifierItem>,
    dirty: bool,
}

impl ModifierList {
    pub fn new(span: Range<usize>, gaps: Vec<String>, items: Vec<ModifierItem>) -> Self {
        Self {
            span,
            gaps,
            items,
            dirty: false,
        }
    }

    /// Empty list that inserts at `offset` if items are added later.
    pub fn empty_at(offset: usize) -> Self {
        Self::new(offset..offset, Vec::new(), Vec::new())
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn items(&self) -> &[ModifierItem] {
        &self.items
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Items joined by the original separators, positionally.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                out.push_str(self.gaps.get(idx - 1).map(String::as_str).unwrap_or(" "));
            }
            out.push_str(item.text());
        }
        if self.span.is_empty() && !self.items.is_empty() {
            out.push(' ');
        }
        out
    }

    fn markers(&self) -> Vec<Marker> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ModifierItem::Marker(m) => Some(m.clone()),
                ModifierItem::Qualifier(_) => None,
            })
            .collect()
    }

    fn qualifiers(&self) -> Vec<Qualifier> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ModifierItem::Qualifier(q) => Some(q.clone()),
                ModifierItem::Marker(_) => None,
            })
            .collect()
    }

    fn position(&self, item: &ModifierItem) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    fn remove(&mut self, idx: usize) {
        self.items.remove(idx);
        self.dirty = true;
    }

    fn push(&mut self, item: ModifierItem) {
        self.items.push(item);
        self.dirty = true;
    }
}

/// A Java declaration with its nested members.
#[derive(Debug, Clone)]
pub struct JavaDeclaration {
    kind: JavaKind,
    name: String,
    line: usize,
    modifiers: ModifierList,
    fields: Vec<JavaDeclaration>,
    methods: Vec<JavaDeclaration>,
    constructors: Vec<JavaDeclaration>,
    inner: Vec<JavaDeclaration>,
    names: Arc<NameResolver>,
    valid: bool,
}

impl JavaDeclaration {
    pub fn new(
        kind: JavaKind,
        name: impl Into<String>,
        line: usize,
        modifiers: ModifierList,
        names: Arc<NameResolver>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            line,
            modifiers,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            inner: Vec::new(),
            names,
            valid: true,
        }
    }

    pub fn kind(&self) -> JavaKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based line of the declaration start.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn modifiers(&self) -> &ModifierList {
        &self.modifiers
    }

    pub fn members(&self, kind: MemberKind) -> &[JavaDeclaration] {
        match kind {
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
            MemberKind::Constructor => &self.constructors,
            MemberKind::Inner => &self.inner,
        }
    }

    pub fn push_member(&mut self, member: JavaDeclaration) {
        let group = match member.kind.member_kind() {
            MemberKind::Field => &mut self.fields,
            MemberKind::Method => &mut self.methods,
            MemberKind::Constructor => &mut self.constructors,
            MemberKind::Inner => &mut self.inner,
        };
        group.push(member);
    }

    /// Mark the declaration as unsafe to edit (e.g. it contains syntax errors).
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Visit this declaration and all nested ones, parents first.
    pub fn for_each<'s>(&'s self, f: &mut impl FnMut(&'s JavaDeclaration)) {
        f(self);
        for kind in [
            MemberKind::Field,
            MemberKind::Method,
            MemberKind::Constructor,
            MemberKind::Inner,
        ] {
            for member in self.members(kind) {
                member.for_each(f);
            }
        }
    }

    fn check_valid(&self) -> DomainResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(DomainError::InvalidNode(self.label()))
        }
    }

    fn attach(&mut self, written: String, text: String) -> Marker {
        let marker = Marker::new(self.names.resolve(&written), text);
        self.modifiers.push(ModifierItem::Marker(marker.clone()));
        marker
    }
}

impl DeclarationNode for JavaDeclaration {
    type Snapshot = ModifierList;

    fn label(&self) -> String {
        format!("{} {} (line {})", self.kind, self.name, self.line)
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn markers(&self) -> Vec<Marker> {
        self.modifiers.markers()
    }

    fn qualifiers(&self) -> Vec<Qualifier> {
        self.modifiers.qualifiers()
    }

    fn remove_marker(&mut self, marker: &Marker) -> DomainResult<()> {
        self.check_valid()?;
        let item = ModifierItem::Marker(marker.clone());
        let idx = self.modifiers.position(&item).ok_or_else(|| {
            DomainError::rewrite_failed(self.label(), format!("{} is not attached", marker))
        })?;
        self.modifiers.remove(idx);
        Ok(())
    }

    fn add_marker(&mut self, text: &str) -> DomainResult<Marker> {
        self.check_valid()?;
        let written = self
            .names
            .parse_marker_text(text)
            .map_err(|reason| DomainError::marker_parse(text, reason))?;
        Ok(self.attach(written, text.trim().to_string()))
    }

    fn add_bare_marker(&mut self, name: &str) -> DomainResult<Marker> {
        self.check_valid()?;
        let written = self
            .names
            .parse_bare_name(name)
            .map_err(|reason| DomainError::rewrite_failed(self.label(), reason))?;
        let text = format!("@{}", written);
        Ok(self.attach(written, text))
    }

    fn set_qualifier(&mut self, qualifier: &Qualifier, value: bool) -> DomainResult<()> {
        self.check_valid()?;
        let item = ModifierItem::Qualifier(qualifier.clone());
        match (self.modifiers.position(&item), value) {
            (None, true) => self.modifiers.push(item),
            (Some(idx), false) => self.modifiers.remove(idx),
            _ => {}
        }
        Ok(())
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.modifiers.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        self.modifiers = snapshot;
    }

    fn members_mut(&mut self, kind: MemberKind) -> Vec<&mut Self> {
        let group = match kind {
            MemberKind::Field => &mut self.fields,
            MemberKind::Method => &mut self.methods,
            MemberKind::Constructor => &mut self.constructors,
            MemberKind::Inner => &mut self.inner,
        };
        group.iter_mut().collect()
    }
}
