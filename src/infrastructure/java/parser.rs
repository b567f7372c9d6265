//! tree-sitter front end: builds the declaration model and splices edits back.

use std::sync::Arc;

use tracing::{debug, instrument};
use tree_sitter::Node;

use crate::domain::{Marker, Qualifier};
use crate::infrastructure::java::declaration::{
    JavaDeclaration, JavaKind, ModifierItem, ModifierList,
};
use crate::infrastructure::java::names::NameResolver;
use crate::infrastructure::java::{parse_java, JavaParseError};

/// A parsed Java compilation unit.
#[derive(Debug)]
pub struct JavaSource {
    text: String,
    roots: Vec<JavaDeclaration>,
    has_syntax_errors: bool,
}

impl JavaSource {
    #[instrument(level = "trace", skip_all)]
    pub fn parse(text: impl Into<String>) -> Result<Self, JavaParseError> {
        let text = text.into();
        let tree = parse_java(&text)?;
        let root = tree.root_node();

        let mut names = NameResolver::new()?;
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "import_declaration" {
                collect_import(child, &text, &mut names)?;
            }
        }
        let names = Arc::new(names);

        let mut roots = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match JavaKind::from_node_kind(child.kind()) {
                Some(kind) if kind.is_type() => {
                    roots.push(build_declaration(child, kind, &text, &names)?);
                }
                _ => {}
            }
        }

        let has_syntax_errors = root.has_error();
        if has_syntax_errors {
            debug!("unit contains syntax errors; affected declarations are left untouched");
        }
        Ok(Self {
            text,
            roots,
            has_syntax_errors,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-level type declarations in source order.
    pub fn roots(&self) -> &[JavaDeclaration] {
        &self.roots
    }

    pub fn roots_mut(&mut self) -> &mut [JavaDeclaration] {
        &mut self.roots
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.has_syntax_errors
    }

    /// Source text with every edited modifier list spliced in.
    pub fn render(&self) -> String {
        let mut edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();
        for root in &self.roots {
            root.for_each(&mut |decl| {
                let modifiers = decl.modifiers();
                if modifiers.is_dirty() {
                    edits.push((modifiers.span(), modifiers.render()));
                }
            });
        }
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

        let mut out = self.text.clone();
        for (span, replacement) in edits {
            out.replace_range(span, &replacement);
        }
        out
    }
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> Result<&'s str, JavaParseError> {
    source
        .get(node.byte_range())
        .ok_or(JavaParseError::Span {
            start: node.start_byte(),
            end: node.end_byte(),
        })
}

fn collect_import(
    node: Node<'_>,
    source: &str,
    names: &mut NameResolver,
) -> Result<(), JavaParseError> {
    let mut target = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" | "asterisk" => return Ok(()),
            "scoped_identifier" | "identifier" => target = Some(child),
            _ => {}
        }
    }
    if let Some(target) = target {
        names.add_import(node_text(target, source)?);
    }
    Ok(())
}

fn declaration_name(node: Node<'_>, kind: JavaKind, source: &str) -> Result<String, JavaParseError> {
    let name_node = match kind {
        JavaKind::Field => node
            .child_by_field_name("declarator")
            .and_then(|d| d.child_by_field_name("name")),
        _ => node.child_by_field_name("name"),
    };
    match name_node {
        Some(n) => Ok(node_text(n, source)?.to_string()),
        None => Ok("<anonymous>".to_string()),
    }
}

fn build_modifiers(
    node: Node<'_>,
    source: &str,
    names: &NameResolver,
) -> Result<ModifierList, JavaParseError> {
    let mut cursor = node.walk();
    let modifiers = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    let Some(modifiers) = modifiers else {
        return Ok(ModifierList::empty_at(node.start_byte()));
    };

    let mut items = Vec::new();
    let mut bounds: Vec<(usize, usize)> = Vec::new();
    let mut cursor = modifiers.walk();
    for child in modifiers.children(&mut cursor) {
        let item = match child.kind() {
            "line_comment" | "block_comment" | "comment" => continue,
            "marker_annotation" | "annotation" => {
                let written = match child.child_by_field_name("name") {
                    Some(name) => node_text(name, source)?,
                    None => node_text(child, source)?,
                };
                ModifierItem::Marker(Marker::new(
                    names.resolve(written),
                    node_text(child, source)?,
                ))
            }
            _ => ModifierItem::Qualifier(Qualifier::new(node_text(child, source)?)),
        };
        items.push(item);
        bounds.push((child.start_byte(), child.end_byte()));
    }

    let (Some(first), Some(last)) = (bounds.first(), bounds.last()) else {
        return Ok(ModifierList::empty_at(node.start_byte()));
    };
    let span = first.0..last.1;
    let mut gaps = Vec::with_capacity(bounds.len().saturating_sub(1));
    for pair in bounds.windows(2) {
        let gap = source.get(pair[0].1..pair[1].0).ok_or(JavaParseError::Span {
            start: pair[0].1,
            end: pair[1].0,
        })?;
        gaps.push(gap.to_string());
    }
    Ok(ModifierList::new(span, gaps, items))
}

fn build_declaration(
    node: Node<'_>,
    kind: JavaKind,
    source: &str,
    names: &Arc<NameResolver>,
) -> Result<JavaDeclaration, JavaParseError> {
    let modifiers = build_modifiers(node, source, names)?;
    let name = declaration_name(node, kind, source)?;
    let line = node.start_position().row + 1;
    let mut decl = JavaDeclaration::new(kind, name, line, modifiers, Arc::clone(names));
    if has_own_error(node, kind) {
        decl.invalidate();
    }

    if kind.is_type() {
        if let Some(body) = node.child_by_field_name("body") {
            collect_members(body, source, names, &mut decl)?;
        }
    }
    Ok(decl)
}

/// Syntax errors that belong to this declaration.
///
/// A type declaration owns errors in its header and modifiers only; its
/// body holds members that are judged on their own. Any other declaration
/// owns every error below it.
fn has_own_error(node: Node<'_>, kind: JavaKind) -> bool {
    if !kind.is_type() {
        return node.has_error();
    }
    let body = node.child_by_field_name("body").map(|b| b.id());
    let mut cursor = node.walk();
    let own = node
        .children(&mut cursor)
        .filter(|child| Some(child.id()) != body)
        .any(|child| child.has_error() || child.is_missing());
    own
}

fn collect_members(
    body: Node<'_>,
    source: &str,
    names: &Arc<NameResolver>,
    parent: &mut JavaDeclaration,
) -> Result<(), JavaParseError> {
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            collect_members(child, source, names, parent)?;
            continue;
        }
        if let Some(kind) = JavaKind::from_node_kind(child.kind()) {
            parent.push_member(build_declaration(child, kind, source, names)?);
        }
    }
    Ok(())
}
