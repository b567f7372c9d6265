//! Marker name resolution and marker text validation for Java units.

use std::collections::HashMap;

use regex::Regex;
use tree_sitter::Node;

use crate::infrastructure::java::{parse_java, JavaParseError};

/// Annotation types visible in every unit without an import.
const JAVA_LANG_MARKERS: &[&str] = &[
    "Deprecated",
    "FunctionalInterface",
    "Override",
    "SafeVarargs",
    "SuppressWarnings",
];

/// Resolves written annotation names against the imports of one unit.
#[derive(Debug)]
pub struct NameResolver {
    imports: HashMap<String, String>,
    marker_head: Regex,
}

impl NameResolver {
    pub fn new() -> Result<Self, JavaParseError> {
        let marker_head = Regex::new(
            r"^@\s*([\p{XID_Start}_$][\p{XID_Continue}$]*(?:\s*\.\s*[\p{XID_Start}_$][\p{XID_Continue}$]*)*)\s*",
        )
        .map_err(|e| JavaParseError::Setup(e.to_string()))?;
        Ok(Self {
            imports: HashMap::new(),
            marker_head,
        })
    }

    /// Register a single-type import (`import a.b.C;`).
    ///
    /// Static and on-demand imports are ignored by the caller.
    pub fn add_import(&mut self, qualified: &str) {
        let qualified = strip_whitespace(qualified);
        let simple = qualified
            .rsplit_once('.')
            .map(|(_, simple)| simple)
            .unwrap_or(&qualified)
            .to_string();
        self.imports.insert(simple, qualified);
    }

    /// Best-effort qualified name for a written annotation name.
    ///
    /// Falls back to the name as written when nothing resolves it.
    pub fn resolve(&self, written: &str) -> String {
        let written = strip_whitespace(written);
        if let Some((head, rest)) = written.split_once('.') {
            return match self.imports.get(head) {
                Some(qualified) => format!("{}.{}", qualified, rest),
                None => written,
            };
        }
        if let Some(qualified) = self.imports.get(&written) {
            return qualified.clone();
        }
        if JAVA_LANG_MARKERS.contains(&written.as_str()) {
            return format!("java.lang.{}", written);
        }
        written
    }

    /// Validate the full text of a marker and return its written name.
    ///
    /// The text must parse, without syntax errors, as exactly one annotation
    /// in front of a type declaration.
    pub fn parse_marker_text(&self, text: &str) -> Result<String, String> {
        let text = text.trim();
        let unit = format!("{}\nclass MarkerHost {{}}\n", text);
        let tree = parse_java(&unit).map_err(|e| e.to_string())?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(format!("`{}` is not a well-formed marker", text));
        }

        let marker = sole_marker(root)
            .filter(|node| node.byte_range() == (0..text.len()))
            .ok_or_else(|| format!("`{}` is not a single marker", text))?;
        let name = marker
            .child_by_field_name("name")
            .and_then(|name| unit.get(name.byte_range()))
            .ok_or_else(|| format!("`{}` has no marker name", text))?;
        Ok(strip_whitespace(name))
    }

    /// Validate a bare marker name such as `Data` or `lombok.Data`.
    pub fn parse_bare_name(&self, name: &str) -> Result<String, String> {
        let text = format!("@{}", name.trim());
        match self.marker_head.captures(&text) {
            Some(caps) if caps[0].len() == text.len() => Ok(strip_whitespace(&caps[1])),
            _ => Err(format!("`{}` is not a marker name", name)),
        }
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The only annotation on the only declaration of a parsed unit.
fn sole_marker(root: Node<'_>) -> Option<Node<'_>> {
    if root.named_child_count() != 1 {
        return None;
    }
    let declaration = root.named_child(0)?;
    let mut cursor = declaration.walk();
    let modifiers = declaration
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers")?;
    if modifiers.named_child_count() != 1 {
        return None;
    }
    modifiers
        .named_child(0)
        .filter(|node| matches!(node.kind(), "annotation" | "marker_annotation"))
}
