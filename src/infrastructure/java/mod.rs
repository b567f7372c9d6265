//! Java host: maps tree-sitter parse trees onto [`crate::domain::DeclarationNode`].

pub mod declaration;
pub mod names;
pub mod parser;

use thiserror::Error;
use tree_sitter::{Parser, Tree};

pub use declaration::{JavaDeclaration, JavaKind, ModifierItem, ModifierList};
pub use names::NameResolver;
pub use parser::JavaSource;

/// File extension of the units the sorter processes.
pub const JAVA_EXTENSION: &str = "java";

#[derive(Error, Debug)]
pub enum JavaParseError {
    #[error("parser setup failed: {0}")]
    Setup(String),

    #[error("parser gave up on the unit")]
    Aborted,

    #[error("node span {start}..{end} is not valid text")]
    Span { start: usize, end: usize },
}

/// Parse `text` as a Java compilation unit.
pub(crate) fn parse_java(text: &str) -> Result<Tree, JavaParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| JavaParseError::Setup(e.to_string()))?;
    parser.parse(text, None).ok_or(JavaParseError::Aborted)
}
