//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors raised while rewriting a declaration tree.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The node went stale mid-rewrite. Skipped silently.
    #[error("declaration is no longer valid: {0}")]
    InvalidNode(String),

    /// Marker text could not be turned back into a structured marker.
    #[error("cannot parse marker `{text}`: {reason}")]
    MarkerParse { text: String, reason: String },

    #[error("rewrite of {node} failed: {message}")]
    RewriteFailed { node: String, message: String },
}

impl DomainError {
    pub fn marker_parse(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MarkerParse {
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub fn rewrite_failed(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RewriteFailed {
            node: node.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
