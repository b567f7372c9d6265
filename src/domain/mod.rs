//! Domain layer: entities and ordering logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod memory;
pub mod node;
pub mod resolver;
pub mod rewriter;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use memory::MemoryDeclaration;
pub use node::{DeclarationNode, MemberKind};
pub use resolver::{sorted_marker_texts, tie_break, EffectiveOrder};
pub use rewriter::{RewriteFailure, RewriteReport, TreeRewriter};
