//! Priority-driven annotation sorting for Java sources.
//!
//! Layers, innermost first:
//! - [`domain`]: priority resolution and the tree rewriter, free of I/O
//! - [`application`]: settings provider and batch sorting services
//! - [`infrastructure`]: filesystem, error reporting and the tree-sitter Java host
//! - [`cli`]: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
