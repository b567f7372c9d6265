//! Infrastructure layer: I/O implementations, the Java host and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod java;
pub mod traits;

pub use error::{InfraError, InfraResult};
