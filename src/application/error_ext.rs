//! Error conversion helpers for per-path operations
//!
//! Attaches the action and the unit path to I/O and parser errors.

use std::error::Error;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting foreign results to `ApplicationResult` with context.
pub trait PathContextExt<T> {
    /// Add path context to an error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&unit)
    ///     .with_path_context("read unit", &unit)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> PathContextExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
