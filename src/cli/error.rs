//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    /// `sort --check` found units that would change
    #[error("{0} file(s) would be reformatted")]
    CheckFailed(usize),

    /// The batch ran to completion but some units or nodes failed
    #[error("{0} failure(s) while sorting")]
    Incomplete(usize),

    #[error("interrupted")]
    Interrupted,
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::CheckFailed(_) => crate::exitcode::CHANGED,
            CliError::Incomplete(_) => crate::exitcode::SOFTWARE,
            CliError::Interrupted => crate::exitcode::INTERRUPTED,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Java(_) => crate::exitcode::DATAERR,
                InfraError::Signal { .. } => crate::exitcode::OSERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::PathNotFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Domain(_) | ApplicationError::OperationFailed { .. } => {
                        crate::exitcode::SOFTWARE
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_errors_when_exit_code_then_sysexits_mapping() {
        assert_eq!(CliError::CheckFailed(2).exit_code(), 1);
        assert_eq!(CliError::Interrupted.exit_code(), 130);
        assert_eq!(
            CliError::from(ApplicationError::PathNotFound(PathBuf::from("x"))).exit_code(),
            crate::exitcode::NOINPUT
        );
        assert_eq!(
            CliError::from(ApplicationError::Config {
                message: "bad".into()
            })
            .exit_code(),
            crate::exitcode::CONFIG
        );
    }
}
