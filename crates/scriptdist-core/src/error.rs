//! Unified error handling for scriptdist core.
//!
//! Wraps domain and application errors, with categories the CLI maps to
//! exit codes and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for scriptdist core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptdistError {
    /// Release rule violations.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Orchestration and I/O failures.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ScriptdistError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run `scriptdist config list` to inspect the effective settings".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in scriptdist".into(),
                "Re-run with -vvv and include the log when reporting it".into(),
            ],
        }
    }

    /// Get error category for display and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(e) if e.is_retryable())
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Configuration,
    Remote,
    Internal,
}

/// Convenient result type alias.
pub type ScriptdistResult<T> = Result<T, ScriptdistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_convert_and_categorize() {
        let err: ScriptdistError = DomainError::EmptyVersion.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn network_errors_are_retryable() {
        let err: ScriptdistError = ApplicationError::Network {
            reason: "reset".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Remote);
    }
}
