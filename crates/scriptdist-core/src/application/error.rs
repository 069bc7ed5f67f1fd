//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not release
//! rules. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running a pipeline stage.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A required input (version marker, release notes, layout) is missing or invalid.
    #[error("Configuration error at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// A declared source could not be staged, or an archive could not be written.
    #[error("Assembly failed at {path}: {reason}")]
    Assembly { path: PathBuf, reason: String },

    /// An archive could not be read or its sidecar could not be written.
    #[error("Checksum failed for {path}: {reason}")]
    Checksum { path: PathBuf, reason: String },

    /// The release or tag already exists and may not be overwritten.
    #[error("Release conflict for {tag}: {reason}")]
    ReleaseConflict { tag: String, reason: String },

    /// The release host rejected the credentials.
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    /// The release host could not be reached.
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// The release host answered with an unexpected status.
    #[error("Release host returned {status}: {message}")]
    RemoteApi { status: u16, message: String },

    /// The CLI-parser generator failed.
    #[error("Parser generation failed: {reason}")]
    Generator { reason: String },

    /// A git command failed.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// In-memory adapter state could not be locked.
    #[error("Adapter store error")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config { path, .. } => vec![
                format!("Check that {} exists and is readable", path.display()),
                "Run from the repository root or pass --project-dir".into(),
            ],
            Self::Assembly { path, .. } => vec![
                format!("Missing or unreadable source: {}", path.display()),
                "Check distribution.common_components and distribution.maven_components".into(),
            ],
            Self::Checksum { path, .. } => vec![
                format!("Re-run `scriptdist assemble` to recreate {}", path.display()),
            ],
            Self::ReleaseConflict { tag, .. } => vec![
                format!("A release or tag named {} already exists", tag),
                "Bump release/version.txt for a new final release".into(),
                "Omit --final-release to publish a development release".into(),
            ],
            Self::Auth { .. } => vec![
                "Set GITHUB_ACCESS_TOKEN or pass --token".into(),
                "The token needs the `repo` scope (contents: write)".into(),
            ],
            Self::Network { .. } => vec![
                "Check your network connection and try again".into(),
                "Raise github.timeout_secs or github.max_attempts if the host is slow".into(),
            ],
            Self::RemoteApi { status, .. } => vec![
                format!("The release host answered HTTP {}", status),
                "Check github.owner and github.repo in your configuration".into(),
            ],
            Self::Generator { .. } => vec![
                "Check generator.argbash_home points at an unpacked Argbash".into(),
                "Or set generator.kind = \"prebuilt\" with generated parsers in place".into(),
            ],
            Self::Git { command, .. } => vec![
                format!("Run `git {}` manually to see the full error", command),
                "Ensure you are inside a git checkout with a configured remote".into(),
            ],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Assembly { .. } | Self::Checksum { .. } => ErrorCategory::NotFound,
            Self::ReleaseConflict { .. } => ErrorCategory::Conflict,
            Self::Auth { .. } | Self::Network { .. } | Self::RemoteApi { .. } => {
                ErrorCategory::Remote
            }
            Self::Generator { .. } | Self::Git { .. } => ErrorCategory::Internal,
            Self::Filesystem { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::StoreLockError => true,
            Self::RemoteApi { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
