// ============================================================================
// domain/error.rs - RELEASE DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Version marker errors
    // ========================================================================
    #[error("version marker is empty")]
    EmptyVersion,

    #[error("version marker must hold a single line, found {lines} lines")]
    MultiLineVersion { lines: usize },

    #[error("invalid release version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("invalid tag name '{tag}': {reason}")]
    InvalidTagName { tag: String, reason: String },

    // ========================================================================
    // Layout errors
    // ========================================================================
    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Parent directory segments not allowed: {path}")]
    ParentTraversalNotAllowed { path: String },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("distribution '{name}' declares no sources")]
    EmptyDistribution { name: String },

    #[error("invalid archive base name '{name}': {reason}")]
    InvalidBaseName { name: String, reason: String },

    #[error("distribution '{name}' is declared more than once")]
    DuplicateDistribution { name: String },

    // ========================================================================
    // Parsing
    // ========================================================================
    #[error("unknown ecosystem '{0}'")]
    UnknownEcosystem(String),

    #[error("unknown checksum algorithm '{0}'")]
    UnknownAlgorithm(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyVersion => vec![
                "Write the release version into release/version.txt".into(),
                "Example: echo 2.1 > release/version.txt".into(),
            ],
            Self::MultiLineVersion { .. } | Self::InvalidVersion { .. } => vec![
                "The version marker must contain one version, e.g. 2.1".into(),
                "Remove any extra lines or whitespace inside the version".into(),
            ],
            Self::InvalidTagName { tag, .. } => vec![
                format!("'{}' cannot be used as a git tag", tag),
                "Tags may not contain whitespace, '..', '~', '^', ':', '?', '*' or '['".into(),
            ],
            Self::InvalidPattern { pattern, .. } => vec![
                format!("Fix the include/exclude pattern: {}", pattern),
                "Patterns use glob syntax, e.g. lib/** or **/*.m4".into(),
            ],
            Self::UnknownEcosystem(_) => vec!["Supported ecosystems: gradle, maven".into()],
            Self::UnknownAlgorithm(_) => vec!["Supported algorithms: sha256, sha512".into()],
            _ => vec!["Check the distribution layout definition".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyVersion
            | Self::MultiLineVersion { .. }
            | Self::InvalidVersion { .. }
            | Self::InvalidTagName { .. } => ErrorCategory::Validation,
            Self::UnknownEcosystem(_) | Self::UnknownAlgorithm(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
