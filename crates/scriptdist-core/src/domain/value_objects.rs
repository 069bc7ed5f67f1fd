//! Domain value objects: ReleaseMode, Ecosystem, ChecksumAlgorithm, AccessToken.
//!
//! These are pure value types with equality-by-value and no identity. They
//! define string representations and `FromStr` parsers; the release rules
//! that combine them live in `entities::release`.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ReleaseMode ──────────────────────────────────────────────────────────────

/// Whether this invocation produces a development or a final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseMode {
    /// Rolling prerelease, overwritten on every publish.
    #[default]
    Development,
    /// Immutable, versioned release.
    Final,
}

impl ReleaseMode {
    /// The final-release signal is presence-based: any value selects final mode.
    pub const fn from_presence(final_release_present: bool) -> Self {
        if final_release_present {
            Self::Final
        } else {
            Self::Development
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Ecosystem ────────────────────────────────────────────────────────────────

/// Build tool flavor a distribution targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Gradle,
    Maven,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 2] = [Ecosystem::Gradle, Ecosystem::Maven];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gradle => "gradle",
            Self::Maven => "maven",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gradle" => Ok(Self::Gradle),
            "maven" | "mvn" => Ok(Self::Maven),
            other => Err(DomainError::UnknownEcosystem(other.to_string())),
        }
    }
}

// ── ChecksumAlgorithm ────────────────────────────────────────────────────────

/// Digest algorithm used for checksum sidecars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Sha256,
    #[default]
    Sha512,
}

impl ChecksumAlgorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// File extension appended to the archive name for the sidecar.
    pub const fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Length of the lowercase hex digest.
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(DomainError::UnknownAlgorithm(other.to_string())),
        }
    }
}

// ── AccessToken ──────────────────────────────────────────────────────────────

/// Token used to authenticate against the release host.
///
/// An empty token is a valid value: it is sent as-is and the host answers
/// with an authentication failure.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Resolve the token: explicit value, then environment value, then empty.
    pub fn resolve(explicit: Option<String>, from_env: Option<String>) -> Self {
        Self(explicit.or(from_env).unwrap_or_default())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("AccessToken(<empty>)")
        } else {
            f.write_str("AccessToken(<redacted>)")
        }
    }
}
