//! Release coordinates: the version marker, the mode, and everything derived
//! from the two.
//!
//! | mode        | distribution | tag                  | name                  | prerelease | overwrite |
//! |-------------|--------------|----------------------|-----------------------|------------|-----------|
//! | development | `dev`        | `development-latest` | `Development release` | true       | true      |
//! | final       | version      | `v` + version        | version               | false      | false     |

use serde::Serialize;
use std::fmt;

use crate::domain::{error::DomainError, value_objects::ReleaseMode};

/// Tag used for the rolling development release.
pub const DEVELOPMENT_TAG: &str = "development-latest";
/// Release name used for the rolling development release.
pub const DEVELOPMENT_RELEASE_NAME: &str = "Development release";
/// Distribution file suffix used for development builds.
pub const DEVELOPMENT_DISTRIBUTION_VERSION: &str = "dev";

// ── ReleaseVersion ────────────────────────────────────────────────────────────

/// The release version read from the version marker, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Parse the raw contents of the version marker file.
    pub fn parse(contents: &str) -> Result<Self, DomainError> {
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyVersion);
        }

        let lines = trimmed.lines().count();
        if lines > 1 {
            return Err(DomainError::MultiLineVersion { lines });
        }

        // The version ends up in file names and tag names.
        if let Some(bad) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '~' | '^'))
        {
            return Err(DomainError::InvalidVersion {
                value: trimmed.to_string(),
                reason: format!("contains forbidden character {bad:?}"),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── TagName ───────────────────────────────────────────────────────────────────

/// A git tag name, validated against the ref-name rules that matter here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        let invalid = |reason: &str| DomainError::InvalidTagName {
            tag: tag.clone(),
            reason: reason.to_string(),
        };

        if tag.is_empty() {
            return Err(invalid("tag is empty"));
        }
        if tag.starts_with('-') || tag.starts_with('/') || tag.ends_with('/') {
            return Err(invalid("tag may not start with '-' or start/end with '/'"));
        }
        if tag.ends_with(".lock") || tag.ends_with('.') {
            return Err(invalid("tag may not end with '.lock' or '.'"));
        }
        if tag.contains("..") || tag.contains("@{") || tag.contains("//") {
            return Err(invalid("tag may not contain '..', '@{' or '//'"));
        }
        if tag
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
        {
            return Err(invalid("tag contains a forbidden character"));
        }

        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── ReleaseCoordinates ────────────────────────────────────────────────────────

/// Everything downstream components need to know about this release.
///
/// Computed once per invocation and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseCoordinates {
    release_version: ReleaseVersion,
    mode: ReleaseMode,
    distribution_version: String,
    tag_name: TagName,
    release_name: String,
    prerelease: bool,
    overwrite: bool,
}

impl ReleaseCoordinates {
    /// Apply the release rule table. Pure: no I/O, no clock.
    pub fn resolve(release_version: ReleaseVersion, mode: ReleaseMode) -> Result<Self, DomainError> {
        let coordinates = match mode {
            ReleaseMode::Development => Self {
                distribution_version: DEVELOPMENT_DISTRIBUTION_VERSION.to_string(),
                tag_name: TagName::new(DEVELOPMENT_TAG)?,
                release_name: DEVELOPMENT_RELEASE_NAME.to_string(),
                prerelease: true,
                overwrite: true,
                release_version,
                mode,
            },
            ReleaseMode::Final => Self {
                distribution_version: release_version.as_str().to_string(),
                tag_name: TagName::new(format!("v{release_version}"))?,
                release_name: release_version.as_str().to_string(),
                prerelease: false,
                overwrite: false,
                release_version,
                mode,
            },
        };
        Ok(coordinates)
    }

    /// Parse the version marker contents and resolve in one step.
    pub fn from_marker(contents: &str, mode: ReleaseMode) -> Result<Self, DomainError> {
        Self::resolve(ReleaseVersion::parse(contents)?, mode)
    }

    pub fn release_version(&self) -> &ReleaseVersion {
        &self.release_version
    }

    pub fn mode(&self) -> ReleaseMode {
        self.mode
    }

    pub fn distribution_version(&self) -> &str {
        &self.distribution_version
    }

    pub fn tag_name(&self) -> &TagName {
        &self.tag_name
    }

    pub fn release_name(&self) -> &str {
        &self.release_name
    }

    pub fn prerelease(&self) -> bool {
        self.prerelease
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// `<base>-<distribution version>.<extension>`
    pub fn archive_file_name(&self, base_name: &str, extension: &str) -> String {
        format!("{base_name}-{}.{extension}", self.distribution_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_release_coordinates() {
        let c = ReleaseCoordinates::from_marker("3.0\n", ReleaseMode::Final).unwrap();
        assert_eq!(c.release_version().as_str(), "3.0");
        assert_eq!(c.distribution_version(), "3.0");
        assert_eq!(c.tag_name().as_str(), "v3.0");
        assert_eq!(c.release_name(), "3.0");
        assert!(!c.prerelease());
        assert!(!c.overwrite());
        assert_eq!(
            c.archive_file_name("gradle-enterprise-gradle-build-validation", "zip"),
            "gradle-enterprise-gradle-build-validation-3.0.zip"
        );
    }

    #[test]
    fn development_coordinates_ignore_version() {
        for marker in ["1.0", "2.1", "  9.9.9-rc1  "] {
            let c = ReleaseCoordinates::from_marker(marker, ReleaseMode::Development).unwrap();
            assert_eq!(c.distribution_version(), "dev");
            assert_eq!(c.tag_name().as_str(), "development-latest");
            assert_eq!(c.release_name(), "Development release");
            assert!(c.prerelease());
            assert!(c.overwrite());
        }
    }

    #[test]
    fn development_still_carries_release_version() {
        let c = ReleaseCoordinates::from_marker("2.1", ReleaseMode::Development).unwrap();
        assert_eq!(c.release_version().as_str(), "2.1");
    }

    #[test]
    fn empty_marker_is_rejected() {
        assert_eq!(ReleaseVersion::parse("  \n\t"), Err(DomainError::EmptyVersion));
    }

    #[test]
    fn multi_line_marker_is_rejected() {
        assert!(matches!(
            ReleaseVersion::parse("2.1\n2.2\n"),
            Err(DomainError::MultiLineVersion { lines: 2 })
        ));
    }

    #[test]
    fn version_with_space_is_rejected() {
        assert!(matches!(
            ReleaseVersion::parse("2 1"),
            Err(DomainError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn tag_names_follow_ref_rules() {
        assert!(TagName::new("v2.1").is_ok());
        assert!(TagName::new("development-latest").is_ok());
        assert!(TagName::new("").is_err());
        assert!(TagName::new("v1..2").is_err());
        assert!(TagName::new("-v1").is_err());
        assert!(TagName::new("v1.lock").is_err());
        assert!(TagName::new("v1 2").is_err());
    }

    #[test]
    fn coordinates_serialize_flat() {
        let c = ReleaseCoordinates::from_marker("3.0", ReleaseMode::Final).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "release_version": "3.0",
                "mode": "final",
                "distribution_version": "3.0",
                "tag_name": "v3.0",
                "release_name": "3.0",
                "prerelease": false,
                "overwrite": false
            })
        );
    }
}
