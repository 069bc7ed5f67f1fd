//! Remote release records as the host sees them.

use serde::{Deserialize, Serialize};

use super::release::{ReleaseCoordinates, TagName};

/// Metadata sent when creating or updating a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDraft {
    pub tag: TagName,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
    pub target_commitish: String,
}

impl ReleaseDraft {
    pub fn from_coordinates(
        coordinates: &ReleaseCoordinates,
        body: impl Into<String>,
        target_commitish: impl Into<String>,
    ) -> Self {
        Self {
            tag: coordinates.tag_name().clone(),
            name: coordinates.release_name().to_string(),
            body: body.into(),
            prerelease: coordinates.prerelease(),
            target_commitish: target_commitish.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: u64,
    pub name: String,
}

/// A release that exists on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRelease {
    pub id: u64,
    pub tag: String,
    pub name: String,
    pub prerelease: bool,
    pub upload_url: String,
    pub html_url: String,
    pub assets: Vec<RemoteAsset>,
}

/// An asset ready for upload, bytes already in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub content_type: &'static str,
    pub contents: Vec<u8>,
}

impl ReleaseAsset {
    pub fn content_type_for(name: &str) -> &'static str {
        if name.ends_with(".zip") {
            "application/zip"
        } else {
            "text/plain"
        }
    }

    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            content_type: Self::content_type_for(&name),
            name,
            contents,
        }
    }
}

impl std::fmt::Debug for ReleaseAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseAsset")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.contents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ReleaseMode;

    #[test]
    fn draft_copies_coordinates() {
        let coords = ReleaseCoordinates::from_marker("2.1", ReleaseMode::Final).unwrap();
        let draft = ReleaseDraft::from_coordinates(&coords, "notes", "main");
        assert_eq!(draft.tag.as_str(), "v2.1");
        assert_eq!(draft.name, "2.1");
        assert!(!draft.prerelease);
        assert_eq!(draft.target_commitish, "main");
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(ReleaseAsset::new("a-dev.zip", vec![]).content_type, "application/zip");
        assert_eq!(ReleaseAsset::new("a-dev.zip.sha512", vec![]).content_type, "text/plain");
    }
}
