//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the release pipeline needs from external systems.
//! The `scriptdist-adapters` crate provides implementations.

use crate::domain::{ReleaseAsset, ReleaseDraft, RemoteAsset, RemoteRelease, TagName};
use crate::error::ScriptdistResult;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `scriptdist_adapters::filesystem::LocalFilesystem` (production)
/// - `scriptdist_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ScriptdistResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> ScriptdistResult<Vec<u8>>;

    /// Write a whole file, replacing any previous content.
    fn write_file(&self, path: &Path, contents: &[u8]) -> ScriptdistResult<()>;

    /// Set or clear the executable bit.
    fn set_permissions(&self, path: &Path, executable: bool) -> ScriptdistResult<()>;

    /// Whether the file carries the executable bit.
    fn is_executable(&self, path: &Path) -> bool;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// All regular files below `root`, relative to it, sorted.
    fn list_files(&self, root: &Path) -> ScriptdistResult<Vec<PathBuf>>;

    /// Remove a directory and all contents. Missing directories are not an error.
    fn remove_dir_all(&self, path: &Path) -> ScriptdistResult<()>;
}

/// One file to place in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the archive, prefix included.
    pub path: String,
    pub contents: Vec<u8>,
    pub executable: bool,
}

/// Port for archive encoding.
///
/// Implementations must be deterministic: the same entries produce the same bytes.
#[cfg_attr(test, automock)]
pub trait Archiver: Send + Sync {
    /// File extension without the dot, e.g. `zip`.
    fn extension(&self) -> &'static str;

    /// Encode entries in the order given.
    fn archive(&self, entries: &[ArchiveEntry]) -> ScriptdistResult<Vec<u8>>;
}

/// Port for digest computation.
#[cfg_attr(test, automock)]
pub trait Digester: Send + Sync {
    fn algorithm(&self) -> crate::domain::ChecksumAlgorithm;

    /// Lowercase hex digest.
    fn digest(&self, contents: &[u8]) -> String;
}

/// Port for the CLI-parser generator.
#[cfg_attr(test, automock)]
pub trait ParserGenerator: Send + Sync {
    /// Generate parsers from templates under `templates_root` into
    /// `output_root`, mirroring the template directory layout.
    fn generate(&self, templates_root: &Path, output_root: &Path) -> ScriptdistResult<()>;
}

/// Port for the remote release host.
#[cfg_attr(test, automock)]
pub trait ReleaseHost: Send + Sync {
    fn find_release(&self, tag: &TagName) -> ScriptdistResult<Option<RemoteRelease>>;

    fn create_release(&self, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease>;

    fn update_release(&self, id: u64, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease>;

    fn delete_asset(&self, asset_id: u64) -> ScriptdistResult<()>;

    /// Upload one asset and return it as stored by the host.
    fn upload_asset(
        &self,
        release: &RemoteRelease,
        asset: &ReleaseAsset,
    ) -> ScriptdistResult<RemoteAsset>;

    fn rename_asset(&self, asset_id: u64, name: &str) -> ScriptdistResult<()>;
}

/// Port for version control tags.
#[cfg_attr(test, automock)]
pub trait TagStore: Send + Sync {
    /// Commit id of `HEAD`.
    fn head_commit(&self) -> ScriptdistResult<String>;

    /// Commit the tag points at, if the tag exists locally.
    fn resolve_tag(&self, tag: &TagName) -> ScriptdistResult<Option<String>>;

    fn create_tag(&self, tag: &TagName, commit: &str, force: bool) -> ScriptdistResult<()>;

    fn push_tag(&self, tag: &TagName, force: bool) -> ScriptdistResult<()>;
}
