//! Infrastructure adapters for scriptdist.
//!
//! This crate implements the ports defined in `scriptdist-core::application::ports`.
//! It contains all external dependencies and I/O operations: the local
//! filesystem, zip archives, SHA digests, the argbash parser generator, the
//! system `git` binary and the GitHub releases API.

pub mod archive;
pub mod builtin_layouts;
pub mod digest;
pub mod filesystem;
pub mod generator;
pub mod git;
pub mod release_host;

// Re-export commonly used adapters
pub use archive::ZipArchiver;
pub use builtin_layouts::{ComponentFiles, builtin_layout};
pub use digest::ShaDigester;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use generator::{ArgbashGenerator, PrebuiltParsers};
pub use git::{InMemoryTagStore, SystemGit};
pub use release_host::{GitHubConfig, GitHubReleaseHost, HostCall, InMemoryReleaseHost};
