//! scriptdist core - hexagonal release pipeline.
//!
//! This crate provides the domain and application layers for packaging the
//! build validation scripts, checksumming them and publishing them as a
//! release, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         scriptdist-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Version, Assembly, Checksum, Publish, │
//! │   Tag, ReleasePipeline)                 │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │  (Filesystem, Archiver, Digester,       │
//! │   ParserGenerator, ReleaseHost, Tags)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    scriptdist-adapters (Infrastructure) │
//! │  (LocalFilesystem, ZipArchiver, GitHub) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (ReleaseCoordinates, DistributionSpec) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scriptdist_core::domain::{ReleaseCoordinates, ReleaseMode};
//!
//! let coordinates = ReleaseCoordinates::from_marker("3.0\n", ReleaseMode::Final).unwrap();
//! assert_eq!(coordinates.tag_name().as_str(), "v3.0");
//! assert_eq!(
//!     coordinates.archive_file_name("gradle-enterprise-gradle-build-validation", "zip"),
//!     "gradle-enterprise-gradle-build-validation-3.0.zip"
//! );
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AssemblyConfig, AssemblyService, ChecksumConfig, ChecksumService, PipelineOptions,
        PipelineReport, PublishReceipt, PublishRequest, PublishService, ReleasePipeline,
        RetryPolicy, Stage, TagOutcome, TagService, VersionService,
        ports::{Archiver, Digester, Filesystem, ParserGenerator, ReleaseHost, TagStore},
    };
    pub use crate::domain::{
        AccessToken, AssembledSet, ChecksumAlgorithm, ChecksummedSet, CopySpec,
        DistributionSpec, Ecosystem, ReleaseCoordinates, ReleaseMode, ReleaseVersion, TagName,
    };
    pub use crate::error::{ScriptdistError, ScriptdistResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
