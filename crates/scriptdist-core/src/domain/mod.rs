// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for scriptdist.
//!
//! Pure release rules: version resolution, distribution layouts, placeholder
//! substitution and the typed artifact sets that gate each pipeline stage.
//! All I/O goes through the ports defined in the application layer.
//!
//! - **No I/O**: No filesystem, network, or process calls
//! - **Few crates**: std, thiserror, serde and glob
//! - **Immutable values**: Domain objects are Clone + PartialEq

pub mod entities;
pub mod error;
pub mod substitution;
pub mod value_objects;

mod validation;

pub use entities::{
    AssembledSet, ChecksumRecord, ChecksummedSet, CopySource, CopySpec, DistributionArtifact,
    DistributionSpec, PathFilter, RelativePath, ReleaseAsset, ReleaseCoordinates, ReleaseDraft,
    ReleaseVersion, RemoteAsset, RemoteRelease, StagedFile, StagedTree, TagName,
    release::{DEVELOPMENT_DISTRIBUTION_VERSION, DEVELOPMENT_RELEASE_NAME, DEVELOPMENT_TAG},
};

pub use error::{DomainError, ErrorCategory};

pub use substitution::{DEFAULT_SUMMARY_VERSION, Placeholders, is_binary};

pub use value_objects::{AccessToken, ChecksumAlgorithm, Ecosystem, ReleaseMode};

pub use validation::DomainValidator;
