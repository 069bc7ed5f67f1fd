pub mod checksum;
pub mod common;
pub mod distribution;
pub mod publication;
pub mod release;

pub use crate::domain::DomainError;
pub use checksum::{ChecksumRecord, ChecksummedSet};
pub use common::RelativePath;
pub use distribution::{
    AssembledSet, CopySource, CopySpec, DistributionArtifact, DistributionSpec, PathFilter,
    StagedFile, StagedTree, validate_layout,
};
pub use publication::{ReleaseAsset, ReleaseDraft, RemoteAsset, RemoteRelease};
pub use release::{ReleaseCoordinates, ReleaseVersion, TagName};
