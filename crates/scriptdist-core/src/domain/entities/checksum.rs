use serde::Serialize;
use std::path::{Path, PathBuf};

use super::distribution::DistributionArtifact;
use crate::domain::value_objects::ChecksumAlgorithm;

/// Digest of one archive and the sidecar it was written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    pub archive: PathBuf,
    pub algorithm: ChecksumAlgorithm,
    pub digest: String,
    pub sidecar: PathBuf,
}

impl ChecksumRecord {
    /// `<archive file name>.<algorithm extension>`
    pub fn sidecar_file_name(archive_file_name: &str, algorithm: ChecksumAlgorithm) -> String {
        format!("{archive_file_name}.{}", algorithm.extension())
    }
}

/// Archives plus one checksum per archive: the full release asset set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksummedSet {
    artifacts: Vec<DistributionArtifact>,
    checksums: Vec<ChecksumRecord>,
}

impl ChecksummedSet {
    pub(crate) fn new(artifacts: Vec<DistributionArtifact>, checksums: Vec<ChecksumRecord>) -> Self {
        Self {
            artifacts,
            checksums,
        }
    }

    pub fn artifacts(&self) -> &[DistributionArtifact] {
        &self.artifacts
    }

    pub fn checksums(&self) -> &[ChecksumRecord] {
        &self.checksums
    }

    /// Archives first, then sidecars, each in assembly order.
    pub fn asset_paths(&self) -> Vec<&Path> {
        self.artifacts
            .iter()
            .map(|a| a.path.as_path())
            .chain(self.checksums.iter().map(|c| c.sidecar.as_path()))
            .collect()
    }
}
