//! Checksum Service - one sidecar per archive.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Digester, Filesystem},
    },
    domain::{AssembledSet, ChecksumRecord, ChecksummedSet},
    error::ScriptdistResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumConfig {
    /// Directory the sidecars are written to.
    pub output_dir: PathBuf,
}

impl ChecksumConfig {
    /// `checksums/` next to the archives.
    pub fn beside(distributions_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: distributions_dir.into().join("checksums"),
        }
    }
}

pub struct ChecksumService {
    filesystem: Arc<dyn Filesystem>,
    digester: Arc<dyn Digester>,
}

impl ChecksumService {
    pub fn new(filesystem: Arc<dyn Filesystem>, digester: Arc<dyn Digester>) -> Self {
        Self {
            filesystem,
            digester,
        }
    }

    /// Digest every archive of the set and write `<archive>.<ext>` sidecars
    /// holding the lowercase hex digest and nothing else.
    #[instrument(skip_all, fields(archives = assembled.len(), algorithm = %self.digester.algorithm()))]
    pub fn generate(
        &self,
        assembled: &AssembledSet,
        config: &ChecksumConfig,
    ) -> ScriptdistResult<ChecksummedSet> {
        let algorithm = self.digester.algorithm();
        self.filesystem
            .create_dir_all(&config.output_dir)
            .map_err(|e| checksum_error(&config.output_dir, e))?;

        let mut records = Vec::with_capacity(assembled.len());
        for artifact in assembled.artifacts() {
            let bytes = self
                .filesystem
                .read_file(&artifact.path)
                .map_err(|e| checksum_error(&artifact.path, e))?;
            let digest = self.digester.digest(&bytes);

            let sidecar = config
                .output_dir
                .join(ChecksumRecord::sidecar_file_name(&artifact.file_name, algorithm));
            self.filesystem
                .write_file(&sidecar, digest.as_bytes())
                .map_err(|e| checksum_error(&sidecar, e))?;
            info!(archive = %artifact.file_name, sidecar = %sidecar.display(), "Checksum written");

            records.push(ChecksumRecord {
                archive: artifact.path.clone(),
                algorithm,
                digest,
                sidecar,
            });
        }

        Ok(ChecksummedSet::new(assembled.artifacts().to_vec(), records))
    }
}

fn checksum_error(path: &std::path::Path, e: impl std::fmt::Display) -> crate::error::ScriptdistError {
    ApplicationError::Checksum {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}
