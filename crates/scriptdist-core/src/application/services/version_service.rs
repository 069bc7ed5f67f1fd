//! Version resolution: reads the version marker and applies the release rules.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{ReleaseCoordinates, ReleaseMode, ReleaseVersion},
    error::{ScriptdistError, ScriptdistResult},
};

pub struct VersionService {
    filesystem: Arc<dyn Filesystem>,
}

impl VersionService {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Read the version marker and compute the release coordinates.
    #[instrument(skip_all, fields(marker = %version_file.display(), mode = %mode))]
    pub fn resolve(&self, version_file: &Path, mode: ReleaseMode) -> ScriptdistResult<ReleaseCoordinates> {
        let contents = self.read_text(version_file)?;
        let version = ReleaseVersion::parse(&contents).map_err(|e| config_error(version_file, e))?;
        let coordinates =
            ReleaseCoordinates::resolve(version, mode).map_err(|e| config_error(version_file, e))?;

        info!(
            version = %coordinates.release_version(),
            tag = %coordinates.tag_name(),
            distribution = coordinates.distribution_version(),
            "Release coordinates resolved"
        );
        Ok(coordinates)
    }

    /// Read the release notes, trimmed.
    #[instrument(skip_all, fields(notes = %notes_file.display()))]
    pub fn release_notes(&self, notes_file: &Path) -> ScriptdistResult<String> {
        let notes = self.read_text(notes_file)?.trim().to_string();
        debug!(length = notes.len(), "Release notes loaded");
        Ok(notes)
    }

    fn read_text(&self, path: &Path) -> ScriptdistResult<String> {
        let bytes = self.filesystem.read_file(path).map_err(|e| {
            ScriptdistError::from(ApplicationError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
        String::from_utf8(bytes).map_err(|_| {
            ApplicationError::Config {
                path: path.to_path_buf(),
                reason: "file is not valid UTF-8".into(),
            }
            .into()
        })
    }
}

fn config_error(path: &Path, e: impl std::fmt::Display) -> ScriptdistError {
    ApplicationError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}
