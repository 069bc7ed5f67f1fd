//! Parsers generated ahead of time, e.g. committed or produced by another job.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use scriptdist_core::{
    application::{ApplicationError, ports::ParserGenerator},
    error::{ScriptdistError, ScriptdistResult},
};

/// Copies an existing parser tree into the generator output root.
#[derive(Debug, Clone)]
pub struct PrebuiltParsers {
    source: PathBuf,
}

impl PrebuiltParsers {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ParserGenerator for PrebuiltParsers {
    fn generate(&self, _templates_root: &Path, output_root: &Path) -> ScriptdistResult<()> {
        if !self.source.is_dir() {
            return Err(ApplicationError::Generator {
                reason: format!("prebuilt parser directory {} does not exist", self.source.display()),
            }
            .into());
        }
        if self.source == output_root {
            debug!("Prebuilt parsers already in place");
            return Ok(());
        }

        let mut copied = 0usize;
        for entry in WalkDir::new(&self.source).min_depth(1) {
            let entry = entry.map_err(|e| io_error(&self.source, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.source) else {
                continue;
            };
            let target = output_root.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| io_error(&target, e))?;
            copied += 1;
        }
        info!(files = copied, source = %self.source.display(), "Prebuilt parsers copied");
        Ok(())
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> ScriptdistError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}
