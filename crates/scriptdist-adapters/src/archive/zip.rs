//! Deterministic zip encoding.
//!
//! Entries keep the order they are given in, carry the DOS epoch
//! (1980-01-01 00:00:00) as timestamp, and get mode 0755 or 0644.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use zip::{CompressionMethod, DateTime, ZipWriter, write::FileOptions};

use scriptdist_core::{
    application::{
        ApplicationError,
        ports::{ArchiveEntry, Archiver},
    },
    error::{ScriptdistError, ScriptdistResult},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }

    fn options(executable: bool) -> FileOptions {
        FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(if executable { 0o755 } else { 0o644 })
    }
}

impl Archiver for ZipArchiver {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn archive(&self, entries: &[ArchiveEntry]) -> ScriptdistResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in entries {
            writer
                .start_file(entry.path.as_str(), Self::options(entry.executable))
                .map_err(|e| entry_error(&entry.path, e))?;
            writer
                .write_all(&entry.contents)
                .map_err(|e| entry_error(&entry.path, e))?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| entry_error("<central directory>", e))?;
        Ok(cursor.into_inner())
    }
}

fn entry_error(path: &str, e: impl std::fmt::Display) -> ScriptdistError {
    ApplicationError::Assembly {
        path: PathBuf::from(path),
        reason: format!("failed to write archive entry: {e}"),
    }
    .into()
}
