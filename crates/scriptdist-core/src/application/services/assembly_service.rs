//! Assembly Service - stages each distribution and packs it into an archive.
//!
//! Per distribution:
//! 1. Wipe and recreate the staging dir
//! 2. Apply copy specs in order (later specs overwrite earlier files)
//! 3. Write the staged tree, then archive it under `<base>/`
//!
//! Distributions are independent and assembled on the rayon pool. The
//! `AssembledSet` is returned only when every one of them succeeded.

use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{ArchiveEntry, Archiver, Filesystem, ParserGenerator},
    },
    domain::{
        AssembledSet, CopySource, CopySpec, DEFAULT_SUMMARY_VERSION, DistributionArtifact,
        DistributionSpec, DomainValidator as validator, Placeholders, ReleaseCoordinates,
        StagedFile, StagedTree,
    },
    error::{ScriptdistError, ScriptdistResult},
};

/// Locations and values the assembler needs. All paths are absolute or
/// relative to the current directory; copy sources resolve against
/// `project_root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    pub project_root: PathBuf,
    pub distributions_dir: PathBuf,
    /// Output root of the parser generator.
    pub generated_dir: PathBuf,
    /// Root the generator scans for parser templates.
    pub parser_templates: PathBuf,
    pub summary_version: String,
}

impl AssemblyConfig {
    /// Default layout under `project_root`.
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            distributions_dir: project_root.join("build/distributions"),
            generated_dir: project_root.join("build/generated/scripts"),
            parser_templates: project_root.join("components/scripts"),
            summary_version: DEFAULT_SUMMARY_VERSION.to_string(),
            project_root,
        }
    }
}

/// A file waiting to be written into a staging dir.
struct PendingFile {
    contents: Vec<u8>,
    executable: bool,
    substituted: bool,
}

pub struct AssemblyService {
    filesystem: Arc<dyn Filesystem>,
    archiver: Arc<dyn Archiver>,
    generator: Arc<dyn ParserGenerator>,
}

impl AssemblyService {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        archiver: Arc<dyn Archiver>,
        generator: Arc<dyn ParserGenerator>,
    ) -> Self {
        Self {
            filesystem,
            archiver,
            generator,
        }
    }

    /// Assemble every distribution of the layout.
    #[instrument(
        skip_all,
        fields(
            distributions = specs.len(),
            version = coordinates.distribution_version()
        )
    )]
    pub fn assemble(
        &self,
        coordinates: &ReleaseCoordinates,
        specs: &[DistributionSpec],
        config: &AssemblyConfig,
    ) -> ScriptdistResult<AssembledSet> {
        validator::validate_coordinates(coordinates)?;
        validator::validate_layout(specs)?;

        if specs.iter().any(DistributionSpec::needs_generated) {
            info!(templates = %config.parser_templates.display(), "Generating CLI parsers");
            self.generator
                .generate(&config.parser_templates, &config.generated_dir)?;
        }

        self.filesystem
            .create_dir_all(&config.distributions_dir)
            .map_err(|e| assembly_error(&config.distributions_dir, e))?;

        let placeholders = Placeholders::new(
            coordinates.release_version(),
            config.summary_version.clone(),
        );

        let artifacts = specs
            .par_iter()
            .map(|spec| self.assemble_one(coordinates, spec, config, &placeholders))
            .collect::<ScriptdistResult<Vec<_>>>()?;

        info!(archives = artifacts.len(), "All distributions assembled");
        Ok(AssembledSet::new(artifacts))
    }

    #[instrument(skip_all, fields(distribution = %spec.base_name))]
    fn assemble_one(
        &self,
        coordinates: &ReleaseCoordinates,
        spec: &DistributionSpec,
        config: &AssemblyConfig,
        placeholders: &Placeholders,
    ) -> ScriptdistResult<DistributionArtifact> {
        let staging = config.project_root.join(spec.staging_dir.as_path());
        self.filesystem
            .remove_dir_all(&staging)
            .map_err(|e| assembly_error(&staging, e))?;
        self.filesystem
            .create_dir_all(&staging)
            .map_err(|e| assembly_error(&staging, e))?;

        let mut staged: BTreeMap<String, PendingFile> = BTreeMap::new();
        for copy in &spec.copies {
            self.apply_copy(copy, config, placeholders, &mut staged)?;
        }
        self.write_staging(&staging, &staged)?;
        debug!(files = staged.len(), staging = %staging.display(), "Staging complete");

        let entries: Vec<ArchiveEntry> = staged
            .iter()
            .map(|(path, file)| ArchiveEntry {
                path: format!("{}/{}", spec.base_name, path),
                contents: file.contents.clone(),
                executable: file.executable,
            })
            .collect();
        let bytes = self.archiver.archive(&entries)?;

        let file_name = coordinates.archive_file_name(&spec.base_name, self.archiver.extension());
        let path = config.distributions_dir.join(&file_name);
        self.filesystem
            .write_file(&path, &bytes)
            .map_err(|e| assembly_error(&path, e))?;
        info!(archive = %path.display(), size = bytes.len(), "Archive written");

        let files = staged
            .into_iter()
            .map(|(path, file)| StagedFile {
                path,
                executable: file.executable,
                substituted: file.substituted,
            })
            .collect();

        Ok(DistributionArtifact {
            ecosystem: spec.ecosystem,
            base_name: spec.base_name.clone(),
            file_name,
            path,
            staged: StagedTree::new(staging, files),
        })
    }

    /// Resolve one copy spec and merge its files into `staged`.
    fn apply_copy(
        &self,
        copy: &CopySpec,
        config: &AssemblyConfig,
        placeholders: &Placeholders,
        staged: &mut BTreeMap<String, PendingFile>,
    ) -> ScriptdistResult<()> {
        let filter = copy.filter()?;
        for (source, relative) in self.resolve_sources(copy, config)? {
            if !filter.matches(&relative) {
                continue;
            }

            let raw = self
                .filesystem
                .read_file(&source)
                .map_err(|e| assembly_error(&source, e))?;
            let executable = self.filesystem.is_executable(&source);
            let replaced = if copy.substitute {
                match placeholders.apply(&raw) {
                    Cow::Owned(replaced) => Some(replaced),
                    Cow::Borrowed(_) => None,
                }
            } else {
                None
            };
            let (contents, substituted) = match replaced {
                Some(replaced) => (replaced, true),
                None => (raw, false),
            };

            let destination = copy.destination(&relative)?;
            staged.insert(
                destination.to_slash_string(),
                PendingFile {
                    contents,
                    executable,
                    substituted,
                },
            );
        }
        Ok(())
    }

    /// Source files of a copy spec as `(absolute source, path relative to the source root)`.
    fn resolve_sources(
        &self,
        copy: &CopySpec,
        config: &AssemblyConfig,
    ) -> ScriptdistResult<Vec<(PathBuf, PathBuf)>> {
        match &copy.source {
            CopySource::File(path) => {
                let source = config.project_root.join(path.as_path());
                self.require_file(&source)?;
                Ok(vec![(source, file_name_of(path.as_path()))])
            }
            CopySource::Tree(path) => {
                self.tree_sources(&config.project_root.join(path.as_path()), "source directory")
            }
            CopySource::Generated(path) => self.tree_sources(
                &config.generated_dir.join(path.as_path()),
                "generated parser directory",
            ),
            CopySource::Components(files) => files
                .iter()
                .map(|file| {
                    let source = if file.is_absolute() {
                        file.clone()
                    } else {
                        config.project_root.join(file)
                    };
                    self.require_file(&source)?;
                    Ok((source, file_name_of(file)))
                })
                .collect(),
        }
    }

    fn tree_sources(&self, root: &Path, what: &str) -> ScriptdistResult<Vec<(PathBuf, PathBuf)>> {
        if !self.filesystem.is_dir(root) {
            return Err(ApplicationError::Assembly {
                path: root.to_path_buf(),
                reason: format!("{what} does not exist"),
            }
            .into());
        }
        let files = self
            .filesystem
            .list_files(root)
            .map_err(|e| assembly_error(root, e))?;
        Ok(files
            .into_iter()
            .map(|relative| (root.join(&relative), relative))
            .collect())
    }

    fn require_file(&self, path: &Path) -> ScriptdistResult<()> {
        if !self.filesystem.exists(path) || self.filesystem.is_dir(path) {
            return Err(ApplicationError::Assembly {
                path: path.to_path_buf(),
                reason: "declared source file does not exist".into(),
            }
            .into());
        }
        Ok(())
    }

    fn write_staging(
        &self,
        staging: &Path,
        staged: &BTreeMap<String, PendingFile>,
    ) -> ScriptdistResult<()> {
        for (relative, file) in staged {
            let path = staging.join(relative);
            if let Some(parent) = path.parent() {
                self.filesystem
                    .create_dir_all(parent)
                    .map_err(|e| assembly_error(parent, e))?;
            }
            self.filesystem
                .write_file(&path, &file.contents)
                .map_err(|e| assembly_error(&path, e))?;
            if file.executable {
                self.filesystem
                    .set_permissions(&path, true)
                    .map_err(|e| assembly_error(&path, e))?;
            }
        }
        Ok(())
    }
}

fn file_name_of(path: &Path) -> PathBuf {
    path.file_name().map(PathBuf::from).unwrap_or_default()
}

fn assembly_error(path: &Path, e: ScriptdistError) -> ScriptdistError {
    match e {
        // Already names the right path.
        ScriptdistError::Application(ApplicationError::Assembly { .. }) => e,
        other => ApplicationError::Assembly {
            path: path.to_path_buf(),
            reason: other.to_string(),
        }
        .into(),
    }
}
