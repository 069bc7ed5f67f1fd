//! Release Pipeline - the explicit stage order.
//!
//! resolve → assemble → checksum → preflight → publish → tag
//!
//! Each stage consumes the typed output of the previous one, so a later stage
//! cannot run on a partial result.

use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument};

use super::{
    assembly_service::{AssemblyConfig, AssemblyService},
    checksum_service::{ChecksumConfig, ChecksumService},
    publish_service::{PublishReceipt, PublishRequest, PublishService},
    tag_service::{TagOutcome, TagService},
    version_service::VersionService,
};
use crate::{
    domain::{ChecksummedSet, DistributionSpec, ReleaseCoordinates, ReleaseMode},
    error::ScriptdistResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Assemble,
    Checksum,
    Preflight,
    Publish,
    Tag,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolve => "Resolving release version",
            Self::Assemble => "Assembling distributions",
            Self::Checksum => "Generating checksums",
            Self::Preflight => "Checking remote state",
            Self::Publish => "Publishing release",
            Self::Tag => "Tagging release",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mode: ReleaseMode,
    pub version_file: PathBuf,
    pub notes_file: PathBuf,
    pub assembly: AssemblyConfig,
    pub checksum: ChecksumConfig,
    /// Release target when tagging is skipped; otherwise `HEAD` is used.
    pub target_commitish: String,
    /// Stop after preflight.
    pub dry_run: bool,
    pub skip_tag: bool,
}

impl PipelineOptions {
    pub fn for_project(project_root: impl Into<PathBuf>, mode: ReleaseMode) -> Self {
        let project_root = project_root.into();
        let assembly = AssemblyConfig::for_project(&project_root);
        Self {
            mode,
            version_file: project_root.join("release/version.txt"),
            notes_file: project_root.join("release/changes.md"),
            checksum: ChecksumConfig::beside(&assembly.distributions_dir),
            assembly,
            target_commitish: "main".into(),
            dry_run: false,
            skip_tag: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub coordinates: ReleaseCoordinates,
    pub assets: ChecksummedSet,
    pub commit: String,
    pub receipt: Option<PublishReceipt>,
    pub tag: Option<TagOutcome>,
}

pub struct ReleasePipeline {
    version: VersionService,
    assembly: AssemblyService,
    checksum: ChecksumService,
    publish: PublishService,
    tag: TagService,
}

impl ReleasePipeline {
    pub fn new(
        version: VersionService,
        assembly: AssemblyService,
        checksum: ChecksumService,
        publish: PublishService,
        tag: TagService,
    ) -> Self {
        Self {
            version,
            assembly,
            checksum,
            publish,
            tag,
        }
    }

    pub fn run(
        &self,
        specs: &[DistributionSpec],
        options: &PipelineOptions,
    ) -> ScriptdistResult<PipelineReport> {
        self.run_with(specs, options, |_| {})
    }

    /// Run every stage, calling `on_stage` as each one starts.
    #[instrument(skip_all, fields(mode = %options.mode, dry_run = options.dry_run))]
    pub fn run_with(
        &self,
        specs: &[DistributionSpec],
        options: &PipelineOptions,
        mut on_stage: impl FnMut(Stage),
    ) -> ScriptdistResult<PipelineReport> {
        on_stage(Stage::Resolve);
        let coordinates = self.version.resolve(&options.version_file, options.mode)?;
        let notes = self.version.release_notes(&options.notes_file)?;

        on_stage(Stage::Assemble);
        let assembled = self.assembly.assemble(&coordinates, specs, &options.assembly)?;

        on_stage(Stage::Checksum);
        let assets = self.checksum.generate(&assembled, &options.checksum)?;

        on_stage(Stage::Preflight);
        let commit = self.tag.head_commit()?;
        // The host creates a missing tag at the release target, so the
        // target must be the commit that gets tagged.
        let target = if options.skip_tag {
            options.target_commitish.as_str()
        } else {
            commit.as_str()
        };
        let request = PublishRequest::new(&coordinates, notes, target, &assets);
        if !options.skip_tag {
            self.tag
                .preflight(coordinates.tag_name(), &commit, coordinates.overwrite())?;
        }
        self.publish.preflight(&request)?;

        if options.dry_run {
            info!("Dry run: stopping before publish");
            return Ok(PipelineReport {
                coordinates,
                assets,
                commit,
                receipt: None,
                tag: None,
            });
        }

        on_stage(Stage::Publish);
        let receipt = self.publish.publish(&request)?;

        let tag = if options.skip_tag {
            None
        } else {
            on_stage(Stage::Tag);
            Some(self.tag.apply(&receipt, &commit)?)
        };

        info!(tag = %coordinates.tag_name(), "Release complete");
        Ok(PipelineReport {
            coordinates,
            assets,
            commit,
            receipt: Some(receipt),
            tag,
        })
    }
}
