//! `scriptdist assemble`: stage and zip the distributions.

use tracing::{info, instrument};

use scriptdist_core::domain::{AssembledSet, ReleaseCoordinates};

use super::context::ProjectContext;
use crate::{cli::BuildArgs, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(mode = %ctx.mode))]
pub fn execute(args: BuildArgs, ctx: &ProjectContext, output: &OutputManager) -> CliResult<()> {
    let (coordinates, assembled) = build(&args, ctx, output)?;
    output.json(&assembled)?;

    output.header(&format!(
        "Assembled {} distribution(s) for {}",
        assembled.len(),
        coordinates.distribution_version()
    ))?;
    for artifact in assembled.artifacts() {
        output.success(&format!(
            "{} ({} files)",
            artifact.path.display(),
            artifact.staged.file_count()
        ))?;
    }
    Ok(())
}

/// Resolve the version and assemble; shared with `checksum`.
pub(crate) fn build(
    args: &BuildArgs,
    ctx: &ProjectContext,
    output: &OutputManager,
) -> CliResult<(ReleaseCoordinates, AssembledSet)> {
    let coordinates = ctx.coordinates()?;
    let specs = ctx.layout(&args.ecosystems())?;
    info!(distributions = specs.len(), version = coordinates.distribution_version(), "Assembling");

    let spinner = output.spinner();
    spinner.set_message("Assembling distributions");
    let assembled = ctx
        .assembly_service()?
        .assemble(&coordinates, &specs, &ctx.assembly_config());
    spinner.finish_and_clear();

    Ok((coordinates, assembled?))
}
