//! `scriptdist checksum`: assemble, then write one sidecar per archive.

use tracing::instrument;

use super::{assemble, context::ProjectContext};
use crate::{cli::BuildArgs, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(mode = %ctx.mode))]
pub fn execute(args: BuildArgs, ctx: &ProjectContext, output: &OutputManager) -> CliResult<()> {
    let (_, assembled) = assemble::build(&args, ctx, output)?;
    let checksummed = ctx
        .checksum_service()
        .generate(&assembled, &ctx.checksum_config())?;
    output.json(&checksummed)?;

    output.header("Checksums")?;
    for record in checksummed.checksums() {
        output.success(&format!(
            "{}  {}",
            short_digest(&record.digest),
            record.sidecar.display()
        ))?;
    }
    Ok(())
}

fn short_digest(digest: &str) -> &str {
    digest.get(..16).unwrap_or(digest)
}
