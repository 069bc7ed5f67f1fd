//! `scriptdist version`: show what the current mode resolves to.

use tracing::instrument;

use super::context::ProjectContext;
use crate::{error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(mode = %ctx.mode))]
pub fn execute(ctx: &ProjectContext, output: &OutputManager) -> CliResult<()> {
    let coordinates = ctx.coordinates()?;
    output.json(&coordinates)?;

    output.header(&format!("{} release", capitalize(coordinates.mode().as_str())))?;
    output.field("version", coordinates.release_version().as_str())?;
    output.field("distribution version", coordinates.distribution_version())?;
    output.field("tag", coordinates.tag_name().as_str())?;
    output.field("release name", coordinates.release_name())?;
    output.field("prerelease", &coordinates.prerelease().to_string())?;
    output.field("overwrite", &coordinates.overwrite().to_string())?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
