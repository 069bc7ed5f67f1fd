//! `scriptdist release`: the full pipeline.
//!
//! 1. Resolve the token; an empty one is sent as-is and the host decides
//! 2. Confirm final releases unless `--yes`
//! 3. Run resolve → assemble → checksum → preflight → publish → tag
//! 4. Render the report

use serde_json::json;
use tracing::{info, instrument, warn};

use scriptdist_core::{application::PipelineReport, domain::ReleaseCoordinates};

use super::context::ProjectContext;
use crate::{
    cli::ReleaseArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(mode = %ctx.mode, dry_run = args.dry_run))]
pub fn execute(args: ReleaseArgs, ctx: &ProjectContext, output: &OutputManager) -> CliResult<()> {
    let token = ctx.config.resolve_token(args.token.clone());
    if token.is_empty() {
        warn!("No GitHub token configured; requests are sent unauthenticated");
    }

    if ctx.mode.is_final() && !args.dry_run && !args.yes {
        let coordinates = ctx.coordinates()?;
        if !output.is_interactive() {
            return Err(CliError::InvalidInput {
                message: format!(
                    "publishing final release {} needs --yes when not running interactively",
                    coordinates.tag_name()
                ),
            });
        }
        if !confirm(&coordinates)? {
            return Err(CliError::Cancelled);
        }
    }

    let specs = ctx.layout(&args.build.ecosystems())?;
    let mut options = ctx.pipeline_options();
    options.dry_run = args.dry_run;
    options.skip_tag = args.skip_tag;

    let pipeline = ctx.pipeline(token)?;
    let spinner = output.spinner();
    let result = pipeline.run_with(&specs, &options, |stage| {
        info!(%stage, "Stage started");
        spinner.set_message(stage.to_string());
    });
    spinner.finish_and_clear();
    let report = result?;

    render(&report, output)
}

fn render(report: &PipelineReport, output: &OutputManager) -> CliResult<()> {
    output.json(&json!({
        "coordinates": report.coordinates,
        "assets": report.assets,
        "commit": report.commit,
        "dry_run": report.receipt.is_none(),
        "release": report.receipt.as_ref().map(|r| r.release()),
        "created": report.receipt.as_ref().map(|r| r.created()),
        "uploaded": report.receipt.as_ref().map(|r| r.uploaded()),
        "tag": report.tag.as_ref().map(ToString::to_string),
    }))?;

    let coordinates = &report.coordinates;
    let Some(receipt) = &report.receipt else {
        output.info(&format!(
            "Dry run: {} would be published with {} asset(s) at {}",
            coordinates.tag_name(),
            report.assets.asset_paths().len(),
            short(&report.commit)
        ))?;
        for path in report.assets.asset_paths() {
            output.print(&format!("  {}", path.display()))?;
        }
        return Ok(());
    };

    let verb = if receipt.created() { "Created" } else { "Updated" };
    output.success(&format!(
        "{verb} release {} ({} asset(s) uploaded)",
        receipt.release().name,
        receipt.uploaded().len()
    ))?;
    if !receipt.release().html_url.is_empty() {
        output.field("url", &receipt.release().html_url)?;
    }
    match &report.tag {
        Some(outcome) => {
            output.field("tag", &format!("{} ({outcome})", coordinates.tag_name()))?;
        }
        None => {
            output.warning(&format!(
                "Tag {} was not touched (--skip-tag)",
                coordinates.tag_name()
            ))?;
        }
    }
    Ok(())
}

fn short(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}

fn prompt(coordinates: &ReleaseCoordinates) -> String {
    format!(
        "Publish final release {} as tag {}? This cannot be overwritten",
        coordinates.release_name(),
        coordinates.tag_name()
    )
}

#[cfg(feature = "interactive")]
fn confirm(coordinates: &ReleaseCoordinates) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt(coordinates))
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(coordinates: &ReleaseCoordinates) -> CliResult<bool> {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt(coordinates));
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: e,
        })?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
