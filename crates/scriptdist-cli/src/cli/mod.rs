//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use scriptdist_core::domain::Ecosystem;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "scriptdist",
    bin_name = "scriptdist",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Package, checksum and publish the build validation scripts",
    long_about = "scriptdist assembles the Gradle and Maven build validation \
                  script distributions, writes SHA-512 checksums and publishes \
                  them as a GitHub release.",
    after_help = "EXAMPLES:\n\
        \x20 scriptdist version\n\
        \x20 scriptdist assemble --distribution gradle\n\
        \x20 scriptdist release --dry-run\n\
        \x20 FINAL_RELEASE=1 scriptdist release --yes",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved release coordinates.
    #[command(
        about = "Show the release coordinates for the current mode",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist version\n\
            \x20 scriptdist --final-release version --output-format json"
    )]
    Version,

    /// Stage and zip the distributions.
    #[command(
        visible_alias = "a",
        about = "Assemble the distribution archives",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist assemble\n\
            \x20 scriptdist assemble --distribution maven"
    )]
    Assemble(BuildArgs),

    /// Assemble, then write checksum sidecars.
    #[command(
        about = "Assemble and write SHA-512 checksums",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist checksum"
    )]
    Checksum(BuildArgs),

    /// Run the whole pipeline.
    #[command(
        about = "Assemble, checksum, publish and tag a release",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist release --dry-run\n\
            \x20 scriptdist release --token \"$GITHUB_ACCESS_TOKEN\"\n\
            \x20 scriptdist --final-release release --yes"
    )]
    Release(ReleaseArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist init           # .scriptdist.toml in the project\n\
            \x20 scriptdist init --global  # user configuration"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 scriptdist completions bash > ~/.local/share/bash-completion/completions/scriptdist\n\
            \x20 scriptdist completions zsh  > ~/.zfunc/_scriptdist"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 scriptdist config get github.owner\n\
            \x20 scriptdist config list"
    )]
    Config(ConfigCommands),
}

// ── assemble / checksum ───────────────────────────────────────────────────────

/// Arguments shared by the build commands.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Restrict the build to some distributions.
    #[arg(
        short = 'd',
        long = "distribution",
        value_name = "NAME",
        value_enum,
        help = "Only build this distribution (repeatable, default: all)"
    )]
    pub distributions: Vec<Distribution>,
}

// ── release ───────────────────────────────────────────────────────────────────

/// Arguments for `scriptdist release`.
#[derive(Debug, Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Check everything, change nothing remote.
    #[arg(
        long = "dry-run",
        help = "Assemble and check remote state without publishing"
    )]
    pub dry_run: bool,

    /// Skip the final-release confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,

    /// GitHub access token.
    #[arg(
        long = "token",
        value_name = "TOKEN",
        help = "GitHub access token (default: config, then GITHUB_ACCESS_TOKEN)"
    )]
    pub token: Option<String>,

    /// Publish without creating or moving the tag.
    #[arg(long = "skip-tag", help = "Do not create or push the release tag")]
    pub skip_tag: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `scriptdist init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the user configuration directory instead of the project.
    #[arg(long = "global", help = "Create user-level configuration")]
    pub global: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `scriptdist completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `scriptdist config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `github.owner`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path of the configuration file in use.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Distribution flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Distribution {
    Gradle,
    Maven,
}

impl From<Distribution> for Ecosystem {
    fn from(d: Distribution) -> Self {
        match d {
            Distribution::Gradle => Ecosystem::Gradle,
            Distribution::Maven => Ecosystem::Maven,
        }
    }
}

impl BuildArgs {
    /// Requested ecosystems in canonical order; all when none were given.
    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        Ecosystem::ALL
            .into_iter()
            .filter(|e| {
                self.distributions.is_empty()
                    || self.distributions.iter().any(|d| Ecosystem::from(*d) == *e)
            })
            .collect()
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_release_command() {
        let cli = Cli::parse_from(["scriptdist", "release", "--dry-run", "--skip-tag"]);
        let Commands::Release(args) = cli.command else {
            panic!("expected Release command");
        };
        assert!(args.dry_run);
        assert!(args.skip_tag);
        assert!(!args.yes);
    }

    #[test]
    fn final_release_flag_is_presence_based() {
        let cli = Cli::parse_from(["scriptdist", "--final-release", "version"]);
        assert_eq!(cli.global.final_release.as_deref(), Some("true"));

        let cli = Cli::parse_from(["scriptdist", "version", "--final-release=false"]);
        assert_eq!(cli.global.final_release.as_deref(), Some("false"));

        let cli = Cli::parse_from(["scriptdist", "version"]);
        assert!(cli.global.final_release.is_none());
    }

    #[test]
    fn distribution_filter_keeps_canonical_order() {
        let cli = Cli::parse_from(["scriptdist", "assemble", "-d", "maven", "-d", "gradle"]);
        let Commands::Assemble(args) = cli.command else {
            panic!("expected Assemble command");
        };
        assert_eq!(args.ecosystems(), vec![Ecosystem::Gradle, Ecosystem::Maven]);

        let cli = Cli::parse_from(["scriptdist", "assemble", "--distribution", "maven"]);
        let Commands::Assemble(args) = cli.command else {
            panic!("expected Assemble command");
        };
        assert_eq!(args.ecosystems(), vec![Ecosystem::Maven]);
    }

    #[test]
    fn no_filter_means_every_distribution() {
        let cli = Cli::parse_from(["scriptdist", "checksum"]);
        let Commands::Checksum(args) = cli.command else {
            panic!("expected Checksum command");
        };
        assert_eq!(args.ecosystems(), Ecosystem::ALL.to_vec());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["scriptdist", "--quiet", "--verbose", "version"]);
        assert!(result.is_err());
    }

    #[test]
    fn project_dir_defaults_to_cwd() {
        let cli = Cli::parse_from(["scriptdist", "version"]);
        assert_eq!(cli.global.project_dir, std::path::PathBuf::from("."));
    }
}
