//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the per-component structs
//! built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `SCRIPTDIST__<SECTION>__<KEY>`
//! 3. Config file: `--config`, else `.scriptdist.toml` in the project root,
//!    else the user config file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use scriptdist_core::application::RetryPolicy;
use scriptdist_core::domain::{AccessToken, DEFAULT_SUMMARY_VERSION};

/// File name of the project-level configuration.
pub const PROJECT_CONFIG_FILE: &str = ".scriptdist.toml";

/// Variable consulted for the GitHub token when neither the flag nor the
/// config provides one.
pub const TOKEN_ENV: &str = "GITHUB_ACCESS_TOKEN";

const ENV_PREFIX: &str = "SCRIPTDIST";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Project-relative locations.
    pub project: ProjectConfig,
    /// What goes into the archives.
    pub distribution: DistributionConfig,
    /// How CLI parsers are produced.
    pub generator: GeneratorConfig,
    /// Release host.
    pub github: GitHubSettings,
    /// Tagging.
    pub git: GitSettings,
    /// Output settings.
    pub output: OutputConfig,
}

/// Paths relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub version_file: PathBuf,
    pub notes_file: PathBuf,
    pub distributions_dir: PathBuf,
    pub checksums_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub parser_templates: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version_file: "release/version.txt".into(),
            notes_file: "release/changes.md".into(),
            distributions_dir: "build/distributions".into(),
            checksums_dir: "build/distributions/checksums".into(),
            generated_dir: "build/generated/scripts".into(),
            parser_templates: "components/scripts".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Replaces `<SUMMARY_VERSION>` in substituted files.
    pub summary_version: String,
    /// Jars shipped in `lib/build-scan-clients/` of every distribution.
    pub common_components: Vec<PathBuf>,
    /// Jars shipped in `lib/maven-libs/` of the Maven distribution.
    pub maven_components: Vec<PathBuf>,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            summary_version: DEFAULT_SUMMARY_VERSION.into(),
            common_components: Vec::new(),
            maven_components: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Run argbash over the parser templates.
    #[default]
    Argbash,
    /// Copy parsers that were generated elsewhere.
    Prebuilt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    /// Argbash installation, containing `bin/argbash`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argbash_home: Option<PathBuf>,
    /// Source of prebuilt parsers; defaults to the generated dir itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prebuilt_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub target_commitish: String,
    /// Never written back out.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Attempts per remote call, including the first.
    pub max_attempts: u32,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            owner: "gradle".into(),
            repo: "gradle-enterprise-build-validation-scripts".into(),
            target_commitish: "main".into(),
            token: None,
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_attempts: RetryPolicy::default().max_attempts,
        }
    }
}

impl GitHubSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub remote: String,
    /// When false, tags are created locally only.
    pub push_tags: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            remote: "origin".into(),
            push_tags: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration: defaults, then the located file, then environment.
    pub fn load(config_file: Option<&PathBuf>, project_root: &Path) -> anyhow::Result<Self> {
        if let Some(explicit) = config_file.filter(|p| !p.is_file()) {
            anyhow::bail!("config file {} does not exist", explicit.display());
        }

        let defaults = serde_json::to_string(&Self::default())
            .context("serialising default configuration")?;
        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));

        if let Some(path) = Self::locate(config_file, project_root) {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// The configuration file that [`Self::load`] reads, if any.
    pub fn locate(config_file: Option<&PathBuf>, project_root: &Path) -> Option<PathBuf> {
        if let Some(explicit) = config_file {
            return Some(explicit.clone());
        }
        let project = project_root.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }
        Self::user_config_path().filter(|p| p.is_file())
    }

    /// Path of the user-level configuration file.
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "gradle", "scriptdist")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Token precedence: flag, config, `GITHUB_ACCESS_TOKEN`, empty.
    pub fn resolve_token(&self, flag: Option<String>) -> AccessToken {
        AccessToken::resolve(
            flag.or_else(|| self.github.token.clone()),
            std::env::var(TOKEN_ENV).ok(),
        )
    }

    /// Look up a dotted key such as `github.owner`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .try_fold(root, |value, segment| value.get(segment).cloned())
    }
}
