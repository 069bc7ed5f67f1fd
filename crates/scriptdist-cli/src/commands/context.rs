//! Wiring shared by the pipeline commands: project root, release mode and
//! the adapters behind each core service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use scriptdist_adapters::{
    ArgbashGenerator, ComponentFiles, GitHubConfig, GitHubReleaseHost, LocalFilesystem,
    PrebuiltParsers, ShaDigester, SystemGit, ZipArchiver, builtin_layout,
};
use scriptdist_core::{
    application::{
        AssemblyConfig, AssemblyService, ChecksumConfig, ChecksumService, PipelineOptions,
        PublishService, ReleasePipeline, TagService, VersionService,
        ports::{Filesystem, ParserGenerator},
    },
    domain::{AccessToken, DistributionSpec, Ecosystem, ReleaseCoordinates, ReleaseMode},
    error::ScriptdistError,
};

use crate::{
    cli::GlobalArgs,
    config::{AppConfig, GeneratorKind},
    error::{CliError, CliResult},
};

/// Variable that selects final mode when set, whatever its value.
pub const FINAL_RELEASE_ENV: &str = "FINAL_RELEASE";

/// Everything a pipeline command needs to build services.
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: AppConfig,
    pub mode: ReleaseMode,
}

impl ProjectContext {
    pub fn new(global: &GlobalArgs, config: AppConfig) -> CliResult<Self> {
        let root = project_root(&global.project_dir)?;
        let env = std::env::var_os(FINAL_RELEASE_ENV).map(|v| v.to_string_lossy().into_owned());
        let (mode, falsy) = resolve_mode(global.final_release.as_deref(), env.as_deref());
        if let Some(value) = falsy {
            warn!(
                value = %value,
                "The final-release signal is presence-based; '{value}' still selects final mode"
            );
        }
        debug!(root = %root.display(), mode = %mode, "Project context ready");
        Ok(Self { root, config, mode })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(LocalFilesystem::new())
    }

    /// Built-in layout for the requested ecosystems.
    pub fn layout(&self, ecosystems: &[Ecosystem]) -> CliResult<Vec<DistributionSpec>> {
        let components = ComponentFiles {
            common: self.config.distribution.common_components.clone(),
            maven: self.config.distribution.maven_components.clone(),
        };
        builtin_layout(ecosystems, &components).map_err(|e| CliError::Core(e.into()))
    }

    pub fn coordinates(&self) -> CliResult<ReleaseCoordinates> {
        let version_file = self.resolve(&self.config.project.version_file);
        Ok(self.version_service().resolve(&version_file, self.mode)?)
    }

    pub fn assembly_config(&self) -> AssemblyConfig {
        let project = &self.config.project;
        AssemblyConfig {
            project_root: self.root.clone(),
            distributions_dir: self.resolve(&project.distributions_dir),
            generated_dir: self.resolve(&project.generated_dir),
            parser_templates: self.resolve(&project.parser_templates),
            summary_version: self.config.distribution.summary_version.clone(),
        }
    }

    pub fn checksum_config(&self) -> ChecksumConfig {
        ChecksumConfig {
            output_dir: self.resolve(&self.config.project.checksums_dir),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let project = &self.config.project;
        PipelineOptions {
            mode: self.mode,
            version_file: self.resolve(&project.version_file),
            notes_file: self.resolve(&project.notes_file),
            assembly: self.assembly_config(),
            checksum: self.checksum_config(),
            target_commitish: self.config.github.target_commitish.clone(),
            dry_run: false,
            skip_tag: false,
        }
    }

    pub fn version_service(&self) -> VersionService {
        VersionService::new(self.filesystem())
    }

    pub fn assembly_service(&self) -> CliResult<AssemblyService> {
        Ok(AssemblyService::new(
            self.filesystem(),
            Arc::new(ZipArchiver::new()),
            self.generator()?,
        ))
    }

    pub fn checksum_service(&self) -> ChecksumService {
        ChecksumService::new(self.filesystem(), Arc::new(ShaDigester::default()))
    }

    pub fn publish_service(&self, token: AccessToken) -> CliResult<PublishService> {
        let github = &self.config.github;
        let host = GitHubReleaseHost::new(GitHubConfig {
            api_url: github.api_url.clone(),
            owner: github.owner.clone(),
            repo: github.repo.clone(),
            token,
            connect_timeout: github.connect_timeout(),
            timeout: github.timeout(),
        })?;
        Ok(PublishService::new(self.filesystem(), Arc::new(host))
            .with_retry_policy(github.retry_policy()))
    }

    pub fn tag_service(&self) -> TagService {
        let git = SystemGit::new(&self.root, self.config.git.remote.clone());
        let git = if self.config.git.push_tags {
            git
        } else {
            git.without_push()
        };
        TagService::new(Arc::new(git))
    }

    pub fn pipeline(&self, token: AccessToken) -> CliResult<ReleasePipeline> {
        Ok(ReleasePipeline::new(
            self.version_service(),
            self.assembly_service()?,
            self.checksum_service(),
            self.publish_service(token)?,
            self.tag_service(),
        ))
    }

    fn generator(&self) -> CliResult<Arc<dyn ParserGenerator>> {
        let generator = &self.config.generator;
        match generator.kind {
            GeneratorKind::Argbash => {
                let home = generator.argbash_home.as_ref().ok_or_else(|| {
                    CliError::Core(ScriptdistError::Configuration {
                        message: "generator.argbash_home is not set".into(),
                    })
                })?;
                Ok(Arc::new(ArgbashGenerator::new(self.resolve(home))))
            }
            GeneratorKind::Prebuilt => {
                let source = generator
                    .prebuilt_dir
                    .as_ref()
                    .unwrap_or(&self.config.project.generated_dir);
                Ok(Arc::new(PrebuiltParsers::new(self.resolve(source))))
            }
        }
    }
}

fn project_root(dir: &Path) -> CliResult<PathBuf> {
    if !dir.is_dir() {
        return Err(CliError::InvalidInput {
            message: format!("project directory {} does not exist", dir.display()),
        });
    }
    std::fs::canonicalize(dir).map_err(|e| CliError::IoError {
        message: format!("Failed to resolve project directory '{}'", dir.display()),
        source: e,
    })
}

/// Mode from the flag or the environment, plus the signal's value when it
/// reads as false.
pub fn resolve_mode(flag: Option<&str>, env: Option<&str>) -> (ReleaseMode, Option<String>) {
    let signal = flag.or(env);
    let falsy = signal
        .filter(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "false" | "0" | "no" | "off"
            )
        })
        .map(str::to_string);
    (ReleaseMode::from_presence(signal.is_some()), falsy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn global(dir: &Path) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config: None,
            project_dir: dir.to_path_buf(),
            final_release: Some("true".into()),
            output_format: OutputFormat::Plain,
        }
    }

    #[test]
    fn absent_signal_is_development() {
        assert_eq!(resolve_mode(None, None), (ReleaseMode::Development, None));
    }

    #[test]
    fn any_value_selects_final() {
        assert_eq!(resolve_mode(Some("true"), None).0, ReleaseMode::Final);
        assert_eq!(resolve_mode(None, Some("")).0, ReleaseMode::Final);
        assert_eq!(resolve_mode(None, Some("yes")), (ReleaseMode::Final, None));
    }

    #[test]
    fn falsy_value_still_selects_final_but_is_reported() {
        assert_eq!(
            resolve_mode(Some("False"), None),
            (ReleaseMode::Final, Some("False".to_string()))
        );
        assert_eq!(resolve_mode(None, Some("0")).1.as_deref(), Some("0"));
    }

    #[test]
    fn flag_value_wins_over_environment() {
        assert_eq!(resolve_mode(Some("1"), Some("off")).1, None);
    }

    #[test]
    fn paths_resolve_against_the_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(&global(dir.path()), AppConfig::default()).unwrap();
        let options = ctx.pipeline_options();
        assert_eq!(options.mode, ReleaseMode::Final);
        assert!(options.version_file.ends_with("release/version.txt"));
        assert!(options.version_file.starts_with(&ctx.root));
        assert!(options.checksum.output_dir.ends_with("build/distributions/checksums"));
        assert_eq!(options.target_commitish, "main");
    }

    #[test]
    fn argbash_without_home_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(&global(dir.path()), AppConfig::default()).unwrap();
        let err = ctx.assembly_service().err().unwrap();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn missing_project_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectContext::new(&global(&dir.path().join("nope")), AppConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CliError::InvalidInput { .. }));
    }

    #[test]
    fn layout_honours_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::new(&global(dir.path()), AppConfig::default()).unwrap();
        let layout = ctx.layout(&[Ecosystem::Maven]).unwrap();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].ecosystem, Ecosystem::Maven);
    }
}
