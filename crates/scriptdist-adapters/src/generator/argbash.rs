//! Argbash as a black-box parser generator.
//!
//! Every `*-cli-parser.m4` template under the templates root becomes a `.sh`
//! parser at the same relative location under the output root.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use scriptdist_core::{
    application::{ApplicationError, ports::ParserGenerator},
    domain::PathFilter,
    error::{ScriptdistError, ScriptdistResult},
};

pub const TEMPLATE_PATTERN: &str = "**/*-cli-parser.m4";
pub const TEMPLATE_EXCLUDES: [&str; 2] = ["gradle/.data/", "maven/.data/"];

#[derive(Debug, Clone)]
pub struct ArgbashGenerator {
    home: PathBuf,
}

impl ArgbashGenerator {
    /// `home` is the unpacked Argbash distribution (contains `bin/argbash`).
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn executable(&self) -> PathBuf {
        self.home.join("bin").join("argbash")
    }

    /// Templates to process, relative to `templates_root`, sorted.
    pub fn templates(templates_root: &Path) -> ScriptdistResult<Vec<PathBuf>> {
        let filter = PathFilter::new(
            &[TEMPLATE_PATTERN.to_string()],
            &TEMPLATE_EXCLUDES.map(String::from),
        )?;
        let mut templates = Vec::new();
        for entry in WalkDir::new(templates_root).min_depth(1) {
            let entry = entry.map_err(|e| generator_error(format!("directory walk error: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(templates_root) else {
                continue;
            };
            if filter.matches(relative) {
                templates.push(relative.to_path_buf());
            }
        }
        templates.sort();
        Ok(templates)
    }
}

impl ParserGenerator for ArgbashGenerator {
    #[instrument(skip_all, fields(home = %self.home.display()))]
    fn generate(&self, templates_root: &Path, output_root: &Path) -> ScriptdistResult<()> {
        let argbash = self.executable();
        if !argbash.is_file() {
            return Err(generator_error(format!(
                "argbash not found at {}",
                argbash.display()
            )));
        }

        if templates_root.starts_with(output_root) {
            return Err(generator_error(format!(
                "output {} would contain the templates in {}",
                output_root.display(),
                templates_root.display()
            )));
        }
        // Parsers of deleted templates must not reach the archives.
        if output_root.exists() {
            debug!(output = %output_root.display(), "Clearing previous parsers");
            std::fs::remove_dir_all(output_root).map_err(|e| {
                ScriptdistError::from(ApplicationError::Filesystem {
                    path: output_root.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;
        }

        let templates = Self::templates(templates_root)?;
        for relative in &templates {
            let template = templates_root.join(relative);
            let output = output_root.join(relative).with_extension("sh");
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ScriptdistError::from(ApplicationError::Filesystem {
                        path: parent.to_path_buf(),
                        reason: e.to_string(),
                    })
                })?;
            }

            debug!(template = %relative.display(), "Running argbash");
            let result = Command::new(&argbash)
                .arg(&template)
                .arg("-o")
                .arg(&output)
                .output()
                .map_err(|e| generator_error(format!("failed to run {}: {e}", argbash.display())))?;
            if !result.status.success() {
                return Err(generator_error(format!(
                    "{}: {}",
                    relative.display(),
                    String::from_utf8_lossy(&result.stderr).trim()
                )));
            }
        }

        info!(parsers = templates.len(), "CLI parsers generated");
        Ok(())
    }
}

fn generator_error(reason: String) -> ScriptdistError {
    ApplicationError::Generator { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn selects_parser_templates_and_skips_data_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "lib/cli-parsers/gradle/01-cli-parser.m4",
            "lib/cli-parsers/gradle/common.m4",
            "lib/cli-parsers/maven/02-cli-parser.m4",
            "gradle/.data/x-cli-parser.m4",
            "maven/.data/y-cli-parser.m4",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "m4").unwrap();
        }

        let templates = ArgbashGenerator::templates(root).unwrap();
        assert_eq!(
            templates,
            vec![
                PathBuf::from("lib/cli-parsers/gradle/01-cli-parser.m4"),
                PathBuf::from("lib/cli-parsers/maven/02-cli-parser.m4"),
            ]
        );
    }

    #[test]
    fn missing_argbash_is_a_generator_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArgbashGenerator::new(dir.path().join("argbash"))
            .generate(dir.path(), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptdistError::Application(ApplicationError::Generator { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn runs_argbash_per_template() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("argbash");
        fs::create_dir_all(home.join("bin")).unwrap();
        let fake = home.join("bin/argbash");
        // Copies the template to the -o target.
        fs::write(&fake, "#!/bin/sh\ncp \"$1\" \"$3\"\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let templates = dir.path().join("scripts");
        fs::create_dir_all(templates.join("lib/cli-parsers/gradle")).unwrap();
        fs::write(templates.join("lib/cli-parsers/gradle/a-cli-parser.m4"), "parser").unwrap();

        let out = dir.path().join("out");
        ArgbashGenerator::new(&home).generate(&templates, &out).unwrap();
        assert_eq!(
            fs::read_to_string(out.join("lib/cli-parsers/gradle/a-cli-parser.sh")).unwrap(),
            "parser"
        );
    }

    #[cfg(unix)]
    #[test]
    fn parsers_of_removed_templates_are_cleared() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("argbash");
        fs::create_dir_all(home.join("bin")).unwrap();
        let fake = home.join("bin/argbash");
        fs::write(&fake, "#!/bin/sh\ncp \"$1\" \"$3\"\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let templates = dir.path().join("scripts");
        fs::create_dir_all(templates.join("lib/cli-parsers/maven")).unwrap();
        fs::write(templates.join("lib/cli-parsers/maven/b-cli-parser.m4"), "b").unwrap();

        let out = dir.path().join("out");
        let stale = out.join("lib/cli-parsers/gradle/a-cli-parser.sh");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        ArgbashGenerator::new(&home).generate(&templates, &out).unwrap();
        assert!(!stale.exists());
        assert!(out.join("lib/cli-parsers/maven/b-cli-parser.sh").is_file());
    }

    #[test]
    fn output_enclosing_the_templates_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("argbash");
        fs::create_dir_all(home.join("bin")).unwrap();
        fs::write(home.join("bin/argbash"), "").unwrap();
        let templates = dir.path().join("scripts");
        fs::create_dir_all(&templates).unwrap();

        let err = ArgbashGenerator::new(&home)
            .generate(&templates, dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("would contain the templates"));
        assert!(templates.is_dir());
    }
}
