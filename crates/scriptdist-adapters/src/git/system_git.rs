//! System git backend for release tags.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

use scriptdist_core::{
    application::{ApplicationError, ports::TagStore},
    domain::TagName,
    error::{ScriptdistError, ScriptdistResult},
};

/// Environment variables passed through to git. Push needs credentials.
const PASSTHROUGH_ENV: &[&str] = &[
    "PATH",
    "HOME",
    "SSH_AUTH_SOCK",
    "GIT_SSH_COMMAND",
    "GIT_ASKPASS",
    "GIT_TERMINAL_PROMPT",
];

/// Tags through the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    repo_path: PathBuf,
    remote: String,
    push: bool,
}

impl SystemGit {
    pub fn new(repo_path: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote: remote.into(),
            push: true,
        }
    }

    /// Keep tags local (`git.push_tags = false`).
    #[must_use]
    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Create a git command with isolated environment
    ///
    /// - Sets working directory to repo path
    /// - Clears environment variables except the passthrough list
    /// - Adds safe configuration overrides
    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo_path);

        cmd.env_clear();
        for key in PASSTHROUGH_ENV {
            if let Ok(value) = std::env::var(key) {
                cmd.env(key, value);
            }
        }

        cmd.arg("-c").arg("advice.detachedHead=false");
        cmd.arg("-c").arg("core.quotePath=false");
        cmd
    }

    fn run(&self, args: &[&str]) -> ScriptdistResult<Output> {
        debug!(args = ?args, "git");
        self.git_cmd().args(args).output().map_err(|e| {
            ApplicationError::Git {
                command: args.join(" "),
                stderr: format!("failed to execute git: {e}"),
            }
            .into()
        })
    }

    fn run_checked(&self, args: &[&str]) -> ScriptdistResult<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(git_error(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl TagStore for SystemGit {
    fn head_commit(&self) -> ScriptdistResult<String> {
        self.run_checked(&["rev-parse", "HEAD"])
    }

    fn resolve_tag(&self, tag: &TagName) -> ScriptdistResult<Option<String>> {
        let spec = format!("refs/tags/{tag}^{{commit}}");
        let args = ["rev-parse", "-q", "--verify", spec.as_str()];
        let output = self.run(&args)?;
        // `--verify -q` exits 1 with empty output when the ref is missing.
        match output.status.code() {
            Some(0) => Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string())),
            Some(1) if output.stdout.is_empty() => Ok(None),
            _ => Err(git_error(&args, &output)),
        }
    }

    fn create_tag(&self, tag: &TagName, commit: &str, force: bool) -> ScriptdistResult<()> {
        let mut args = vec!["tag"];
        if force {
            args.push("-f");
        }
        args.extend([tag.as_str(), commit]);
        self.run_checked(&args).map(|_| ())
    }

    fn push_tag(&self, tag: &TagName, force: bool) -> ScriptdistResult<()> {
        if !self.push {
            debug!(tag = %tag, "Tag push disabled");
            return Ok(());
        }
        let refspec = format!("refs/tags/{tag}");
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([self.remote.as_str(), refspec.as_str()]);
        self.run_checked(&args).map(|_| ())
    }
}

fn git_error(args: &[&str], output: &Output) -> ScriptdistError {
    ApplicationError::Git {
        command: args.join(" "),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validate SHA format (40 hex chars)
    fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn init_repo() -> Option<(tempfile::TempDir, SystemGit)> {
        let dir = tempfile::tempdir().ok()?;
        let git = |args: &[&str]| {
            Command::new("git")
                .arg("-C")
                .arg(dir.path())
                .args(args)
                .output()
                .ok()
                .filter(|o| o.status.success())
        };
        git(&["init", "-q"])?;
        git(&[
            "-c",
            "user.name=t",
            "-c",
            "user.email=t@example.com",
            "commit",
            "-q",
            "--allow-empty",
            "-m",
            "init",
        ])?;
        let store = SystemGit::new(dir.path(), "origin").without_push();
        Some((dir, store))
    }

    #[test]
    fn tags_round_trip_in_a_scratch_repo() {
        // Skip silently where git is unavailable.
        let Some((_dir, store)) = init_repo() else {
            return;
        };
        let head = store.head_commit().unwrap();
        assert!(is_valid_sha(&head));

        let tag = TagName::new("v2.1").unwrap();
        assert_eq!(store.resolve_tag(&tag).unwrap(), None);
        store.create_tag(&tag, &head, false).unwrap();
        assert_eq!(store.resolve_tag(&tag).unwrap(), Some(head.clone()));

        // Non-forced re-creation fails, forced succeeds.
        assert!(store.create_tag(&tag, &head, false).is_err());
        store.create_tag(&tag, &head, true).unwrap();
        store.push_tag(&tag, true).unwrap();
    }
}
