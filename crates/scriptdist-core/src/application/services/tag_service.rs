//! Tag Service - creates or moves the release tag once the release is published.

use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

use super::publish_service::PublishReceipt;
use crate::{
    application::{ApplicationError, ports::TagStore},
    domain::TagName,
    error::ScriptdistResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Created,
    Moved { from: String },
    Unchanged,
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Moved { from } => write!(f, "moved from {}", short(from)),
            Self::Unchanged => f.write_str("unchanged"),
        }
    }
}

fn short(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}

pub struct TagService {
    tags: Arc<dyn TagStore>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>) -> Self {
        Self { tags }
    }

    pub fn head_commit(&self) -> ScriptdistResult<String> {
        self.tags.head_commit()
    }

    /// Fail when an immutable tag already points elsewhere. Read-only.
    #[instrument(skip(self))]
    pub fn preflight(&self, tag: &TagName, commit: &str, overwrite: bool) -> ScriptdistResult<()> {
        match self.tags.resolve_tag(tag)? {
            Some(existing) if existing != commit && !overwrite => Err(moved_error(tag, &existing)),
            _ => Ok(()),
        }
    }

    /// Create or move the tag to `commit` and push it.
    ///
    /// Takes the publish receipt so a tag is never written for an
    /// unpublished release.
    #[instrument(skip_all, fields(tag = %receipt.tag(), commit = short(commit)))]
    pub fn apply(&self, receipt: &PublishReceipt, commit: &str) -> ScriptdistResult<TagOutcome> {
        let tag = receipt.tag();
        let force = receipt.overwrite();

        let outcome = match self.tags.resolve_tag(tag)? {
            Some(existing) if existing == commit => TagOutcome::Unchanged,
            Some(existing) if !force => return Err(moved_error(tag, &existing)),
            Some(existing) => {
                self.tags.create_tag(tag, commit, true)?;
                TagOutcome::Moved { from: existing }
            }
            None => {
                self.tags.create_tag(tag, commit, force)?;
                TagOutcome::Created
            }
        };

        self.tags.push_tag(tag, force)?;
        info!(outcome = %outcome, "Tag pushed");
        Ok(outcome)
    }
}

fn moved_error(tag: &TagName, existing: &str) -> crate::error::ScriptdistError {
    ApplicationError::ReleaseConflict {
        tag: tag.to_string(),
        reason: format!("tag already points at {} and may not be moved", short(existing)),
    }
    .into()
}
