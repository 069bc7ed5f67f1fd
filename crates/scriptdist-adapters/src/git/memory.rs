//! In-memory tag store for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use scriptdist_core::{
    application::{ApplicationError, ports::TagStore},
    domain::TagName,
    error::ScriptdistResult,
};

#[derive(Debug, Default)]
struct Inner {
    head: String,
    tags: BTreeMap<String, String>,
    pushed: Vec<(String, bool)>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTagStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTagStore {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                head: head.into(),
                ..Inner::default()
            })),
        }
    }

    #[must_use]
    pub fn with_tag(self, tag: impl Into<String>, commit: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.tags.insert(tag.into(), commit.into());
        }
        self
    }

    pub fn tag(&self, tag: &str) -> Option<String> {
        self.inner.read().ok()?.tags.get(tag).cloned()
    }

    /// `(tag, forced)` for every push, in order.
    pub fn pushes(&self) -> Vec<(String, bool)> {
        self.inner
            .read()
            .map(|i| i.pushed.clone())
            .unwrap_or_default()
    }
}

impl TagStore for InMemoryTagStore {
    fn head_commit(&self) -> ScriptdistResult<String> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.head.clone())
    }

    fn resolve_tag(&self, tag: &TagName) -> ScriptdistResult<Option<String>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.tags.get(tag.as_str()).cloned())
    }

    fn create_tag(&self, tag: &TagName, commit: &str, force: bool) -> ScriptdistResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        if !force && inner.tags.contains_key(tag.as_str()) {
            return Err(ApplicationError::Git {
                command: format!("tag {tag} {commit}"),
                stderr: format!("fatal: tag '{tag}' already exists"),
            }
            .into());
        }
        inner.tags.insert(tag.to_string(), commit.to_string());
        Ok(())
    }

    fn push_tag(&self, tag: &TagName, force: bool) -> ScriptdistResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        inner.pushed.push((tag.to_string(), force));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_unforced_overwrite() {
        let store = InMemoryTagStore::new("abc").with_tag("v1", "old");
        let tag = TagName::new("v1").unwrap();
        assert!(store.create_tag(&tag, "abc", false).is_err());
        store.create_tag(&tag, "abc", true).unwrap();
        assert_eq!(store.tag("v1").as_deref(), Some("abc"));
    }
}
