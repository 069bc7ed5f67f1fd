//! In-memory release host that records every mutating call.

use std::sync::{Arc, RwLock};

use scriptdist_core::{
    application::{ApplicationError, ports::ReleaseHost},
    domain::{ReleaseAsset, ReleaseDraft, RemoteAsset, RemoteRelease, TagName},
    error::ScriptdistResult,
};

/// A mutating call made against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Create { tag: String },
    Update { id: u64 },
    DeleteAsset { id: u64 },
    Upload { release: u64, name: String },
    RenameAsset { id: u64, name: String },
}

#[derive(Debug, Default)]
struct Inner {
    releases: Vec<RemoteRelease>,
    /// Asset id to uploaded bytes.
    contents: Vec<(u64, Vec<u8>)>,
    failing_uploads: Vec<String>,
    calls: Vec<HostCall>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryReleaseHost {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReleaseHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing release with named assets.
    #[must_use]
    pub fn with_release(self, tag: &str, name: &str, assets: &[&str]) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let id = inner.next_id();
            let assets = assets
                .iter()
                .map(|name| RemoteAsset {
                    id: inner.next_id(),
                    name: (*name).to_string(),
                })
                .collect();
            inner.releases.push(RemoteRelease {
                id,
                tag: tag.into(),
                name: name.into(),
                prerelease: false,
                upload_url: format!("memory://releases/{id}/assets{{?name,label}}"),
                html_url: format!("memory://releases/{id}"),
                assets,
            });
        }
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.read().map(|i| i.calls.clone()).unwrap_or_default()
    }

    pub fn release(&self, tag: &str) -> Option<RemoteRelease> {
        self.inner
            .read()
            .ok()?
            .releases
            .iter()
            .find(|r| r.tag == tag)
            .cloned()
    }

    /// Uploads of `name` fail with a server error.
    #[must_use]
    pub fn failing_upload(self, name: &str) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_uploads.push(name.to_string());
        }
        self
    }

    /// Uploaded bytes of an asset by name.
    pub fn asset_contents(&self, release_id: u64, name: &str) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        let asset_id = inner
            .releases
            .iter()
            .find(|r| r.id == release_id)?
            .assets
            .iter()
            .find(|a| a.name == name)?
            .id;
        inner
            .contents
            .iter()
            .find(|(id, _)| *id == asset_id)
            .map(|(_, c)| c.clone())
    }
}

impl ReleaseHost for InMemoryReleaseHost {
    fn find_release(&self, tag: &TagName) -> ScriptdistResult<Option<RemoteRelease>> {
        Ok(self.release(tag.as_str()))
    }

    fn create_release(&self, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        if inner.releases.iter().any(|r| r.tag == draft.tag.as_str()) {
            return Err(ApplicationError::ReleaseConflict {
                tag: draft.tag.to_string(),
                reason: "already_exists".into(),
            }
            .into());
        }
        let id = inner.next_id();
        let release = RemoteRelease {
            id,
            tag: draft.tag.to_string(),
            name: draft.name.clone(),
            prerelease: draft.prerelease,
            upload_url: format!("memory://releases/{id}/assets{{?name,label}}"),
            html_url: format!("memory://releases/{id}"),
            assets: vec![],
        };
        inner.releases.push(release.clone());
        inner.calls.push(HostCall::Create {
            tag: draft.tag.to_string(),
        });
        Ok(release)
    }

    fn update_release(&self, id: u64, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        inner.calls.push(HostCall::Update { id });
        let release = inner
            .releases
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApplicationError::RemoteApi {
                status: 404,
                message: format!("release {id} not found"),
            })?;
        release.name = draft.name.clone();
        release.prerelease = draft.prerelease;
        Ok(release.clone())
    }

    fn delete_asset(&self, asset_id: u64) -> ScriptdistResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        inner.calls.push(HostCall::DeleteAsset { id: asset_id });
        for release in &mut inner.releases {
            release.assets.retain(|a| a.id != asset_id);
        }
        inner.contents.retain(|(id, _)| *id != asset_id);
        Ok(())
    }

    fn upload_asset(
        &self,
        release: &RemoteRelease,
        asset: &ReleaseAsset,
    ) -> ScriptdistResult<RemoteAsset> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        if inner.failing_uploads.iter().any(|n| *n == asset.name) {
            return Err(ApplicationError::RemoteApi {
                status: 500,
                message: format!("upload of {} failed", asset.name),
            }
            .into());
        }
        let asset_id = inner.next_id();
        let stored = inner
            .releases
            .iter_mut()
            .find(|r| r.id == release.id)
            .ok_or(ApplicationError::RemoteApi {
                status: 404,
                message: format!("release {} not found", release.id),
            })?;
        if stored.assets.iter().any(|a| a.name == asset.name) {
            return Err(ApplicationError::ReleaseConflict {
                tag: release.tag.clone(),
                reason: format!("asset {} already_exists", asset.name),
            }
            .into());
        }
        let remote = RemoteAsset {
            id: asset_id,
            name: asset.name.clone(),
        };
        stored.assets.push(remote.clone());
        inner.contents.push((asset_id, asset.contents.clone()));
        inner.calls.push(HostCall::Upload {
            release: release.id,
            name: asset.name.clone(),
        });
        Ok(remote)
    }

    fn rename_asset(&self, asset_id: u64, name: &str) -> ScriptdistResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        inner.calls.push(HostCall::RenameAsset {
            id: asset_id,
            name: name.to_string(),
        });
        let release = inner
            .releases
            .iter_mut()
            .find(|r| r.assets.iter().any(|a| a.id == asset_id))
            .ok_or(ApplicationError::RemoteApi {
                status: 404,
                message: format!("asset {asset_id} not found"),
            })?;
        if release.assets.iter().any(|a| a.name == name && a.id != asset_id) {
            return Err(ApplicationError::ReleaseConflict {
                tag: release.tag.clone(),
                reason: format!("asset {name} already_exists"),
            }
            .into());
        }
        for asset in release.assets.iter_mut().filter(|a| a.id == asset_id) {
            asset.name = name.to_string();
        }
        Ok(())
    }
}
