//! Publish Service - creates or updates the remote release and uploads assets.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ReleaseHost},
        retry::{RetryPolicy, with_retry},
    },
    domain::{
        ChecksummedSet, ReleaseAsset, ReleaseCoordinates, ReleaseDraft, RemoteAsset,
        RemoteRelease, TagName,
    },
    error::{ScriptdistError, ScriptdistResult},
};

/// Appended to asset names while a replacement upload is in flight.
pub const STAGING_SUFFIX: &str = ".partial";

/// Everything needed to publish one release.
///
/// Assets can only come from a `ChecksummedSet`, so unchecksummed archives
/// are never published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    draft: ReleaseDraft,
    overwrite: bool,
    assets: Vec<PathBuf>,
}

impl PublishRequest {
    pub fn new(
        coordinates: &ReleaseCoordinates,
        body: impl Into<String>,
        target_commitish: impl Into<String>,
        assets: &ChecksummedSet,
    ) -> Self {
        Self {
            draft: ReleaseDraft::from_coordinates(coordinates, body, target_commitish),
            overwrite: coordinates.overwrite(),
            assets: assets.asset_paths().into_iter().map(PathBuf::from).collect(),
        }
    }

    pub fn tag(&self) -> &TagName {
        &self.draft.tag
    }

    pub fn draft(&self) -> &ReleaseDraft {
        &self.draft
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn asset_paths(&self) -> &[PathBuf] {
        &self.assets
    }
}

/// Proof that the release was published. Required to create the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    tag: TagName,
    overwrite: bool,
    release: RemoteRelease,
    created: bool,
    uploaded: Vec<String>,
}

impl PublishReceipt {
    pub fn tag(&self) -> &TagName {
        &self.tag
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn release(&self) -> &RemoteRelease {
        &self.release
    }

    /// True when the release did not exist before.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn uploaded(&self) -> &[String] {
        &self.uploaded
    }
}

#[cfg(test)]
impl PublishReceipt {
    pub(crate) fn for_tests(tag: &str, overwrite: bool) -> Self {
        Self {
            tag: TagName::new(tag).unwrap(),
            overwrite,
            release: RemoteRelease {
                id: 1,
                tag: tag.into(),
                name: tag.into(),
                prerelease: overwrite,
                upload_url: String::new(),
                html_url: String::new(),
                assets: vec![],
            },
            created: true,
            uploaded: vec![],
        }
    }
}

pub struct PublishService {
    filesystem: Arc<dyn Filesystem>,
    host: Arc<dyn ReleaseHost>,
    retry: RetryPolicy,
}

impl PublishService {
    pub fn new(filesystem: Arc<dyn Filesystem>, host: Arc<dyn ReleaseHost>) -> Self {
        Self {
            filesystem,
            host,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fail early when the release exists and may not be replaced. Read-only.
    #[instrument(skip_all, fields(tag = %request.tag()))]
    pub fn preflight(&self, request: &PublishRequest) -> ScriptdistResult<Option<RemoteRelease>> {
        let existing = self.find(request.tag())?;
        if let Some(release) = &existing {
            if !request.overwrite() {
                return Err(conflict(request.tag(), release));
            }
            debug!(release_id = release.id, "Existing release will be replaced");
        }
        Ok(existing)
    }

    /// Create or update the release and upload the full asset set.
    ///
    /// An existing release keeps its metadata and assets until every new
    /// asset is on the host. Replacement order:
    ///
    /// 1. upload under staging names
    /// 2. delete the previous assets
    /// 3. rename the staged assets
    /// 4. update the metadata
    #[instrument(skip_all, fields(tag = %request.tag(), overwrite = request.overwrite()))]
    pub fn publish(&self, request: &PublishRequest) -> ScriptdistResult<PublishReceipt> {
        // Every asset is in memory before the host is touched.
        let assets = self.load_assets(request)?;

        let (release, created) = match self.find(request.tag())? {
            Some(existing) if !request.overwrite() => return Err(conflict(request.tag(), &existing)),
            Some(existing) => {
                info!(release_id = existing.id, "Replacing existing release");
                self.replace_assets(&existing, &assets)?;
                let updated = with_retry(&self.retry, "update_release", || {
                    self.host.update_release(existing.id, request.draft())
                })?;
                (updated, false)
            }
            None => {
                info!("Creating release");
                // Not retried: a lost response would leave a duplicate behind.
                let release = self.host.create_release(request.draft())?;
                for asset in &assets {
                    self.upload(&release, asset)?;
                }
                (release, true)
            }
        };

        Ok(PublishReceipt {
            tag: request.tag().clone(),
            overwrite: request.overwrite(),
            release,
            created,
            uploaded: assets.iter().map(|a| a.name.clone()).collect(),
        })
    }

    fn replace_assets(&self, existing: &RemoteRelease, assets: &[ReleaseAsset]) -> ScriptdistResult<()> {
        let (leftovers, previous): (Vec<&RemoteAsset>, Vec<&RemoteAsset>) = existing
            .assets
            .iter()
            .partition(|a| a.name.ends_with(STAGING_SUFFIX));

        for asset in leftovers {
            debug!(asset = %asset.name, "Removing staged asset of an interrupted run");
            self.delete(asset.id)?;
        }

        let mut staged = Vec::with_capacity(assets.len());
        for asset in assets {
            let staging = ReleaseAsset {
                name: format!("{}{STAGING_SUFFIX}", asset.name),
                content_type: asset.content_type,
                contents: asset.contents.clone(),
            };
            match self.upload(existing, &staging) {
                Ok(remote) => staged.push((remote.id, asset.name.as_str())),
                Err(e) => {
                    warn!(error = %e, "Upload failed, previous release left in place");
                    for (id, _) in &staged {
                        if let Err(cleanup) = self.delete(*id) {
                            warn!(asset_id = *id, error = %cleanup, "Could not remove staged asset");
                        }
                    }
                    return Err(e);
                }
            }
        }

        for asset in previous {
            debug!(asset = %asset.name, "Deleting previous asset");
            self.delete(asset.id)?;
        }
        for (id, name) in staged {
            with_retry(&self.retry, "rename_asset", || self.host.rename_asset(id, name))?;
        }
        Ok(())
    }

    fn upload(&self, release: &RemoteRelease, asset: &ReleaseAsset) -> ScriptdistResult<RemoteAsset> {
        let remote = with_retry(&self.retry, "upload_asset", || {
            self.host.upload_asset(release, asset)
        })?;
        info!(asset = %asset.name, size = asset.contents.len(), "Asset uploaded");
        Ok(remote)
    }

    fn delete(&self, asset_id: u64) -> ScriptdistResult<()> {
        with_retry(&self.retry, "delete_asset", || self.host.delete_asset(asset_id))
    }

    fn find(&self, tag: &TagName) -> ScriptdistResult<Option<RemoteRelease>> {
        with_retry(&self.retry, "find_release", || self.host.find_release(tag))
    }

    fn load_assets(&self, request: &PublishRequest) -> ScriptdistResult<Vec<ReleaseAsset>> {
        request
            .asset_paths()
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| ScriptdistError::Internal {
                        message: format!("asset path has no file name: {}", path.display()),
                    })?;
                let contents = self.filesystem.read_file(path).map_err(|e| {
                    warn!(path = %path.display(), "Asset unreadable, aborting before publish");
                    ScriptdistError::from(ApplicationError::Filesystem {
                        path: path.clone(),
                        reason: e.to_string(),
                    })
                })?;
                Ok(ReleaseAsset::new(name, contents))
            })
            .collect()
    }
}

fn conflict(tag: &TagName, release: &RemoteRelease) -> ScriptdistError {
    ApplicationError::ReleaseConflict {
        tag: tag.to_string(),
        reason: format!(
            "release '{}' already exists and final releases are never overwritten",
            release.name
        ),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockFilesystem, MockReleaseHost};
    use crate::domain::{
        AssembledSet, ChecksumAlgorithm, ChecksumRecord, DistributionArtifact, Ecosystem,
        ReleaseMode, RemoteAsset, StagedTree,
    };
    use mockall::Sequence;

    fn assets() -> ChecksummedSet {
        let artifact = DistributionArtifact {
            ecosystem: Ecosystem::Gradle,
            base_name: "dist".into(),
            file_name: "dist-dev.zip".into(),
            path: PathBuf::from("/out/dist-dev.zip"),
            staged: StagedTree::new(PathBuf::from("/stage"), vec![]),
        };
        let assembled = AssembledSet::new(vec![artifact]);
        ChecksummedSet::new(
            assembled.artifacts().to_vec(),
            vec![ChecksumRecord {
                archive: PathBuf::from("/out/dist-dev.zip"),
                algorithm: ChecksumAlgorithm::Sha512,
                digest: "ab".into(),
                sidecar: PathBuf::from("/out/checksums/dist-dev.zip.sha512"),
            }],
        )
    }

    fn request(mode: ReleaseMode) -> PublishRequest {
        let coords = ReleaseCoordinates::from_marker("2.1", mode).unwrap();
        PublishRequest::new(&coords, "notes", "main", &assets())
    }

    fn readable_fs() -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_read_file().returning(|_| Ok(b"bytes".to_vec()));
        fs
    }

    fn remote(tag: &str, assets: Vec<RemoteAsset>) -> RemoteRelease {
        RemoteRelease {
            id: 7,
            tag: tag.into(),
            name: tag.into(),
            prerelease: true,
            upload_url: "https://uploads/7/assets{?name,label}".into(),
            html_url: String::new(),
            assets,
        }
    }

    fn service(fs: MockFilesystem, host: MockReleaseHost) -> PublishService {
        PublishService::new(Arc::new(fs), Arc::new(host)).with_retry_policy(RetryPolicy::none())
    }

    #[test]
    fn final_release_onto_existing_release_is_a_conflict_without_mutation() {
        let mut host = MockReleaseHost::new();
        host.expect_find_release()
            .returning(|_| Ok(Some(remote("v2.1", vec![]))));
        host.expect_create_release().never();
        host.expect_update_release().never();
        host.expect_delete_asset().never();
        host.expect_upload_asset().never();

        let err = service(readable_fs(), host)
            .publish(&request(ReleaseMode::Final))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptdistError::Application(ApplicationError::ReleaseConflict { .. })
        ));
    }

    fn stored(id: u64, asset: &ReleaseAsset) -> RemoteAsset {
        RemoteAsset {
            id,
            name: asset.name.clone(),
        }
    }

    fn development_release() -> RemoteRelease {
        remote(
            "development-latest",
            vec![
                RemoteAsset { id: 1, name: "old.zip".into() },
                RemoteAsset { id: 2, name: "old.zip.sha512".into() },
            ],
        )
    }

    #[test]
    fn development_release_stages_assets_before_dropping_the_old_ones() {
        let mut seq = Sequence::new();
        let mut host = MockReleaseHost::new();
        host.expect_find_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(development_release())));
        host.expect_upload_asset()
            .withf(|release, asset| release.id == 7 && asset.name == "dist-dev.zip.partial")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, asset| Ok(stored(10, asset)));
        host.expect_upload_asset()
            .withf(|_, asset| {
                asset.name == "dist-dev.zip.sha512.partial" && asset.content_type == "text/plain"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, asset| Ok(stored(11, asset)));
        host.expect_delete_asset()
            .withf(|id| *id == 1 || *id == 2)
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        host.expect_rename_asset()
            .withf(|id, name| *id == 10 && name == "dist-dev.zip")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        host.expect_rename_asset()
            .withf(|id, name| *id == 11 && name == "dist-dev.zip.sha512")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        host.expect_update_release()
            .withf(|id, draft| *id == 7 && draft.prerelease && draft.name == "Development release")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(remote("development-latest", vec![])));
        host.expect_create_release().never();

        let receipt = service(readable_fs(), host)
            .publish(&request(ReleaseMode::Development))
            .unwrap();
        assert!(!receipt.created());
        assert_eq!(receipt.uploaded(), ["dist-dev.zip", "dist-dev.zip.sha512"]);
        assert_eq!(receipt.tag().as_str(), "development-latest");
    }

    #[test]
    fn failed_upload_leaves_previous_release_intact() {
        let mut host = MockReleaseHost::new();
        host.expect_find_release()
            .returning(|_| Ok(Some(development_release())));
        host.expect_upload_asset()
            .withf(|_, asset| asset.name == "dist-dev.zip.partial")
            .times(1)
            .returning(|_, asset| Ok(stored(10, asset)));
        host.expect_upload_asset()
            .withf(|_, asset| asset.name == "dist-dev.zip.sha512.partial")
            .times(1)
            .returning(|_, _| {
                Err(ApplicationError::RemoteApi {
                    status: 502,
                    message: "bad gateway".into(),
                }
                .into())
            });
        // Only the staged upload is cleaned up; ids 1 and 2 stay.
        host.expect_delete_asset()
            .withf(|id| *id == 10)
            .times(1)
            .returning(|_| Ok(()));
        host.expect_rename_asset().never();
        host.expect_update_release().never();
        host.expect_create_release().never();

        let err = service(readable_fs(), host)
            .publish(&request(ReleaseMode::Development))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptdistError::Application(ApplicationError::RemoteApi { status: 502, .. })
        ));
    }

    #[test]
    fn staged_leftovers_are_removed_first() {
        let mut seq = Sequence::new();
        let mut host = MockReleaseHost::new();
        host.expect_find_release().returning(|_| {
            Ok(Some(remote(
                "development-latest",
                vec![
                    RemoteAsset { id: 1, name: "old.zip".into() },
                    RemoteAsset { id: 5, name: "dist-dev.zip.partial".into() },
                ],
            )))
        });
        host.expect_delete_asset()
            .withf(|id| *id == 5)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        host.expect_upload_asset()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, asset| Ok(stored(20, asset)));
        host.expect_delete_asset()
            .withf(|id| *id == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        host.expect_rename_asset().times(2).returning(|_, _| Ok(()));
        host.expect_update_release()
            .returning(|_, _| Ok(remote("development-latest", vec![])));

        assert!(service(readable_fs(), host)
            .publish(&request(ReleaseMode::Development))
            .is_ok());
    }

    #[test]
    fn missing_release_is_created() {
        let mut host = MockReleaseHost::new();
        host.expect_find_release().returning(|_| Ok(None));
        host.expect_create_release()
            .withf(|draft| draft.tag.as_str() == "v2.1" && !draft.prerelease && draft.body == "notes")
            .times(1)
            .returning(|_| Ok(remote("v2.1", vec![])));
        host.expect_upload_asset()
            .withf(|_, asset| !asset.contents.is_empty() && !asset.name.ends_with(STAGING_SUFFIX))
            .times(2)
            .returning(|_, asset| Ok(stored(3, asset)));
        host.expect_rename_asset().never();

        let receipt = service(readable_fs(), host)
            .publish(&request(ReleaseMode::Final))
            .unwrap();
        assert!(receipt.created());
        assert!(!receipt.overwrite());
    }

    #[test]
    fn unreadable_asset_aborts_before_any_remote_call() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_file().returning(|p| {
            Err(ApplicationError::Filesystem {
                path: p.to_path_buf(),
                reason: "gone".into(),
            }
            .into())
        });
        let mut host = MockReleaseHost::new();
        host.expect_find_release().never();
        host.expect_create_release().never();
        host.expect_upload_asset().never();

        assert!(service(fs, host).publish(&request(ReleaseMode::Final)).is_err());
    }

    #[test]
    fn preflight_is_read_only() {
        let mut host = MockReleaseHost::new();
        host.expect_find_release()
            .returning(|_| Ok(Some(remote("v2.1", vec![]))));
        host.expect_create_release().never();
        host.expect_update_release().never();

        let err = service(MockFilesystem::new(), host)
            .preflight(&request(ReleaseMode::Final))
            .unwrap_err();
        assert!(err.to_string().contains("v2.1"));
    }

    #[test]
    fn lookups_are_retried_on_network_errors() {
        let mut host = MockReleaseHost::new();
        let mut seq = Sequence::new();
        host.expect_find_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApplicationError::Network { reason: "reset".into() }.into()));
        host.expect_find_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let svc = PublishService::new(Arc::new(MockFilesystem::new()), Arc::new(host))
            .with_retry_policy(RetryPolicy {
                max_attempts: 2,
                initial_delay: std::time::Duration::ZERO,
                max_delay: std::time::Duration::ZERO,
            });
        assert_eq!(svc.preflight(&request(ReleaseMode::Final)).unwrap(), None);
    }
}
