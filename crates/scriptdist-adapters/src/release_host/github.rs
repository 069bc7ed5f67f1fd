//! GitHub REST v3 release host.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use scriptdist_core::{
    application::{ApplicationError, ports::ReleaseHost},
    domain::{AccessToken, ReleaseAsset, ReleaseDraft, RemoteAsset, RemoteRelease, TagName},
    error::{ScriptdistError, ScriptdistResult},
};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("scriptdist/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: AccessToken,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            owner: "gradle".into(),
            repo: "gradle-enterprise-build-validation-scripts".into(),
            token: AccessToken::default(),
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct GitHubReleaseHost {
    config: GitHubConfig,
    http_client: Client,
}

#[derive(Serialize)]
struct ReleasePayload<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
    generate_release_notes: bool,
}

impl<'a> From<&'a ReleaseDraft> for ReleasePayload<'a> {
    fn from(draft: &'a ReleaseDraft) -> Self {
        Self {
            tag_name: draft.tag.as_str(),
            target_commitish: &draft.target_commitish,
            name: &draft.name,
            body: &draft.body,
            draft: false,
            prerelease: draft.prerelease,
            generate_release_notes: false,
        }
    }
}

#[derive(Deserialize)]
struct ReleaseResponse {
    id: u64,
    tag_name: String,
    name: Option<String>,
    #[serde(default)]
    prerelease: bool,
    upload_url: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    assets: Vec<RemoteAsset>,
}

impl From<ReleaseResponse> for RemoteRelease {
    fn from(r: ReleaseResponse) -> Self {
        Self {
            id: r.id,
            name: r.name.unwrap_or_else(|| r.tag_name.clone()),
            tag: r.tag_name,
            prerelease: r.prerelease,
            upload_url: r.upload_url,
            html_url: r.html_url,
            assets: r.assets,
        }
    }
}

impl GitHubReleaseHost {
    pub fn new(config: GitHubConfig) -> ScriptdistResult<Self> {
        if config.owner.trim().is_empty() || config.repo.trim().is_empty() {
            return Err(ScriptdistError::Configuration {
                message: "github.owner and github.repo must not be empty".into(),
            });
        }
        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScriptdistError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);
        // Anonymous reads still work against public repositories.
        if self.config.token.is_empty() {
            request
        } else {
            request.bearer_auth(self.config.token.expose())
        }
    }

    fn send(&self, request: RequestBuilder) -> ScriptdistResult<Response> {
        self.authorized(request).send().map_err(|e| {
            ApplicationError::Network {
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn asset_from(response: Response, context: &str) -> ScriptdistResult<RemoteAsset> {
        let status = response.status();
        response.json::<RemoteAsset>().map_err(|e| {
            ApplicationError::RemoteApi {
                status: status.as_u16(),
                message: format!("unexpected asset payload for {context}: {e}"),
            }
            .into()
        })
    }

    fn find_asset(&self, release_id: u64, name: &str) -> ScriptdistResult<Option<RemoteAsset>> {
        let response = self.send(
            self.http_client
                .get(self.repo_url(&format!("releases/{release_id}/assets")))
                .query(&[("per_page", "100")]),
        )?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, &body_of(response), name));
        }
        let assets = response.json::<Vec<RemoteAsset>>().map_err(|e| {
            ScriptdistError::from(ApplicationError::RemoteApi {
                status: status.as_u16(),
                message: format!("unexpected asset list: {e}"),
            })
        })?;
        Ok(assets.into_iter().find(|a| a.name == name))
    }

    fn release_from(response: Response, context: &str) -> ScriptdistResult<RemoteRelease> {
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, &body_of(response), context));
        }
        response
            .json::<ReleaseResponse>()
            .map(RemoteRelease::from)
            .map_err(|e| {
                ApplicationError::RemoteApi {
                    status: status.as_u16(),
                    message: format!("unexpected release payload: {e}"),
                }
                .into()
            })
    }
}

impl ReleaseHost for GitHubReleaseHost {
    #[instrument(skip(self))]
    fn find_release(&self, tag: &TagName) -> ScriptdistResult<Option<RemoteRelease>> {
        let url = self.repo_url(&format!("releases/tags/{tag}"));
        let response = self.send(self.http_client.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No release for tag");
            return Ok(None);
        }
        Self::release_from(response, tag.as_str()).map(Some)
    }

    #[instrument(skip_all, fields(tag = %draft.tag))]
    fn create_release(&self, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease> {
        let response = self.send(
            self.http_client
                .post(self.repo_url("releases"))
                .json(&ReleasePayload::from(draft)),
        )?;
        Self::release_from(response, draft.tag.as_str())
    }

    #[instrument(skip_all, fields(tag = %draft.tag, id = id))]
    fn update_release(&self, id: u64, draft: &ReleaseDraft) -> ScriptdistResult<RemoteRelease> {
        let response = self.send(
            self.http_client
                .patch(self.repo_url(&format!("releases/{id}")))
                .json(&ReleasePayload::from(draft)),
        )?;
        Self::release_from(response, draft.tag.as_str())
    }

    #[instrument(skip(self))]
    fn delete_asset(&self, asset_id: u64) -> ScriptdistResult<()> {
        let response = self.send(
            self.http_client
                .delete(self.repo_url(&format!("releases/assets/{asset_id}"))),
        )?;
        let status = response.status();
        // Already gone counts as deleted.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_for(status, &body_of(response), &format!("asset {asset_id}")))
    }

    #[instrument(skip_all, fields(asset = %asset.name, size = asset.contents.len()))]
    fn upload_asset(
        &self,
        release: &RemoteRelease,
        asset: &ReleaseAsset,
    ) -> ScriptdistResult<RemoteAsset> {
        let response = self.send(
            self.http_client
                .post(upload_endpoint(&release.upload_url))
                .query(&[("name", asset.name.as_str())])
                .header("Content-Type", asset.content_type)
                .body(asset.contents.clone()),
        )?;
        let status = response.status();
        if status.is_success() {
            return Self::asset_from(response, &asset.name);
        }
        let body = body_of(response);
        // A retry after a lost response finds the first upload already stored.
        if status == StatusCode::UNPROCESSABLE_ENTITY && body.contains("already_exists") {
            if let Some(existing) = self.find_asset(release.id, &asset.name)? {
                debug!(asset_id = existing.id, "Asset already uploaded");
                return Ok(existing);
            }
        }
        Err(error_for(status, &body, &asset.name))
    }

    #[instrument(skip(self))]
    fn rename_asset(&self, asset_id: u64, name: &str) -> ScriptdistResult<()> {
        let response = self.send(
            self.http_client
                .patch(self.repo_url(&format!("releases/assets/{asset_id}")))
                .json(&serde_json::json!({ "name": name })),
        )?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(error_for(status, &body_of(response), name))
    }
}

/// Strip the RFC 6570 template suffix GitHub appends to `upload_url`.
fn upload_endpoint(upload_url: &str) -> &str {
    upload_url.split('{').next().unwrap_or(upload_url)
}

fn body_of(response: Response) -> String {
    response
        .text()
        .unwrap_or_else(|_| "unable to read response body".to_string())
}

/// Map a failed response to the error taxonomy.
fn error_for(status: StatusCode, body: &str, context: &str) -> ScriptdistError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApplicationError::Auth {
            reason: format!("{} for {context}: {}", status.as_u16(), summarize(body)),
        },
        StatusCode::UNPROCESSABLE_ENTITY if body.contains("already_exists") => {
            ApplicationError::ReleaseConflict {
                tag: context.to_string(),
                reason: "the release host reports it already exists".into(),
            }
        }
        _ => ApplicationError::RemoteApi {
            status: status.as_u16(),
            message: format!("{context}: {}", summarize(body)),
        },
    }
    .into()
}

/// The `message` field of a GitHub error body, or the raw body.
fn summarize(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_template_is_stripped() {
        assert_eq!(
            upload_endpoint("https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}"),
            "https://uploads.github.com/repos/o/r/releases/1/assets"
        );
        assert_eq!(upload_endpoint("https://x/assets"), "https://x/assets");
    }

    #[test]
    fn repo_urls_use_owner_and_repo() {
        let host = GitHubReleaseHost::new(GitHubConfig {
            api_url: "https://api.github.com/".into(),
            ..GitHubConfig::default()
        })
        .unwrap();
        assert_eq!(
            host.repo_url("releases/tags/v2.1"),
            "https://api.github.com/repos/gradle/gradle-enterprise-build-validation-scripts/releases/tags/v2.1"
        );
    }

    #[test]
    fn empty_owner_is_rejected() {
        let config = GitHubConfig {
            owner: " ".into(),
            ..GitHubConfig::default()
        };
        assert!(matches!(
            GitHubReleaseHost::new(config),
            Err(ScriptdistError::Configuration { .. })
        ));
    }

    #[test]
    fn status_mapping() {
        let auth = error_for(StatusCode::UNAUTHORIZED, r#"{"message":"Bad credentials"}"#, "v2.1");
        assert!(matches!(
            auth,
            ScriptdistError::Application(ApplicationError::Auth { ref reason }) if reason.contains("Bad credentials")
        ));

        let conflict = error_for(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Validation Failed","errors":[{"code":"already_exists"}]}"#,
            "v2.1",
        );
        assert!(matches!(
            conflict,
            ScriptdistError::Application(ApplicationError::ReleaseConflict { .. })
        ));

        let server = error_for(StatusCode::BAD_GATEWAY, "oops", "v2.1");
        assert!(server.is_retryable());

        let missing = error_for(StatusCode::NOT_FOUND, "{}", "v2.1");
        assert!(!missing.is_retryable());
    }

    #[test]
    fn payload_disables_generated_notes() {
        let draft = ReleaseDraft {
            tag: TagName::new("v2.1").unwrap(),
            name: "2.1".into(),
            body: "notes".into(),
            prerelease: false,
            target_commitish: "main".into(),
        };
        let json = serde_json::to_value(ReleasePayload::from(&draft)).unwrap();
        assert_eq!(json["generate_release_notes"], false);
        assert_eq!(json["tag_name"], "v2.1");
        assert_eq!(json["target_commitish"], "main");
    }

    mod http {
        use super::*;
        use serde_json::json;
        use wiremock::matchers::{body_json, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const REPO: &str = "/repos/gradle/gradle-enterprise-build-validation-scripts";

        fn host(api_url: String) -> GitHubReleaseHost {
            GitHubReleaseHost::new(GitHubConfig {
                api_url,
                ..GitHubConfig::default()
            })
            .unwrap()
        }

        fn release_at(uri: &str) -> RemoteRelease {
            RemoteRelease {
                id: 7,
                tag: "development-latest".into(),
                name: "Development release".into(),
                prerelease: true,
                upload_url: format!("{uri}/uploads/7/assets{{?name,label}}"),
                html_url: String::new(),
                assets: vec![],
            }
        }

        // The blocking client must not run on a runtime worker.
        async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
            tokio::task::spawn_blocking(f).await.unwrap()
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn empty_token_is_sent_anonymously_and_401_is_an_auth_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(format!("{REPO}/releases/tags/v2.1")))
                .respond_with(
                    ResponseTemplate::new(401)
                        .set_body_json(json!({ "message": "Requires authentication" })),
                )
                .expect(1)
                .mount(&server)
                .await;

            let uri = server.uri();
            let result = blocking(move || host(uri).find_release(&TagName::new("v2.1").unwrap())).await;
            assert!(matches!(
                result,
                Err(ScriptdistError::Application(ApplicationError::Auth { ref reason }))
                    if reason.contains("Requires authentication")
            ));

            let requests = server.received_requests().await.unwrap();
            assert!(requests.iter().all(|r| !r.headers.contains_key("authorization")));
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn upload_that_already_landed_resolves_to_the_stored_asset() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/uploads/7/assets"))
                .and(query_param("name", "a.zip"))
                .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                    "message": "Validation Failed",
                    "errors": [{ "resource": "ReleaseAsset", "code": "already_exists", "field": "name" }]
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(format!("{REPO}/releases/7/assets")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    { "id": 41, "name": "other.zip" },
                    { "id": 42, "name": "a.zip" }
                ])))
                .mount(&server)
                .await;

            let uri = server.uri();
            let stored = blocking(move || {
                host(uri.clone()).upload_asset(&release_at(&uri), &ReleaseAsset::new("a.zip", vec![1]))
            })
            .await
            .unwrap();
            assert_eq!(stored, RemoteAsset { id: 42, name: "a.zip".into() });
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn upload_returns_the_created_asset() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/uploads/7/assets"))
                .and(query_param("name", "a.zip.sha512"))
                .respond_with(
                    ResponseTemplate::new(201)
                        .set_body_json(json!({ "id": 9, "name": "a.zip.sha512", "size": 128 })),
                )
                .mount(&server)
                .await;

            let uri = server.uri();
            let stored = blocking(move || {
                host(uri.clone())
                    .upload_asset(&release_at(&uri), &ReleaseAsset::new("a.zip.sha512", vec![1]))
            })
            .await
            .unwrap();
            assert_eq!(stored.id, 9);
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn rename_patches_the_asset_name() {
            let server = MockServer::start().await;
            Mock::given(method("PATCH"))
                .and(path(format!("{REPO}/releases/assets/42")))
                .and(body_json(json!({ "name": "a.zip" })))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({ "id": 42, "name": "a.zip" })),
                )
                .expect(1)
                .mount(&server)
                .await;

            let uri = server.uri();
            blocking(move || host(uri).rename_asset(42, "a.zip"))
                .await
                .unwrap();
        }
    }

    #[test]
    fn release_response_falls_back_to_tag_for_name() {
        let r: ReleaseResponse = serde_json::from_str(
            r#"{"id":3,"tag_name":"v2.1","name":null,"upload_url":"u","assets":[{"id":9,"name":"a.zip","size":1}]}"#,
        )
        .unwrap();
        let release = RemoteRelease::from(r);
        assert_eq!(release.name, "v2.1");
        assert_eq!(release.assets[0].id, 9);
    }
}
