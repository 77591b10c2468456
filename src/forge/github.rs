//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub and GitHub Enterprise.
//! Every operation is a single REST call:
//!
//! | operation            | request                                      | success |
//! |----------------------|----------------------------------------------|---------|
//! | `create_release`     | `POST repos/{o}/{r}/releases`                | 201     |
//! | `get_release_by_tag` | `GET repos/{o}/{r}/releases/tags/{tag}`      | 200/404 |
//! | `delete_release`     | `DELETE repos/{o}/{r}/releases/{id}`         | 204     |
//! | `delete_tag`         | `DELETE repos/{o}/{r}/git/refs/tags/{tag}`   | 204     |
//! | `list_commits`       | `GET repos/{o}/{r}/commits`                  | 200     |
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. Nothing here
//! retries; that is the caller's decision.
//!
//! # Example
//!
//! ```ignore
//! use rls_release::forge::github::{GitHubConfig, GitHubForge};
//!
//! let forge = GitHubForge::new(GitHubConfig::new("octocat", "hello-world", token))?;
//! let release = forge.create_release(&request).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::traits::{Forge, ForgeError, ReleaseId, ReleaseLookup, ReleaseRequest, RemoteRelease};
use crate::git::CommitInfo;

/// Commits requested per listing; the API maximum.
const COMMITS_PER_PAGE: &str = "100";

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "rls-cli";

/// Parameters for constructing a [`GitHubForge`].
#[derive(Clone)]
pub struct GitHubConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// API token, sent as a bearer credential
    pub token: String,
    /// API base URL (configurable for GitHub Enterprise)
    pub api_base: String,
}

impl GitHubConfig {
    /// Config against the public GitHub API.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("has_token", &!self.token.is_empty())
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Parse and check an API base URL.
///
/// The URL must be absolute, use `http` or `https`, and be able to carry
/// path segments.
pub fn parse_api_base(raw: &str) -> Result<Url, ForgeError> {
    if raw.trim().is_empty() {
        return Err(ForgeError::InvalidConfig("missing GitHub API URL".into()));
    }

    let url = Url::parse(raw).map_err(|e| {
        ForgeError::InvalidConfig(format!("failed to parse GitHub API URL '{}': {}", raw, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ForgeError::InvalidConfig(format!(
            "GitHub API URL '{}' must be an absolute http(s) URL",
            raw
        )));
    }

    Ok(url)
}

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Headers sent with every request (includes the bearer token)
    headers: HeaderMap,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL
    api_base: Url,
}

// Custom Debug to avoid exposing the Authorization header
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge.
    ///
    /// # Errors
    ///
    /// `ForgeError::InvalidConfig` if owner, repo or token is empty, if the
    /// token is not usable as a header value, or if the API base is not a
    /// valid absolute URL.
    pub fn new(config: GitHubConfig) -> Result<Self, ForgeError> {
        if config.owner.trim().is_empty() {
            return Err(ForgeError::InvalidConfig(
                "missing GitHub repository owner".into(),
            ));
        }
        if config.repo.trim().is_empty() {
            return Err(ForgeError::InvalidConfig(
                "missing GitHub repository name".into(),
            ));
        }
        if config.token.trim().is_empty() {
            return Err(ForgeError::InvalidConfig("missing GitHub API token".into()));
        }

        let api_base = parse_api_base(&config.api_base)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| {
                ForgeError::InvalidConfig("GitHub API token contains invalid characters".into())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        Ok(Self {
            client: Client::new(),
            headers,
            owner: config.owner,
            repo: config.repo,
            api_base,
        })
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    /// Build URL for a repository endpoint. Segments are percent-encoded.
    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // parse_api_base rejected cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        url
    }

    /// Send a request with the common headers.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ForgeError> {
        request
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))
    }

    /// Decode a release from a successful response.
    async fn parse_release(response: Response) -> Result<RemoteRelease, ForgeError> {
        let status = response.status();
        let release: GitHubRelease = response.json().await.map_err(|e| ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        })?;
        Ok(release.into())
    }

    /// Map a response that did not carry the expected status to an error.
    async fn error_from_response(response: Response) -> ForgeError {
        let status = response.status();

        // Try to get error message from body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<RemoteRelease, ForgeError> {
        let url = self.repo_url(&["releases"]);

        let body = CreateReleaseBody {
            tag_name: request.tag(),
            target_commitish: request.target_commitish(),
            name: request.name(),
            body: request.body(),
            draft: request.is_draft(),
            prerelease: request.is_prerelease(),
        };

        let response = self.send(self.client.post(url).json(&body)).await?;

        if response.status() == StatusCode::CREATED {
            Self::parse_release(response).await
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<ReleaseLookup, ForgeError> {
        let url = self.repo_url(&["releases", "tags", tag]);

        let response = self.send(self.client.get(url)).await?;

        match response.status() {
            StatusCode::OK => Ok(ReleaseLookup::Found(Self::parse_release(response).await?)),
            StatusCode::NOT_FOUND => Ok(ReleaseLookup::NotFound),
            _ => Err(Self::error_from_response(response).await),
        }
    }

    async fn delete_release(&self, id: ReleaseId) -> Result<(), ForgeError> {
        let id = id.to_string();
        let url = self.repo_url(&["releases", &id]);

        let response = self.send(self.client.delete(url)).await?;

        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), ForgeError> {
        let url = self.repo_url(&["git", "refs", "tags", tag]);

        let response = self.send(self.client.delete(url)).await?;

        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn list_commits(&self, sha: Option<&str>) -> Result<Vec<CommitInfo>, ForgeError> {
        let mut url = self.repo_url(&["commits"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("per_page", COMMITS_PER_PAGE);
            if let Some(sha) = sha.filter(|s| !s.is_empty()) {
                query.append_pair("sha", sha);
            }
        }

        let response = self.send(self.client.get(url)).await?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_from_response(response).await);
        }

        let status = response.status();
        let commits: Vec<GitHubCommit> =
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })?;
        Ok(commits.into_iter().map(CommitInfo::from).collect())
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a release.
#[derive(Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

fn is_empty(s: &&str) -> bool {
    s.is_empty()
}

/// GitHub release response.
#[derive(Deserialize)]
struct GitHubRelease {
    id: u64,
    tag_name: String,
    html_url: String,
    #[serde(default)]
    draft: bool,
}

impl From<GitHubRelease> for RemoteRelease {
    fn from(gh: GitHubRelease) -> Self {
        RemoteRelease {
            id: ReleaseId(gh.id),
            tag_name: gh.tag_name,
            html_url: gh.html_url,
            draft: gh.draft,
        }
    }
}

/// Entry of the commit listing.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Deserialize)]
struct GitHubCommitDetail {
    message: String,
}

impl From<GitHubCommit> for CommitInfo {
    fn from(gh: GitHubCommit) -> Self {
        CommitInfo {
            summary: gh.commit.message.lines().next().unwrap_or("").to_string(),
            oid: gh.sha,
            message: gh.commit.message,
        }
    }
}

/// GitHub error response.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}
