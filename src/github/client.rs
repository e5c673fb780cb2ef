//! GitHub REST client for the release endpoints.
//!
//! Requests are sent once. There are no retries and no explicit timeout, so
//! an unresponsive API blocks the run until the transport gives up.

use super::api::{NewRelease, Release, ReleaseApi};
use super::actions_settings_url;
use crate::error::{ApiOperation, ConfigError, GitHubError, ReleaseError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

const API_VERSION: &str = "2022-11-28";

/// Error payload returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Authenticated REST client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    server_url: String,
}

impl GitHubClient {
    /// Create a client authenticated with `token`
    pub fn new(token: &str, api_url: &str, server_url: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ReleaseError::Config(ConfigError::InvalidToken))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("continuous_release/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, owner, repo)
    }

    /// Turn a non-success response into a classified error
    async fn check(
        &self,
        operation: ApiOperation,
        owner: &str,
        repo: &str,
        response: Response,
    ) -> std::result::Result<Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|remaining| remaining.as_bytes() == b"0");
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| fallback_message(status, &text));

        log::debug!("{operation} returned HTTP {}: {message}", status.as_u16());

        Err(GitHubError::from_status(
            operation,
            status.as_u16(),
            message,
            rate_limit_exhausted,
            actions_settings_url(&self.server_url, owner, repo),
        ))
    }

    async fn decode(operation: ApiOperation, response: Response) -> std::result::Result<Release, GitHubError> {
        response.json::<Release>().await.map_err(|e| GitHubError::Decode {
            operation,
            reason: e.to_string(),
        })
    }
}

fn fallback_message(status: StatusCode, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("no message").to_string()
    } else {
        trimmed.to_string()
    }
}

fn transport(operation: ApiOperation) -> impl FnOnce(reqwest::Error) -> GitHubError {
    move |source| GitHubError::Transport { operation, source }
}

#[async_trait]
impl ReleaseApi for GitHubClient {
    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> std::result::Result<Release, GitHubError> {
        let operation = ApiOperation::GetReleaseByTag;
        let url = format!("{}/releases/tags/{}", self.repo_url(owner, repo), tag);
        log::debug!("GET {url}");

        let response = self.http.get(&url).send().await.map_err(transport(operation))?;
        let response = self.check(operation, owner, repo, response).await?;
        Self::decode(operation, response).await
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &NewRelease,
    ) -> std::result::Result<Release, GitHubError> {
        let operation = ApiOperation::CreateRelease;
        let url = format!("{}/releases", self.repo_url(owner, repo));
        log::debug!("POST {url} (tag {}, commit {})", release.tag_name, release.target_commitish);

        let response = self
            .http
            .post(&url)
            .json(release)
            .send()
            .await
            .map_err(transport(operation))?;
        let response = self.check(operation, owner, repo, response).await?;
        Self::decode(operation, response).await
    }

    async fn delete_release(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> std::result::Result<(), GitHubError> {
        let operation = ApiOperation::DeleteRelease;
        let url = format!("{}/releases/{}", self.repo_url(owner, repo), id);
        log::debug!("DELETE {url}");

        let response = self.http.delete(&url).send().await.map_err(transport(operation))?;
        self.check(operation, owner, repo, response).await?;
        Ok(())
    }

    async fn delete_tag_ref(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> std::result::Result<(), GitHubError> {
        let operation = ApiOperation::DeleteTagRef;
        let url = format!("{}/git/refs/tags/{}", self.repo_url(owner, repo), tag);
        log::debug!("DELETE {url}");

        let response = self.http.delete(&url).send().await.map_err(transport(operation))?;
        self.check(operation, owner, repo, response).await?;
        Ok(())
    }
}
