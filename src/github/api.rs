//! Release API seam and its payload types.

use crate::error::GitHubError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A release as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Commit or branch the tag was created from
    pub target_commitish: String,
    /// Release page URL
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Request body for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelease {
    /// Tag to attach (created from `target_commitish` when absent)
    pub tag_name: String,
    /// Commit the tag should point at
    pub target_commitish: String,
    /// Display name
    pub name: String,
}

/// Release operations consumed by the reconciler.
///
/// A missing release or ref is reported as [`GitHubError::NotFound`].
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Fetch the release attached to `tag`
    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, GitHubError>;

    /// Create a release
    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &NewRelease,
    ) -> Result<Release, GitHubError>;

    /// Delete a release by ID; its tag is left in place
    async fn delete_release(&self, owner: &str, repo: &str, id: u64) -> Result<(), GitHubError>;

    /// Delete the git ref `tags/<tag>`
    async fn delete_tag_ref(&self, owner: &str, repo: &str, tag: &str) -> Result<(), GitHubError>;
}
