//! In-memory release API (testing only)
//!
//! Keeps releases and tag refs in a map, records every call in order, and can
//! fail any operation on demand. Like GitHub, creating a release for a tag
//! that already exists reuses the tag and ignores the requested commit.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::api::{NewRelease, Release, ReleaseApi};
use super::actions_settings_url;
use crate::config::DEFAULT_SERVER_URL;
use crate::error::{ApiOperation, GitHubError};

/// A recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `get_release_by_tag(tag)`
    GetReleaseByTag {
        /// Requested tag
        tag: String,
    },
    /// `create_release(tag, commit)`
    CreateRelease {
        /// Requested tag
        tag: String,
        /// Requested commit
        commit: String,
    },
    /// `delete_release(id)`
    DeleteRelease {
        /// Release ID
        id: u64,
    },
    /// `delete_tag_ref(tag)`
    DeleteTagRef {
        /// Tag whose ref was deleted
        tag: String,
    },
}

impl ApiCall {
    /// Whether this call changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, ApiCall::GetReleaseByTag { .. })
    }
}

type FailureFactory = Box<dyn Fn() -> GitHubError + Send + Sync>;

#[derive(Default)]
struct State {
    releases: HashMap<String, Release>,
    tags: HashMap<String, String>,
    calls: Vec<ApiCall>,
    next_id: u64,
}

/// In-memory platform for a single repository
#[derive(Default)]
pub struct MemoryReleaseApi {
    state: Mutex<State>,
    failures: Mutex<HashMap<ApiOperation, FailureFactory>>,
}

impl MemoryReleaseApi {
    /// Empty repository: no releases, no tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose `tag` already has a release at `commit`
    pub fn with_release(tag: &str, commit: &str) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            let release = state.insert_release(tag, commit);
            state.releases.insert(tag.to_string(), release);
        }
        api
    }

    /// Repository where `tag` points at `commit` but has no release
    pub fn with_tag(tag: &str, commit: &str) -> Self {
        let api = Self::new();
        api.state
            .lock()
            .unwrap()
            .tags
            .insert(tag.to_string(), commit.to_string());
        api
    }

    /// Make every call of `operation` fail with the error built by `make`
    pub fn fail_on<F>(&self, operation: ApiOperation, make: F)
    where
        F: Fn() -> GitHubError + Send + Sync + 'static,
    {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, Box::new(make));
    }

    /// Make every call of `operation` fail with a 403 permission rejection
    pub fn deny(&self, operation: ApiOperation, owner: &str, repo: &str) {
        let settings_url = actions_settings_url(DEFAULT_SERVER_URL, owner, repo);
        self.fail_on(operation, move || GitHubError::PermissionDenied {
            operation,
            message: "Resource not accessible by integration".to_string(),
            settings_url: settings_url.clone(),
        });
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Mutating calls received so far, in order
    pub fn mutating_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(ApiCall::is_mutating)
            .collect()
    }

    /// Current release for `tag`
    pub fn release(&self, tag: &str) -> Option<Release> {
        self.state.lock().unwrap().releases.get(tag).cloned()
    }

    /// Commit `tag` points at, if the tag exists
    pub fn tag_commit(&self, tag: &str) -> Option<String> {
        self.state.lock().unwrap().tags.get(tag).cloned()
    }

    /// Number of releases stored
    pub fn release_count(&self) -> usize {
        self.state.lock().unwrap().releases.len()
    }

    fn record(&self, call: ApiCall, operation: ApiOperation) -> Result<(), GitHubError> {
        self.state.lock().unwrap().calls.push(call);
        match self.failures.lock().unwrap().get(&operation) {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

impl State {
    fn insert_release(&mut self, tag: &str, commit: &str) -> Release {
        self.next_id += 1;
        let commit = self
            .tags
            .entry(tag.to_string())
            .or_insert_with(|| commit.to_string())
            .clone();
        Release {
            id: self.next_id,
            tag_name: tag.to_string(),
            name: Some(tag.to_string()),
            target_commitish: commit,
            html_url: None,
        }
    }
}

#[async_trait]
impl ReleaseApi for MemoryReleaseApi {
    async fn get_release_by_tag(
        &self,
        _owner: &str,
        _repo: &str,
        tag: &str,
    ) -> Result<Release, GitHubError> {
        let operation = ApiOperation::GetReleaseByTag;
        self.record(
            ApiCall::GetReleaseByTag {
                tag: tag.to_string(),
            },
            operation,
        )?;
        self.release(tag)
            .ok_or(GitHubError::NotFound { operation })
    }

    async fn create_release(
        &self,
        _owner: &str,
        _repo: &str,
        release: &NewRelease,
    ) -> Result<Release, GitHubError> {
        let operation = ApiOperation::CreateRelease;
        self.record(
            ApiCall::CreateRelease {
                tag: release.tag_name.clone(),
                commit: release.target_commitish.clone(),
            },
            operation,
        )?;

        let mut state = self.state.lock().unwrap();
        if state.releases.contains_key(&release.tag_name) {
            return Err(GitHubError::Api {
                operation,
                status: 422,
                message: "Validation Failed: already_exists".to_string(),
            });
        }
        let mut created = state.insert_release(&release.tag_name, &release.target_commitish);
        created.name = Some(release.name.clone());
        state
            .releases
            .insert(release.tag_name.clone(), created.clone());
        Ok(created)
    }

    async fn delete_release(&self, _owner: &str, _repo: &str, id: u64) -> Result<(), GitHubError> {
        let operation = ApiOperation::DeleteRelease;
        self.record(ApiCall::DeleteRelease { id }, operation)?;

        let mut state = self.state.lock().unwrap();
        let tag = state
            .releases
            .iter()
            .find(|(_, release)| release.id == id)
            .map(|(tag, _)| tag.clone())
            .ok_or(GitHubError::NotFound { operation })?;
        state.releases.remove(&tag);
        Ok(())
    }

    async fn delete_tag_ref(&self, _owner: &str, _repo: &str, tag: &str) -> Result<(), GitHubError> {
        let operation = ApiOperation::DeleteTagRef;
        self.record(
            ApiCall::DeleteTagRef {
                tag: tag.to_string(),
            },
            operation,
        )?;

        match self.state.lock().unwrap().tags.remove(tag) {
            Some(_) => Ok(()),
            None => Err(GitHubError::Api {
                operation,
                status: 422,
                message: "Reference does not exist".to_string(),
            }),
        }
    }
}
