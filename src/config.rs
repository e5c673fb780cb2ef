//! Immutable run configuration.
//!
//! The environment is snapshotted once at startup into [`EnvConfig`], and
//! [`Settings`] is resolved from that snapshot plus command-line overrides.
//! Nothing downstream reads process environment variables.

use crate::ci::{CiContext, CiProvider, Field};
use crate::error::ConfigError;
use crate::github::ReleaseTarget;
use std::collections::HashMap;
use std::fmt;

/// Default REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default web host, used for settings links
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Value of `key`; empty values read as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    /// Whether `key` is set to exactly `true`
    pub fn is_true(&self, key: &str) -> bool {
        self.vars.get(key).is_some_and(|value| value == "true")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Values given on the command line; each wins over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Repository owner
    pub owner: Option<String>,
    /// Repository name
    pub repo: Option<String>,
    /// Commit the release should point at
    pub commit: Option<String>,
    /// REST API base URL
    pub api_url: Option<String>,
    /// Leave the tag ref in place when replacing
    pub keep_tag: bool,
    /// Compute the plan without mutating anything
    pub dry_run: bool,
}

/// Configuration for one reconciliation run
#[derive(Clone)]
pub struct Settings {
    /// Release to converge
    pub target: ReleaseTarget,
    /// Where the coordinates came from
    pub provider: CiProvider,
    /// API credential
    pub token: String,
    /// REST API base URL, without trailing slash
    pub api_url: String,
    /// Web host, without trailing slash
    pub server_url: String,
    /// Delete `tags/<tag>` after deleting a stale release
    pub delete_tag_ref: bool,
    /// Fetch and compare only
    pub dry_run: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("target", &self.target)
            .field("provider", &self.provider)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("server_url", &self.server_url)
            .field("delete_tag_ref", &self.delete_tag_ref)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from the environment snapshot and overrides.
    ///
    /// The credential is checked first so a misconfigured job fails before
    /// anything else is inspected.
    pub fn resolve(env: &EnvConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let token = env
            .get("GITHUB_TOKEN")
            .or_else(|| env.get("GH_TOKEN"))
            .ok_or(ConfigError::MissingToken)?;

        let context = CiContext::from_env(env).unwrap_or(CiContext {
            provider: CiProvider::Manual,
            owner: None,
            repo: None,
            commit: None,
        });

        let pick = |cli: &Option<String>, detected: &Option<String>, field: Field| {
            cli.clone()
                .filter(|value| !value.is_empty())
                .or_else(|| detected.clone())
                .ok_or_else(|| context.missing(field))
        };
        let owner = pick(&overrides.owner, &context.owner, Field::Owner)?;
        let repo = pick(&overrides.repo, &context.repo, Field::Repo)?;
        let commit = pick(&overrides.commit, &context.commit, Field::Commit)?;

        if repo.contains('/') {
            return Err(ConfigError::InvalidRepository { value: repo });
        }

        let api_url = overrides
            .api_url
            .clone()
            .or_else(|| env.get("GITHUB_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let server_url = env
            .get("GITHUB_SERVER_URL")
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Ok(Self {
            target: ReleaseTarget::continuous(owner, repo, commit),
            provider: context.provider,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            server_url: server_url.trim_end_matches('/').to_string(),
            delete_tag_ref: !overrides.keep_tag,
            dry_run: overrides.dry_run,
        })
    }
}
