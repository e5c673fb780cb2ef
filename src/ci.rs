//! CI provider detection.
//!
//! Each supported provider exposes the repository owner, repository name and
//! build commit under its own environment variable names.

use crate::config::EnvConfig;
use crate::error::ConfigError;
use std::fmt;

/// Where the run's coordinates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiProvider {
    /// GitHub Actions (`GITHUB_ACTIONS=true`)
    GitHubActions,
    /// Cirrus CI (`CIRRUS_CI=true`)
    CirrusCi,
    /// No CI detected; every coordinate given on the command line
    Manual,
}

impl fmt::Display for CiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CiProvider::GitHubActions => "GitHub Actions",
            CiProvider::CirrusCi => "Cirrus CI",
            CiProvider::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl CiProvider {
    /// Detect the provider from its marker variable. GitHub Actions wins when
    /// both markers are present.
    pub fn detect(env: &EnvConfig) -> Option<Self> {
        if env.is_true("GITHUB_ACTIONS") {
            Some(CiProvider::GitHubActions)
        } else if env.is_true("CIRRUS_CI") {
            Some(CiProvider::CirrusCi)
        } else {
            None
        }
    }

    /// Variable names for owner, repository and commit
    fn variables(self) -> Option<(&'static str, &'static str, &'static str)> {
        match self {
            CiProvider::GitHubActions => {
                Some(("GITHUB_REPOSITORY_OWNER", "GITHUB_REPOSITORY", "GITHUB_SHA"))
            }
            CiProvider::CirrusCi => Some((
                "CIRRUS_REPO_OWNER",
                "CIRRUS_REPO_NAME",
                "CIRRUS_CHANGE_IN_REPO",
            )),
            CiProvider::Manual => None,
        }
    }
}

/// Repository coordinates supplied by the CI environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiContext {
    /// Detected provider
    pub provider: CiProvider,
    /// Repository owner
    pub owner: Option<String>,
    /// Repository name
    pub repo: Option<String>,
    /// Commit the build ran on
    pub commit: Option<String>,
}

impl CiContext {
    /// Read the coordinates exposed by the detected provider.
    ///
    /// Returns `None` when no supported provider is present. Missing values
    /// are left as `None` so command-line overrides can fill them in.
    pub fn from_env(env: &EnvConfig) -> Option<Self> {
        let provider = CiProvider::detect(env)?;
        let (owner_var, repo_var, commit_var) = provider.variables()?;

        let repo = env.get(repo_var).map(|value| match provider {
            CiProvider::GitHubActions => extract_repository_name(&value).to_string(),
            _ => value,
        });

        Some(Self {
            provider,
            owner: env.get(owner_var),
            repo,
            commit: env.get(commit_var),
        })
    }

    /// Error for a coordinate that neither the provider nor an override set
    pub(crate) fn missing(&self, field: Field) -> ConfigError {
        let name = match (self.provider.variables(), field) {
            (Some((owner, _, _)), Field::Owner) => owner,
            (Some((_, repo, _)), Field::Repo) => repo,
            (Some((_, _, commit)), Field::Commit) => commit,
            (None, _) => return ConfigError::UnsupportedEnvironment,
        };
        ConfigError::MissingVariable {
            provider: self.provider.to_string(),
            name: name.to_string(),
        }
    }
}

/// Coordinate of the release target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Owner,
    Repo,
    Commit,
}

/// Repository name from an `owner/name` slug; the whole value when it has no slash.
pub fn extract_repository_name(full_name: &str) -> &str {
    let mut parts = full_name.split('/');
    match (parts.next(), parts.next()) {
        (Some(_), Some(name)) => name,
        _ => full_name,
    }
}
