//! Command line argument parsing and validation.
//!
//! The tool is meant to "just work" inside CI: with no arguments it reads the
//! target from the provider's environment. The options below override it.

use crate::config::Overrides;
use clap::Parser;

/// Keep the `continuous` release pointed at the latest build commit
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "continuous_release",
    version,
    about = "Keep the `continuous` GitHub release pointed at the latest build commit",
    long_about = "Reconcile the rolling `continuous` release of a GitHub repository.

Inside GitHub Actions or Cirrus CI the repository and commit are read from the
environment; GITHUB_TOKEN must hold a token with write access to releases.

Usage:
  continuous_release
  continuous_release --dry-run
  continuous_release --owner acme --repo widget --commit 3f2a9c1"
)]
pub struct Args {
    /// Repository owner (default: from the CI environment)
    #[arg(long, value_name = "OWNER")]
    pub owner: Option<String>,

    /// Repository name (default: from the CI environment)
    #[arg(long, value_name = "REPO")]
    pub repo: Option<String>,

    /// Commit the release should point at (default: the build commit)
    #[arg(long, value_name = "SHA")]
    pub commit: Option<String>,

    /// GitHub REST API base URL (default: GITHUB_API_URL or https://api.github.com)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Leave the `continuous` tag ref in place when replacing a stale release
    #[arg(long)]
    pub keep_tag: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide [VERBOSE] lines
    #[arg(long)]
    pub brief: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        for (flag, value) in [
            ("--owner", &self.owner),
            ("--repo", &self.repo),
            ("--commit", &self.commit),
            ("--api-url", &self.api_url),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{flag} must not be empty"));
            }
        }

        if let Some(repo) = &self.repo
            && repo.contains('/')
        {
            return Err(format!(
                "--repo takes the repository name only, got '{repo}'. Use --owner for the owner"
            ));
        }

        if let Some(url) = &self.api_url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            return Err(format!("--api-url must be an http(s) URL, got '{url}'"));
        }

        Ok(())
    }
}

impl From<&Args> for Overrides {
    fn from(args: &Args) -> Self {
        Self {
            owner: args.owner.clone(),
            repo: args.repo.clone(),
            commit: args.commit.clone(),
            api_url: args.api_url.clone(),
            keep_tag: args.keep_tag,
            dry_run: args.dry_run,
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for the severity-tagged stream
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration around an output manager
    pub fn new(output: super::OutputManager) -> Self {
        Self { output }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(super::OutputManager::new(true, false))
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(super::OutputManager::new(!args.brief, args.quiet))
    }
}

impl RuntimeConfig {
    /// Print [INFO] line
    pub fn info_println(&self, message: &str) {
        self.output.info(message);
    }

    /// Print [VERBOSE] line
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message);
    }

    /// Print [ERROR] line (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }
}
