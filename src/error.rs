//! Error types for continuous release reconciliation.
//!
//! Every failure is terminal for a run. The variants are closed so callers
//! inspect an error by kind, never by matching on its message.

use std::fmt;
use thiserror::Error;

/// Result type alias for continuous_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all continuous_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors (raised before any API call)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// GitHub API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// The stale release was deleted but its replacement could not be created
    #[error(
        "Deleted release {previous_id} but failed to create its replacement; tag '{tag}' has no release until the next run: {source}"
    )]
    ReplacementFailed {
        /// Release tag
        tag: String,
        /// ID of the release that was deleted
        previous_id: u64,
        /// Create failure
        #[source]
        source: GitHubError,
    },

    /// GitHub attached the new release to an existing tag at another commit
    #[error(
        "Release {release_id} was created on the existing tag '{tag}' at {actual} instead of {expected}"
    )]
    StaleTag {
        /// Release tag
        tag: String,
        /// Commit the release should point at
        expected: String,
        /// Commit the tag still points at
        actual: String,
        /// ID of the release that was created
        release_id: u64,
    },

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No credential in the environment
    #[error("GITHUB_TOKEN environment variable not set.")]
    MissingToken,

    /// Credential cannot be sent as an HTTP header
    #[error("GitHub token contains characters that are not valid in an HTTP header")]
    InvalidToken,

    /// HTTP client could not be initialised
    #[error("Failed to initialise HTTP client: {reason}")]
    HttpClient {
        /// Builder message
        reason: String,
    },

    /// Neither a supported CI provider nor a complete manual target
    #[error("Unsupported CI environment.")]
    UnsupportedEnvironment,

    /// Provider detected but one of its variables is missing
    #[error("{provider} detected but {name} is not set")]
    MissingVariable {
        /// Detected provider
        provider: String,
        /// Missing environment variable
        name: String,
    },

    /// Repository coordinate could not be used
    #[error("Invalid repository '{value}'")]
    InvalidRepository {
        /// Offending value
        value: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Remote operation an API error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `GET /repos/{owner}/{repo}/releases/tags/{tag}`
    GetReleaseByTag,
    /// `POST /repos/{owner}/{repo}/releases`
    CreateRelease,
    /// `DELETE /repos/{owner}/{repo}/releases/{id}`
    DeleteRelease,
    /// `DELETE /repos/{owner}/{repo}/git/refs/tags/{tag}`
    DeleteTagRef,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiOperation::GetReleaseByTag => "get release by tag",
            ApiOperation::CreateRelease => "create release",
            ApiOperation::DeleteRelease => "delete release",
            ApiOperation::DeleteTagRef => "delete tag ref",
        };
        f.write_str(name)
    }
}

/// GitHub API errors, classified by HTTP status
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The requested resource does not exist (HTTP 404)
    #[error("{operation}: not found")]
    NotFound {
        /// Operation that failed
        operation: ApiOperation,
    },

    /// Token lacks the scope for this write (HTTP 403)
    #[error("{operation}: insufficient permissions ({message})")]
    PermissionDenied {
        /// Operation that failed
        operation: ApiOperation,
        /// Message returned by GitHub
        message: String,
        /// Repository Actions settings page where write access is granted
        settings_url: String,
    },

    /// Token rejected (HTTP 401)
    #[error("{operation}: bad credentials ({message})")]
    Unauthorized {
        /// Operation that failed
        operation: ApiOperation,
        /// Message returned by GitHub
        message: String,
    },

    /// Rate limit exhausted
    #[error("{operation}: API rate limit exceeded")]
    RateLimited {
        /// Operation that failed
        operation: ApiOperation,
    },

    /// Any other non-success response
    #[error("{operation} failed (HTTP {status}): {message}")]
    Api {
        /// Operation that failed
        operation: ApiOperation,
        /// HTTP status code
        status: u16,
        /// Message returned by GitHub
        message: String,
    },

    /// Request never produced a response
    #[error("{operation}: request failed: {source}")]
    Transport {
        /// Operation that failed
        operation: ApiOperation,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Success response that could not be decoded
    #[error("{operation}: unexpected response body: {reason}")]
    Decode {
        /// Operation that failed
        operation: ApiOperation,
        /// Decoder message
        reason: String,
    },
}

impl GitHubError {
    /// Classify a non-success response.
    ///
    /// A 403 is a permission problem unless the rate-limit budget is spent,
    /// in which case GitHub uses the same status for throttling.
    pub fn from_status(
        operation: ApiOperation,
        status: u16,
        message: String,
        rate_limit_exhausted: bool,
        settings_url: String,
    ) -> Self {
        match status {
            404 => GitHubError::NotFound { operation },
            403 | 429 if rate_limit_exhausted => GitHubError::RateLimited { operation },
            403 => GitHubError::PermissionDenied {
                operation,
                message,
                settings_url,
            },
            401 => GitHubError::Unauthorized { operation, message },
            _ => GitHubError::Api {
                operation,
                status,
                message,
            },
        }
    }

    /// Operation this error came from
    pub fn operation(&self) -> ApiOperation {
        match self {
            GitHubError::NotFound { operation }
            | GitHubError::PermissionDenied { operation, .. }
            | GitHubError::Unauthorized { operation, .. }
            | GitHubError::RateLimited { operation }
            | GitHubError::Api { operation, .. }
            | GitHubError::Transport { operation, .. }
            | GitHubError::Decode { operation, .. } => *operation,
        }
    }

    /// Whether this is the not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound { .. })
    }

    /// Whether GitHub rejected the write for lack of permissions
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, GitHubError::PermissionDenied { .. })
    }

    fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            GitHubError::PermissionDenied { settings_url, .. } => vec![
                "Insufficient permissions. Please ensure that the token has the necessary access rights."
                    .to_string(),
                format!(
                    "To fix this, go to {settings_url}, under \"Workflow permissions\" set \"Read and write permissions\"."
                ),
            ],
            GitHubError::Unauthorized { .. } => vec![
                "Verify that GITHUB_TOKEN holds a valid, unexpired token".to_string(),
            ],
            GitHubError::RateLimited { .. } => vec![
                "Wait for the GitHub API rate limit window to reset, then re-run the job".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingToken) => vec![
                "Expose the workflow token to this step: env: GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}"
                    .to_string(),
            ],
            ReleaseError::Config(ConfigError::UnsupportedEnvironment) => vec![
                "Run inside GitHub Actions or Cirrus CI".to_string(),
                "Or pass --owner, --repo and --commit explicitly".to_string(),
            ],
            ReleaseError::Config(ConfigError::MissingVariable { name, .. }) => {
                vec![format!("Set {name} or pass the matching command-line option")]
            }
            ReleaseError::GitHub(error) => error.recovery_suggestions(),
            ReleaseError::ReplacementFailed { source, .. } => {
                let mut suggestions = source.recovery_suggestions();
                suggestions.push(
                    "Re-run the job once the cause is fixed; the next run creates the release"
                        .to_string(),
                );
                suggestions
            }
            ReleaseError::StaleTag { tag, .. } => vec![
                format!("Delete the tag ref 'tags/{tag}' (git push origin :refs/tags/{tag}) and re-run the job"),
                "Do not pass --keep-tag; the tag ref must be removed before the release is recreated"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether this error is a permission rejection from the platform
    pub fn is_permission_denied(&self) -> bool {
        match self {
            ReleaseError::GitHub(error) | ReleaseError::ReplacementFailed { source: error, .. } => {
                error.is_permission_denied()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, exhausted: bool) -> GitHubError {
        GitHubError::from_status(
            ApiOperation::CreateRelease,
            status,
            "Resource not accessible by integration".to_string(),
            exhausted,
            "https://github.com/acme/widget/settings/actions".to_string(),
        )
    }

    #[test]
    fn test_404_is_not_found() {
        assert!(classify(404, false).is_not_found());
    }

    #[test]
    fn test_403_is_permission_denied() {
        assert!(classify(403, false).is_permission_denied());
    }

    #[test]
    fn test_403_with_exhausted_budget_is_rate_limit() {
        assert!(matches!(classify(403, true), GitHubError::RateLimited { .. }));
    }

    #[test]
    fn test_other_status_keeps_code() {
        match classify(502, false) {
            GitHubError::Api { status, operation, .. } => {
                assert_eq!(status, 502);
                assert_eq!(operation, ApiOperation::CreateRelease);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_permission_suggestion_names_settings_page() {
        let error = ReleaseError::GitHub(classify(403, false));
        let suggestions = error.recovery_suggestions().join("\n");
        assert!(suggestions.contains("https://github.com/acme/widget/settings/actions"));
        assert!(suggestions.contains("Read and write permissions"));
    }

    #[test]
    fn test_replacement_failure_keeps_permission_kind() {
        let error = ReleaseError::ReplacementFailed {
            tag: "continuous".to_string(),
            previous_id: 7,
            source: classify(403, false),
        };
        assert!(error.is_permission_denied());
        assert!(error.to_string().contains("Deleted release 7"));
    }

    #[test]
    fn test_stale_tag_suggests_deleting_the_ref() {
        let error = ReleaseError::StaleTag {
            tag: "continuous".to_string(),
            expected: "new111".to_string(),
            actual: "old999".to_string(),
            release_id: 4,
        };
        assert!(error.to_string().contains("at old999 instead of new111"));
        assert!(
            error
                .recovery_suggestions()
                .iter()
                .any(|line| line.contains("tags/continuous"))
        );
        assert!(!error.is_permission_denied());
    }
}
