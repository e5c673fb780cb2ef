//! GitHub integration for the rolling release

mod api;
mod client;
pub mod memory;
mod reconciler;

pub use api::{NewRelease, Release, ReleaseApi};
pub use client::GitHubClient;
pub use memory::{ApiCall, MemoryReleaseApi};
pub use reconciler::{Outcome, Plan, ReconcileOptions, ReleaseReconciler, ReleaseTarget};

/// Tag of the rolling release
pub const CONTINUOUS_TAG: &str = "continuous";

/// Display name of the rolling release
pub const CONTINUOUS_NAME: &str = "continuous";

/// Repository Actions settings page, where workflow token permissions are set
pub fn actions_settings_url(server_url: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/{}/{}/settings/actions",
        server_url.trim_end_matches('/'),
        owner,
        repo
    )
}
