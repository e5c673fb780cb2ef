//! Reconcile command: converge the `continuous` release.

use crate::cli::{Args, RuntimeConfig};
use crate::config::{EnvConfig, Overrides, Settings};
use crate::error::Result;
use crate::github::{
    GitHubClient, Outcome, Plan, ReconcileOptions, ReleaseApi, ReleaseReconciler,
};

/// Resolve settings from the environment and run against the GitHub API
pub(super) async fn execute_reconcile(
    args: &Args,
    env: &EnvConfig,
    config: &RuntimeConfig,
) -> Result<()> {
    let settings = Settings::resolve(env, &Overrides::from(args))?;
    log::debug!("resolved settings: {settings:?}");

    let client = GitHubClient::new(&settings.token, &settings.api_url, &settings.server_url)?;
    execute_with_api(&settings, &client, config).await?;
    Ok(())
}

/// Run one reconciliation with resolved settings against `api`.
///
/// Returns the outcome, or `None` for a dry run.
pub async fn execute_with_api<A: ReleaseApi + ?Sized>(
    settings: &Settings,
    api: &A,
    config: &RuntimeConfig,
) -> Result<Option<Outcome>> {
    let target = &settings.target;

    config.info_println("Starting release management...");
    config.verbose_println(&format!("CI Provider: {}", settings.provider));
    config.verbose_println(&format!("Repository Owner: {}", target.owner()));
    config.verbose_println(&format!("Repository Name: {}", target.repo()));
    config.verbose_println(&format!("Release Tag: {}", target.tag_name()));
    config.verbose_println(&format!("Release Commit Hash: {}", target.desired_commit()));

    let options = ReconcileOptions {
        delete_tag_ref: settings.delete_tag_ref,
    };
    let reconciler = ReleaseReconciler::new(api, options, config);

    if settings.dry_run {
        let plan = reconciler.plan(target).await?;
        config.info_println(&describe_plan(&plan, target.tag_name(), target.desired_commit(), options));
        return Ok(None);
    }

    let outcome = reconciler.reconcile(target).await?;
    let release = outcome.release();
    match &outcome {
        Outcome::Created(_) => config.info_println(&format!(
            "Created release '{}' at {}.",
            target.tag_name(),
            release.target_commitish
        )),
        Outcome::Replaced { previous_id, .. } => config.info_println(&format!(
            "Replaced release {} with {} at {}.",
            previous_id, release.id, release.target_commitish
        )),
        Outcome::NoopCurrent(_) => {
            config.info_println(&format!("Release '{}' is up to date.", target.tag_name()))
        }
    }
    if let Some(url) = &release.html_url {
        config.verbose_println(&format!("Release URL: {url}"));
    }

    Ok(Some(outcome))
}

fn describe_plan(plan: &Plan, tag: &str, commit: &str, options: ReconcileOptions) -> String {
    match plan {
        Plan::Create => format!("Dry run: would create release '{tag}' at {commit}."),
        Plan::Keep(release) => format!(
            "Dry run: release {} already points at {commit}; nothing to do.",
            release.id
        ),
        Plan::Replace(release) if options.delete_tag_ref => format!(
            "Dry run: would delete release {} (at {}), delete tag ref 'tags/{tag}', and create release '{tag}' at {commit}.",
            release.id, release.target_commitish
        ),
        Plan::Replace(release) => format!(
            "Dry run: would delete release {} (at {}) and create release '{tag}' at {commit}.",
            release.id, release.target_commitish
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Release;

    fn release(commit: &str) -> Release {
        Release {
            id: 9,
            tag_name: "continuous".to_string(),
            name: None,
            target_commitish: commit.to_string(),
            html_url: None,
        }
    }

    #[test]
    fn test_describe_replace_mentions_tag_ref() {
        let text = describe_plan(
            &Plan::Replace(release("old999")),
            "continuous",
            "new111",
            ReconcileOptions::default(),
        );
        assert!(text.contains("delete release 9"));
        assert!(text.contains("tags/continuous"));
        assert!(text.contains("new111"));
    }

    #[test]
    fn test_describe_replace_keep_tag() {
        let text = describe_plan(
            &Plan::Replace(release("old999")),
            "continuous",
            "new111",
            ReconcileOptions {
                delete_tag_ref: false,
            },
        );
        assert!(!text.contains("tags/continuous"));
    }

    #[test]
    fn test_describe_keep() {
        let text = describe_plan(
            &Plan::Keep(release("abc123")),
            "continuous",
            "abc123",
            ReconcileOptions::default(),
        );
        assert!(text.contains("nothing to do"));
    }
}
