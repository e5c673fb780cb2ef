//! Reconciliation of the rolling release.
//!
//! One run fetches the release for the fixed tag, compares its commit with
//! the desired one and converges with at most one delete and one create:
//!
//! | remote state            | action                       | outcome       |
//! |-------------------------|------------------------------|---------------|
//! | absent (not found)      | create                       | `Created`     |
//! | present, same commit    | nothing                      | `NoopCurrent` |
//! | present, other commit   | delete, drop tag ref, create | `Replaced`    |
//!
//! Every step is awaited in order and nothing is retried. A failed delete
//! stops the run before any create. A failed create after a delete leaves the
//! tag without a release, reported as [`ReleaseError::ReplacementFailed`].
//! A create that lands on a surviving tag at another commit is reported as
//! [`ReleaseError::StaleTag`], never as `Created` or `Replaced`.

use super::api::{NewRelease, Release, ReleaseApi};
use super::{CONTINUOUS_NAME, CONTINUOUS_TAG};
use crate::cli::RuntimeConfig;
use crate::error::{GitHubError, ReleaseError, Result};

/// Release the run should converge to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    owner: String,
    repo: String,
    tag_name: String,
    release_name: String,
    desired_commit: String,
}

impl ReleaseTarget {
    /// The `continuous` release of `owner/repo` at `desired_commit`
    pub fn continuous(
        owner: impl Into<String>,
        repo: impl Into<String>,
        desired_commit: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            tag_name: CONTINUOUS_TAG.to_string(),
            release_name: CONTINUOUS_NAME.to_string(),
            desired_commit: desired_commit.into(),
        }
    }

    /// Repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Release tag
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Release display name
    pub fn release_name(&self) -> &str {
        &self.release_name
    }

    /// Commit the release should point at
    pub fn desired_commit(&self) -> &str {
        &self.desired_commit
    }

    fn new_release(&self) -> NewRelease {
        NewRelease {
            tag_name: self.tag_name.clone(),
            target_commitish: self.desired_commit.clone(),
            name: self.release_name.clone(),
        }
    }
}

/// Action needed to converge the remote release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No release exists for the tag
    Create,
    /// The release already points at the desired commit
    Keep(Release),
    /// The release points elsewhere and must be replaced
    Replace(Release),
}

impl Plan {
    /// Compare the current release with the desired commit.
    ///
    /// Matching commits always keep the release, so assets are never churned
    /// by a delete and recreate of an identical release.
    pub fn decide(current: Option<Release>, desired_commit: &str) -> Self {
        match current {
            None => Plan::Create,
            Some(release) if release.target_commitish == desired_commit => Plan::Keep(release),
            Some(release) => Plan::Replace(release),
        }
    }
}

/// Result of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No release existed; one was created
    Created(Release),
    /// A stale release was deleted and recreated at the desired commit
    Replaced {
        /// ID of the deleted release
        previous_id: u64,
        /// The new release
        release: Release,
    },
    /// The release already pointed at the desired commit
    NoopCurrent(Release),
}

impl Outcome {
    /// Release that exists after the run
    pub fn release(&self) -> &Release {
        match self {
            Outcome::Created(release)
            | Outcome::Replaced { release, .. }
            | Outcome::NoopCurrent(release) => release,
        }
    }
}

/// Reconciliation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Delete `tags/<tag>` after deleting a stale release.
    ///
    /// GitHub attaches a new release to an existing tag as-is and ignores
    /// `target_commitish`, so keeping the old tag would recreate the release
    /// at the stale commit.
    pub delete_tag_ref: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            delete_tag_ref: true,
        }
    }
}

/// Converges the rolling release through a [`ReleaseApi`]
pub struct ReleaseReconciler<'a, A: ReleaseApi + ?Sized> {
    api: &'a A,
    options: ReconcileOptions,
    runtime_config: &'a RuntimeConfig,
}

impl<'a, A: ReleaseApi + ?Sized> ReleaseReconciler<'a, A> {
    /// Create a reconciler over `api`
    pub fn new(api: &'a A, options: ReconcileOptions, runtime_config: &'a RuntimeConfig) -> Self {
        Self {
            api,
            options,
            runtime_config,
        }
    }

    /// Fetch the current release and decide what to do, without mutating.
    ///
    /// Only the not-found signal routes to [`Plan::Create`]; any other fetch
    /// error is returned and nothing is attempted.
    pub async fn plan(&self, target: &ReleaseTarget) -> std::result::Result<Plan, GitHubError> {
        self.runtime_config.info_println("Checking for existing release...");

        let current = match self
            .api
            .get_release_by_tag(target.owner(), target.repo(), target.tag_name())
            .await
        {
            Ok(release) => {
                self.runtime_config
                    .verbose_println(&format!("Release found with ID: {}", release.id));
                Some(release)
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(Plan::decide(current, target.desired_commit()))
    }

    /// Converge the remote release to `target`
    pub async fn reconcile(&self, target: &ReleaseTarget) -> Result<Outcome> {
        let plan = self.plan(target).await?;
        self.apply(target, plan).await
    }

    /// Execute a plan produced by [`plan`](Self::plan)
    pub async fn apply(&self, target: &ReleaseTarget, plan: Plan) -> Result<Outcome> {
        match plan {
            Plan::Keep(release) => {
                self.runtime_config.info_println(&format!(
                    "Release with the name '{}' already exists and has the desired commit hash.",
                    target.release_name()
                ));
                Ok(Outcome::NoopCurrent(release))
            }
            Plan::Create => {
                self.runtime_config.info_println(&format!(
                    "Release with the name '{}' does not exist. Creating a new release...",
                    target.release_name()
                ));
                let release = self.create(target).await?;
                let release = self.confirm(target, release)?;
                Ok(Outcome::Created(release))
            }
            Plan::Replace(stale) => {
                self.runtime_config.verbose_println(&format!(
                    "Existing release commit hash {} differs from the desired {}. Replacing it...",
                    stale.target_commitish,
                    target.desired_commit()
                ));

                self.api
                    .delete_release(target.owner(), target.repo(), stale.id)
                    .await?;
                self.runtime_config
                    .info_println("Existing release deleted successfully.");

                if self.options.delete_tag_ref {
                    self.delete_tag_ref(target).await;
                }

                let release =
                    self.create(target)
                        .await
                        .map_err(|source| ReleaseError::ReplacementFailed {
                            tag: target.tag_name().to_string(),
                            previous_id: stale.id,
                            source,
                        })?;
                let release = self.confirm(target, release)?;

                Ok(Outcome::Replaced {
                    previous_id: stale.id,
                    release,
                })
            }
        }
    }

    async fn create(&self, target: &ReleaseTarget) -> std::result::Result<Release, GitHubError> {
        self.api
            .create_release(target.owner(), target.repo(), &target.new_release())
            .await
    }

    /// Accept a created release only if it points at the desired commit.
    ///
    /// GitHub keeps an existing tag's commit, so a tag ref that survived
    /// (kept, or its deletion failed) yields a release at the old commit.
    fn confirm(&self, target: &ReleaseTarget, release: Release) -> Result<Release> {
        if release.target_commitish != target.desired_commit() {
            return Err(ReleaseError::StaleTag {
                tag: target.tag_name().to_string(),
                expected: target.desired_commit().to_string(),
                actual: release.target_commitish,
                release_id: release.id,
            });
        }

        self.runtime_config
            .info_println("New release created successfully!");
        self.runtime_config
            .verbose_println(&format!("Release ID: {}", release.id));
        Ok(release)
    }

    /// Remove the tag ref so the create can retag at the desired commit.
    ///
    /// A failure here is reported but does not stop the create; a create that
    /// then reuses the stale tag fails the commit check instead.
    async fn delete_tag_ref(&self, target: &ReleaseTarget) {
        match self
            .api
            .delete_tag_ref(target.owner(), target.repo(), target.tag_name())
            .await
        {
            Ok(()) => self
                .runtime_config
                .info_println("Existing tag deleted successfully."),
            Err(e) if is_missing_ref(&e) => self
                .runtime_config
                .verbose_println(&format!("Tag '{}' already absent.", target.tag_name())),
            Err(e) => self
                .runtime_config
                .error_println(&format!("Error deleting tag: {e}")),
        }
    }
}

/// GitHub answers 422 "Reference does not exist" for a missing ref
fn is_missing_ref(error: &GitHubError) -> bool {
    matches!(
        error,
        GitHubError::NotFound { .. } | GitHubError::Api { status: 422, .. }
    )
}
