//! # Continuous Release
//!
//! Keeps a single rolling GitHub release, tagged `continuous`, pointed at the
//! commit of the latest CI build.
//!
//! Each run is a one-shot reconciliation: fetch the release for the tag,
//! compare its commit with the build commit, then create, replace or leave it.
//!
//! ## Usage
//!
//! ```bash
//! continuous_release                 # inside GitHub Actions or Cirrus CI
//! continuous_release --dry-run       # show the plan only
//! continuous_release --owner acme --repo widget --commit 3f2a9c1
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;

// Re-export main types for public API
pub use ci::{CiContext, CiProvider};
pub use cli::Args;
pub use config::{EnvConfig, Overrides, Settings};
pub use error::{ApiOperation, ConfigError, GitHubError, ReleaseError, Result};
pub use github::{
    GitHubClient, Outcome, Plan, ReconcileOptions, Release, ReleaseApi, ReleaseReconciler,
    ReleaseTarget,
};
