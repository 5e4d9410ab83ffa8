//! Top-level error taxonomy.

use crate::config::ConfigError;
use crate::diff::DiffError;
use crate::git::GitError;
use crate::github::TrackerError;
use crate::request::RequestError;
use crate::templates::TemplateError;
use thiserror::Error;

/// A target whose tracking issue or pull request could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub target: String,
    pub error: String,
}

/// Errors that abort a backport run.
///
/// Conflicts are not errors: they are recorded on the target and published.
#[derive(Debug, Error)]
pub enum BackportError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request was malformed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The pull request has not been merged.
    #[error("Pull request {pull_request} is not merged")]
    NotMerged { pull_request: String },

    /// A target is the pull request's own base branch.
    #[error("Cannot backport {pull_request} onto its own base branch '{target}'")]
    InvalidTarget {
        pull_request: String,
        target: String,
    },

    /// A target branch does not exist on the remote.
    #[error("Target branch '{target}' does not exist on the remote")]
    UnknownTarget { target: String },

    /// A derived branch name is not a valid git ref.
    #[error("Derived branch name '{name}' is not a valid ref: {message}")]
    InvalidBranchName { name: String, message: String },

    /// A derived branch already exists, most likely from an earlier run.
    #[error("Branch '{name}' already exists; refusing to overwrite an earlier backport")]
    BranchExists { name: String },

    /// Fetching pull request data failed.
    #[error(transparent)]
    Remote(#[from] TrackerError),

    /// Staging the diff failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Preparing the checkout failed.
    #[error("Failed to prepare checkout: {0}")]
    Checkout(#[from] GitError),

    /// A repository operation for one target failed.
    #[error("Backport onto '{target}' failed: {source}")]
    GitOperation {
        target: String,
        #[source]
        source: GitError,
    },

    /// Pushing a derived branch failed.
    #[error("Failed to push '{branch}': {source}")]
    Push {
        branch: String,
        #[source]
        source: GitError,
    },

    /// Rendering an issue or pull request failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Publishing failed for one or more targets.
    #[error("Publishing failed for {}", describe_failures(.failures))]
    Publish { failures: Vec<PublishFailure> },
}

impl BackportError {
    /// True for failures detected before anything was mutated.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Request(_)
                | Self::NotMerged { .. }
                | Self::InvalidTarget { .. }
                | Self::UnknownTarget { .. }
                | Self::InvalidBranchName { .. }
                | Self::BranchExists { .. }
        )
    }
}

fn describe_failures(failures: &[PublishFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("'{}' ({})", f.target, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}
