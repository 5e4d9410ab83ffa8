//! Diff staging error types.

use crate::github::TrackerError;
use thiserror::Error;

/// Errors that can occur while fetching and staging a diff.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Downloading the diff failed.
    #[error(transparent)]
    Remote(#[from] TrackerError),

    /// The pull request changes nothing.
    #[error("Pull request {pull_request} has an empty diff")]
    Empty { pull_request: String },

    /// Writing the staged file failed.
    #[error("Failed to stage diff: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}
