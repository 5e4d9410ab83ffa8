//! Git error types.

use thiserror::Error;

/// Errors raised by repository operations.
///
/// A patch that applies with conflicts is not an error; see
/// [`ApplyOutcome`](super::ApplyOutcome).
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be started.
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The remote has no branch with the requested name.
    #[error("Branch '{branch}' not found on remote '{remote}'")]
    RemoteBranchNotFound { remote: String, branch: String },

    /// A git command succeeded but printed something unusable.
    #[error("{command} returned unexpected output: {output:?}")]
    UnexpectedOutput { command: String, output: String },

    /// Failed to prepare the checkout directory.
    #[error("Failed to prepare checkout directory '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
