//! Request parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing a backport request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The pull request URL could not be parsed.
    #[error("Invalid pull request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The command did not start with the `backport` keyword.
    #[error("Unrecognised command: expected 'backport <pull-request-url> <targets...>'")]
    UnknownCommand,

    /// No pull request URL was given.
    #[error("Missing pull request URL")]
    MissingUrl,

    /// No target branches were given.
    #[error("At least one target branch is required")]
    NoTargets,

    /// The same target branch was listed more than once.
    #[error("Target branch '{target}' was listed more than once")]
    DuplicateTarget { target: String },
}
