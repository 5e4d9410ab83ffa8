//! Source-control collaborator.
//!
//! The backport engine only talks to a repository through [`SourceControl`],
//! and obtains one through a [`Workspace`]. Mutating operations take
//! `&mut self`: a checkout's working tree and index are shared state, so only
//! one caller may drive it at a time.

mod auth;
mod cli;
mod error;

pub use auth::GitAuth;
pub use cli::{GitCli, GitWorkspace};
pub use error::GitError;

use crate::request::RepositoryHandle;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// Name and email recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Signature {
    #[must_use]
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

/// Result of applying a patch with a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every hunk applied.
    Clean,

    /// Some hunks overlapped; conflict markers were written to these paths.
    Conflicted { paths: Vec<String> },
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_conflicted(&self) -> bool {
        matches!(self, Self::Conflicted { .. })
    }
}

/// A commit to write and point a ref at.
#[derive(Debug, Clone)]
pub struct CommitRequest<'a> {
    /// Full ref name to update (e.g., `refs/heads/backport/1-main-fix`).
    pub reference: &'a str,
    pub author: &'a Signature,
    pub committer: &'a Signature,
    pub message: &'a str,
    /// Tree id, as returned by [`SourceControl::write_index_tree`].
    pub tree: &'a str,
    /// Parent commit ids; the first is the ref's expected current value.
    pub parents: &'a [String],
}

/// Operations the backport engine performs on a checkout.
#[async_trait]
pub trait SourceControl: Send {
    /// Returns the URL configured for `remote`.
    async fn remote_url(&self, remote: &str) -> Result<String, GitError>;

    /// Updates remote-tracking branches for `remote`.
    async fn fetch(&mut self, remote: &str) -> Result<(), GitError>;

    /// Returns true if a local branch called `name` exists.
    async fn branch_exists(&self, name: &str) -> Result<bool, GitError>;

    /// Resolves the commit at the tip of `<remote>/<branch>`.
    async fn resolve_remote_branch_tip(
        &self,
        remote: &str,
        branch: &str,
    ) -> Result<String, GitError>;

    /// Creates local branch `name` at `from_commit`. Fails if it exists.
    async fn create_branch(&mut self, name: &str, from_commit: &str) -> Result<(), GitError>;

    /// Switches the working tree to `branch`.
    async fn checkout(&mut self, branch: &str) -> Result<(), GitError>;

    /// Applies a unified diff with a three-way merge, leaving conflict markers
    /// rather than aborting.
    async fn apply_patch(&mut self, patch: &Path) -> Result<ApplyOutcome, GitError>;

    /// Stages every working tree change, including conflicted files.
    async fn stage_all(&mut self) -> Result<(), GitError>;

    /// Writes the index as a tree and returns its id.
    async fn write_index_tree(&mut self) -> Result<String, GitError>;

    /// Returns the commit `HEAD` points at.
    async fn current_head_commit(&self) -> Result<String, GitError>;

    /// Writes a commit and moves `commit.reference` to it. Returns the commit id.
    async fn create_commit(&mut self, commit: &CommitRequest<'_>) -> Result<String, GitError>;

    /// Pushes `refspecs` to `remote` in a single operation.
    async fn push(&mut self, remote: &str, refspecs: &[String]) -> Result<(), GitError>;
}

/// Provides the checkout for a repository.
#[async_trait]
pub trait Workspace: Send + Sync {
    type Repository: SourceControl;

    /// Opens (cloning on first use) and fetches the checkout of `repository`.
    async fn open(
        &self,
        repository: &RepositoryHandle,
        remote_url: &str,
    ) -> Result<Self::Repository, GitError>;
}
