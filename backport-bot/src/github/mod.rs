//! Issue tracker / code review collaborator.
//!
//! [`IssueTracker`] is everything the engine needs from GitHub: pull request
//! metadata, commits and diff, plus issue and pull request creation.
//! [`GitHubTracker`] implements it with octocrab.

mod client;
mod error;
mod models;
mod rate_limit;

pub use client::GitHubTracker;
pub use error::TrackerError;
pub use models::{CommitRecord, CreatedItem, NewIssue, NewPullRequest, Person, PullRequestInfo};

use crate::request::{PullRequestHandle, RepositoryHandle};
use async_trait::async_trait;

/// Remote operations on pull requests and issues.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches pull request metadata.
    async fn pull_request_info(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<PullRequestInfo, TrackerError>;

    /// Fetches the pull request's commits in their original order.
    async fn pull_request_commits(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<Vec<CommitRecord>, TrackerError>;

    /// Downloads the pull request's unified diff.
    async fn pull_request_diff(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<String, TrackerError>;

    /// Creates an issue.
    async fn create_issue(
        &self,
        repository: &RepositoryHandle,
        issue: &NewIssue,
    ) -> Result<CreatedItem, TrackerError>;

    /// Creates a pull request.
    async fn create_pull_request(
        &self,
        repository: &RepositoryHandle,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedItem, TrackerError>;
}
