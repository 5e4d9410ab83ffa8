//! Data fetched from and sent to the issue tracker.

use serde::Serialize;

/// Snapshot of a pull request, fetched once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,

    /// Branch the pull request was merged into.
    pub base_ref: String,

    /// Branch the changes came from.
    pub head_ref: String,

    pub merged: bool,

    /// Login of whoever merged it, if merged.
    pub merged_by: Option<String>,

    /// Where the unified diff can be downloaded.
    pub diff_url: Option<String>,

    /// Clone URL of the base repository.
    pub source_repo_url: String,
}

/// Name, email and date of a commit author or committer.
///
/// The date is kept exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub date: String,
}

impl Person {
    #[must_use]
    pub fn new(name: &str, email: &str, date: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            date: date.to_string(),
        }
    }
}

/// One commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author: Person,
    pub committer: Person,
}

/// A tracking issue to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
}

/// A pull request to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    /// Branch holding the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
}

/// An issue or pull request the tracker created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedItem {
    pub number: u64,
    pub url: String,
}
