//! The state of one backport invocation.

use super::target::BackportTarget;
use crate::error::BackportError;
use crate::github::{CommitRecord, PullRequestInfo};
use crate::message::{compose_message, target_message};
use crate::request::{BackportRequest, PullRequestHandle};
use serde::Serialize;

/// Everything a run needs after inspection: the pull request snapshot, the
/// consolidated message, and one entry per target.
///
/// Only the backporter mutates the targets.
#[derive(Debug, Clone, Serialize)]
pub struct BackportRun {
    pub pull_request: PullRequestHandle,
    pub title: String,
    pub base_ref: String,
    pub head_ref: String,

    /// Login to assign tracking issues to.
    pub merged_by: Option<String>,

    pub consolidated_message: String,
    pub targets: Vec<BackportTarget>,
}

impl BackportRun {
    /// Plans a run, composing the message and deriving every branch name.
    ///
    /// # Errors
    ///
    /// Returns [`BackportError::InvalidBranchName`] if any derived name is not
    /// a valid ref.
    pub fn plan(
        request: &BackportRequest,
        info: &PullRequestInfo,
        commits: &[CommitRecord],
    ) -> Result<Self, BackportError> {
        let number = request.pull_request.number;
        let targets = request
            .targets
            .iter()
            .map(|target| BackportTarget::plan(number, target, &info.head_ref))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pull_request: request.pull_request.clone(),
            title: info.title.clone(),
            base_ref: info.base_ref.clone(),
            head_ref: info.head_ref.clone(),
            merged_by: info.merged_by.clone(),
            consolidated_message: compose_message(commits),
            targets,
        })
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.pull_request.number
    }

    /// Commit message for the backport onto `target`.
    #[must_use]
    pub fn commit_message(&self, target: &str) -> String {
        target_message(self.number(), target, &self.consolidated_message)
    }

    /// Derived branch names, in target order.
    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.branch.as_str())
    }

    /// Target branch names, in order.
    #[must_use]
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.target.as_str()).collect()
    }
}
