//! Values available to issue and pull request templates.

use crate::backport::{BackportRun, BackportTarget};
use serde::Serialize;

/// Data a template is rendered with.
///
/// `issue_number` is only set once the tracking issue exists, so it is
/// `null` for issue templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
    pub number: u64,
    pub title: &'a str,
    pub target: &'a str,
    pub branch: &'a str,
    pub base: &'a str,
    pub head: &'a str,
    pub has_conflicts: bool,
    pub conflicted_paths: &'a [String],

    /// Consolidated commit message.
    pub message: &'a str,

    pub issue_number: Option<u64>,
}

impl<'a> TemplateContext<'a> {
    #[must_use]
    pub fn new(run: &'a BackportRun, target: &'a BackportTarget) -> Self {
        Self {
            number: run.number(),
            title: &run.title,
            target: &target.target,
            branch: &target.branch,
            base: &run.base_ref,
            head: &run.head_ref,
            has_conflicts: target.has_conflicts,
            conflicted_paths: &target.conflicted_paths,
            message: &run.consolidated_message,
            issue_number: None,
        }
    }

    /// Sets the tracking issue number.
    #[must_use]
    pub fn with_issue(mut self, issue_number: u64) -> Self {
        self.issue_number = Some(issue_number);
        self
    }
}
