//! Outcome of a backport run.

use crate::backport::BackportRun;
use crate::github::CreatedItem;
use crate::publish::PublishedTarget;
use crate::request::PullRequestHandle;
use serde::Serialize;
use std::fmt;

/// What happened for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub target: String,
    pub branch: String,
    pub has_conflicts: bool,
    pub conflicted_paths: Vec<String>,
    pub commit: Option<String>,
    pub issue: Option<CreatedItem>,
    pub pull_request: Option<CreatedItem>,
}

/// Summary of a complete run.
///
/// Displays as `Backported pull request #<n> to <a>, <b>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackportReport {
    pub pull_request: PullRequestHandle,

    /// Whether this was a dry run.
    pub dry_run: bool,

    pub targets: Vec<TargetReport>,
}

impl BackportReport {
    /// Report for a dry run: branches are planned, nothing was created.
    #[must_use]
    pub fn planned(run: &BackportRun) -> Self {
        Self::build(run, true, &[])
    }

    /// Report for a completed run.
    #[must_use]
    pub fn completed(run: &BackportRun, published: &[PublishedTarget]) -> Self {
        Self::build(run, false, published)
    }

    fn build(run: &BackportRun, dry_run: bool, published: &[PublishedTarget]) -> Self {
        let targets = run
            .targets
            .iter()
            .map(|target| {
                let publication = published.iter().find(|p| p.target == target.target);
                TargetReport {
                    target: target.target.clone(),
                    branch: target.branch.clone(),
                    has_conflicts: target.has_conflicts,
                    conflicted_paths: target.conflicted_paths.clone(),
                    commit: target.commit.clone(),
                    issue: publication.map(|p| p.issue.clone()),
                    pull_request: publication.map(|p| p.pull_request.clone()),
                }
            })
            .collect();

        Self {
            pull_request: run.pull_request.clone(),
            dry_run,
            targets,
        }
    }

    /// Targets whose backport committed conflict markers.
    pub fn conflicted_targets(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| t.has_conflicts)
    }
}

impl fmt::Display for BackportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run {
            "Would backport"
        } else {
            "Backported"
        };
        let targets: Vec<&str> = self.targets.iter().map(|t| t.target.as_str()).collect();
        write!(
            f,
            "{verb} pull request #{} to {}",
            self.pull_request.number,
            targets.join(", ")
        )
    }
}
