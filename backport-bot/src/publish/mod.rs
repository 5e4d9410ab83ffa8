//! Filing tracking issues and follow-up pull requests.
//!
//! Runs only after every branch has been pushed. Targets are published
//! concurrently; one target failing does not stop the others, and every
//! failure is reported together.

use crate::backport::{BackportRun, BackportTarget};
use crate::config::LabelConfig;
use crate::error::{BackportError, PublishFailure};
use crate::github::{CreatedItem, IssueTracker, NewIssue, NewPullRequest};
use crate::templates::{TemplateContext, TemplateRenderer};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

/// The issue and pull request filed for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedTarget {
    pub target: String,
    pub branch: String,
    pub has_conflicts: bool,
    pub issue: CreatedItem,
    pub pull_request: CreatedItem,
}

/// Settings shared by every target's publication.
#[derive(Debug, Clone, Copy)]
pub struct PublishOptions<'a> {
    pub labels: &'a LabelConfig,

    /// Maximum targets published at once.
    pub concurrency: usize,
}

/// Files a tracking issue, then a pull request, for every target of `run`.
///
/// Results are returned in target order.
///
/// # Errors
///
/// Returns [`BackportError::Publish`] listing every target that failed.
pub async fn publish_all<T: IssueTracker + ?Sized>(
    tracker: &T,
    renderer: &TemplateRenderer,
    run: &BackportRun,
    options: PublishOptions<'_>,
) -> Result<Vec<PublishedTarget>, BackportError> {
    let results: Vec<(usize, Result<PublishedTarget, BackportError>)> =
        stream::iter(run.targets.iter().enumerate())
            .map(|(index, target)| {
                let span = info_span!("publish", onto = %target.target);
                async move {
                    let result = publish_target(tracker, renderer, run, target, options.labels)
                        .instrument(span)
                        .await;
                    (index, result)
                }
            })
            .buffer_unordered(options.concurrency.max(1))
            .collect()
            .await;

    let mut published = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (index, result) in results {
        match result {
            Ok(target) => published.push((index, target)),
            Err(e) => {
                let target = &run.targets[index].target;
                error!(onto = %target, error = %e, "Failed to publish backport");
                failures.push((
                    index,
                    PublishFailure {
                        target: target.clone(),
                        error: e.to_string(),
                    },
                ));
            }
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|(index, _)| *index);
        return Err(BackportError::Publish {
            failures: failures.into_iter().map(|(_, f)| f).collect(),
        });
    }

    published.sort_by_key(|(index, _)| *index);
    Ok(published.into_iter().map(|(_, p)| p).collect())
}

/// Labels for a target's tracking issue.
#[must_use]
pub fn issue_labels(labels: &LabelConfig, target: &BackportTarget) -> Vec<String> {
    let mut result = vec![labels.backport.clone()];
    if target.has_conflicts {
        result.push(labels.conflicts.clone());
    }
    result
}

async fn publish_target<T: IssueTracker + ?Sized>(
    tracker: &T,
    renderer: &TemplateRenderer,
    run: &BackportRun,
    target: &BackportTarget,
    labels: &LabelConfig,
) -> Result<PublishedTarget, BackportError> {
    let repository = &run.pull_request.repository;
    let context = TemplateContext::new(run, target);

    let issue_text = renderer.render_issue(&context)?;
    let issue = tracker
        .create_issue(
            repository,
            &NewIssue {
                title: issue_text.title,
                body: issue_text.body,
                assignee: run.merged_by.clone(),
                labels: issue_labels(labels, target),
            },
        )
        .await?;
    info!(issue = issue.number, url = %issue.url, "Created tracking issue");

    let pr_text = renderer.render_pull_request(&context.with_issue(issue.number))?;
    let pull_request = tracker
        .create_pull_request(
            repository,
            &NewPullRequest {
                title: pr_text.title,
                body: pr_text.body,
                head: target.branch.clone(),
                base: target.target.clone(),
            },
        )
        .await?;
    info!(pull_request = pull_request.number, url = %pull_request.url, "Created pull request");

    Ok(PublishedTarget {
        target: target.target.clone(),
        branch: target.branch.clone(),
        has_conflicts: target.has_conflicts,
        issue,
        pull_request,
    })
}
