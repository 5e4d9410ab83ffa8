//! Pull request inspection and validation gates.

use crate::error::BackportError;
use crate::github::{CommitRecord, IssueTracker, PullRequestInfo};
use crate::request::BackportRequest;
use tracing::{info, info_span, Instrument};

/// Fetches the pull request's metadata and commits concurrently.
///
/// # Errors
///
/// Returns [`BackportError::Remote`] if either request fails.
pub async fn inspect<T: IssueTracker + ?Sized>(
    tracker: &T,
    request: &BackportRequest,
) -> Result<(PullRequestInfo, Vec<CommitRecord>), BackportError> {
    let pull_request = &request.pull_request;
    let span = info_span!("inspect", pull_request = %pull_request);

    async {
        let (info, commits) = tokio::try_join!(
            tracker.pull_request_info(pull_request),
            tracker.pull_request_commits(pull_request),
        )?;
        info!(
            base = %info.base_ref,
            head = %info.head_ref,
            merged = info.merged,
            commits = commits.len(),
            "Fetched pull request"
        );
        Ok::<_, BackportError>((info, commits))
    }
    .instrument(span)
    .await
}

/// Checks that `request` may be backported.
///
/// The pull request must be merged and no target may be its base branch.
/// Nothing is mutated before these checks pass.
///
/// # Errors
///
/// Returns [`BackportError::NotMerged`] or [`BackportError::InvalidTarget`].
pub fn validate(request: &BackportRequest, info: &PullRequestInfo) -> Result<(), BackportError> {
    if !info.merged {
        return Err(BackportError::NotMerged {
            pull_request: request.pull_request.to_string(),
        });
    }

    if let Some(target) = request.targets.iter().find(|t| **t == info.base_ref) {
        return Err(BackportError::InvalidTarget {
            pull_request: request.pull_request.to_string(),
            target: target.clone(),
        });
    }

    Ok(())
}
