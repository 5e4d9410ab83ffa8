//! Per-target branch creation, patch application and commit.
//!
//! Targets are processed strictly one after another against a single
//! checkout. Each target moves through [`TargetState`] once; a conflicting
//! patch is recorded on the target and processing continues, while any other
//! failure aborts the whole run without undoing earlier targets.

mod run;
mod target;

pub use run::BackportRun;
pub use target::{derive_branch_name, BackportTarget, TargetState};

use crate::error::BackportError;
use crate::git::{CommitRequest, GitError, Signature, SourceControl};
use std::path::Path;
use tracing::{info, info_span, warn, Instrument};

/// Creates, patches and commits a branch for every target of `run`.
///
/// Before the first mutation every derived branch is checked to be absent,
/// both locally and on `remote`, and every target to exist on `remote`.
///
/// # Errors
///
/// Returns [`BackportError::BranchExists`] or [`BackportError::UnknownTarget`]
/// if the preflight fails, or [`BackportError::GitOperation`] if a repository
/// operation fails.
pub async fn backport_targets<R: SourceControl + ?Sized>(
    repo: &mut R,
    remote: &str,
    patch: &Path,
    run: &mut BackportRun,
    signature: &Signature,
) -> Result<(), BackportError> {
    let tips = preflight(repo, remote, run).await?;

    let messages: Vec<String> = run
        .targets
        .iter()
        .map(|t| run.commit_message(&t.target))
        .collect();

    for ((target, tip), message) in run.targets.iter_mut().zip(tips).zip(messages) {
        let name = target.target.clone();
        let span = info_span!("backport", onto = %name, branch = %target.branch);

        backport_target(repo, patch, target, &tip, &message, signature)
            .instrument(span)
            .await
            .map_err(|source| BackportError::GitOperation {
                target: name,
                source,
            })?;
    }

    Ok(())
}

/// Resolves every target's tip and rejects derived branches that already
/// exist locally or on `remote`. Returns the tips in target order.
async fn preflight<R: SourceControl + ?Sized>(
    repo: &R,
    remote: &str,
    run: &BackportRun,
) -> Result<Vec<String>, BackportError> {
    let mut tips = Vec::with_capacity(run.targets.len());

    for target in &run.targets {
        let exists = repo
            .branch_exists(&target.branch)
            .await
            .map_err(|source| BackportError::GitOperation {
                target: target.target.clone(),
                source,
            })?;
        if exists {
            return Err(BackportError::BranchExists {
                name: target.branch.clone(),
            });
        }

        match repo.resolve_remote_branch_tip(remote, &target.branch).await {
            Ok(_) => {
                return Err(BackportError::BranchExists {
                    name: target.branch.clone(),
                })
            }
            Err(GitError::RemoteBranchNotFound { .. }) => {}
            Err(source) => {
                return Err(BackportError::GitOperation {
                    target: target.target.clone(),
                    source,
                })
            }
        }

        match repo.resolve_remote_branch_tip(remote, &target.target).await {
            Ok(tip) => tips.push(tip),
            Err(GitError::RemoteBranchNotFound { .. }) => {
                return Err(BackportError::UnknownTarget {
                    target: target.target.clone(),
                })
            }
            Err(source) => {
                return Err(BackportError::GitOperation {
                    target: target.target.clone(),
                    source,
                })
            }
        }
    }

    Ok(tips)
}

async fn backport_target<R: SourceControl + ?Sized>(
    repo: &mut R,
    patch: &Path,
    target: &mut BackportTarget,
    tip: &str,
    message: &str,
    signature: &Signature,
) -> Result<(), GitError> {
    repo.create_branch(&target.branch, tip).await?;
    target.advance(TargetState::Created);

    repo.checkout(&target.branch).await?;
    target.advance(TargetState::CheckedOut);

    let outcome = repo.apply_patch(patch).await?;
    if outcome.is_conflicted() {
        warn!("Patch applied with conflicts");
    }
    target.record_apply(outcome);

    repo.stage_all().await?;
    let tree = repo.write_index_tree().await?;
    let head = repo.current_head_commit().await?;
    let reference = target.reference();
    let parents = [head];

    let commit = repo
        .create_commit(&CommitRequest {
            reference: &reference,
            author: signature,
            committer: signature,
            message,
            tree: &tree,
            parents: &parents,
        })
        .await?;

    info!(
        commit = %commit,
        conflicts = target.has_conflicts,
        "Committed backport"
    );
    target.record_commit(commit);
    Ok(())
}
