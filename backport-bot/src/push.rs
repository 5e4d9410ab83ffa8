//! Pushing derived branches.

use crate::backport::{BackportRun, TargetState};
use crate::error::BackportError;
use crate::git::SourceControl;
use tracing::{info, info_span, Instrument};

/// Refspec that pushes local `branch` to the same name on the remote.
#[must_use]
pub fn refspec(branch: &str) -> String {
    format!("refs/heads/{branch}:refs/heads/{branch}")
}

/// Pushes every committed target's branch to `remote`, one at a time.
///
/// The first failure stops the remaining pushes.
///
/// # Errors
///
/// Returns [`BackportError::Push`] naming the branch that failed.
pub async fn push_branches<R: SourceControl + ?Sized>(
    repo: &mut R,
    remote: &str,
    run: &BackportRun,
) -> Result<(), BackportError> {
    for target in &run.targets {
        debug_assert_eq!(target.state, TargetState::Committed);

        let span = info_span!("push", branch = %target.branch);
        repo.push(remote, &[refspec(&target.branch)])
            .instrument(span)
            .await
            .map_err(|source| BackportError::Push {
                branch: target.branch.clone(),
                source,
            })?;
        info!(branch = %target.branch, remote, "Pushed branch");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refspec_maps_branch_to_itself() {
        assert_eq!(
            refspec("backport/42-release-1.0-feature-x"),
            "refs/heads/backport/42-release-1.0-feature-x:refs/heads/backport/42-release-1.0-feature-x"
        );
    }
}
