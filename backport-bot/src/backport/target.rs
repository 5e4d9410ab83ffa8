//! Per-target backport state.

use crate::error::BackportError;
use crate::git::ApplyOutcome;
use bstr::ByteSlice;
use serde::Serialize;

/// Where a target is in the backport sequence.
///
/// Targets only move forward: `Planned → Created → CheckedOut → PatchApplied
/// → Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Planned,
    Created,
    CheckedOut,
    PatchApplied,
    Committed,
}

/// One branch the pull request is backported onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackportTarget {
    /// Existing branch the backport is based on.
    pub target: String,

    /// Branch created for the backport.
    pub branch: String,

    pub state: TargetState,

    /// Whether the patch left conflict markers.
    pub has_conflicts: bool,

    /// Files holding conflict markers.
    pub conflicted_paths: Vec<String>,

    /// Backport commit, once written.
    pub commit: Option<String>,
}

impl BackportTarget {
    /// Plans a target, deriving and validating its branch name.
    ///
    /// # Errors
    ///
    /// Returns [`BackportError::InvalidBranchName`] if the derived name is not
    /// a valid git ref.
    pub fn plan(number: u64, target: &str, head_ref: &str) -> Result<Self, BackportError> {
        let branch = derive_branch_name(number, target, head_ref);
        validate_branch_name(&branch)?;
        Ok(Self {
            target: target.to_string(),
            branch,
            state: TargetState::Planned,
            has_conflicts: false,
            conflicted_paths: Vec::new(),
            commit: None,
        })
    }

    /// Full ref name of the derived branch.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }

    pub(crate) fn advance(&mut self, next: TargetState) {
        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub(crate) fn record_apply(&mut self, outcome: ApplyOutcome) {
        if let ApplyOutcome::Conflicted { paths } = outcome {
            self.has_conflicts = true;
            self.conflicted_paths = paths;
        }
        self.advance(TargetState::PatchApplied);
    }

    pub(crate) fn record_commit(&mut self, commit: String) {
        self.commit = Some(commit);
        self.advance(TargetState::Committed);
    }
}

/// Name of the branch holding the backport of PR `number` onto `target`.
///
/// Format: `backport/<number>-<target>-<head_ref>`
#[must_use]
pub fn derive_branch_name(number: u64, target: &str, head_ref: &str) -> String {
    format!("backport/{number}-{target}-{head_ref}")
}

fn validate_branch_name(branch: &str) -> Result<(), BackportError> {
    let reference = format!("refs/heads/{branch}");
    if let Err(e) = gix_validate::reference::name(reference.as_bytes().as_bstr()) {
        return Err(BackportError::InvalidBranchName {
            name: branch.to_string(),
            message: e.to_string(),
        });
    }
    Ok(())
}
