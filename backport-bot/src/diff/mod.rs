//! Staging of pull request diffs.
//!
//! The diff is downloaded once per run and written to a temporary file that
//! every target applies. The file is deleted when the [`StagedDiff`] is
//! dropped, so it never outlives the run, whether that run succeeds or fails.

mod error;

pub use error::DiffError;

use crate::github::IssueTracker;
use crate::request::PullRequestHandle;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info_span, Instrument};

/// A unified diff written to a temporary file.
#[derive(Debug)]
pub struct StagedDiff {
    file: NamedTempFile,
}

impl StagedDiff {
    /// Writes `text` to a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Io`] if the file cannot be created or written.
    pub fn stage(text: &str) -> Result<Self, DiffError> {
        let mut file = tempfile::Builder::new()
            .prefix("backport-")
            .suffix(".diff")
            .tempfile()
            .map_err(|source| DiffError::Io { source })?;

        file.write_all(text.as_bytes())
            .map_err(|source| DiffError::Io { source })?;
        if !text.ends_with('\n') {
            file.write_all(b"\n")
                .map_err(|source| DiffError::Io { source })?;
        }
        file.flush().map_err(|source| DiffError::Io { source })?;

        Ok(Self { file })
    }

    /// Location of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Downloads the pull request's diff and stages it.
///
/// # Errors
///
/// Returns [`DiffError`] if the download fails, the diff is empty, or the
/// file cannot be written.
pub async fn fetch_diff<T>(
    tracker: &T,
    pull_request: &PullRequestHandle,
) -> Result<StagedDiff, DiffError>
where
    T: IssueTracker + ?Sized,
{
    let span = info_span!("fetch_diff", pull_request = %pull_request);

    async {
        let text = tracker.pull_request_diff(pull_request).await?;
        if text.trim().is_empty() {
            return Err(DiffError::Empty {
                pull_request: pull_request.to_string(),
            });
        }

        let staged = StagedDiff::stage(&text)?;
        debug!(path = %staged.path().display(), bytes = text.len(), "Staged diff");
        Ok(staged)
    }
    .instrument(span)
    .await
}
