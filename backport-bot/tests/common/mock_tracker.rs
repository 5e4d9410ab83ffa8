//! In-memory issue tracker.

use async_trait::async_trait;
use backport_bot::{
    CommitRecord, CreatedItem, IssueTracker, NewIssue, NewPullRequest, PullRequestHandle,
    PullRequestInfo, RepositoryHandle, TrackerError,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Issue tracker serving one pull request and recording what it creates.
///
/// Features:
/// - Call counting for the diff download
/// - Issue and pull request numbers from one shared counter
/// - Error injection per target branch
pub struct MockTracker {
    info: PullRequestInfo,
    commits: Vec<CommitRecord>,
    diff: String,
    next_number: AtomicU64,
    diff_fetches: AtomicUsize,
    issues: Mutex<Vec<NewIssue>>,
    pull_requests: Mutex<Vec<NewPullRequest>>,
    fail_pull_request_for: Mutex<Option<String>>,
}

impl MockTracker {
    pub fn new(info: PullRequestInfo, commits: Vec<CommitRecord>, diff: &str) -> Self {
        Self {
            info,
            commits,
            diff: diff.to_string(),
            next_number: AtomicU64::new(100),
            diff_fetches: AtomicUsize::new(0),
            issues: Mutex::new(Vec::new()),
            pull_requests: Mutex::new(Vec::new()),
            fail_pull_request_for: Mutex::new(None),
        }
    }

    /// Make `create_pull_request` fail when the base is `target`.
    pub fn fail_pull_request_for(&self, target: &str) {
        *self.fail_pull_request_for.lock().unwrap() = Some(target.to_string());
    }

    pub fn diff_fetches(&self) -> usize {
        self.diff_fetches.load(Ordering::SeqCst)
    }

    pub fn issues(&self) -> Vec<NewIssue> {
        self.issues.lock().unwrap().clone()
    }

    pub fn pull_requests(&self) -> Vec<NewPullRequest> {
        self.pull_requests.lock().unwrap().clone()
    }

    fn created(&self, kind: &str) -> CreatedItem {
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        CreatedItem {
            number,
            url: format!("https://github.com/acme/widgets/{kind}/{number}"),
        }
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn pull_request_info(
        &self,
        _pull_request: &PullRequestHandle,
    ) -> Result<PullRequestInfo, TrackerError> {
        Ok(self.info.clone())
    }

    async fn pull_request_commits(
        &self,
        _pull_request: &PullRequestHandle,
    ) -> Result<Vec<CommitRecord>, TrackerError> {
        Ok(self.commits.clone())
    }

    async fn pull_request_diff(
        &self,
        _pull_request: &PullRequestHandle,
    ) -> Result<String, TrackerError> {
        self.diff_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.diff.clone())
    }

    async fn create_issue(
        &self,
        _repository: &RepositoryHandle,
        issue: &NewIssue,
    ) -> Result<CreatedItem, TrackerError> {
        self.issues.lock().unwrap().push(issue.clone());
        Ok(self.created("issues"))
    }

    async fn create_pull_request(
        &self,
        _repository: &RepositoryHandle,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedItem, TrackerError> {
        let failing = self.fail_pull_request_for.lock().unwrap().clone();
        if failing.as_deref() == Some(pull_request.base.as_str()) {
            return Err(TrackerError::InvalidResponse {
                resource: "pull request".to_string(),
                message: "validation failed".to_string(),
            });
        }

        self.pull_requests.lock().unwrap().push(pull_request.clone());
        Ok(self.created("pull"))
    }
}
