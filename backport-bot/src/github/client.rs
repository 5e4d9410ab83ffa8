//! [`IssueTracker`] backed by octocrab.

use super::rate_limit::ensure_core_rate_limit;
use super::{
    CommitRecord, CreatedItem, IssueTracker, NewIssue, NewPullRequest, Person, PullRequestInfo,
    TrackerError,
};
use crate::request::{PullRequestHandle, RepositoryHandle};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};

/// Page size for the pull request commits endpoint.
const COMMITS_PER_PAGE: u8 = 100;

/// GitHub stops listing pull request commits after this many.
const MAX_PULL_REQUEST_COMMITS: usize = 250;

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    #[serde(default)]
    merged: bool,
    merged_by: Option<UserResponse>,
    diff_url: Option<String>,
    base: RefResponse,
    head: RefResponse,
}

#[derive(Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    name: String,
    repo: Option<RepoResponse>,
}

#[derive(Deserialize)]
struct RepoResponse {
    clone_url: String,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<ActorResponse>,
    committer: Option<ActorResponse>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ActorResponse {
    name: String,
    email: String,
    date: String,
}

impl From<Option<ActorResponse>> for Person {
    fn from(actor: Option<ActorResponse>) -> Self {
        let actor = actor.unwrap_or_default();
        Self {
            name: actor.name,
            email: actor.email,
            date: actor.date,
        }
    }
}

impl From<CommitResponse> for CommitRecord {
    fn from(response: CommitResponse) -> Self {
        Self {
            sha: response.sha,
            message: response.commit.message,
            author: response.commit.author.into(),
            committer: response.commit.committer.into(),
        }
    }
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

/// GitHub issue tracker.
#[derive(Clone)]
pub struct GitHubTracker {
    client: Octocrab,
}

impl GitHubTracker {
    /// Builds a client for `repository` authenticated with `token`.
    ///
    /// Repositories outside github.com are treated as GitHub Enterprise and
    /// reached through `https://<host>/api/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the client cannot be built.
    pub fn new(token: &str, repository: &RepositoryHandle) -> Result<Self, TrackerError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if !repository.is_public_github() {
            builder = builder.base_uri(format!("https://{}/api/v3", repository.host))?;
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn pull_request_info(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<PullRequestInfo, TrackerError> {
        let repository = &pull_request.repository;
        let route = format!(
            "/repos/{}/{}/pulls/{}",
            repository.owner, repository.name, pull_request.number
        );
        debug!(route = %route, "Fetching pull request");

        let response: PullResponse = self.client.get(&route, None::<&()>).await?;
        let source_repo_url = response
            .base
            .repo
            .map(|repo| repo.clone_url)
            .ok_or_else(|| TrackerError::InvalidResponse {
                resource: pull_request.to_string(),
                message: "base repository is missing".to_string(),
            })?;

        Ok(PullRequestInfo {
            number: response.number,
            title: response.title,
            base_ref: response.base.name,
            head_ref: response.head.name,
            merged: response.merged,
            merged_by: response.merged_by.map(|user| user.login),
            diff_url: response.diff_url,
            source_repo_url,
        })
    }

    async fn pull_request_commits(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<Vec<CommitRecord>, TrackerError> {
        let repository = &pull_request.repository;
        let route = format!(
            "/repos/{}/{}/pulls/{}/commits",
            repository.owner, repository.name, pull_request.number
        );

        let mut commits = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: COMMITS_PER_PAGE,
                page,
            };
            let batch: Vec<CommitResponse> = self.client.get(&route, Some(&params)).await?;
            let exhausted = batch.len() < usize::from(COMMITS_PER_PAGE);
            commits.extend(batch.into_iter().map(CommitRecord::from));

            if exhausted || commits.len() >= MAX_PULL_REQUEST_COMMITS {
                break;
            }
            page += 1;
        }

        debug!(count = commits.len(), "Fetched pull request commits");
        Ok(commits)
    }

    async fn pull_request_diff(
        &self,
        pull_request: &PullRequestHandle,
    ) -> Result<String, TrackerError> {
        let repository = &pull_request.repository;
        Ok(self
            .client
            .pulls(&repository.owner, &repository.name)
            .get_diff(pull_request.number)
            .await?)
    }

    async fn create_issue(
        &self,
        repository: &RepositoryHandle,
        issue: &NewIssue,
    ) -> Result<CreatedItem, TrackerError> {
        let span = info_span!("create_issue", repo = %repository, title = %issue.title);

        async {
            ensure_core_rate_limit(&self.client).await;

            let handler = self.client.issues(&repository.owner, &repository.name);
            let mut builder = handler
                .create(&issue.title)
                .body(&issue.body)
                .labels(issue.labels.clone());
            if let Some(assignee) = &issue.assignee {
                builder = builder.assignees(vec![assignee.clone()]);
            }
            let created = builder.send().await?;

            info!(issue_number = created.number, "Issue created");
            Ok(CreatedItem {
                number: created.number,
                url: created.html_url.to_string(),
            })
        }
        .instrument(span)
        .await
    }

    async fn create_pull_request(
        &self,
        repository: &RepositoryHandle,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedItem, TrackerError> {
        let span = info_span!(
            "create_pull_request",
            repo = %repository,
            head = %pull_request.head,
            base = %pull_request.base
        );

        async {
            ensure_core_rate_limit(&self.client).await;

            let created = self
                .client
                .pulls(&repository.owner, &repository.name)
                .create(&pull_request.title, &pull_request.head, &pull_request.base)
                .body(&pull_request.body)
                .send()
                .await?;

            let url = created
                .html_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_else(|| {
                    format!(
                        "https://{}/{}/pull/{}",
                        repository.host,
                        repository.full_name(),
                        created.number
                    )
                });

            info!(pr_number = created.number, "Pull request created");
            Ok(CreatedItem {
                number: created.number,
                url,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_pull_request_response() {
        let response: PullResponse = serde_json::from_str(
            r#"{
                "number": 42,
                "title": "Fix bug",
                "merged": true,
                "merged_by": {"login": "octocat"},
                "diff_url": "https://github.com/acme/widgets/pull/42.diff",
                "base": {"ref": "main", "repo": {"clone_url": "https://github.com/acme/widgets.git"}},
                "head": {"ref": "feature-x", "repo": null}
            }"#,
        )
        .unwrap();

        assert_eq!(response.number, 42);
        assert!(response.merged);
        assert_eq!(response.merged_by.unwrap().login, "octocat");
        assert_eq!(response.base.name, "main");
        assert_eq!(response.head.name, "feature-x");
        assert!(response.head.repo.is_none());
    }

    #[test]
    fn unmerged_pull_request_defaults() {
        let response: PullResponse = serde_json::from_str(
            r#"{
                "number": 7,
                "title": "Draft",
                "merged_by": null,
                "base": {"ref": "main", "repo": {"clone_url": "https://github.com/a/b.git"}},
                "head": {"ref": "wip", "repo": null}
            }"#,
        )
        .unwrap();

        assert!(!response.merged);
        assert!(response.merged_by.is_none());
        assert!(response.diff_url.is_none());
    }

    #[test]
    fn converts_commit_response_verbatim() {
        let response: CommitResponse = serde_json::from_str(
            r#"{
                "sha": "abc123",
                "commit": {
                    "message": "Fix bug",
                    "author": {"name": "A", "email": "a@x.com", "date": "2020-01-01T00:00:00Z"},
                    "committer": null
                }
            }"#,
        )
        .unwrap();

        let record = CommitRecord::from(response);
        assert_eq!(record.sha, "abc123");
        assert_eq!(record.message, "Fix bug");
        assert_eq!(
            record.author,
            Person::new("A", "a@x.com", "2020-01-01T00:00:00Z")
        );
        assert_eq!(record.committer, Person::default());
    }
}
