#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod backport;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod github;
pub mod inspect;
pub mod message;
pub mod publish;
pub mod push;
pub mod report;
pub mod request;
pub mod runner;
pub mod templates;

pub use backport::{backport_targets, derive_branch_name, BackportRun, BackportTarget, TargetState};
pub use config::{BackportConfig, ConfigError, TemplateFormats};
pub use diff::{fetch_diff, DiffError, StagedDiff};
pub use error::{BackportError, PublishFailure};
pub use git::{
    ApplyOutcome, CommitRequest, GitAuth, GitCli, GitError, GitWorkspace, Signature,
    SourceControl, Workspace,
};
pub use github::{
    CommitRecord, CreatedItem, GitHubTracker, IssueTracker, NewIssue, NewPullRequest, Person,
    PullRequestInfo, TrackerError,
};
pub use inspect::{inspect, validate};
pub use message::compose_message;
pub use publish::{publish_all, PublishOptions, PublishedTarget};
pub use push::push_branches;
pub use report::{BackportReport, TargetReport};
pub use request::{BackportRequest, PullRequestHandle, RepositoryHandle, RequestError};
pub use runner::{Runner, RunnerConfig};
pub use templates::{TemplateError, TemplateRenderer};
