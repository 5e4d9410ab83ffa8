//! Orchestrates a backport run.
//!
//! Order of work: inspect and validate the pull request, plan the targets,
//! open the checkout while the diff downloads, backport every target, push
//! every branch, then publish issues and pull requests.

mod config;

pub use config::RunnerConfig;

use crate::backport::{backport_targets, BackportRun};
use crate::config::BackportConfig;
use crate::diff::fetch_diff;
use crate::error::BackportError;
use crate::git::{GitWorkspace, Workspace};
use crate::github::{GitHubTracker, IssueTracker};
use crate::inspect::{inspect, validate};
use crate::publish::{publish_all, PublishOptions};
use crate::push::push_branches;
use crate::report::BackportReport;
use crate::request::{BackportRequest, RepositoryHandle};
use crate::templates::TemplateRenderer;
use tracing::{info, info_span, Instrument};

/// Runs backports against an issue tracker and a workspace.
pub struct Runner<T, W> {
    config: RunnerConfig,
    tracker: T,
    workspace: W,
    renderer: TemplateRenderer,
}

impl Runner<GitHubTracker, GitWorkspace> {
    /// Builds a runner talking to the host of `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`BackportError`] if credentials are missing or the GitHub
    /// client cannot be built.
    pub fn from_config(
        config: &BackportConfig,
        repository: &RepositoryHandle,
        token: &str,
        dry_run: bool,
    ) -> Result<Self, BackportError> {
        let tracker = GitHubTracker::new(token, repository)?;
        let auth = config.git_auth(Some(token))?;
        let workspace = GitWorkspace::new(config.workdir.clone(), &config.remote, auth);
        Self::new(RunnerConfig::new(config, dry_run), tracker, workspace)
    }
}

impl<T, W> Runner<T, W>
where
    T: IssueTracker,
    W: Workspace,
{
    /// Builds a runner from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`BackportError::Template`] if a configured format does not
    /// compile.
    pub fn new(config: RunnerConfig, tracker: T, workspace: W) -> Result<Self, BackportError> {
        let renderer = TemplateRenderer::new(config.templates())?;
        Ok(Self {
            config,
            tracker,
            workspace,
            renderer,
        })
    }

    /// Executes the full backport flow for `request`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`BackportError`]; publish failures are
    /// aggregated.
    pub async fn run(&self, request: &BackportRequest) -> Result<BackportReport, BackportError> {
        let span = info_span!("run", pull_request = %request.pull_request);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &BackportRequest) -> Result<BackportReport, BackportError> {
        let (info, commits) = inspect(&self.tracker, request).await?;
        validate(request, &info)?;

        let mut run = BackportRun::plan(request, &info, &commits)?;
        info!(
            targets = ?run.target_names(),
            branches = ?run.branches().collect::<Vec<_>>(),
            "Planned backport"
        );

        if self.config.dry_run() {
            info!("Dry run, nothing will be changed");
            return Ok(BackportReport::planned(&run));
        }

        let (mut repo, diff) = tokio::try_join!(
            async {
                self.workspace
                    .open(&request.pull_request.repository, &info.source_repo_url)
                    .await
                    .map_err(BackportError::from)
            },
            async {
                fetch_diff(&self.tracker, &request.pull_request)
                    .await
                    .map_err(BackportError::from)
            },
        )?;

        let remote = self.config.remote();
        backport_targets(
            &mut repo,
            remote,
            diff.path(),
            &mut run,
            self.config.signature(),
        )
        .await?;
        drop(diff);

        push_branches(&mut repo, remote, &run).await?;

        let published = publish_all(
            &self.tracker,
            &self.renderer,
            &run,
            PublishOptions {
                labels: self.config.labels(),
                concurrency: self.config.publish_concurrency(),
            },
        )
        .await?;

        let report = BackportReport::completed(&run, &published);
        info!(report = %report, "Backport complete");
        Ok(report)
    }

    /// The issue tracker this runner talks to.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// The workspace this runner opens checkouts from.
    pub fn workspace(&self) -> &W {
        &self.workspace
    }
}
