//! [`SourceControl`] backed by the `git` binary.

use super::{ApplyOutcome, CommitRequest, GitAuth, GitError, SourceControl, Workspace};
use crate::request::RepositoryHandle;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// A checkout driven through the git command line.
#[derive(Debug)]
pub struct GitCli {
    path: PathBuf,
    auth: GitAuth,
}

impl GitCli {
    /// Opens the checkout at `path`, cloning `remote_url` into it if absent.
    ///
    /// `remote` names the remote the clone is registered under. An existing
    /// checkout has that remote's URL updated to `remote_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the directory cannot be created or git fails.
    pub async fn open_or_clone(
        path: &Path,
        remote: &str,
        remote_url: &str,
        auth: GitAuth,
    ) -> Result<Self, GitError> {
        let repo = Self {
            path: path.to_path_buf(),
            auth,
        };

        if path.join(".git").is_dir() {
            debug!(path = %path.display(), "Reusing existing checkout");
            repo.run(&["remote", "set-url", remote, remote_url]).await?;
            return Ok(repo);
        }

        info!(path = %path.display(), url = %remote_url, "Cloning repository");
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let directory = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| GitError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "checkout path has no directory name",
                ),
            })?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| GitError::Io {
                path: parent.display().to_string(),
                source,
            })?;

        let clone_url = repo.auth.authenticated_url(remote_url);
        repo.run_in(
            parent,
            &["clone", "--quiet", "--origin", remote, &clone_url, &directory],
        )
        .await?;

        // The clone recorded the authenticated URL; keep only the plain one.
        repo.run(&["remote", "set-url", remote, remote_url]).await?;
        Ok(repo)
    }

    /// Discards uncommitted state left behind by an interrupted run.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if git fails.
    pub async fn discard_local_changes(&mut self) -> Result<(), GitError> {
        self.run(&["reset", "--hard", "--quiet"]).await?;
        self.run(&["clean", "-fd", "--quiet"]).await?;
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        self.run_in(&self.path, args).await
    }

    async fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(dir, args, &[]).await?;
        self.check(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Runs git and returns its output whatever the exit status.
    async fn output(
        &self,
        dir: &Path,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output, GitError> {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in self.auth.environment() {
            command.env(key, value);
        }
        for (key, value) in envs {
            command.env(key, value);
        }

        command.output().await.map_err(|source| GitError::Spawn {
            command: self.describe(args),
            source,
        })
    }

    fn check(&self, args: &[&str], output: &Output) -> Result<(), GitError> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(GitError::CommandFailed {
            command: self.describe(args),
            stderr: self.auth.redact(stderr.trim()),
        })
    }

    fn describe(&self, args: &[&str]) -> String {
        self.auth.redact(&format!("git {}", args.join(" ")))
    }

    /// Paths with unmerged index entries.
    async fn unmerged_paths(&self) -> Result<Vec<String>, GitError> {
        let listing = self.run(&["ls-files", "--unmerged", "-z"]).await?;
        Ok(parse_unmerged_paths(&listing))
    }

    async fn object_id(&self, args: &[&str]) -> Result<String, GitError> {
        let id = self.run(args).await?;
        self.parse_object_id(args, id)
    }

    fn parse_object_id(&self, args: &[&str], id: String) -> Result<String, GitError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GitError::UnexpectedOutput {
                command: self.describe(args),
                output: id,
            });
        }
        Ok(id)
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        self.run(&["remote", "get-url", remote]).await
    }

    async fn fetch(&mut self, remote: &str) -> Result<(), GitError> {
        debug!(remote, "Fetching");
        let url = self.remote_url(remote).await?;
        let fetch_url = self.auth.authenticated_url(&url);
        let refspec = format!("+refs/heads/*:refs/remotes/{remote}/*");
        self.run(&["fetch", "--quiet", "--prune", &fetch_url, &refspec])
            .await?;
        Ok(())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, GitError> {
        let reference = format!("refs/heads/{name}");
        let args = ["show-ref", "--verify", "--quiet", reference.as_str()];
        let output = self.output(&self.path, &args, &[]).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => {
                self.check(&args, &output)?;
                Ok(false)
            }
        }
    }

    async fn resolve_remote_branch_tip(
        &self,
        remote: &str,
        branch: &str,
    ) -> Result<String, GitError> {
        let revision = format!("refs/remotes/{remote}/{branch}^{{commit}}");
        let args = ["rev-parse", "--verify", "--quiet", revision.as_str()];
        let output = self.output(&self.path, &args, &[]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // `--verify --quiet` exits 1 silently only when the ref is missing.
        if output.status.code() == Some(1) && stdout.is_empty() {
            return Err(GitError::RemoteBranchNotFound {
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
        }
        self.check(&args, &output)?;
        self.parse_object_id(&args, stdout)
    }

    async fn create_branch(&mut self, name: &str, from_commit: &str) -> Result<(), GitError> {
        debug!(branch = name, from = from_commit, "Creating branch");
        self.run(&["branch", "--no-track", name, from_commit]).await?;
        Ok(())
    }

    async fn checkout(&mut self, branch: &str) -> Result<(), GitError> {
        debug!(branch, "Checking out");
        self.run(&["checkout", "--quiet", branch, "--"]).await?;
        Ok(())
    }

    async fn apply_patch(&mut self, patch: &Path) -> Result<ApplyOutcome, GitError> {
        let patch_path = patch.display().to_string();
        let args = ["apply", "--3way", patch_path.as_str()];
        let output = self.output(&self.path, &args, &[]).await?;
        if output.status.success() {
            return Ok(ApplyOutcome::Clean);
        }

        // A conflicted three-way apply leaves unmerged index entries; any other
        // failure leaves none.
        let paths = self.unmerged_paths().await?;
        if paths.is_empty() {
            self.check(&args, &output)?;
        }
        Ok(ApplyOutcome::Conflicted { paths })
    }

    async fn stage_all(&mut self) -> Result<(), GitError> {
        self.run(&["add", "--all"]).await?;
        Ok(())
    }

    async fn write_index_tree(&mut self) -> Result<String, GitError> {
        self.object_id(&["write-tree"]).await
    }

    async fn current_head_commit(&self) -> Result<String, GitError> {
        self.object_id(&["rev-parse", "--verify", "HEAD^{commit}"])
            .await
    }

    async fn create_commit(&mut self, commit: &CommitRequest<'_>) -> Result<String, GitError> {
        let mut args = vec!["commit-tree", commit.tree];
        for parent in commit.parents {
            args.extend(["-p", parent.as_str()]);
        }
        args.extend(["-m", commit.message]);

        let envs = [
            ("GIT_AUTHOR_NAME", commit.author.name.as_str()),
            ("GIT_AUTHOR_EMAIL", commit.author.email.as_str()),
            ("GIT_COMMITTER_NAME", commit.committer.name.as_str()),
            ("GIT_COMMITTER_EMAIL", commit.committer.email.as_str()),
        ];
        let output = self.output(&self.path, &args, &envs).await?;
        self.check(&args, &output)?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // Compare-and-swap against the expected parent so a concurrent writer
        // cannot be silently overwritten.
        let mut update = vec!["update-ref", commit.reference, id.as_str()];
        if let Some(parent) = commit.parents.first() {
            update.push(parent.as_str());
        }
        self.run(&update).await?;

        debug!(reference = commit.reference, commit = %id, "Created commit");
        Ok(id)
    }

    async fn push(&mut self, remote: &str, refspecs: &[String]) -> Result<(), GitError> {
        let url = self.remote_url(remote).await?;
        let push_url = self.auth.authenticated_url(&url);
        let mut args = vec!["push", "--quiet", push_url.as_str()];
        args.extend(refspecs.iter().map(String::as_str));
        self.run(&args).await?;
        Ok(())
    }
}

/// Keeps one checkout per repository under a root directory.
///
/// Checkouts live at `<root>/<owner>/<repo>` and are reused across runs.
#[derive(Debug, Clone)]
pub struct GitWorkspace {
    root: PathBuf,
    remote: String,
    auth: GitAuth,
}

impl GitWorkspace {
    #[must_use]
    pub fn new(root: PathBuf, remote: &str, auth: GitAuth) -> Self {
        Self {
            root,
            remote: remote.to_string(),
            auth,
        }
    }

    /// Directory holding the checkout of `repository`.
    #[must_use]
    pub fn checkout_path(&self, repository: &RepositoryHandle) -> PathBuf {
        self.root.join(&repository.owner).join(&repository.name)
    }
}

#[async_trait]
impl Workspace for GitWorkspace {
    type Repository = GitCli;

    async fn open(
        &self,
        repository: &RepositoryHandle,
        remote_url: &str,
    ) -> Result<GitCli, GitError> {
        let path = self.checkout_path(repository);
        let mut repo =
            GitCli::open_or_clone(&path, &self.remote, remote_url, self.auth.clone()).await?;
        repo.fetch(&self.remote).await?;
        repo.discard_local_changes().await?;
        Ok(repo)
    }
}

/// Extracts paths from `git ls-files --unmerged -z` output, first stage wins.
fn parse_unmerged_paths(listing: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for entry in listing.split('\0').filter(|e| !e.is_empty()) {
        if let Some((_, path)) = entry.split_once('\t') {
            if !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
    }
    paths
}
