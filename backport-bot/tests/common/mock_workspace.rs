//! In-memory checkout.

use async_trait::async_trait;
use backport_bot::{
    ApplyOutcome, CommitRequest, GitError, RepositoryHandle, SourceControl, Workspace,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A repository mutation, in the order it was performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Fetch,
    CreateBranch { name: String, from: String },
    Checkout(String),
    ApplyPatch(PathBuf),
    StageAll,
    WriteTree,
    Commit {
        reference: String,
        message: String,
        parents: Vec<String>,
        author: String,
    },
    Push(Vec<String>),
}

#[derive(Default)]
struct State {
    opened: usize,
    ops: Vec<Op>,
    remote_tips: HashMap<String, String>,
    local_branches: HashMap<String, String>,
    current: Option<String>,
    conflicting_tips: HashSet<String>,
    failing_apply_tips: HashSet<String>,
    patch_contents: Vec<String>,
    fail_push: Option<String>,
    commits: usize,
}

/// Workspace handing out [`MockRepo`]s that share one recorded state.
#[derive(Clone, Default)]
pub struct MockWorkspace {
    state: Arc<Mutex<State>>,
}

impl MockWorkspace {
    /// A remote with the given branches.
    pub fn with_remote_branches(branches: &[&str]) -> Self {
        let workspace = Self::default();
        {
            let mut state = workspace.state.lock().unwrap();
            for branch in branches {
                state
                    .remote_tips
                    .insert((*branch).to_string(), tip_for(branch));
            }
        }
        workspace
    }

    /// Make the patch conflict on `target`.
    pub fn conflict_on(&self, target: &str) {
        self.state
            .lock()
            .unwrap()
            .conflicting_tips
            .insert(tip_for(target));
    }

    /// Make the patch fail outright, without conflicts, on `target`.
    pub fn fail_apply_on(&self, target: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_apply_tips
            .insert(tip_for(target));
    }

    /// Pretend a branch already exists on the remote.
    pub fn add_remote_branch(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .remote_tips
            .insert(name.to_string(), tip_for(name));
    }

    /// Pretend a local branch already exists.
    pub fn add_local_branch(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .local_branches
            .insert(name.to_string(), "old".to_string());
    }

    /// Make pushing `branch` fail.
    pub fn fail_push(&self, branch: &str) {
        self.state.lock().unwrap().fail_push = Some(branch.to_string());
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Every op except the fetch done when opening.
    pub fn mutations(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| *op != Op::Fetch)
            .collect()
    }

    pub fn patch_contents(&self) -> Vec<String> {
        self.state.lock().unwrap().patch_contents.clone()
    }

    pub fn commits(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| matches!(op, Op::Commit { .. }))
            .collect()
    }

    pub fn pushes(&self) -> Vec<Vec<String>> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Push(refspecs) => Some(refspecs),
                _ => None,
            })
            .collect()
    }

    pub fn applied_patches(&self) -> Vec<PathBuf> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::ApplyPatch(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

fn tip_for(branch: &str) -> String {
    format!("tip-{branch}")
}

#[async_trait]
impl Workspace for MockWorkspace {
    type Repository = MockRepo;

    async fn open(
        &self,
        _repository: &RepositoryHandle,
        _remote_url: &str,
    ) -> Result<MockRepo, GitError> {
        let mut repo = MockRepo {
            state: Arc::clone(&self.state),
        };
        self.state.lock().unwrap().opened += 1;
        repo.fetch("origin").await?;
        Ok(repo)
    }
}

/// Checkout backed by [`MockWorkspace`]'s state.
pub struct MockRepo {
    state: Arc<Mutex<State>>,
}

fn failed(command: &str, stderr: &str) -> GitError {
    GitError::CommandFailed {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl SourceControl for MockRepo {
    async fn remote_url(&self, _remote: &str) -> Result<String, GitError> {
        Ok("https://github.com/acme/widgets.git".to_string())
    }

    async fn fetch(&mut self, _remote: &str) -> Result<(), GitError> {
        self.state.lock().unwrap().ops.push(Op::Fetch);
        Ok(())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, GitError> {
        Ok(self.state.lock().unwrap().local_branches.contains_key(name))
    }

    async fn resolve_remote_branch_tip(
        &self,
        remote: &str,
        branch: &str,
    ) -> Result<String, GitError> {
        self.state
            .lock()
            .unwrap()
            .remote_tips
            .get(branch)
            .cloned()
            .ok_or_else(|| GitError::RemoteBranchNotFound {
                remote: remote.to_string(),
                branch: branch.to_string(),
            })
    }

    async fn create_branch(&mut self, name: &str, from_commit: &str) -> Result<(), GitError> {
        let mut state = self.state.lock().unwrap();
        if state.local_branches.contains_key(name) {
            return Err(failed("git branch", "already exists"));
        }
        state
            .local_branches
            .insert(name.to_string(), from_commit.to_string());
        state.ops.push(Op::CreateBranch {
            name: name.to_string(),
            from: from_commit.to_string(),
        });
        Ok(())
    }

    async fn checkout(&mut self, branch: &str) -> Result<(), GitError> {
        let mut state = self.state.lock().unwrap();
        state.current = Some(branch.to_string());
        state.ops.push(Op::Checkout(branch.to_string()));
        Ok(())
    }

    async fn apply_patch(&mut self, patch: &Path) -> Result<ApplyOutcome, GitError> {
        let contents = std::fs::read_to_string(patch)
            .map_err(|_| failed("git apply", "patch file missing"))?;

        let mut state = self.state.lock().unwrap();
        state.patch_contents.push(contents);
        state.ops.push(Op::ApplyPatch(patch.to_path_buf()));

        let tip = state
            .current
            .as_ref()
            .and_then(|branch| state.local_branches.get(branch))
            .cloned()
            .unwrap_or_default();
        if state.failing_apply_tips.contains(&tip) {
            return Err(failed(
                "git apply --3way",
                "error: src/lib.rs: does not exist in index",
            ));
        }
        if state.conflicting_tips.contains(&tip) {
            Ok(ApplyOutcome::Conflicted {
                paths: vec!["src/lib.rs".to_string()],
            })
        } else {
            Ok(ApplyOutcome::Clean)
        }
    }

    async fn stage_all(&mut self) -> Result<(), GitError> {
        self.state.lock().unwrap().ops.push(Op::StageAll);
        Ok(())
    }

    async fn write_index_tree(&mut self) -> Result<String, GitError> {
        self.state.lock().unwrap().ops.push(Op::WriteTree);
        Ok("tree".to_string())
    }

    async fn current_head_commit(&self) -> Result<String, GitError> {
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|branch| state.local_branches.get(branch))
            .cloned()
            .ok_or_else(|| failed("git rev-parse", "no HEAD"))
    }

    async fn create_commit(&mut self, commit: &CommitRequest<'_>) -> Result<String, GitError> {
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        let id = format!("commit-{}", state.commits);

        let branch = commit
            .reference
            .strip_prefix("refs/heads/")
            .unwrap_or(commit.reference)
            .to_string();
        state.local_branches.insert(branch, id.clone());
        state.ops.push(Op::Commit {
            reference: commit.reference.to_string(),
            message: commit.message.to_string(),
            parents: commit.parents.to_vec(),
            author: format!("{} <{}>", commit.author.name, commit.author.email),
        });
        Ok(id)
    }

    async fn push(&mut self, _remote: &str, refspecs: &[String]) -> Result<(), GitError> {
        let mut state = self.state.lock().unwrap();
        if let Some(branch) = &state.fail_push {
            if refspecs.iter().any(|r| r.contains(branch.as_str())) {
                return Err(failed("git push", "rejected"));
            }
        }
        state.ops.push(Op::Push(refspecs.to_vec()));
        Ok(())
    }
}
