//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mock_tracker;
pub mod mock_workspace;

pub use mock_tracker::MockTracker;
pub use mock_workspace::{MockWorkspace, Op};

use backport_bot::{CommitRecord, Person, PullRequestInfo};

pub const PR_URL: &str = "https://github.com/acme/widgets/pull/42";

/// PR #42: merged from `feature-x` into `main` by octocat.
pub fn pr_42() -> PullRequestInfo {
    PullRequestInfo {
        number: 42,
        title: "Fix bug".to_string(),
        base_ref: "main".to_string(),
        head_ref: "feature-x".to_string(),
        merged: true,
        merged_by: Some("octocat".to_string()),
        diff_url: Some("https://github.com/acme/widgets/pull/42.diff".to_string()),
        source_repo_url: "https://github.com/acme/widgets.git".to_string(),
    }
}

/// The single commit of PR #42.
pub fn pr_42_commits() -> Vec<CommitRecord> {
    let person = Person::new("A", "a@x.com", "2020-01-01");
    vec![CommitRecord {
        sha: "abc123".to_string(),
        message: "Fix bug".to_string(),
        author: person.clone(),
        committer: person,
    }]
}

pub const PR_42_DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1 +1 @@
-pub const LIMIT: u32 = 10;
+pub const LIMIT: u32 = 20;
";
