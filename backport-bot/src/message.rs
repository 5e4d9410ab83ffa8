//! Consolidated commit messages.
//!
//! A backport squashes every commit of the pull request into one, so the
//! message keeps each original commit's message, sha, author and committer.

use crate::github::{CommitRecord, Person};

/// Separator between commit blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Builds one message describing every commit, in order.
///
/// Each commit becomes a block:
///
/// ```text
/// [Commit 1]
/// Fix bug
///
/// Original sha: abc123
/// Author: A <a@x.com> on 2020-01-01
/// Committer: A <a@x.com> on 2020-01-01
/// ```
#[must_use]
pub fn compose_message(commits: &[CommitRecord]) -> String {
    commits
        .iter()
        .enumerate()
        .map(|(index, commit)| commit_block(index + 1, commit))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Heading line for a backport of PR `number` onto `target`.
#[must_use]
pub fn backport_heading(number: u64, target: &str) -> String {
    format!("Backport PR #{number} to {target}")
}

/// Full commit (and default issue) body for one target.
#[must_use]
pub fn target_message(number: u64, target: &str, consolidated: &str) -> String {
    format!("{}\n\n{consolidated}", backport_heading(number, target))
}

fn commit_block(index: usize, commit: &CommitRecord) -> String {
    format!(
        "[Commit {index}]\n{message}\n\nOriginal sha: {sha}\nAuthor: {author}\nCommitter: {committer}",
        message = commit.message,
        sha = commit.sha,
        author = describe(&commit.author),
        committer = describe(&commit.committer),
    )
}

fn describe(person: &Person) -> String {
    format!("{} <{}> on {}", person.name, person.email, person.date)
}
