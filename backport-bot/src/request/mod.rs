//! Backport request parsing.
//!
//! A request names one merged pull request by URL and the branches it should
//! be backported onto. It can be built from already-split arguments (the CLI)
//! or from the chat command form `backport <pull-request-url> <targets...>`.

mod error;

pub use error::RequestError;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Keyword that starts a chat command.
const COMMAND_KEYWORD: &str = "backport";

/// A repository hosted on GitHub or GitHub Enterprise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryHandle {
    /// Host name (e.g., "github.com").
    pub host: String,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepositoryHandle {
    /// Returns the repository name in "owner/name" format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns true when the repository lives on github.com.
    #[must_use]
    pub fn is_public_github(&self) -> bool {
        self.host.eq_ignore_ascii_case("github.com")
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A pull request identified by repository and number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestHandle {
    /// Repository the pull request belongs to.
    pub repository: RepositoryHandle,

    /// Pull request number.
    pub number: u64,
}

impl PullRequestHandle {
    /// Parses a URL of the form `https://<host>/<owner>/<repo>/pull/<number>`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] if the URL does not have that shape.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let invalid = |message: &str| RequestError::InvalidUrl {
            url: raw.to_string(),
            message: message.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("only https URLs are supported"));
        }

        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();

        let [owner, name, "pull", number] = segments.as_slice() else {
            return Err(invalid("expected /<owner>/<repo>/pull/<number>"));
        };

        let number = number
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid("pull request number must be a positive integer"))?;

        Ok(Self {
            repository: RepositoryHandle {
                host: host.to_string(),
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            },
            number,
        })
    }
}

impl fmt::Display for PullRequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

/// A request to backport one pull request onto a set of branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportRequest {
    /// The merged pull request to backport.
    pub pull_request: PullRequestHandle,

    /// Target branches, in the order given.
    pub targets: Vec<String>,
}

impl BackportRequest {
    /// Builds a request from a pull request URL and target branch names.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the URL is malformed, no targets are given,
    /// or a target is repeated.
    pub fn new<I, S>(url: &str, targets: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pull_request = PullRequestHandle::parse(url)?;
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();

        if targets.is_empty() {
            return Err(RequestError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(target.as_str()) {
                return Err(RequestError::DuplicateTarget {
                    target: target.clone(),
                });
            }
        }

        Ok(Self {
            pull_request,
            targets,
        })
    }

    /// Parses the chat command form `backport <pull-request-url> <targets...>`.
    ///
    /// Targets are separated by whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the command keyword, URL or targets are
    /// missing or invalid.
    pub fn parse_command(line: &str) -> Result<Self, RequestError> {
        let mut words = line.split_whitespace();
        if words.next() != Some(COMMAND_KEYWORD) {
            return Err(RequestError::UnknownCommand);
        }
        let url = words.next().ok_or(RequestError::MissingUrl)?;
        Self::new(url, words)
    }
}
