//! Credentials handed to git.

use std::path::PathBuf;
use url::Url;

/// Username GitHub expects alongside an installation or personal token.
const TOKEN_USERNAME: &str = "x-access-token";

/// Credentials for fetching from and pushing to the remote.
///
/// Built once at start-up and owned by the workspace, so no operation reads
/// key material on its own.
#[derive(Debug, Clone)]
pub enum GitAuth {
    /// HTTPS basic auth with a GitHub token.
    Token(String),

    /// SSH with an explicit private key. Encrypted keys must be loaded into an
    /// agent, since git runs non-interactively.
    SshKey { private_key: PathBuf },

    /// Rely on the ambient git configuration (local paths, credential helpers).
    None,
}

impl GitAuth {
    /// Returns the URL git should talk to for `remote_url`.
    ///
    /// Tokens are embedded into HTTPS URLs, and SSH keys switch HTTPS URLs to
    /// the `git@<host>:<path>` form, only for the duration of a single
    /// command; the stored remote URL stays clean.
    #[must_use]
    pub fn authenticated_url(&self, remote_url: &str) -> String {
        let url = match Url::parse(remote_url) {
            Ok(url) if url.scheme() == "https" => url,
            _ => return remote_url.to_string(),
        };

        match self {
            Self::Token(token) => with_token(url, token).unwrap_or_else(|| remote_url.to_string()),
            Self::SshKey { .. } => match url.host_str() {
                Some(host) => format!("git@{host}:{}", url.path().trim_start_matches('/')),
                None => remote_url.to_string(),
            },
            Self::None => remote_url.to_string(),
        }
    }

    /// Extra environment for git processes.
    #[must_use]
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::SshKey { private_key } => vec![(
                "GIT_SSH_COMMAND",
                format!(
                    "ssh -i '{}' -o IdentitiesOnly=yes -o BatchMode=yes",
                    private_key.display()
                ),
            )],
            Self::Token(_) | Self::None => Vec::new(),
        }
    }

    /// Removes secrets from text that may end up in logs or errors.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        match self {
            Self::Token(token) if !token.is_empty() => text.replace(token.as_str(), "***"),
            _ => text.to_string(),
        }
    }
}

fn with_token(mut url: Url, token: &str) -> Option<String> {
    url.set_username(TOKEN_USERNAME).ok()?;
    url.set_password(Some(token)).ok()?;
    Some(url.to_string())
}
