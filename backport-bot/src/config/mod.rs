//! Configuration loading.
//!
//! Settings are read from a TOML file (kebab-case keys, every section
//! optional), then overridden from the environment. A missing file yields the
//! defaults.
//!
//! ```toml
//! workdir = "/var/lib/backport-bot"
//! remote = "origin"
//! publish-concurrency = 4
//!
//! [signature]
//! name = "Backport Bot"
//! email = "backport-bot@users.noreply.github.com"
//!
//! [labels]
//! backport = "backport"
//! conflicts = "has conflicts"
//!
//! [git]
//! auth = "ssh"
//! ssh-key = "/etc/backport-bot/id_ed25519"
//! ```

mod error;
mod formats;

pub use error::ConfigError;
pub use formats::{
    default_issue_body_format, default_issue_title_format, default_pr_body_format,
    default_pr_title_format, TemplateFormats,
};

use crate::git::{GitAuth, Signature};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overrides `workdir`.
pub const WORKDIR_ENV: &str = "BACKPORT_WORKDIR";

/// Overrides `remote`.
pub const REMOTE_ENV: &str = "BACKPORT_REMOTE";

/// Complete bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BackportConfig {
    /// Directory holding one reusable checkout per repository.
    pub workdir: PathBuf,

    /// Name of the remote branches are resolved from and pushed to.
    pub remote: String,

    /// Maximum number of targets published concurrently.
    pub publish_concurrency: usize,

    /// Author and committer of backport commits.
    pub signature: SignatureConfig,

    /// Labels applied to tracking issues.
    pub labels: LabelConfig,

    /// Git transport settings.
    pub git: GitConfig,

    /// Issue and pull request formats.
    pub templates: TemplateFormats,
}

impl Default for BackportConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from(".backport-bot/checkouts"),
            remote: "origin".to_string(),
            publish_concurrency: 4,
            signature: SignatureConfig::default(),
            labels: LabelConfig::default(),
            git: GitConfig::default(),
            templates: TemplateFormats::default(),
        }
    }
}

/// Fixed identity used for backport commits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SignatureConfig {
    pub name: String,
    pub email: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            name: "Backport Bot".to_string(),
            email: "backport-bot@users.noreply.github.com".to_string(),
        }
    }
}

/// Labels applied to tracking issues.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LabelConfig {
    /// Applied to every tracking issue.
    pub backport: String,

    /// Applied only when the patch left conflict markers.
    pub conflicts: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            backport: "backport".to_string(),
            conflicts: "has conflicts".to_string(),
        }
    }
}

/// How git authenticates against the remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// HTTPS with the GitHub token.
    #[default]
    Token,
    /// SSH with a private key file.
    Ssh,
    /// Whatever the local git configuration provides.
    None,
}

/// Git transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GitConfig {
    pub auth: AuthMethod,

    /// Private key used when `auth = "ssh"`.
    pub ssh_key: Option<PathBuf>,
}

impl BackportConfig {
    /// Loads configuration from `path`, applies environment overrides and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a value
    /// is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading configuration");
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
                path: path.display().to_string(),
                source,
            })?
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies `BACKPORT_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(workdir) = non_empty_env(WORKDIR_ENV) {
            self.workdir = PathBuf::from(workdir);
        }
        if let Some(remote) = non_empty_env(REMOTE_ENV) {
            self.remote = remote;
        }
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.publish_concurrency == 0 {
            return Err(ConfigError::invalid(
                "publish-concurrency",
                "must be at least 1",
            ));
        }
        if self.remote.trim().is_empty() {
            return Err(ConfigError::invalid("remote", "must not be empty"));
        }
        if self.signature.name.trim().is_empty() {
            return Err(ConfigError::invalid("signature.name", "must not be empty"));
        }
        if self.signature.email.trim().is_empty() {
            return Err(ConfigError::invalid("signature.email", "must not be empty"));
        }
        if self.labels.backport.trim().is_empty() {
            return Err(ConfigError::invalid("labels.backport", "must not be empty"));
        }
        if self.labels.conflicts.trim().is_empty() {
            return Err(ConfigError::invalid("labels.conflicts", "must not be empty"));
        }
        if self.git.auth == AuthMethod::Ssh && self.git.ssh_key.is_none() {
            return Err(ConfigError::invalid(
                "git.ssh-key",
                "required when git.auth = \"ssh\"",
            ));
        }
        for (key, format) in self.templates.entries() {
            handlebars::Template::compile(format)
                .map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        }
        Ok(())
    }

    /// Returns the commit signature.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::new(&self.signature.name, &self.signature.email)
    }

    /// Builds git credentials once, at start-up.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when token authentication is
    /// selected but no token is available.
    pub fn git_auth(&self, token: Option<&str>) -> Result<GitAuth, ConfigError> {
        match self.git.auth {
            AuthMethod::Token => token
                .filter(|t| !t.is_empty())
                .map(|t| GitAuth::Token(t.to_string()))
                .ok_or_else(|| ConfigError::invalid("git.auth", "token auth needs a GitHub token")),
            AuthMethod::Ssh => self
                .git
                .ssh_key
                .clone()
                .map(|private_key| GitAuth::SshKey { private_key })
                .ok_or_else(|| {
                    ConfigError::invalid("git.ssh-key", "required when git.auth = \"ssh\"")
                }),
            AuthMethod::None => Ok(GitAuth::None),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, contents: &str) -> PathBuf {
        let path = temp.path().join("backport.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    fn without_overrides<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset([WORKDIR_ENV, REMOTE_ENV], f)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config =
            without_overrides(|| BackportConfig::load(&temp.path().join("missing.toml"))).unwrap();

        assert_eq!(config, BackportConfig::default());
        assert_eq!(config.labels.backport, "backport");
        assert_eq!(config.labels.conflicts, "has conflicts");
    }

    #[test]
    fn parses_full_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
workdir = "/srv/checkouts"
remote = "upstream"
publish-concurrency = 2

[signature]
name = "Release Bot"
email = "release@example.com"

[labels]
conflicts = "needs-resolution"

[git]
auth = "ssh"
ssh-key = "/keys/id_ed25519"

[templates]
issue-title = "[{{target}}] {{title}}"
"#,
        );

        let config = without_overrides(|| BackportConfig::load(&path)).unwrap();

        assert_eq!(config.workdir, PathBuf::from("/srv/checkouts"));
        assert_eq!(config.remote, "upstream");
        assert_eq!(config.publish_concurrency, 2);
        assert_eq!(config.signature().name, "Release Bot");
        assert_eq!(config.labels.backport, "backport");
        assert_eq!(config.labels.conflicts, "needs-resolution");
        assert_eq!(config.git.auth, AuthMethod::Ssh);
        assert_eq!(config.templates.issue_title, "[{{target}}] {{title}}");
        assert_eq!(config.templates.pr_title, default_pr_title_format());
    }

    #[test]
    fn environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "workdir = \"/from/file\"\n");

        let config = temp_env::with_vars(
            [(WORKDIR_ENV, Some("/from/env")), (REMOTE_ENV, Some("fork"))],
            || BackportConfig::load(&path),
        )
        .unwrap();

        assert_eq!(config.workdir, PathBuf::from("/from/env"));
        assert_eq!(config.remote, "fork");
    }

    #[test]
    fn reports_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "workdir = [unclosed");

        let result = without_overrides(|| BackportConfig::load(&path));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let config = BackportConfig {
            publish_concurrency: 0,
            ..BackportConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { key, .. }) if key == "publish-concurrency"
        ));
    }

    #[test]
    fn rejects_unparsable_template() {
        let mut config = BackportConfig::default();
        config.templates.pr_body = "{{#if has_conflicts}}x{{/each}}".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { key, .. }) if key == "templates.pr-body"
        ));
    }

    #[test]
    fn ssh_auth_requires_key() {
        let mut config = BackportConfig::default();
        config.git.auth = AuthMethod::Ssh;
        assert!(config.validate().is_err());

        config.git.ssh_key = Some(PathBuf::from("/keys/id"));
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.git_auth(None).unwrap(),
            GitAuth::SshKey { private_key } if private_key == PathBuf::from("/keys/id")
        ));
    }

    #[test]
    fn token_auth_requires_token() {
        let config = BackportConfig::default();

        assert!(config.git_auth(None).is_err());
        assert!(config.git_auth(Some("")).is_err());
        assert!(matches!(
            config.git_auth(Some("ghp_secret")).unwrap(),
            GitAuth::Token(token) if token == "ghp_secret"
        ));
    }
}
