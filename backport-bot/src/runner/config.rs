//! Runner configuration.

use crate::config::{BackportConfig, LabelConfig, TemplateFormats};
use crate::git::Signature;

/// Settings for one backport run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Remote the targets are read from and branches pushed to.
    remote: String,
    /// Author and committer of backport commits.
    signature: Signature,
    labels: LabelConfig,
    templates: TemplateFormats,
    /// Maximum targets published at once.
    publish_concurrency: usize,
    /// Whether to stop after planning.
    dry_run: bool,
}

impl RunnerConfig {
    /// Derives run settings from loaded configuration.
    #[must_use]
    pub fn new(config: &BackportConfig, dry_run: bool) -> Self {
        Self {
            remote: config.remote.clone(),
            signature: config.signature(),
            labels: config.labels.clone(),
            templates: config.templates.clone(),
            publish_concurrency: config.publish_concurrency,
            dry_run,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    pub fn templates(&self) -> &TemplateFormats {
        &self.templates
    }

    pub fn publish_concurrency(&self) -> usize {
        self.publish_concurrency
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(&BackportConfig::default(), false)
    }
}
