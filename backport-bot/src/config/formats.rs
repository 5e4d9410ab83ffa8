//! Handlebars formats for tracking issues and pull requests.

use serde::Deserialize;

/// Title and body formats used when publishing a backport.
///
/// Every format is a handlebars template rendered with `number`, `title`,
/// `target`, `branch`, `base`, `head`, `has_conflicts`, `conflicted_paths`,
/// `message` and (for pull requests) `issue_number`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TemplateFormats {
    /// Tracking issue title.
    pub issue_title: String,

    /// Tracking issue body.
    pub issue_body: String,

    /// Pull request title.
    pub pr_title: String,

    /// Pull request body.
    pub pr_body: String,
}

impl Default for TemplateFormats {
    fn default() -> Self {
        Self {
            issue_title: default_issue_title_format(),
            issue_body: default_issue_body_format(),
            pr_title: default_pr_title_format(),
            pr_body: default_pr_body_format(),
        }
    }
}

impl TemplateFormats {
    /// Returns each format paired with its configuration key.
    pub(crate) fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("templates.issue-title", self.issue_title.as_str()),
            ("templates.issue-body", self.issue_body.as_str()),
            ("templates.pr-title", self.pr_title.as_str()),
            ("templates.pr-body", self.pr_body.as_str()),
        ]
    }
}

#[must_use]
pub fn default_issue_title_format() -> String {
    "Backport PR #{{number}} to {{target}}".to_string()
}

#[must_use]
pub fn default_issue_body_format() -> String {
    "Backport PR #{{number}} to {{target}}\n\n{{message}}".to_string()
}

#[must_use]
pub fn default_pr_title_format() -> String {
    "Backport PR #{{number}} to {{target}}".to_string()
}

#[must_use]
pub fn default_pr_body_format() -> String {
    concat!(
        "Backport of #{{number}} ({{title}}) onto `{{target}}`.\n\n",
        "Tracking issue: #{{issue_number}}\n",
        "{{#if has_conflicts}}\n",
        "**This backport has conflicts.** The patch did not apply cleanly and ",
        "conflict markers were committed in:\n\n",
        "{{#each conflicted_paths}}- `{{this}}`\n{{/each}}\n",
        "Resolve them on `{{branch}}` before merging.\n",
        "{{/if}}"
    )
    .to_string()
}
