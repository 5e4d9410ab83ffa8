//! Template renderer.

use super::{TemplateContext, TemplateError};
use crate::config::TemplateFormats;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};

const ISSUE_TITLE: &str = "issue-title";
const ISSUE_BODY: &str = "issue-body";
const PR_TITLE: &str = "pr-title";
const PR_BODY: &str = "pr-body";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs.register_helper("eq", Box::new(eq_helper));

    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq target "main")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).map(|v| v.value());
    let param2 = h.param(1).map(|v| v.value());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// A rendered title and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub title: String,
    pub body: String,
}

/// Renders tracking issues and pull requests from configured formats.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Compiles every format.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RegistrationError`] if a format does not parse.
    pub fn new(formats: &TemplateFormats) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        for (name, template) in [
            (ISSUE_TITLE, &formats.issue_title),
            (ISSUE_BODY, &formats.issue_body),
            (PR_TITLE, &formats.pr_title),
            (PR_BODY, &formats.pr_body),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|source| TemplateError::RegistrationError {
                    name,
                    source,
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Renders the tracking issue for one target.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue(&self, context: &TemplateContext<'_>) -> Result<RenderedText, TemplateError> {
        self.render_pair(ISSUE_TITLE, ISSUE_BODY, context)
    }

    /// Renders the pull request for one target.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_pull_request(
        &self,
        context: &TemplateContext<'_>,
    ) -> Result<RenderedText, TemplateError> {
        self.render_pair(PR_TITLE, PR_BODY, context)
    }

    fn render_pair(
        &self,
        title: &str,
        body: &str,
        context: &TemplateContext<'_>,
    ) -> Result<RenderedText, TemplateError> {
        Ok(RenderedText {
            title: self.handlebars.render(title, context)?,
            body: self.handlebars.render(body, context)?,
        })
    }
}
