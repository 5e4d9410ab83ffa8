//! Rendering of tracking issue and pull request text.
//!
//! Titles and bodies are handlebars templates taken from
//! [`TemplateFormats`](crate::config::TemplateFormats), rendered once per
//! target with a [`TemplateContext`].

mod context;
mod error;
mod renderer;

pub use context::TemplateContext;
pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, RenderedText, TemplateRenderer};
