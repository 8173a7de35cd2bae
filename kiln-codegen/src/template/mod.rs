//! Template rendering.
//!
//! Templates are fetched by slug from a [`TemplateStore`], compiled once
//! into a [`TemplateCache`], and rendered with a parameter map that is
//! checked against the template's [`ParameterSchema`].

mod cache;
mod engine;
mod renderer;
mod schema;
mod store;

pub use cache::{CacheStats, TemplateCache};
pub use engine::{CompiledTemplate, render};
pub use renderer::TemplateRenderer;
pub use schema::{ParameterKind, ParameterSchema, ParameterSpec};
pub use store::{InMemoryTemplateStore, TemplateSource, TemplateStore};

/// Parameters a template is rendered with.
pub type Parameters = serde_json::Map<String, serde_json::Value>;
