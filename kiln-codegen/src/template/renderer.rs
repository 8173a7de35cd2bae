use std::sync::Arc;

use super::{InMemoryTemplateStore, Parameters, TemplateCache, TemplateSource, TemplateStore};
use crate::TemplateError;

/// Renders templates by slug through a shared cache.
#[derive(Debug)]
pub struct TemplateRenderer<S> {
    store: Arc<S>,
    cache: Arc<TemplateCache>,
}

impl<S> Clone for TemplateRenderer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: TemplateStore> TemplateRenderer<S> {
    pub fn new(store: Arc<S>, cache: Arc<TemplateCache>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub fn render(&self, slug: &str, params: &Parameters) -> Result<String, TemplateError> {
        let compiled = self
            .cache
            .get_or_compile(slug, || self.store.template_by_slug(slug))?;
        let output = compiled.render(params)?;
        self.store.increment_usage(compiled.id());
        Ok(output)
    }
}

impl TemplateRenderer<InMemoryTemplateStore> {
    /// Replace a template and drop its compiled form.
    pub fn update(&self, source: TemplateSource) -> u64 {
        let slug = source.slug.clone();
        let version = self.store.insert(source);
        self.cache.retire(&slug, version);
        version
    }
}
