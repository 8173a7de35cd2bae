use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;

use super::{CompiledTemplate, TemplateSource};
use crate::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Compiled templates keyed by slug.
///
/// Populated on a read miss and invalidated when a template changes.
/// Readers share the lock; compilation happens outside it.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
struct Entries {
    compiled: HashMap<String, Arc<CompiledTemplate>>,
    /// Oldest store version still allowed in the cache, per slug
    floors: HashMap<String, u64>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled template for `slug`, fetching and compiling it
    /// with `fetch` on a miss.
    ///
    /// A version retired while `fetch` ran is returned to this caller but
    /// never cached.
    pub fn get_or_compile<F>(
        &self,
        slug: &str,
        fetch: F,
    ) -> Result<Arc<CompiledTemplate>, TemplateError>
    where
        F: FnOnce() -> Result<TemplateSource, TemplateError>,
    {
        if let Some(compiled) = self.entries.read().compiled.get(slug) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(slug, "template cache hit");
            return Ok(Arc::clone(compiled));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(slug, "template cache miss");

        let compiled = Arc::new(CompiledTemplate::compile(&fetch()?)?);
        let mut entries = self.entries.write();
        let floor = entries.floors.get(slug).copied().unwrap_or(0);
        if compiled.version() < floor {
            tracing::debug!(
                slug,
                version = compiled.version(),
                floor,
                "not caching retired template"
            );
            return Ok(compiled);
        }
        // Another reader may have compiled the same or a newer version meanwhile.
        let newer = entries
            .compiled
            .get(slug)
            .filter(|existing| existing.version() >= compiled.version())
            .cloned();
        if let Some(existing) = newer {
            return Ok(existing);
        }
        entries
            .compiled
            .insert(slug.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn invalidate(&self, slug: &str) -> bool {
        let removed = self.entries.write().compiled.remove(slug).is_some();
        if removed {
            tracing::debug!(slug, "template cache entry invalidated");
        }
        removed
    }

    /// Drop `slug` and refuse to cache any version older than `version`.
    pub fn retire(&self, slug: &str, version: u64) {
        let mut entries = self.entries.write();
        let floor = entries.floors.entry(slug.to_string()).or_insert(0);
        *floor = (*floor).max(version);
        if entries
            .compiled
            .get(slug)
            .is_some_and(|compiled| compiled.version() < version)
        {
            entries.compiled.remove(slug);
            tracing::debug!(slug, version, "template cache entry retired");
        }
    }

    pub fn clear(&self) {
        self.entries.write().compiled.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
