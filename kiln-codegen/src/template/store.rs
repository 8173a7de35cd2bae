use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Deserialize;

use super::{ParameterSchema, ParameterSpec};
use crate::TemplateError;

/// Template text plus the parameters it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub id: String,
    pub slug: String,
    pub text: String,
    pub schema: ParameterSchema,
    /// Bumped every time the slug is replaced in a store
    pub version: u64,
}

impl TemplateSource {
    pub fn new(slug: impl Into<String>, text: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: slug.clone(),
            slug,
            text: text.into(),
            schema: ParameterSchema::default(),
            version: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.schema = schema;
        self
    }
}

/// Where templates come from.
pub trait TemplateStore: Send + Sync {
    fn template_by_slug(&self, slug: &str) -> Result<TemplateSource, TemplateError>;

    /// Record one successful render of the template with `id`.
    fn increment_usage(&self, id: &str);
}

/// Store backed by memory, safe for concurrent readers.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<IndexMap<String, TemplateSource>>,
    usage: RwLock<HashMap<String, u64>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a template. Replacing bumps its version.
    pub fn insert(&self, mut source: TemplateSource) -> u64 {
        let mut templates = self.templates.write();
        source.version = templates
            .get(&source.slug)
            .map_or(1, |previous| previous.version + 1);
        let version = source.version;
        templates.insert(source.slug.clone(), source);
        version
    }

    pub fn with(self, source: TemplateSource) -> Self {
        self.insert(source);
        self
    }

    /// Current version of `slug`, if present.
    pub fn version(&self, slug: &str) -> Option<u64> {
        self.templates.read().get(slug).map(|source| source.version)
    }

    pub fn slugs(&self) -> Vec<String> {
        self.templates.read().keys().cloned().collect()
    }

    pub fn usage(&self, id: &str) -> u64 {
        self.usage.read().get(id).copied().unwrap_or(0)
    }

    /// Load every `<slug>.toml` file in `dir`. Returns the loaded slugs.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<String>, TemplateError> {
        let load_error = |path: &Path, message: String| TemplateError::Load {
            path: path.to_path_buf(),
            message,
        };

        let entries = fs::read_dir(dir).map_err(|e| load_error(dir, e.to_string()))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content =
                fs::read_to_string(&path).map_err(|e| load_error(&path, e.to_string()))?;
            let file: TemplateFile =
                toml::from_str(&content).map_err(|e| load_error(&path, e.to_string()))?;

            let mut source =
                TemplateSource::new(slug, file.text).with_schema(ParameterSchema::new(file.parameters));
            if let Some(id) = file.id {
                source = source.with_id(id);
            }
            tracing::debug!(slug, path = %path.display(), "loaded template override");
            self.insert(source);
            loaded.push(slug.to_string());
        }
        Ok(loaded)
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn template_by_slug(&self, slug: &str) -> Result<TemplateSource, TemplateError> {
        self.templates
            .read()
            .get(slug)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                slug: slug.to_string(),
            })
    }

    fn increment_usage(&self, id: &str) {
        *self.usage.write().entry(id.to_string()).or_insert(0) += 1;
    }
}

/// On-disk template override.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    id: Option<String>,
    #[allow(dead_code)]
    description: Option<String>,
    text: String,
    #[serde(default)]
    parameters: Vec<ParameterSpec>,
}
