//! In-memory sink for rendered files.

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use indexmap::IndexMap;
use serde::Serialize;

/// What a generated file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Model,
    Constructor,
    Interface,
    Repository,
    Service,
    Handler,
    ModuleIndex,
    Boilerplate,
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    /// Project-relative path
    pub path: PathBuf,
    /// Module path of the file within the generated crate
    pub namespace: String,
    pub content: String,
    /// Content length in bytes
    pub size: usize,
    pub kind: FileKind,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<PathBuf>,
        namespace: impl Into<String>,
        content: impl Into<String>,
        kind: FileKind,
    ) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            namespace: namespace.into(),
            size: content.len(),
            content,
            kind,
        }
    }
}

/// Ordered collection of the files produced by one generation request.
///
/// Appending never reorders and never deduplicates; when two files share
/// a path the writer keeps the later one.
#[derive(Debug)]
pub struct CodeAccumulator {
    files: Vec<GeneratedFile>,
    metadata: IndexMap<String, serde_json::Value>,
    created_at: SystemTime,
}

impl CodeAccumulator {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            metadata: IndexMap::new(),
            created_at: SystemTime::now(),
        }
    }

    pub fn append(&mut self, file: GeneratedFile) {
        tracing::trace!(path = %file.path.display(), size = file.size, "accumulated file");
        self.files.push(file);
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata(&self) -> &IndexMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

impl Default for CodeAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
