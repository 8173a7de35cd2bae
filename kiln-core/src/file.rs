use std::{
    io,
    path::{Path, PathBuf},
};

use crate::paths::{PathError, resolve_within};

/// Trait for boilerplate files that know their own location and content.
///
/// Paths are relative to the project root; [`ProjectFile::write`] refuses to
/// write anywhere outside of it.
pub trait ProjectFile {
    /// Path of the file relative to the project root
    fn path(&self) -> PathBuf;

    /// Rules for writing this file
    fn rules(&self) -> FileRules;

    /// Render the file content
    fn render(&self) -> String;

    /// Write the file under `root`
    fn write(&self, root: &Path) -> Result<WriteResult, PathError> {
        File::new(self.path(), self.render())
            .with_rules(self.rules())
            .write(root)
    }
}

/// Write `content` to `path`, creating parent directories on demand.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was skipped (already exists)
    Skipped,
}

/// A file to be written below a project root
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
    rules: FileRules,
}

impl File {
    /// Create a new file with a root-relative path (default rules: always overwrite)
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            rules: FileRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: FileRules) -> Self {
        self.rules = rules;
        self
    }

    /// Get the root-relative path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rules(&self) -> &FileRules {
        &self.rules
    }

    /// Write the file under `root` according to its rules
    pub fn write(&self, root: &Path) -> Result<WriteResult, PathError> {
        let target = resolve_within(root, &self.path)?;

        if self.rules.overwrite == Overwrite::IfMissing && target.exists() {
            tracing::trace!(path = %self.path.display(), "keeping existing file");
            return Ok(WriteResult::Skipped);
        }

        let content = match self.rules.header {
            Some(header) => format!("{header}\n\n{}", self.content),
            None => self.content.clone(),
        };
        write_file(&target, &content).map_err(|source| PathError::Io {
            path: target.clone(),
            source,
        })?;
        Ok(WriteResult::Written)
    }
}

/// Rules that determine how a file should be written
#[derive(Debug, Clone)]
pub struct FileRules {
    pub overwrite: Overwrite,
    pub header: Option<&'static str>,
}

impl FileRules {
    /// Generated content that is always replaced.
    pub fn always_overwrite() -> Self {
        Self::default()
    }

    /// Scaffolding the user is expected to edit.
    pub fn if_missing() -> Self {
        Self {
            overwrite: Overwrite::IfMissing,
            header: None,
        }
    }

    pub fn with_header(mut self, header: &'static str) -> Self {
        self.header = Some(header);
        self
    }
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Always overwrite (generated code)
    Always,
    /// Only create if file doesn't exist (stubs)
    IfMissing,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            overwrite: Overwrite::Always,
            header: None,
        }
    }
}
