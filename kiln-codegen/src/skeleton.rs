//! Archetype-derived project layout, independent of entity content.

use std::path::{Path, PathBuf};

use kiln_core::{File, ProjectFile, Version};
use kiln_spec::ProjectConfig;

use crate::Archetype;

/// Descriptive metadata boilerplate files are parameterized with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMeta {
    pub name: String,
    pub module: String,
    pub version: Version,
    pub description: String,
    pub authors: Vec<String>,
}

impl ProjectMeta {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            name: config.name.clone(),
            module: config.module_name(),
            version: config.version.clone(),
            description: config.description_or_default(),
            authors: config.authors.clone(),
        }
    }
}

/// Directories and boilerplate files for one project.
#[derive(Debug, Clone)]
pub struct ProjectSkeleton {
    root: PathBuf,
    module: String,
    archetype: &'static Archetype,
    directories: Vec<PathBuf>,
    files: Vec<File>,
}

impl ProjectSkeleton {
    /// Start a skeleton with the archetype's directory list and no files.
    pub fn new(root: impl Into<PathBuf>, module: impl Into<String>, archetype: &'static Archetype) -> Self {
        Self {
            root: root.into(),
            module: module.into(),
            archetype,
            directories: archetype.directories.iter().map(PathBuf::from).collect(),
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, file: &dyn ProjectFile) {
        self.files
            .push(File::new(file.path(), file.render()).with_rules(file.rules()));
    }

    pub fn with_file(mut self, file: &dyn ProjectFile) -> Self {
        self.add_file(file);
        self
    }

    pub fn add_directory(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.directories.contains(&dir) {
            self.directories.push(dir);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn archetype(&self) -> &'static Archetype {
        self.archetype
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }
}
