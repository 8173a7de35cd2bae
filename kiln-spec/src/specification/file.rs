use std::path::{Path, PathBuf};

use super::Specification;
use crate::{Error, Result};

/// A kiln.toml on disk together with its parsed specification.
///
/// Keeping the raw text around lets callers render diagnostics against
/// the exact source that was parsed.
pub struct SpecFile {
    path: PathBuf,
    content: String,
    spec: Specification,
}

impl SpecFile {
    /// Open and parse a kiln.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let spec = Specification::from_str_with_filename(&content, &path.display().to_string())?;

        Ok(Self {
            path,
            content,
            spec,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    /// Directory containing the file; relative paths in the document resolve against it.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn into_spec(self) -> Specification {
        self.spec
    }
}
