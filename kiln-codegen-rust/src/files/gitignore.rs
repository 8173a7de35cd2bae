use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};

/// The .gitignore file
pub struct GitIgnore {
    /// Where `mode = "build"` copies the binary, if inside the project
    pub binary_dir: Option<String>,
}

impl ProjectFile for GitIgnore {
    fn path(&self) -> PathBuf {
        PathBuf::from(".gitignore")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        match &self.binary_dir {
            Some(dir) => format!("/target\n/{dir}\n"),
            None => "/target\n".to_string(),
        }
    }
}
