use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use kiln_core::{File, WriteResult, resolve_within};

use crate::{GeneratedFile, PipelineError, ProjectSkeleton};

/// Paths touched by one write pass, project-relative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Collapse files sharing a path: the last one wins, at the position of the first.
pub fn dedupe(files: &[GeneratedFile]) -> Vec<&GeneratedFile> {
    let mut by_path: IndexMap<&Path, &GeneratedFile> = IndexMap::new();
    for file in files {
        by_path.insert(file.path.as_path(), file);
    }
    by_path.into_values().collect()
}

/// Writes a project tree below one root and nowhere else.
#[derive(Debug, Clone)]
pub struct FilesystemWriter {
    root: PathBuf,
}

impl FilesystemWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and `dirs` below it. Existing directories are fine.
    pub fn create_directories(&self, dirs: &[PathBuf]) -> Result<(), PipelineError> {
        create_dir(&self.root)?;
        for dir in dirs {
            create_dir(&resolve_within(&self.root, dir)?)?;
        }
        Ok(())
    }

    /// Create the skeleton's directories and write its boilerplate files,
    /// honoring each file's overwrite rule.
    pub fn write_skeleton(&self, skeleton: &ProjectSkeleton) -> Result<WriteSummary, PipelineError> {
        self.create_directories(skeleton.directories())?;

        let mut summary = WriteSummary::default();
        for file in skeleton.files() {
            match file.write(&self.root)? {
                WriteResult::Written => summary.written.push(file.path().to_path_buf()),
                WriteResult::Skipped => summary.skipped.push(file.path().to_path_buf()),
            }
        }
        Ok(summary)
    }

    /// Write generated files, last write winning on a shared path.
    ///
    /// Returns the distinct paths in first-appearance order.
    pub fn merge(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, PipelineError> {
        let mut written = Vec::new();
        for file in dedupe(files) {
            File::new(&file.path, file.content.as_str()).write(&self.root)?;
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

fn create_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path).map_err(|source| PipelineError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use kiln_core::FileRules;
    use tempfile::TempDir;

    use super::*;
    use crate::{Archetype, FileKind};

    fn model(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile::new(path, "crate::models", content, FileKind::Model)
    }

    #[test]
    fn test_dedupe_last_wins_first_position() {
        let files = vec![
            model("src/models/order.rs", "A"),
            model("src/models/item.rs", "I"),
            model("src/models/order.rs", "B"),
        ];
        let deduped: Vec<(&Path, &str)> = dedupe(&files)
            .into_iter()
            .map(|f| (f.path.as_path(), f.content.as_str()))
            .collect();
        assert_eq!(
            deduped,
            vec![
                (Path::new("src/models/order.rs"), "B"),
                (Path::new("src/models/item.rs"), "I"),
            ]
        );
    }

    #[test]
    fn test_merge_last_write_wins_on_disk() {
        let temp = TempDir::new().unwrap();
        let writer = FilesystemWriter::new(temp.path());

        let paths = writer
            .merge(&[
                model("src/models/order.rs", "pub struct A;\n"),
                model("src/models/order.rs", "pub struct B;\n"),
            ])
            .unwrap();

        assert_eq!(paths, vec![PathBuf::from("src/models/order.rs")]);
        assert_eq!(
            fs::read_to_string(temp.path().join("src/models/order.rs")).unwrap(),
            "pub struct B;\n"
        );
    }

    #[test]
    fn test_skeleton_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("shop");
        let skeleton = ProjectSkeleton::new(&root, "shop", Archetype::lookup("api").unwrap());
        let writer = FilesystemWriter::new(&root);

        writer.write_skeleton(&skeleton).unwrap();
        let first = list_dirs(&root);
        writer.write_skeleton(&skeleton).unwrap();

        assert_eq!(first, list_dirs(&root));
        assert!(root.join("src/handlers").is_dir());
    }

    #[test]
    fn test_skeleton_respects_if_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "mine").unwrap();

        let mut skeleton =
            ProjectSkeleton::new(temp.path(), "shop", Archetype::lookup("library").unwrap());
        skeleton.add_file(&ReadmeStub);
        let summary = FilesystemWriter::new(temp.path())
            .write_skeleton(&skeleton)
            .unwrap();

        assert_eq!(summary.skipped, vec![PathBuf::from("README.md")]);
        assert!(summary.written.is_empty());
    }

    #[test]
    fn test_merge_refuses_paths_outside_root() {
        let temp = TempDir::new().unwrap();
        let err = FilesystemWriter::new(temp.path())
            .merge(&[model("../escape.rs", "")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Path(_)));
    }

    struct ReadmeStub;

    impl kiln_core::ProjectFile for ReadmeStub {
        fn path(&self) -> PathBuf {
            PathBuf::from("README.md")
        }

        fn rules(&self) -> FileRules {
            FileRules::if_missing()
        }

        fn render(&self) -> String {
            "# shop\n".into()
        }
    }

    fn list_dirs(root: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    dirs.push(path.strip_prefix(root).unwrap().to_path_buf());
                    stack.push(path);
                }
            }
        }
        dirs.sort();
        dirs
    }
}
