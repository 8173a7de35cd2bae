//! Output-root confinement.
//!
//! Every path the generator writes is expressed relative to the project
//! root. [`resolve_within`] turns such a path into an absolute one and
//! rejects anything that would land outside the root.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path '{path}' escapes the output root")]
    OutsideRoot { path: PathBuf },

    #[error("failed to write '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Join `relative` onto `root`, refusing absolute paths and `..` segments.
///
/// `.` segments are dropped, so `./src/./lib.rs` resolves to `root/src/lib.rs`.
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, PathError> {
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::OutsideRoot {
                    path: relative.to_path_buf(),
                });
            }
        }
    }

    if depth == 0 {
        return Err(PathError::OutsideRoot {
            path: relative.to_path_buf(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_nested_path() {
        let root = Path::new("/tmp/project");
        let resolved = resolve_within(root, Path::new("src/models/order.rs")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/project/src/models/order.rs"));
    }

    #[test]
    fn test_drops_current_dir_segments() {
        let root = Path::new("/tmp/project");
        let resolved = resolve_within(root, Path::new("./src/./lib.rs")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/project/src/lib.rs"));
    }

    #[test]
    fn test_rejects_parent_segments() {
        let root = Path::new("/tmp/project");
        assert!(resolve_within(root, Path::new("src/../../etc/passwd")).is_err());
    }

    #[test]
    fn test_rejects_absolute_paths() {
        let root = Path::new("/tmp/project");
        assert!(resolve_within(root, Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_rejects_empty_path() {
        let root = Path::new("/tmp/project");
        assert!(resolve_within(root, Path::new("")).is_err());
        assert!(resolve_within(root, Path::new(".")).is_err());
    }
}
