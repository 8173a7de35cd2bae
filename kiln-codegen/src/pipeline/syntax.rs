use std::path::Path;

use super::ValidationIssue;

/// Parses generated files of one kind in isolation.
pub trait SyntaxChecker: Send + Sync {
    /// Whether this checker handles `path` (by extension or file name).
    fn recognizes(&self, path: &Path) -> bool;

    /// Parse `content`; `None` when it is well-formed.
    fn check(&self, path: &Path, content: &str) -> Option<ValidationIssue>;
}
