//! Parse checks for generated Rust sources and manifests.

use std::path::Path;

use kiln_codegen::pipeline::{SyntaxChecker, ValidationIssue};

/// Parses `.rs` files with `syn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustSyntaxChecker;

impl SyntaxChecker for RustSyntaxChecker {
    fn recognizes(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "rs")
    }

    fn check(&self, path: &Path, content: &str) -> Option<ValidationIssue> {
        let err = syn::parse_file(content).err()?;
        let start = err.span().start();
        // proc-macro2 columns are 0-based
        Some(ValidationIssue::error(path, err.to_string()).at(start.line, start.column + 1))
    }
}

/// Parses `.toml` files as a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSyntaxChecker;

impl SyntaxChecker for TomlSyntaxChecker {
    fn recognizes(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "toml")
    }

    fn check(&self, path: &Path, content: &str) -> Option<ValidationIssue> {
        let err = toml::from_str::<toml::Table>(content).err()?;
        let rendered = err.to_string();
        let message = rendered
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("invalid TOML")
            .trim()
            .to_string();

        let issue = ValidationIssue::error(path, message);
        Some(match err.span() {
            Some(span) => {
                let (line, column) = line_column(content, span.start);
                issue.at(line, column)
            }
            None => issue,
        })
    }
}

/// 1-based line and column of a byte offset.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line, column)
}
