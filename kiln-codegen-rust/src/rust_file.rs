//! RustFile abstraction for structured Rust file generation.
//!
//! A file is an optional module doc, grouped imports and body elements
//! separated by blank lines.

use kiln_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

/// A Rust use statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    module: String,
    symbols: Vec<String>,
}

impl Use {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
        }
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    pub fn symbols(mut self, symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// `std`, external crates, then `crate`/`super`, as rustfmt groups them.
    fn group(&self) -> u8 {
        let root = self.module.split("::").next().unwrap_or_default();
        match root {
            "std" | "core" | "alloc" => 0,
            "crate" | "super" | "self" => 2,
            _ => 1,
        }
    }

    fn format(&self) -> String {
        match self.symbols.as_slice() {
            [] => format!("use {};", self.module),
            [single] => format!("use {}::{single};", self.module),
            many => format!("use {}::{{{}}};", self.module, many.join(", ")),
        }
    }
}

impl Renderable for Use {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::line(self.format())]
    }
}

/// A structured representation of a Rust file.
///
/// ```
/// use kiln_codegen_rust::{RawCode, RustFile, Use};
///
/// let code = RustFile::new()
///     .module_doc("Order model.")
///     .use_stmt(Use::new("serde").symbols(["Deserialize", "Serialize"]))
///     .add(RawCode::new("pub struct Order;"))
///     .render();
///
/// assert_eq!(
///     code,
///     "//! Order model.\n\nuse serde::{Deserialize, Serialize};\n\npub struct Order;\n"
/// );
/// ```
#[derive(Debug, Default)]
pub struct RustFile {
    module_doc: Option<String>,
    uses: Vec<Use>,
    body: Vec<Vec<CodeFragment>>,
}

impl RustFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module_doc(mut self, doc: impl Into<String>) -> Self {
        self.module_doc = Some(doc.into());
        self
    }

    /// Add a use statement; exact duplicates are ignored.
    pub fn use_stmt(mut self, use_stmt: Use) -> Self {
        if !self.uses.contains(&use_stmt) {
            self.uses.push(use_stmt);
        }
        self
    }

    pub fn use_stmts(self, uses: impl IntoIterator<Item = Use>) -> Self {
        uses.into_iter().fold(self, RustFile::use_stmt)
    }

    /// Add a body element (any Renderable).
    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Renderable>(mut self, node: R) -> Self {
        self.body.push(node.to_fragments());
        self
    }

    pub fn add_all<R: Renderable>(mut self, nodes: impl IntoIterator<Item = R>) -> Self {
        self.body.extend(nodes.into_iter().map(|node| node.to_fragments()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.module_doc.is_none() && self.uses.is_empty() && self.body.is_empty()
    }

    pub fn render(&self) -> String {
        let mut builder = CodeBuilder::rust();
        let mut sections = 0;

        if let Some(doc) = &self.module_doc {
            for line in doc.lines() {
                builder.push_line(format!("//! {line}").trim_end());
            }
            sections += 1;
        }

        let mut uses: Vec<&Use> = self.uses.iter().collect();
        uses.sort_by_key(|u| u.group());
        let mut previous_group = None;
        for use_stmt in uses {
            if sections > 0 && previous_group != Some(use_stmt.group()) {
                builder.push_blank();
            }
            previous_group = Some(use_stmt.group());
            builder.emit(use_stmt);
            sections += 1;
        }

        for fragments in &self.body {
            if sections > 0 {
                builder.push_blank();
            }
            for fragment in fragments {
                builder.push_fragment(fragment);
            }
            sections += 1;
        }

        builder.build()
    }

    /// Render with a header comment line (e.g. [`GENERATED_HEADER`](crate::files::GENERATED_HEADER)).
    pub fn render_with_header(&self, header: &str) -> String {
        let content = self.render();
        if content.is_empty() {
            format!("{header}\n")
        } else {
            format!("{header}\n\n{content}")
        }
    }
}

/// A raw code fragment, one line per source line.
#[derive(Debug, Clone)]
pub struct RawCode(String);

impl RawCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            lines
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

impl Renderable for RawCode {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.0
            .lines()
            .map(|line| {
                if line.is_empty() {
                    CodeFragment::blank()
                } else {
                    CodeFragment::line(line)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file() {
        let file = RustFile::new();
        assert!(file.is_empty());
        assert_eq!(file.render(), "");
    }

    #[test]
    fn test_use_grouping() {
        let code = RustFile::new()
            .use_stmt(Use::new("super").symbol("OrderItem"))
            .use_stmt(Use::new("serde").symbols(["Deserialize", "Serialize"]))
            .use_stmt(Use::new("std::sync").symbol("LazyLock"))
            .use_stmt(Use::new("validator").symbol("Validate"))
            .render();

        assert_eq!(
            code,
            "use std::sync::LazyLock;\n\n\
             use serde::{Deserialize, Serialize};\n\
             use validator::Validate;\n\n\
             use super::OrderItem;\n"
        );
    }

    #[test]
    fn test_duplicate_uses_collapse() {
        let code = RustFile::new()
            .use_stmts([Use::new("super::Order"), Use::new("super::Order")])
            .render();
        assert_eq!(code, "use super::Order;\n");
    }

    #[test]
    fn test_blank_lines_between_body() {
        let code = RustFile::new()
            .add(RawCode::new("struct Foo;"))
            .add(RawCode::new("struct Bar;"))
            .render();
        assert_eq!(code, "struct Foo;\n\nstruct Bar;\n");
    }

    #[test]
    fn test_raw_code_keeps_inner_blank_lines() {
        let code = RustFile::new()
            .add(RawCode::lines(["mod order;", "", "pub use order::*;"]))
            .render();
        assert_eq!(code, "mod order;\n\npub use order::*;\n");
    }

    #[test]
    fn test_render_with_header() {
        let code = RustFile::new()
            .add(RawCode::new("pub mod models;"))
            .render_with_header("// @generated");
        assert_eq!(code, "// @generated\n\npub mod models;\n");
    }
}
