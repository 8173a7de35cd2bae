use super::{CodeFragment, Renderable};

/// Accumulates indented source text.
///
/// ```
/// use kiln_codegen::builder::{CodeBuilder, CodeFragment};
///
/// let mut builder = CodeBuilder::rust();
/// builder.push_fragment(&CodeFragment::block(
///     "impl Order {",
///     vec![CodeFragment::line("fn total(&self) {}")],
///     Some("}".into()),
/// ));
///
/// assert_eq!(builder.build(), "impl Order {\n    fn total(&self) {}\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    unit: &'static str,
    depth: usize,
    out: String,
}

impl CodeBuilder {
    /// Four-space indentation, as rustfmt emits.
    pub fn rust() -> Self {
        Self::with_unit("    ")
    }

    pub fn with_unit(unit: &'static str) -> Self {
        Self {
            unit,
            depth: 0,
            out: String::new(),
        }
    }

    pub fn push_line(&mut self, s: &str) -> &mut Self {
        if !s.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(self.unit);
            }
            self.out.push_str(s);
        }
        self.out.push('\n');
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn push_fragment(&mut self, fragment: &CodeFragment) -> &mut Self {
        match fragment {
            CodeFragment::Line(s) => {
                self.push_line(s);
            }
            CodeFragment::Blank => {
                self.push_blank();
            }
            CodeFragment::Doc(text) => {
                for line in text.lines() {
                    if line.is_empty() {
                        self.push_line("///");
                    } else {
                        self.push_line(&format!("/// {line}"));
                    }
                }
            }
            CodeFragment::Block {
                header,
                body,
                close,
            } => {
                self.push_line(header);
                self.depth += 1;
                for f in body {
                    self.push_fragment(f);
                }
                self.depth -= 1;
                if let Some(close) = close {
                    self.push_line(close);
                }
            }
        }
        self
    }

    pub fn emit(&mut self, node: &impl Renderable) -> &mut Self {
        for fragment in node.to_fragments() {
            self.push_fragment(&fragment);
        }
        self
    }

    pub fn build(self) -> String {
        self.out
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::rust()
    }
}
