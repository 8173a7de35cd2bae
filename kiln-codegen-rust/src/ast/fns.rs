//! Rust function builder.

use kiln_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use super::attribute_lines;

/// A parameter in a Rust function. An empty type marks a receiver such as
/// `&self`.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    pub fn receiver(receiver: impl Into<String>) -> Self {
        Self::new(receiver, "")
    }

    fn format(&self) -> String {
        if self.ty.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.ty)
        }
    }
}

/// Builder for Rust functions.
#[derive(Debug, Clone)]
pub struct Fn {
    name: String,
    doc: Option<String>,
    attrs: Vec<String>,
    is_public: bool,
    params: Vec<Param>,
    return_type: Option<String>,
    body: Vec<String>,
    /// Render as a declaration ending in `;`
    declaration: bool,
}

impl Fn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            attrs: Vec::new(),
            is_public: true,
            params: Vec::new(),
            return_type: None,
            body: Vec::new(),
            declaration: false,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Signature only, as inside a trait definition.
    pub fn declaration(mut self) -> Self {
        self.declaration = true;
        self.is_public = false;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// Add raw body content (can contain multiple lines).
    pub fn body(mut self, content: impl Into<String>) -> Self {
        self.body.extend(content.into().lines().map(str::to_string));
        self
    }

    fn signature(&self) -> String {
        let vis = if self.is_public { "pub " } else { "" };
        let params = self
            .params
            .iter()
            .map(Param::format)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.return_type {
            Some(ret) => format!("{vis}fn {}({params}) -> {ret}", self.name),
            None => format!("{vis}fn {}({params})", self.name),
        }
    }

    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::rust();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Fn {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments: Vec<_> = self.doc.iter().map(CodeFragment::doc).collect();
        fragments.extend(attribute_lines(&self.attrs));

        if self.declaration {
            fragments.push(CodeFragment::line(format!("{};", self.signature())));
        } else {
            fragments.push(CodeFragment::block(
                format!("{} {{", self.signature()),
                self.body.iter().map(CodeFragment::line).collect(),
                Some("}".into()),
            ));
        }
        fragments
    }
}
