//! Rust struct builder.

use kiln_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use super::attribute_lines;

/// A named member of a struct.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub doc: Option<String>,
    pub attrs: Vec<String>,
    pub is_public: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            doc: None,
            attrs: Vec::new(),
            is_public: true,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add an attribute without the surrounding `#[...]`.
    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    /// Add `#[name(args)]` unless `args` is empty.
    pub fn attr_list(self, name: &str, args: &[String]) -> Self {
        if args.is_empty() {
            self
        } else {
            self.attr(format!("{name}({})", args.join(", ")))
        }
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    fn to_fragments(&self) -> Vec<CodeFragment> {
        let vis = if self.is_public { "pub " } else { "" };
        let mut fragments: Vec<_> = self.doc.iter().map(CodeFragment::doc).collect();
        fragments.extend(attribute_lines(&self.attrs));
        fragments.push(CodeFragment::line(format!("{vis}{}: {},", self.name, self.ty)));
        fragments
    }
}

/// Builder for Rust structs.
#[derive(Debug, Clone)]
pub struct Struct {
    name: String,
    doc: Option<String>,
    derives: Vec<String>,
    attrs: Vec<String>,
    fields: Vec<Field>,
    is_public: bool,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            derives: Vec::new(),
            attrs: Vec::new(),
            fields: Vec::new(),
            is_public: true,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn derive(mut self, derive: impl Into<String>) -> Self {
        self.derives.push(derive.into());
        self
    }

    pub fn derives(mut self, derives: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.derives.extend(derives.into_iter().map(Into::into));
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::rust();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Struct {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let vis = if self.is_public { "pub " } else { "" };
        let mut fragments: Vec<_> = self.doc.iter().map(CodeFragment::doc).collect();

        if !self.derives.is_empty() {
            fragments.push(CodeFragment::line(format!(
                "#[derive({})]",
                self.derives.join(", ")
            )));
        }
        fragments.extend(attribute_lines(&self.attrs));

        if self.fields.is_empty() {
            fragments.push(CodeFragment::line(format!("{vis}struct {} {{}}", self.name)));
        } else {
            fragments.push(CodeFragment::block(
                format!("{vis}struct {} {{", self.name),
                self.fields.iter().flat_map(Field::to_fragments).collect(),
                Some("}".into()),
            ));
        }
        fragments
    }
}
