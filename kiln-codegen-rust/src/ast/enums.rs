//! Rust enum builder.

use kiln_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use super::attribute_lines;

/// A unit variant of a Rust enum.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub doc: Option<String>,
    pub attrs: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            attrs: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add an attribute to the variant, e.g. `serde(rename = "in_stock")`.
    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }
}

/// Builder for Rust enums.
#[derive(Debug, Clone)]
pub struct Enum {
    name: String,
    doc: Option<String>,
    derives: Vec<String>,
    attrs: Vec<String>,
    variants: Vec<Variant>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            derives: Vec::new(),
            attrs: Vec::new(),
            variants: Vec::new(),
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

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::rust();
        builder.emit(self);
        builder.build()
    }

    fn variant_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = Vec::new();
        for variant in &self.variants {
            fragments.extend(variant.doc.iter().map(CodeFragment::doc));
            fragments.extend(attribute_lines(&variant.attrs));
            fragments.push(CodeFragment::line(format!("{},", variant.name)));
        }
        fragments
    }
}

impl Renderable for Enum {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments: Vec<_> = self.doc.iter().map(CodeFragment::doc).collect();
        if !self.derives.is_empty() {
            fragments.push(CodeFragment::line(format!(
                "#[derive({})]",
                self.derives.join(", ")
            )));
        }
        fragments.extend(attribute_lines(&self.attrs));
        fragments.push(CodeFragment::block(
            format!("pub enum {} {{", self.name),
            self.variant_fragments(),
            Some("}".into()),
        ));
        fragments
    }
}
