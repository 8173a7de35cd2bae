//! Rust impl and trait block builders.

use kiln_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use super::Fn;

fn spaced(methods: &[Fn]) -> Vec<CodeFragment> {
    let mut fragments = Vec::new();
    for (i, method) in methods.iter().enumerate() {
        if i > 0 {
            fragments.push(CodeFragment::blank());
        }
        fragments.extend(method.to_fragments());
    }
    fragments
}

/// Builder for Rust impl blocks.
#[derive(Debug, Clone)]
pub struct Impl {
    type_name: String,
    trait_name: Option<String>,
    methods: Vec<Fn>,
}

impl Impl {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            trait_name: None,
            methods: Vec::new(),
        }
    }

    /// Create an impl block for a trait.
    pub fn for_trait(mut self, trait_name: impl Into<String>) -> Self {
        self.trait_name = Some(trait_name.into());
        self
    }

    pub fn method(mut self, method: Fn) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::rust();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Impl {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let header = match &self.trait_name {
            Some(trait_name) => format!("impl {trait_name} for {} {{", self.type_name),
            None => format!("impl {} {{", self.type_name),
        };
        vec![CodeFragment::block(header, spaced(&self.methods), Some("}".into()))]
    }
}

/// Builder for trait definitions. Methods are rendered as declarations.
#[derive(Debug, Clone)]
pub struct Trait {
    name: String,
    doc: Option<String>,
    methods: Vec<Fn>,
}

impl Trait {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            methods: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn method(mut self, method: Fn) -> Self {
        self.methods.push(method.declaration());
        self
    }

    pub fn build(&self) -> String {
        let mut builder = CodeBuilder::rust();
        builder.emit(self);
        builder.build()
    }
}

impl Renderable for Trait {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments: Vec<_> = self.doc.iter().map(CodeFragment::doc).collect();
        fragments.push(CodeFragment::block(
            format!("pub trait {} {{", self.name),
            spaced(&self.methods),
            Some("}".into()),
        ));
        fragments
    }
}
