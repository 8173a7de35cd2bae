//! The closed set of generatable code elements.
//!
//! Dispatch builds elements from entity specifications; a target's
//! renderer matches on [`CodeElement`] and turns each variant into one
//! generated file. Elements are plain data and never change after
//! construction.

use serde::Serialize;

use crate::template::Parameters;

/// Source directory an element is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Models,
    Repositories,
    Services,
    Handlers,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Models,
        Layer::Repositories,
        Layer::Services,
        Layer::Handlers,
    ];

    pub fn dir(&self) -> &'static str {
        match self {
            Layer::Models => "models",
            Layer::Repositories => "repositories",
            Layer::Services => "services",
            Layer::Handlers => "handlers",
        }
    }
}

/// A struct member, either a column or a relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    /// Name as written in the specification (the wire name)
    pub name: String,
    /// Member identifier, escaped if reserved
    pub ident: String,
    /// Full member type, including any optional wrapper
    pub ty: String,
    pub optional: bool,
    /// Serialization annotation arguments
    pub serde: Vec<String>,
    /// Validation annotation arguments
    pub validate: Vec<String>,
    pub doc: Option<String>,
    /// Target type when the member is a relationship
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDecl {
    pub ident: String,
    /// Serialized value
    pub value: String,
}

/// An enumerated field's value type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub doc: Option<String>,
    pub variants: Vec<VariantDecl>,
    /// Variant marked as the default
    pub default_variant: Option<String>,
}

/// A compiled-once regular expression referenced by a validation annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternDecl {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub module: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub enums: Vec<EnumDecl>,
    pub patterns: Vec<PatternDecl>,
    /// Sibling model types referenced by relationship members
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: String,
}

/// Member initializer in a constructor body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub ident: String,
    pub expr: String,
}

/// Constructor taking the required fields of a struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    /// Type the function is associated with
    pub owner: String,
    pub module: String,
    pub doc: Option<String>,
    pub params: Vec<ParamDecl>,
    pub inits: Vec<FieldInit>,
    /// Sibling model types the signature mentions
    pub imports: Vec<String>,
}

/// Operations every repository interface declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryOp {
    Insert,
    Get,
    List,
    Update,
    Delete,
}

impl RepositoryOp {
    pub const ALL: [RepositoryOp; 5] = [
        RepositoryOp::Insert,
        RepositoryOp::Get,
        RepositoryOp::List,
        RepositoryOp::Update,
        RepositoryOp::Delete,
    ];
}

/// Storage interface for an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub entity: String,
    pub module: String,
    pub key_ty: String,
    pub operations: Vec<RepositoryOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueMember {
    pub ident: String,
    pub optional: bool,
}

/// In-memory implementation of an entity's storage interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryDecl {
    pub name: String,
    pub entity: String,
    pub interface: String,
    pub module: String,
    pub key_ty: String,
    /// Key member; `None` means rows are addressed by position
    pub key_field: Option<String>,
    /// Unique members other than the key
    pub unique_fields: Vec<UniqueMember>,
    pub table: String,
    pub ddl_const: String,
    pub ddl: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDecl {
    pub name: String,
    pub entity: String,
    pub interface: String,
    pub module: String,
    pub key_ty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerDecl {
    pub entity: String,
    /// Function-name suffix for single-item handlers
    pub item: String,
    /// Function-name suffix for the listing handler
    pub collection: String,
    pub service: String,
    pub interface: String,
    pub module: String,
    pub key_ty: String,
}

/// A generatable code element.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeElement {
    Struct(StructDecl),
    Function(FunctionDecl),
    Interface(InterfaceDecl),
    Repository(RepositoryDecl),
    Service(ServiceDecl),
    Handler(HandlerDecl),
}

impl CodeElement {
    pub fn layer(&self) -> Layer {
        match self {
            CodeElement::Struct(_) | CodeElement::Function(_) => Layer::Models,
            CodeElement::Interface(_) | CodeElement::Repository(_) => Layer::Repositories,
            CodeElement::Service(_) => Layer::Services,
            CodeElement::Handler(_) => Layer::Handlers,
        }
    }

    /// Module (file stem) within the layer directory.
    pub fn module(&self) -> &str {
        match self {
            CodeElement::Struct(d) => &d.module,
            CodeElement::Function(d) => &d.module,
            CodeElement::Interface(d) => &d.module,
            CodeElement::Repository(d) => &d.module,
            CodeElement::Service(d) => &d.module,
            CodeElement::Handler(d) => &d.module,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CodeElement::Struct(_) => "struct",
            CodeElement::Function(_) => "function",
            CodeElement::Interface(_) => "interface",
            CodeElement::Repository(_) => "repository",
            CodeElement::Service(_) => "service",
            CodeElement::Handler(_) => "handler",
        }
    }

    /// Template slug and parameters for elements rendered through templates.
    pub fn template(&self) -> Option<(&'static str, Parameters)> {
        let (slug, value) = match self {
            CodeElement::Repository(d) => ("repository", serde_json::to_value(d)),
            CodeElement::Service(d) => ("service", serde_json::to_value(d)),
            CodeElement::Handler(d) => ("handler", serde_json::to_value(d)),
            CodeElement::Struct(_) | CodeElement::Function(_) | CodeElement::Interface(_) => {
                return None;
            }
        };
        match value {
            Ok(serde_json::Value::Object(map)) => Some((slug, map)),
            _ => Some((slug, Parameters::new())),
        }
    }
}
