// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Entity specification documents (`kiln.toml`).
//!
//! A specification names a project, its archetype and requested features,
//! and the entities to generate code for. Parsing validates identifiers
//! and cross-entity references and reports problems as span-labelled
//! [`miette`] diagnostics.

mod constraint;
mod entity;
mod error;
mod project;
mod relationship;
mod specification;

pub use constraint::{ConstraintKind, ConstraintSpec, IndexKind, IndexSpec};
pub use entity::{EntitySpec, FieldReference, FieldSpec, Literal};
pub use error::{Error, Result, SourceContext};
pub use project::{BuildConfig, CompileMode, Feature, ProjectConfig};
pub use relationship::{Cardinality, CascadePolicy, KeySide, RelationshipSpec};
pub use specification::{
    ParseContext, SpecFile, Specification, UnresolvedRelationship, parse_specification,
};
