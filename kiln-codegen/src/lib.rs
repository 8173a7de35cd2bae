//! Language-agnostic code generation for the kiln project generator.
//!
//! A specification is dispatched into [`CodeElement`]s, a target renders
//! them into a [`CodeAccumulator`], and the [`pipeline`] writes the result
//! over an archetype's [`ProjectSkeleton`] before checking and compiling it.
//!
//! # Module Organization
//!
//! - [`builder`] - Code generation building blocks (CodeBuilder, CodeFragment, etc.)
//! - [`mapping`] - Type mapping trait and validation rule grammar
//! - [`element`] - The closed set of generatable elements
//! - [`dispatch`] - Entity to element dispatch
//! - [`template`] - Template store, cache and renderer
//! - [`pipeline`] - Writer, syntax pass, toolchain and stage machine
//! - [`testing`] - Test doubles (feature-gated)

mod accumulator;
mod archetype;
pub mod builder;
pub mod ddl;
pub mod dispatch;
pub mod element;
mod error;
pub mod mapping;
mod naming;
pub mod pipeline;
mod skeleton;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use accumulator::{CodeAccumulator, FileKind, GeneratedFile};
pub use archetype::{ARCHETYPES, Archetype};
pub use dispatch::{Dispatched, Dispatcher, repository_key};
pub use element::{CodeElement, Layer};
pub use error::{PipelineError, SpecificationError, TemplateError};
pub use naming::{NamingConvention, pluralize};
pub use pipeline::{Diagnostic, Severity};
pub use skeleton::{ProjectMeta, ProjectSkeleton};
