//! Line-oriented source building.
//!
//! AST nodes describe themselves as [`CodeFragment`] trees through
//! [`Renderable`]; [`CodeBuilder`] lays the trees out with indentation.

mod code_builder;
mod renderable;

pub use code_builder::CodeBuilder;
pub use renderable::{CodeFragment, Renderable};
