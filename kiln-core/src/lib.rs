//! Core utilities and types for the kiln project generator.
//!
//! This crate provides the file-writing primitives, root-confined path
//! resolution and naming helpers shared by the rest of the workspace.

mod file;
mod paths;
mod utils;
mod version;

// File operations
pub use file::{File, FileRules, Overwrite, ProjectFile, WriteResult, write_file};
// Output-root confinement
pub use paths::{PathError, resolve_within};
// String utilities
pub use utils::{
    is_rust_keyword, to_kebab_case, to_pascal_case, to_snake_case, RUST_KEYWORDS,
};
pub use version::Version;
