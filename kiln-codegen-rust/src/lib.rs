//! Rust target for kiln.
//!
//! Maps logical field types to Rust types, renders code elements into
//! source files, lays out a Cargo project per archetype and drives `cargo`
//! over the result.

mod cargo;
mod generator;
mod naming;
mod renderer;
mod request;
mod rust_file;
mod skeleton;
mod syntax;
mod type_mapper;

pub mod ast;
pub mod files;
pub mod templates;

pub use cargo::{CargoToolchain, parse_diagnostics};
pub use generator::{Generated, Generator};
pub use naming::RUST_NAMING;
pub use renderer::{RustRenderer, module_indexes};
pub use request::{GenerateOptions, RequestError, run_request};
pub use rust_file::{RawCode, RustFile, Use};
pub use skeleton::{project_layers, synthesize};
pub use syntax::{RustSyntaxChecker, TomlSyntaxChecker};
pub use type_mapper::RustTypeMapper;
