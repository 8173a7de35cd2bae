//! Rust AST builders for generating structs, enums, functions, impls and
//! traits.
//!
//! Every builder is [`Renderable`](kiln_codegen::builder::Renderable) and can
//! be emitted into a [`CodeBuilder`](kiln_codegen::builder::CodeBuilder) or
//! added to a [`RustFile`](crate::RustFile).

mod enums;
mod fns;
mod impls;
mod structs;

use kiln_codegen::builder::CodeFragment;

pub use enums::{Enum, Variant};
pub use fns::{Fn, Param};
pub use impls::{Impl, Trait};
pub use structs::{Field, Struct};

fn attribute_lines(attrs: &[String]) -> impl Iterator<Item = CodeFragment> + '_ {
    attrs.iter().map(|attr| CodeFragment::line(format!("#[{attr}]")))
}
