//! Boilerplate files of a generated Rust project.

mod cargo_toml;
mod dockerfile;
mod error_rs;
mod gitignore;
mod layer_mod;
mod lib_rs;
mod main_rs;
mod makefile;
mod readme;

use kiln_codegen::Layer;

pub use cargo_toml::{CargoToml, GENERATED_DEPENDENCIES};
pub use dockerfile::Dockerfile;
pub use error_rs::ErrorRs;
pub use gitignore::GitIgnore;
pub use layer_mod::LayerMod;
pub use lib_rs::LibRs;
pub use main_rs::MainRs;
pub use makefile::Makefile;
pub use readme::Readme;

/// First line of every file kiln owns and rewrites.
pub const GENERATED_HEADER: &str = "// @generated by kiln. Manual edits are overwritten.";

/// Module doc title for a layer's `mod.rs`.
pub fn layer_title(layer: Layer) -> &'static str {
    match layer {
        Layer::Models => "Entity models",
        Layer::Repositories => "Storage interfaces and in-memory repositories",
        Layer::Services => "Validating services",
        Layer::Handlers => "JSON handlers",
    }
}
