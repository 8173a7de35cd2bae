use std::path::PathBuf;

use kiln_codegen::Layer;
use kiln_core::{FileRules, ProjectFile};

use super::GENERATED_HEADER;

/// Empty `mod.rs` for a layer. Replaced by the layer's module index when
/// any element is generated into it.
pub struct LayerMod {
    pub layer: Layer,
}

impl ProjectFile for LayerMod {
    fn path(&self) -> PathBuf {
        PathBuf::from("src").join(self.layer.dir()).join("mod.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        format!("//! {} (none generated).\n", super::layer_title(self.layer))
    }
}
