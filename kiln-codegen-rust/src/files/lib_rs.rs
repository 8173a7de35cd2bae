use std::path::PathBuf;

use kiln_codegen::Layer;
use kiln_core::{FileRules, ProjectFile};

use super::GENERATED_HEADER;
use crate::{RawCode, RustFile};

/// The crate root declaring the error module and every layer.
pub struct LibRs {
    pub description: String,
    pub layers: Vec<Layer>,
}

impl ProjectFile for LibRs {
    fn path(&self) -> PathBuf {
        PathBuf::from("src/lib.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        let mut modules = vec!["pub mod error;".to_string()];
        modules.extend(self.layers.iter().map(|layer| format!("pub mod {};", layer.dir())));

        RustFile::new()
            .module_doc(&self.description)
            .add(RawCode::lines(modules))
            .add(RawCode::new("pub use error::{Error, Result};"))
            .render()
    }
}
