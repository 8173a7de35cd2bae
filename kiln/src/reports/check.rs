//! Check command report data structures.

use std::path::PathBuf;

use kiln_codegen::Diagnostic;
use kiln_spec::Feature;

use super::{
    generate::render_warnings,
    output::{Output, Report},
};

/// Report data from specification validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the specification file.
    pub config_path: PathBuf,
    pub project: String,
    pub version: String,
    pub archetype: String,
    /// Features after prerequisite closure.
    pub features: Vec<Feature>,
    pub entities: Vec<String>,
    /// Number of code elements dispatch produced.
    pub element_count: usize,
    /// Mapping warnings.
    pub warnings: Vec<Diagnostic>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        render_warnings(out, &self.warnings);
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();

        out.preformatted(&format!(
            "  {} v{} ({})",
            self.project, self.version, self.archetype
        ));
        let features: Vec<&str> = self.features.iter().map(Feature::as_str).collect();
        out.key_value(
            "  Features",
            &if features.is_empty() {
                "none".to_string()
            } else {
                features.join(", ")
            },
        );
        out.newline();

        out.section(&format!(
            "  {} entit{}",
            self.entities.len(),
            if self.entities.len() == 1 { "y" } else { "ies" }
        ));
        for entity in &self.entities {
            out.list_item(entity);
        }
        out.newline();
        out.preformatted(&format!(
            "  {} element{} to render",
            self.element_count,
            if self.element_count == 1 { "" } else { "s" }
        ));
    }
}
