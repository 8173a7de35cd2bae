//! Archetype and type-mapping tables.

use kiln_codegen::{Archetype, mapping::TypeMapping};
use kiln_spec::Feature;

use super::output::{Output, Report, columns};

/// The static archetype table.
#[derive(Debug)]
pub struct ArchetypesReport {
    pub archetypes: &'static [Archetype],
}

impl Report for ArchetypesReport {
    fn render(&self, out: &mut dyn Output) {
        let mut rows = vec![
            ["NAME", "ALIASES", "BINARY", "FEATURES", "DESCRIPTION"]
                .map(String::from)
                .to_vec(),
        ];
        for archetype in self.archetypes {
            let features: Vec<&str> = archetype
                .default_features
                .iter()
                .map(Feature::as_str)
                .collect();
            rows.push(vec![
                archetype.name.to_string(),
                archetype.aliases.join(", "),
                if archetype.binary { "yes" } else { "no" }.to_string(),
                features.join(", "),
                archetype.description.to_string(),
            ]);
        }
        for line in columns(&rows) {
            out.preformatted(&line);
        }
    }
}

/// One target language's type-mapping table.
#[derive(Debug)]
pub struct TypesReport {
    pub language: &'static str,
    pub table: &'static [TypeMapping],
    pub opaque: &'static TypeMapping,
}

impl Report for TypesReport {
    fn render(&self, out: &mut dyn Output) {
        let mut rows = vec![
            ["TYPE", "ALIASES", "TARGET", "STORAGE", "KEY"]
                .map(String::from)
                .to_vec(),
        ];
        for mapping in self.table {
            rows.push(vec![
                mapping.name().to_string(),
                mapping.names.get(1..).unwrap_or_default().join(", "),
                mapping.target.to_string(),
                mapping.storage.to_string(),
                if mapping.key_capable { "yes" } else { "" }.to_string(),
            ]);
        }

        out.section(&format!("{} types", self.language));
        for line in columns(&rows) {
            out.preformatted(&line);
        }
        out.newline();
        out.key_value(
            "Unknown types map to",
            &format!("{} ({})", self.opaque.target, self.opaque.storage),
        );
    }
}
