//! Static tables: archetypes and type mappings.

use kiln_codegen::{ARCHETYPES, mapping::TypeMapper};
use kiln_codegen_rust::RustTypeMapper;

use crate::reports::{ArchetypesReport, TypesReport};

pub fn archetypes() -> ArchetypesReport {
    ArchetypesReport {
        archetypes: ARCHETYPES,
    }
}

pub fn types() -> TypesReport {
    let mapper = RustTypeMapper::new();
    TypesReport {
        language: mapper.language(),
        table: mapper.table(),
        opaque: mapper.opaque(),
    }
}
