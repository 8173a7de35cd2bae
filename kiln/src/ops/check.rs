//! Check operation - specification validation without writing.

use std::path::Path;

use kiln_codegen_rust::{Generator, RequestError};
use kiln_spec::Specification;

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Resolves the archetype and dispatches every entity, so a clean check
/// means generation fails only on filesystem or toolchain problems.
pub fn check(spec: &Specification, config_path: &Path) -> Result<CheckReport, RequestError> {
    let generator = Generator::new(spec);
    let archetype = generator.archetype()?;
    generator.check_mode(spec.build.mode)?;
    let features = generator.features()?;
    let dispatched = generator.dispatch()?;

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        project: spec.project.name.clone(),
        version: spec.project.version.to_string(),
        archetype: archetype.name.to_string(),
        features,
        entities: spec.entities.iter().map(|e| e.name.clone()).collect(),
        element_count: dispatched.elements.len(),
        warnings: dispatched.warnings,
    })
}

#[cfg(test)]
mod tests {
    use kiln_codegen::SpecificationError;
    use kiln_spec::{
        Cardinality, CompileMode, EntitySpec, FieldSpec, ProjectConfig, RelationshipSpec,
    };

    use super::*;

    fn spec(archetype: &str) -> Specification {
        Specification::new(ProjectConfig::new("shop", archetype)).with_entity(
            EntitySpec::new("Order")
                .with_field(FieldSpec::new("id", "uuid").required())
                .with_field(FieldSpec::new("total", "decimal").with_rule("min:0")),
        )
    }

    #[test]
    fn test_check_reports_mapping_warnings() {
        let report = check(&spec("api"), Path::new("kiln.toml")).unwrap();

        assert_eq!(report.archetype, "api");
        assert_eq!(report.entities, vec!["Order"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].location.as_deref(), Some("Order.total"));
        assert!(report.element_count > 0);
    }

    #[test]
    fn test_check_rejects_unknown_archetype() {
        let err = check(&spec("desktop"), Path::new("kiln.toml")).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Specification(SpecificationError::UnknownArchetype { .. })
        ));
    }

    #[test]
    fn test_check_rejects_build_without_binary() {
        let mut spec = spec("api");
        spec.build.mode = CompileMode::Build;

        let err = check(&spec, Path::new("kiln.toml")).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Specification(SpecificationError::BuildWithoutBinary { .. })
        ));

        spec.project.archetype = "cli".into();
        assert!(check(&spec, Path::new("kiln.toml")).is_ok());
    }

    #[test]
    fn test_check_rejects_unresolved_relationship() {
        let mut spec = spec("library");
        spec.entities[0] = spec.entities[0].clone().with_relationship(RelationshipSpec::new(
            "lines",
            Cardinality::OneToMany,
            "OrderLine",
        ));

        let err = check(&spec, Path::new("kiln.toml")).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Specification(SpecificationError::UnresolvedRelationship { .. })
        ));
    }
}
