//! Specification to in-memory project.

use std::path::Path;

use kiln_codegen::{
    Archetype, CodeAccumulator, Diagnostic, Dispatched, Dispatcher, ProjectMeta, ProjectSkeleton,
    SpecificationError, TemplateError,
    template::{InMemoryTemplateStore, TemplateStore},
};
use kiln_spec::{CompileMode, Feature, Specification};

use crate::{
    RustRenderer, RustTypeMapper,
    skeleton::{project_layers, synthesize},
};

/// Everything a request renders before the first write.
#[derive(Debug)]
pub struct Generated {
    pub skeleton: ProjectSkeleton,
    pub accumulator: CodeAccumulator,
    pub warnings: Vec<Diagnostic>,
    /// Features after prerequisite closure
    pub features: Vec<Feature>,
}

/// Renders a specification into a skeleton plus generated files.
///
/// Every failure surfaces from [`Generator::render`] before anything touches
/// the filesystem, so a rejected specification writes zero files.
pub struct Generator<'a, S = InMemoryTemplateStore> {
    spec: &'a Specification,
    mapper: RustTypeMapper,
    renderer: RustRenderer<S>,
}

impl<'a> Generator<'a> {
    pub fn new(spec: &'a Specification) -> Self {
        Self::with_renderer(spec, RustRenderer::new())
    }

    /// Load `<slug>.toml` overrides on top of the built-in templates.
    pub fn load_templates(&self, dir: &Path) -> Result<Vec<String>, TemplateError> {
        let templates = self.renderer.templates();
        let slugs = templates.store().load_dir(dir)?;
        for slug in &slugs {
            if let Some(version) = templates.store().version(slug) {
                templates.cache().retire(slug, version);
            }
        }
        tracing::info!(dir = %dir.display(), templates = slugs.len(), "loaded template overrides");
        Ok(slugs)
    }
}

impl<'a, S: TemplateStore> Generator<'a, S> {
    pub fn with_renderer(spec: &'a Specification, renderer: RustRenderer<S>) -> Self {
        Self {
            spec,
            mapper: RustTypeMapper::new(),
            renderer,
        }
    }

    pub fn spec(&self) -> &Specification {
        self.spec
    }

    pub fn renderer(&self) -> &RustRenderer<S> {
        &self.renderer
    }

    pub fn archetype(&self) -> Result<&'static Archetype, SpecificationError> {
        Archetype::lookup(&self.spec.project.archetype)
    }

    /// Fail when `mode` asks for a binary the archetype does not have.
    pub fn check_mode(&self, mode: CompileMode) -> Result<(), SpecificationError> {
        let archetype = self.archetype()?;
        if mode == CompileMode::Build && !archetype.binary {
            return Err(SpecificationError::BuildWithoutBinary {
                archetype: archetype.name.to_string(),
            });
        }
        Ok(())
    }

    /// Requested features, or the archetype's defaults.
    pub fn features(&self) -> Result<Vec<Feature>, SpecificationError> {
        Ok(self.spec.features_or(self.archetype()?.default_features))
    }

    /// Check the specification and build its elements without rendering.
    pub fn dispatch(&self) -> Result<Dispatched, SpecificationError> {
        let features = self.features()?;
        Dispatcher::new(self.spec, &self.mapper, &features).dispatch()
    }

    /// Render the whole project for `root`.
    pub fn render(&self, root: &Path) -> Result<Generated, SpecificationError> {
        let archetype = self.archetype()?;
        let features = self.spec.features_or(archetype.default_features);
        let _span = tracing::info_span!(
            "generate",
            project = %self.spec.project.name,
            archetype = archetype.name
        )
        .entered();

        let dispatched = Dispatcher::new(self.spec, &self.mapper, &features).dispatch()?;
        tracing::info!(
            elements = dispatched.elements.len(),
            warnings = dispatched.warnings.len(),
            "dispatched"
        );

        let mut accumulator = CodeAccumulator::new();
        self.renderer
            .render_all(&dispatched.elements, &mut accumulator)?;
        accumulator.set_metadata("project", self.spec.project.name.clone());
        accumulator.set_metadata("archetype", archetype.name);
        accumulator.set_metadata(
            "features",
            features.iter().map(Feature::as_str).collect::<Vec<_>>(),
        );

        let meta = ProjectMeta::from_config(&self.spec.project);
        let layers = project_layers(archetype, &features);
        let skeleton = synthesize(root, &meta, archetype, &layers);

        Ok(Generated {
            skeleton,
            accumulator,
            warnings: dispatched.warnings,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use kiln_codegen::{FileKind, template::TemplateSource};
    use kiln_spec::{EntitySpec, FieldSpec, ProjectConfig};

    use super::*;

    fn spec(archetype: &str) -> Specification {
        Specification::new(ProjectConfig::new("shop", archetype)).with_entity(
            EntitySpec::new("Order")
                .with_field(FieldSpec::new("id", "uuid").required())
                .with_field(FieldSpec::new("note", "text")),
        )
    }

    #[test]
    fn test_unknown_archetype_renders_nothing() {
        let spec = spec("unknown-type");
        let err = Generator::new(&spec)
            .render(Path::new("/tmp/shop"))
            .unwrap_err();
        assert!(matches!(err, SpecificationError::UnknownArchetype { .. }));
    }

    #[test]
    fn test_library_defaults() {
        let spec = spec("library");
        let generated = Generator::new(&spec).render(Path::new("/tmp/shop")).unwrap();
        let paths: Vec<PathBuf> = generated.accumulator.paths().map(Path::to_path_buf).collect();

        assert_eq!(generated.features, vec![Feature::Repository]);
        assert_eq!(
            paths,
            [
                "src/models/order.rs",
                "src/models/order_new.rs",
                "src/repositories/order.rs",
                "src/repositories/order_memory.rs",
                "src/models/mod.rs",
                "src/repositories/mod.rs",
            ]
            .map(PathBuf::from)
        );
        assert_eq!(
            generated.accumulator.metadata()["archetype"],
            serde_json::json!("library")
        );
    }

    #[test]
    fn test_template_override_replaces_builtin() {
        let spec = spec("api");
        let generator = Generator::new(&spec);
        generator
            .renderer()
            .templates()
            .update(TemplateSource::new("service", "pub struct {{ name }};"));

        let generated = generator.render(Path::new("/tmp/shop")).unwrap();
        let service = generated
            .accumulator
            .files()
            .iter()
            .find(|f| f.kind == FileKind::Service)
            .unwrap();
        assert!(service.content.ends_with("pub struct OrderService;\n"));
    }

    #[test]
    fn test_load_templates_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("handler.toml"),
            "text = \"pub fn handle_{{ item }}() {}\"\n",
        )
        .unwrap();

        let spec = spec("api");
        let generator = Generator::new(&spec);
        assert_eq!(generator.load_templates(dir.path()).unwrap(), vec!["handler"]);

        let generated = generator.render(Path::new("/tmp/shop")).unwrap();
        let handler = generated
            .accumulator
            .files()
            .iter()
            .find(|f| f.kind == FileKind::Handler)
            .unwrap();
        assert!(handler.content.ends_with("pub fn handle_order() {}\n"));
    }
}
