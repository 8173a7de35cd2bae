//! Generate operation - specification to project on disk.

use std::path::{Path, PathBuf};

use kiln_codegen::pipeline::{Toolchain, dedupe};
use kiln_codegen_rust::{GenerateOptions, Generator, RequestError, run_request};
use kiln_spec::Specification;

use crate::reports::{GenerateReport, PreviewFile, PreviewReport};

/// Execute a full generation request and summarize it.
pub fn generate(
    spec: &Specification,
    options: &GenerateOptions,
    toolchain: &dyn Toolchain,
) -> Result<GenerateReport, RequestError> {
    let generator = Generator::new(spec);
    let archetype = generator.archetype()?;
    tracing::info!(
        root = %options.root.display(),
        mode = %options.mode,
        "generating project"
    );
    let report = run_request(spec, options, toolchain)?;

    Ok(GenerateReport {
        project: spec.project.name.clone(),
        version: spec.project.version.to_string(),
        archetype: archetype.name.to_string(),
        mode: options.mode,
        report,
    })
}

/// Render everything a request would write, without touching the filesystem.
///
/// Generated files replace skeleton files at the same path, as they do
/// when merged on disk.
pub fn preview(
    spec: &Specification,
    root: &Path,
    templates: Option<&Path>,
) -> Result<PreviewReport, RequestError> {
    let generator = Generator::new(spec);
    if let Some(dir) = templates {
        generator.load_templates(dir)?;
    }
    let generated = generator.render(root)?;

    let mut files: Vec<PreviewFile> = generated
        .skeleton
        .files()
        .iter()
        .map(|file| PreviewFile {
            path: file.path().to_path_buf(),
            content: file.content().to_string(),
        })
        .collect();
    for file in dedupe(generated.accumulator.files()) {
        match files.iter_mut().find(|p| p.path == file.path) {
            Some(existing) => existing.content = file.content.clone(),
            None => files.push(PreviewFile {
                path: file.path.clone(),
                content: file.content.clone(),
            }),
        }
    }

    Ok(PreviewReport {
        files,
        warnings: generated.warnings,
    })
}

/// Project root for a request: `--output`, else `[project].output`, else
/// a directory named after the module, next to the specification file.
pub fn resolve_root(spec: &Specification, base_dir: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(dir) => dir.to_path_buf(),
        None => {
            let relative = spec
                .project
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(spec.project.module_name()));
            base_dir.join(relative)
        }
    }
}
