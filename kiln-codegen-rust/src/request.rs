//! A full generation request: render, write, check, compile, report.

use std::{path::PathBuf, time::Duration};

use kiln_codegen::{
    PipelineError, SpecificationError,
    pipeline::{BuildPipeline, CancellationToken, GenerationReport, Invocation, Toolchain},
};
use kiln_spec::{CompileMode, Specification};
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    Generator,
    syntax::{RustSyntaxChecker, TomlSyntaxChecker},
};

#[derive(Debug, Error, Diagnostic)]
pub enum RequestError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Specification(#[from] SpecificationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<kiln_codegen::TemplateError> for RequestError {
    fn from(err: kiln_codegen::TemplateError) -> Self {
        RequestError::Specification(err.into())
    }
}

/// Per-request settings. Command-line flags override the `[build]` section.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Project root everything is written under
    pub root: PathBuf,
    pub mode: CompileMode,
    pub timeout: Duration,
    /// Binary destination for [`CompileMode::Build`], relative to `root`
    pub binary_output: Option<PathBuf>,
    /// Directory of template overrides
    pub templates: Option<PathBuf>,
    pub cancel: CancellationToken,
}

impl GenerateOptions {
    /// Options from the specification, rooted at `[project].output` or `default_root`.
    pub fn from_spec(spec: &Specification, default_root: impl Into<PathBuf>) -> Self {
        Self {
            root: spec
                .project
                .output
                .clone()
                .unwrap_or_else(|| default_root.into()),
            mode: spec.build.mode,
            timeout: spec.build.timeout(),
            binary_output: spec.build.binary_output.clone(),
            templates: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Run one request to completion.
///
/// Specification problems fail before the first write. Syntax issues and
/// toolchain failures are reported, not returned as errors.
pub fn run_request(
    spec: &Specification,
    options: &GenerateOptions,
    toolchain: &dyn Toolchain,
) -> Result<GenerationReport, RequestError> {
    let generator = Generator::new(spec);
    generator.check_mode(options.mode)?;
    if let Some(dir) = &options.templates {
        generator.load_templates(dir)?;
    }
    let generated = generator.render(&options.root)?;

    let invocation = Invocation::new(options.timeout).with_cancellation(options.cancel.clone());
    let mut pipeline = BuildPipeline::new(toolchain)
        .with_checker(RustSyntaxChecker)
        .with_checker(TomlSyntaxChecker)
        .with_mode(options.mode)
        .with_invocation(invocation);
    if let Some(output) = &options.binary_output {
        pipeline = pipeline.with_binary_output(output);
    }

    let report = pipeline.run(
        &generated.skeleton,
        generated.accumulator,
        generated.warnings,
    )?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use kiln_spec::ProjectConfig;

    use super::*;

    #[test]
    fn test_options_from_spec() {
        let mut project = ProjectConfig::new("shop", "cli");
        project.output = Some(PathBuf::from("out/shop"));
        let mut spec = Specification::new(project);
        spec.build.mode = CompileMode::Build;
        spec.build.timeout_secs = 30;

        let options = GenerateOptions::from_spec(&spec, "shop");
        assert_eq!(options.root, PathBuf::from("out/shop"));
        assert_eq!(options.mode, CompileMode::Build);
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.templates.is_none());
    }

    #[test]
    fn test_options_default_root() {
        let spec = Specification::new(ProjectConfig::new("shop", "cli"));
        assert_eq!(GenerateOptions::from_spec(&spec, "shop").root, PathBuf::from("shop"));
    }
}
