//! Generate command report data structures.

use std::path::PathBuf;

use kiln_codegen::{
    Diagnostic,
    pipeline::{BuildResult, BuildStatus, GenerationReport},
};
use kiln_spec::CompileMode;

use super::output::{Output, Report};

/// Report data from a generation request.
#[derive(Debug)]
pub struct GenerateReport {
    /// Project name from the specification.
    pub project: String,
    /// Project version from the specification.
    pub version: String,
    /// Resolved archetype name.
    pub archetype: String,
    /// Requested compile mode.
    pub mode: CompileMode,
    /// What the pipeline produced.
    pub report: GenerationReport,
}

impl GenerateReport {
    pub fn success(&self) -> bool {
        self.report.success()
    }

    fn error_count(&self) -> usize {
        let build_errors = self.report.build_result.as_ref().map_or(0, |build| {
            if build.success() {
                0
            } else {
                build.issues.iter().filter(|i| i.severity.is_error()).count().max(1)
            }
        });
        self.report.error_count() + build_errors
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        render_warnings(out, &self.report.warnings);

        out.preformatted(&format!("{} v{}", self.project, self.version));
        out.key_value("Archetype", &self.archetype);
        out.key_value("Output", &self.report.root.display().to_string());
        out.newline();

        out.section(&format!("Files ({})", self.report.file_paths.len()));
        for path in &self.report.file_paths {
            if self.report.skipped_paths.contains(path) {
                out.list_item(&format!("{} (kept)", path.display()));
            } else {
                out.added_item(&path.display().to_string());
            }
        }

        if !self.report.validation_issues.is_empty() {
            out.newline();
            out.section("Syntax issues");
            for issue in &self.report.validation_issues {
                out.error(&issue.to_string());
            }
        }

        out.newline();
        match &self.report.build_result {
            Some(build) => render_build(out, self.mode, build),
            None => out.key_value("Compile", "skipped"),
        }

        out.newline();
        if self.success() {
            out.preformatted(&format!(
                "✓ {} generated files written",
                self.report.generated_file_count
            ));
        } else {
            out.preformatted(&format!(
                "✗ generation finished with {} error(s)",
                self.error_count()
            ));
        }
    }
}

fn render_build(out: &mut dyn Output, mode: CompileMode, build: &BuildResult) {
    let status = match &build.status {
        BuildStatus::Succeeded => format!("succeeded in {:.1}s", build.duration.as_secs_f64()),
        BuildStatus::Failed {
            exit_code: Some(code),
        } => format!("failed (exit code {code})"),
        BuildStatus::Failed { exit_code: None } => "failed to start".to_string(),
        BuildStatus::TimedOut => format!("timed out after {:.1}s", build.duration.as_secs_f64()),
        BuildStatus::Cancelled => "cancelled".to_string(),
    };
    out.key_value(&format!("Compile ({mode})"), &status);

    for issue in &build.issues {
        if issue.severity.is_error() {
            out.error(&issue.to_string());
        } else {
            out.warning(&issue.to_string());
        }
    }
    if build.issues.is_empty()
        && !build.success()
        && let Some(line) = build.stderr.lines().rev().find(|l| !l.trim().is_empty())
    {
        out.error(line.trim());
    }

    if let Some(artifact) = &build.artifact {
        out.key_value("Binary", &artifact.display().to_string());
    }
}

pub(crate) fn render_warnings(out: &mut dyn Output, warnings: &[Diagnostic]) {
    for warning in warnings {
        match &warning.location {
            Some(loc) => out.warning(&format!("{} ({})", warning.message, loc)),
            None => out.warning(&warning.message),
        }
    }
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewReport {
    /// Files that would be written, in write order.
    pub files: Vec<PreviewFile>,
    pub warnings: Vec<Diagnostic>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub content: String,
}

impl Report for PreviewReport {
    fn render(&self, out: &mut dyn Output) {
        render_warnings(out, &self.warnings);

        for file in &self.files {
            out.divider(&file.path.display().to_string());
            out.preformatted(file.content.trim_end());
        }

        out.divider("Summary");
        out.preformatted(&format!("{} files would be generated", self.files.len()));
    }
}
