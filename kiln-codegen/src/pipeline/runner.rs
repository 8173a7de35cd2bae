use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use indexmap::IndexMap;
use kiln_spec::CompileMode;
use serde::Serialize;

use super::{
    BuildResult, Diagnostic, FilesystemWriter, Invocation, SyntaxChecker, Toolchain,
    ValidationIssue, dedupe,
};
use crate::{CodeAccumulator, PipelineError, ProjectSkeleton};

/// Pipeline states, in the order a request passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SkeletonWritten,
    FilesMerged,
    SyntaxChecked,
    Compiled,
    Reported,
}

/// What a generation request produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub root: PathBuf,
    /// Distinct generated files written
    pub generated_file_count: usize,
    /// Every file in the final tree, skeleton first
    pub file_paths: Vec<PathBuf>,
    /// Boilerplate left untouched because it already existed
    pub skipped_paths: Vec<PathBuf>,
    pub validation_issues: Vec<ValidationIssue>,
    /// `None` when compilation was not requested
    pub build_result: Option<BuildResult>,
    pub warnings: Vec<Diagnostic>,
    pub stage: Stage,
}

impl GenerationReport {
    pub fn error_count(&self) -> usize {
        self.validation_issues
            .iter()
            .filter(|i| i.severity.is_error())
            .count()
    }

    /// No syntax errors and, if a build ran, it succeeded.
    pub fn success(&self) -> bool {
        self.error_count() == 0 && self.build_result.as_ref().is_none_or(BuildResult::success)
    }
}

/// Writes a project tree and validates it.
///
/// Runs `SkeletonWritten → FilesMerged → SyntaxChecked → Compiled →
/// Reported` once, never retrying. Syntax errors and failed builds end up
/// in the report; only I/O failures are errors.
pub struct BuildPipeline<'a> {
    toolchain: &'a dyn Toolchain,
    checkers: Vec<Box<dyn SyntaxChecker + 'a>>,
    mode: CompileMode,
    invocation: Invocation,
    binary_output: Option<PathBuf>,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self {
            toolchain,
            checkers: Vec::new(),
            mode: CompileMode::Check,
            invocation: Invocation::new(Duration::from_secs(300)),
            binary_output: None,
        }
    }

    pub fn with_checker(mut self, checker: impl SyntaxChecker + 'a) -> Self {
        self.checkers.push(Box::new(checker));
        self
    }

    pub fn with_mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = invocation;
        self
    }

    pub fn with_binary_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.binary_output = Some(output.into());
        self
    }

    pub fn run(
        &self,
        skeleton: &ProjectSkeleton,
        accumulator: CodeAccumulator,
        warnings: Vec<Diagnostic>,
    ) -> Result<GenerationReport, PipelineError> {
        let root = skeleton.root();
        let _span = tracing::info_span!("pipeline", root = %root.display()).entered();
        let writer = FilesystemWriter::new(root);

        let summary = writer.write_skeleton(skeleton)?;
        tracing::info!(
            stage = ?Stage::SkeletonWritten,
            written = summary.written.len(),
            skipped = summary.skipped.len()
        );

        let files = accumulator.into_files();
        let merged = writer.merge(&files)?;
        tracing::info!(stage = ?Stage::FilesMerged, files = merged.len());

        // Final tree contents: written boilerplate, replaced by generated
        // files on a shared path.
        let mut tree: IndexMap<&Path, &str> = IndexMap::new();
        for file in skeleton.files() {
            if summary.written.iter().any(|p| p == file.path()) {
                tree.insert(file.path(), file.content());
            }
        }
        for file in dedupe(&files) {
            tree.insert(file.path.as_path(), file.content.as_str());
        }

        let validation_issues =
            self.syntax_check(tree.iter().map(|(path, content)| (*path, *content)));
        tracing::info!(stage = ?Stage::SyntaxChecked, issues = validation_issues.len());

        let build_result = self.compile(root, skeleton.module());
        if let Some(result) = &build_result {
            tracing::info!(stage = ?Stage::Compiled, success = result.success());
        }

        let mut file_paths: Vec<PathBuf> = skeleton
            .files()
            .iter()
            .map(|f| f.path().to_path_buf())
            .collect();
        for path in &merged {
            if !file_paths.contains(path) {
                file_paths.push(path.clone());
            }
        }

        tracing::info!(stage = ?Stage::Reported);
        Ok(GenerationReport {
            root: root.to_path_buf(),
            generated_file_count: merged.len(),
            file_paths,
            skipped_paths: summary.skipped,
            validation_issues,
            build_result,
            warnings,
            stage: Stage::Reported,
        })
    }

    /// Parse each recognized file in isolation. A failure is recorded and
    /// the remaining files are still checked.
    pub fn syntax_check<'f>(
        &self,
        files: impl IntoIterator<Item = (&'f Path, &'f str)>,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (path, content) in files {
            let Some(checker) = self.checkers.iter().find(|c| c.recognizes(path)) else {
                continue;
            };
            if let Some(issue) = checker.check(path, content) {
                tracing::warn!(path = %path.display(), "{}", issue.message);
                issues.push(issue);
            }
        }
        issues
    }

    fn compile(&self, root: &Path, module: &str) -> Option<BuildResult> {
        if self.mode == CompileMode::None {
            return None;
        }
        if self.invocation.cancel.is_cancelled() {
            tracing::info!("cancelled before compiling");
            return Some(BuildResult::cancelled());
        }

        tracing::info!(toolchain = self.toolchain.name(), mode = %self.mode, "compiling");
        let result = match self.mode {
            CompileMode::Build => {
                let output = self
                    .binary_output
                    .clone()
                    .unwrap_or_else(|| Path::new("bin").join(module));
                self.toolchain.build(root, &output, &self.invocation)
            }
            _ => self.toolchain.check(root, &self.invocation),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        Archetype, FileKind, GeneratedFile,
        pipeline::{BuildStatus, CancellationToken},
        testing::{FakeToolchain, ToolchainCall},
    };

    /// Flags any `.rs` file containing `@@`.
    struct MarkerChecker;

    impl SyntaxChecker for MarkerChecker {
        fn recognizes(&self, path: &Path) -> bool {
            path.extension().is_some_and(|e| e == "rs")
        }

        fn check(&self, path: &Path, content: &str) -> Option<ValidationIssue> {
            content
                .contains("@@")
                .then(|| ValidationIssue::error(path, "unexpected token `@@`").at(1, 1))
        }
    }

    fn accumulator(files: &[(&str, &str)]) -> CodeAccumulator {
        let mut acc = CodeAccumulator::new();
        for (path, content) in files {
            acc.append(GeneratedFile::new(*path, "crate::models", *content, FileKind::Model));
        }
        acc
    }

    fn skeleton(root: &Path) -> ProjectSkeleton {
        ProjectSkeleton::new(root, "shop", Archetype::lookup("library").unwrap())
    }

    #[test]
    fn test_broken_file_recorded_siblings_still_compiled() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::succeeding();
        let pipeline = BuildPipeline::new(&toolchain).with_checker(MarkerChecker);

        let report = pipeline
            .run(
                &skeleton(temp.path()),
                accumulator(&[
                    ("src/models/order.rs", "pub struct Order;\n"),
                    ("src/models/broken.rs", "pub struct @@;\n"),
                    ("src/models/item.rs", "pub struct Item;\n"),
                ]),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(report.validation_issues.len(), 1);
        assert_eq!(
            report.validation_issues[0].file,
            PathBuf::from("src/models/broken.rs")
        );
        assert!(report.validation_issues[0].severity.is_error());
        assert_eq!(report.generated_file_count, 3);
        assert!(report.file_paths.contains(&PathBuf::from("src/models/item.rs")));
        assert!(temp.path().join("src/models/order.rs").exists());
        assert_eq!(toolchain.calls().len(), 1);
        assert_eq!(report.stage, Stage::Reported);
        assert!(!report.success());
    }

    #[test]
    fn test_failed_build_is_reported() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::failing(101, "error: could not compile `shop`");
        let report = BuildPipeline::new(&toolchain)
            .run(&skeleton(temp.path()), accumulator(&[]), Vec::new())
            .unwrap();

        let result = report.build_result.as_ref().unwrap();
        assert_eq!(result.status, BuildStatus::Failed { exit_code: Some(101) });
        assert!(result.stderr.contains("could not compile"));
        assert!(!report.success());
    }

    #[test]
    fn test_mode_none_skips_toolchain() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::succeeding();
        let report = BuildPipeline::new(&toolchain)
            .with_mode(CompileMode::None)
            .run(&skeleton(temp.path()), accumulator(&[("src/lib.rs", "")]), Vec::new())
            .unwrap();

        assert!(report.build_result.is_none());
        assert!(toolchain.calls().is_empty());
        assert!(report.success());
    }

    #[test]
    fn test_build_mode_passes_output() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::succeeding();
        BuildPipeline::new(&toolchain)
            .with_mode(CompileMode::Build)
            .run(&skeleton(temp.path()), accumulator(&[]), Vec::new())
            .unwrap();

        assert_eq!(
            toolchain.calls(),
            vec![ToolchainCall::Build {
                root: temp.path().to_path_buf(),
                output: PathBuf::from("bin/shop"),
            }]
        );
    }

    #[test]
    fn test_cancelled_before_compile() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::succeeding();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = BuildPipeline::new(&toolchain)
            .with_invocation(Invocation::new(Duration::from_secs(5)).with_cancellation(cancel))
            .run(
                &skeleton(temp.path()),
                accumulator(&[("src/models/order.rs", "pub struct Order;\n")]),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(report.build_result.unwrap().status, BuildStatus::Cancelled);
        assert!(toolchain.calls().is_empty());
        // files written before the Compiled stage stay on disk
        assert_eq!(
            fs::read_to_string(temp.path().join("src/models/order.rs")).unwrap(),
            "pub struct Order;\n"
        );
    }

    #[test]
    fn test_report_serializes() {
        let temp = TempDir::new().unwrap();
        let toolchain = FakeToolchain::succeeding();
        let report = BuildPipeline::new(&toolchain)
            .run(
                &skeleton(temp.path()),
                accumulator(&[("src/models/order.rs", "pub struct Order;\n")]),
                vec![Diagnostic::warning("mapping", "unknown type 'hologram'").at("Order.payload")],
            )
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["generated_file_count"], 1);
        assert_eq!(json["stage"], "reported");
        assert_eq!(json["build_result"]["status"], "succeeded");
        assert_eq!(json["warnings"][0]["location"], "Order.payload");
    }
}
