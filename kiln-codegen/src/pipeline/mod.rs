//! Writing, checking and compiling a generated project.
//!
//! - [`FilesystemWriter`] - root-confined writes with last-write-wins merging
//! - [`SyntaxChecker`] - per-file parse pass
//! - [`Toolchain`] - host compiler behind a narrow trait
//! - [`BuildPipeline`] - the stage machine tying them together

mod build;
mod diagnostic;
mod issue;
mod runner;
mod syntax;
mod toolchain;
mod writer;

pub use build::{BuildResult, BuildStatus};
pub use diagnostic::{Diagnostic, Severity};
pub use issue::ValidationIssue;
pub use runner::{BuildPipeline, GenerationReport, Stage};
pub use syntax::SyntaxChecker;
pub use toolchain::{CancellationToken, Invocation, Toolchain};
pub use writer::{FilesystemWriter, WriteSummary, dedupe};
