//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target.

mod catalog;
mod check;
mod generate;
mod output;

pub use catalog::{ArchetypesReport, TypesReport};
pub use check::CheckReport;
pub use generate::{GenerateReport, PreviewFile, PreviewReport};
#[cfg(test)]
pub use output::RecordingOutput;
pub use output::{Report, TerminalOutput};
