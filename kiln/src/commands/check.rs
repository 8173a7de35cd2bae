use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use kiln_spec::SpecFile;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to kiln.toml (defaults to ./kiln.toml)
    #[arg(short, long, default_value = "kiln.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let spec_file = SpecFile::open(&self.config).unwrap_or_exit();
        let report = ops::check(spec_file.spec(), &self.config).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
