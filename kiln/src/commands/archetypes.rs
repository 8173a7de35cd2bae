use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ArchetypesCommand {}

impl ArchetypesCommand {
    pub fn run(&self) -> Result<()> {
        ops::archetypes().render(&mut TerminalOutput::new());
        Ok(())
    }
}
