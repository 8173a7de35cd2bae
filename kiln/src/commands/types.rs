use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct TypesCommand {}

impl TypesCommand {
    pub fn run(&self) -> Result<()> {
        ops::types().render(&mut TerminalOutput::new());
        Ok(())
    }
}
