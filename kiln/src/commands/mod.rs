mod archetypes;
mod check;
mod completions;
mod generate;
mod types;

use archetypes::ArchetypesCommand;
use check::CheckCommand;
use clap::{ArgAction, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use kiln_codegen_rust::RequestError;
use types::TypesCommand;

/// Extension trait for exiting on specification errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kiln_spec::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for std::result::Result<T, RequestError> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(about = "Generate Rust entity projects from TOML specifications")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug); KILN_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Archetypes(cmd) => cmd.run(),
            Commands::Types(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a project from kiln.toml
    Generate(GenerateCommand),

    /// Validate kiln.toml and report mapping warnings without writing
    Check(CheckCommand),

    /// List the supported project archetypes
    Archetypes(ArchetypesCommand),

    /// Show how logical field types map to Rust types
    Types(TypesCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
