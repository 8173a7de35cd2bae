use std::{path::PathBuf, time::Duration};

use clap::{Args, ValueEnum};
use eyre::{Context, Result};
use kiln_codegen_rust::{CargoToolchain, GenerateOptions};
use kiln_spec::{CompileMode, SpecFile};

use super::UnwrapOrExit;
use crate::{
    ops::{self, generate::resolve_root},
    reports::{Report, TerminalOutput},
};

/// How far to take the generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Write and syntax-check only
    None,
    /// Run `cargo check`
    Check,
    /// Run `cargo build` and copy the binary
    Build,
}

impl From<ModeArg> for CompileMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::None => CompileMode::None,
            ModeArg::Check => CompileMode::Check,
            ModeArg::Build => CompileMode::Build,
        }
    }
}

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to kiln.toml (defaults to ./kiln.toml)
    #[arg(short, long, default_value = "kiln.toml")]
    pub config: PathBuf,

    /// Project root (overrides [project].output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compile mode (overrides [build].mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Toolchain timeout in seconds (overrides [build].timeout_secs)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory of `<slug>.toml` template overrides
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Print the generation report as JSON
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let spec_file = SpecFile::open(&self.config).unwrap_or_exit();
        let spec = spec_file.spec();
        let root = resolve_root(spec, spec_file.base_dir(), self.output.as_deref());

        if self.dry_run {
            let report = ops::preview(spec, &root, self.templates.as_deref()).unwrap_or_exit();
            report.render(&mut TerminalOutput::new());
            return Ok(());
        }

        let mut options = GenerateOptions::from_spec(spec, &root);
        options.root = root;
        options.templates = self.templates.clone();
        if let Some(mode) = self.mode {
            options.mode = mode.into();
        }
        if let Some(secs) = self.timeout {
            options.timeout = Duration::from_secs(secs);
        }

        let report = ops::generate(spec, &options, &CargoToolchain::new()).unwrap_or_exit();

        if self.json {
            let json = serde_json::to_string_pretty(&report.report)
                .wrap_err("Failed to serialize report")?;
            println!("{json}");
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if !report.success() {
            std::process::exit(1);
        }
        Ok(())
    }
}
