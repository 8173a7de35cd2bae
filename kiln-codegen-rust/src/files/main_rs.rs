use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};

/// The binary entry point (user-editable).
pub struct MainRs {
    pub module: String,
}

impl ProjectFile for MainRs {
    fn path(&self) -> PathBuf {
        PathBuf::from("src/main.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        format!(
            r#"use {module}::Result;

fn main() -> Result<()> {{
    println!("{{}} {{}}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    Ok(())
}}
"#,
            module = self.module
        )
    }
}
