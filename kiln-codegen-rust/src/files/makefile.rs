use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};

/// Makefile wrapping the usual cargo invocations.
pub struct Makefile {
    pub binary: bool,
    pub container: Option<String>,
}

impl ProjectFile for Makefile {
    fn path(&self) -> PathBuf {
        PathBuf::from("Makefile")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        let mut targets = vec![
            ("build", "cargo build --release".to_string()),
            ("check", "cargo check --all-targets".to_string()),
            ("test", "cargo test".to_string()),
            ("fmt", "cargo fmt".to_string()),
            ("clean", "cargo clean".to_string()),
        ];
        if self.binary {
            targets.push(("run", "cargo run".to_string()));
        }
        if let Some(image) = &self.container {
            targets.push(("image", format!("docker build -t {image} .")));
        }

        let names: Vec<_> = targets.iter().map(|(name, _)| *name).collect();
        let mut out = format!(".PHONY: {}\n", names.join(" "));
        for (name, recipe) in targets {
            out.push_str(&format!("\n{name}:\n\t{recipe}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipes_use_tabs() {
        let makefile = Makefile {
            binary: true,
            container: Some("shop".into()),
        }
        .render();
        assert!(makefile.starts_with(".PHONY: build check test fmt clean run image\n"));
        assert!(makefile.contains("\nrun:\n\tcargo run\n"));
        assert!(makefile.contains("\nimage:\n\tdocker build -t shop .\n"));
    }
}
