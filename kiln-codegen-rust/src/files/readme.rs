use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};
use kiln_codegen::ProjectMeta;

/// Project README, written once.
pub struct Readme {
    pub meta: ProjectMeta,
    pub archetype: &'static str,
    pub layers: Vec<&'static str>,
}

impl ProjectFile for Readme {
    fn path(&self) -> PathBuf {
        PathBuf::from("README.md")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        let mut out = format!(
            "# {}\n\n{}\n\nGenerated by kiln from the `{}` archetype.\n\n## Layout\n\n",
            self.meta.name, self.meta.description, self.archetype
        );
        for layer in &self.layers {
            out.push_str(&format!("- `src/{layer}/`\n"));
        }
        out.push_str("\n## Development\n\n```sh\nmake check\nmake test\n```\n");
        out
    }
}
