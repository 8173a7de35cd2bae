use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile, Version};

const DEFAULT_EDITION: &str = "2024";

/// Crates the generated models, repositories and handlers use.
pub const GENERATED_DEPENDENCIES: &[(&str, &str)] = &[
    ("chrono", r#"{ version = "0.4", features = ["serde"] }"#),
    ("regex", "1"),
    ("rust_decimal", r#"{ version = "1", features = ["serde"] }"#),
    ("serde", r#"{ version = "1", features = ["derive"] }"#),
    ("serde_bytes", "0.11"),
    ("serde_json", "1"),
    ("thiserror", "2"),
    ("uuid", r#"{ version = "1", features = ["serde", "v4"] }"#),
    ("validator", r#"{ version = "0.20", features = ["derive"] }"#),
];

/// The Cargo.toml project manifest.
#[derive(Debug, Clone)]
pub struct CargoToml {
    pub name: String,
    pub version: Version,
    pub edition: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub dependencies: Vec<(String, String)>,
}

impl CargoToml {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Version::default(),
            edition: DEFAULT_EDITION.to_string(),
            description: None,
            authors: Vec::new(),
            dependencies: GENERATED_DEPENDENCIES
                .iter()
                .map(|(name, spec)| (name.to_string(), spec.to_string()))
                .collect(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Add or replace a dependency; `spec` is either a bare version or an
    /// inline table.
    pub fn with_dependency(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        let (name, spec) = (name.into(), spec.into());
        match self.dependencies.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = spec,
            None => self.dependencies.push((name, spec)),
        }
        self
    }
}

/// TOML basic string with escapes.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl ProjectFile for CargoToml {
    fn path(&self) -> PathBuf {
        PathBuf::from("Cargo.toml")
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite()
    }

    fn render(&self) -> String {
        let mut out = format!(
            "[package]\nname = {}\nversion = \"{}\"\nedition = \"{}\"\n",
            quoted(&self.name),
            self.version,
            self.edition
        );
        if let Some(description) = &self.description {
            out.push_str(&format!("description = {}\n", quoted(description)));
        }
        if !self.authors.is_empty() {
            let authors: Vec<_> = self.authors.iter().map(|a| quoted(a)).collect();
            out.push_str(&format!("authors = [{}]\n", authors.join(", ")));
        }

        out.push_str("\n[dependencies]\n");
        for (name, spec) in &self.dependencies {
            if spec.starts_with('{') {
                out.push_str(&format!("{name} = {spec}\n"));
            } else {
                out.push_str(&format!("{name} = \"{spec}\"\n"));
            }
        }
        out
    }
}
