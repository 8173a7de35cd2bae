use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use kiln_core::{Version, to_snake_case};
use serde::{Deserialize, Serialize};

/// `[project]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Display name of the project
    pub name: String,

    /// Crate identifier, defaults to the snake_case project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default)]
    pub version: Version,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Archetype name or alias (resolved during generation)
    pub archetype: String,

    /// Requested features; the archetype's defaults apply when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,

    /// Output directory; the CLI `--output` flag takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>, archetype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            version: Version::default(),
            description: None,
            archetype: archetype.into(),
            features: None,
            output: None,
            authors: Vec::new(),
        }
    }

    /// The crate identifier used for the generated project.
    pub fn module_name(&self) -> String {
        match &self.module {
            Some(module) => module.clone(),
            None => to_snake_case(&self.name),
        }
    }

    /// Description text, falling back to a generic sentence.
    pub fn description_or_default(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("{} generated by kiln", self.name))
    }
}

/// A layer of code generated per entity on top of the model struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Repository,
    Service,
    #[serde(alias = "handler")]
    Handlers,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Repository, Feature::Service, Feature::Handlers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Repository => "repository",
            Feature::Service => "service",
            Feature::Handlers => "handlers",
        }
    }

    /// Close a feature list over its prerequisites.
    ///
    /// Handlers call into a service and services wrap a repository, so
    /// `[handlers]` normalizes to `[repository, service, handlers]`. The
    /// result is always in [`Feature::ALL`] order without duplicates.
    pub fn normalize(features: &[Feature]) -> Vec<Feature> {
        let handlers = features.contains(&Feature::Handlers);
        let service = handlers || features.contains(&Feature::Service);
        let repository = service || features.contains(&Feature::Repository);

        Feature::ALL
            .into_iter()
            .filter(|feature| match feature {
                Feature::Repository => repository,
                Feature::Service => service,
                Feature::Handlers => handlers,
            })
            .collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[build]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default)]
    pub mode: CompileMode,

    /// Upper bound on a single toolchain invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Where `mode = "build"` places the produced binary, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_output: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mode: CompileMode::default(),
            timeout_secs: default_timeout_secs(),
            binary_output: None,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How far the pipeline takes the generated project after writing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Write and syntax-check only
    None,
    /// Run the toolchain's check operation
    #[default]
    Check,
    /// Build and copy the binary to `binary_output`
    Build,
}

impl CompileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompileMode::None => "none",
            CompileMode::Check => "check",
            CompileMode::Build => "build",
        }
    }
}

impl fmt::Display for CompileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CompileMode::None),
            "check" => Ok(CompileMode::Check),
            "build" => Ok(CompileMode::Build),
            other => Err(format!(
                "unknown compile mode '{other}', expected one of: none, check, build"
            )),
        }
    }
}
