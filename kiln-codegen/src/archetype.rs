//! Static archetype table.

use kiln_spec::Feature;
use serde::Serialize;

use crate::SpecificationError;

/// A named project layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archetype {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    /// Directories created relative to the project root
    pub directories: &'static [&'static str],
    /// Whether the project has a binary entry point
    pub binary: bool,
    /// Ships a container build file
    pub container: bool,
    /// Features generated when the specification requests none
    pub default_features: &'static [Feature],
}

const ALL_FEATURES: &[Feature] = &[Feature::Repository, Feature::Service, Feature::Handlers];
const SERVICE_FEATURES: &[Feature] = &[Feature::Repository, Feature::Service];

pub static ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "microservice",
        aliases: &["service", "micro-service"],
        description: "Long-running service exposing entity handlers",
        directories: &[
            "src",
            "src/models",
            "src/repositories",
            "src/services",
            "src/handlers",
            "tests",
        ],
        binary: true,
        container: true,
        default_features: ALL_FEATURES,
    },
    Archetype {
        name: "cli",
        aliases: &["command-line", "tool"],
        description: "Command-line tool working on local entity data",
        directories: &["src", "src/models", "src/repositories", "src/services"],
        binary: true,
        container: false,
        default_features: SERVICE_FEATURES,
    },
    Archetype {
        name: "library",
        aliases: &["lib", "crate"],
        description: "Reusable crate exporting entity models",
        directories: &["src", "src/models", "src/repositories", "tests"],
        binary: false,
        container: false,
        default_features: &[Feature::Repository],
    },
    Archetype {
        name: "api",
        aliases: &["rest", "rest-api"],
        description: "Library crate with JSON handlers for an API layer",
        directories: &[
            "src",
            "src/models",
            "src/repositories",
            "src/services",
            "src/handlers",
            "tests",
        ],
        binary: false,
        container: false,
        default_features: ALL_FEATURES,
    },
    Archetype {
        name: "web",
        aliases: &["webapp", "web-app"],
        description: "Web application with handlers and static assets",
        directories: &[
            "src",
            "src/models",
            "src/repositories",
            "src/services",
            "src/handlers",
            "static",
            "tests",
        ],
        binary: true,
        container: true,
        default_features: ALL_FEATURES,
    },
    Archetype {
        name: "worker",
        aliases: &["job", "background-worker"],
        description: "Background worker processing entities through services",
        directories: &["src", "src/models", "src/repositories", "src/services"],
        binary: true,
        container: true,
        default_features: SERVICE_FEATURES,
    },
];

impl Archetype {
    /// Look up an archetype by name or alias (case-insensitive, `_` and `-` interchangeable).
    pub fn lookup(name: &str) -> Result<&'static Archetype, SpecificationError> {
        let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
        ARCHETYPES
            .iter()
            .find(|a| a.name == wanted || a.aliases.contains(&wanted.as_str()))
            .ok_or_else(|| SpecificationError::UnknownArchetype {
                name: name.to_string(),
                known: ARCHETYPES
                    .iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Whether the layout includes `src/<dir>`.
    pub fn has_source_dir(&self, dir: &str) -> bool {
        self.directories
            .iter()
            .any(|d| d.strip_prefix("src/") == Some(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        assert_eq!(Archetype::lookup("Micro_Service").unwrap().name, "microservice");
        assert_eq!(Archetype::lookup("lib").unwrap().name, "library");
    }

    #[test]
    fn test_unknown_archetype() {
        let err = Archetype::lookup("unknown-type").unwrap_err();
        match err {
            SpecificationError::UnknownArchetype { name, known } => {
                assert_eq!(name, "unknown-type");
                assert!(known.contains("microservice"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_every_archetype_has_models() {
        for archetype in ARCHETYPES {
            assert!(archetype.has_source_dir("models"), "{}", archetype.name);
        }
    }
}
