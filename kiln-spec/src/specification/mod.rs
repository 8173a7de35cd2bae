mod file;
mod parse;
mod validate;

use kiln_core::to_pascal_case;
use serde::{Deserialize, Serialize};

pub use file::SpecFile;
pub use parse::parse_specification;
pub use validate::ParseContext;

use crate::{BuildConfig, EntitySpec, Feature, ProjectConfig};

/// Root document of `kiln.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Specification {
    pub project: ProjectConfig,

    #[serde(default)]
    pub build: BuildConfig,

    /// Entities in declaration order
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

/// A relationship whose target names no entity of the specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRelationship {
    pub entity: String,
    pub relationship: String,
    pub target: String,
}

impl Specification {
    pub fn new(project: ProjectConfig) -> Self {
        Self {
            project,
            build: BuildConfig::default(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntitySpec) -> Self {
        self.entities.push(entity);
        self
    }

    /// Find an entity by name. `order_item` and `OrderItem` name the same entity.
    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        let wanted = to_pascal_case(name);
        self.entities
            .iter()
            .find(|e| e.name == name || to_pascal_case(&e.name) == wanted)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entity(name).is_some()
    }

    /// Requested features closed over their prerequisites, or the given
    /// defaults when the document requests none.
    pub fn features_or(&self, defaults: &[Feature]) -> Vec<Feature> {
        Feature::normalize(self.project.features.as_deref().unwrap_or(defaults))
    }

    /// All relationships whose target does not resolve, in declaration order.
    pub fn unresolved_relationships(&self) -> Vec<UnresolvedRelationship> {
        self.entities
            .iter()
            .flat_map(|entity| {
                entity
                    .relationships
                    .iter()
                    .filter(|rel| !self.has_entity(&rel.target))
                    .map(|rel| UnresolvedRelationship {
                        entity: entity.name.clone(),
                        relationship: rel.name.clone(),
                        target: rel.target.clone(),
                    })
            })
            .collect()
    }
}
