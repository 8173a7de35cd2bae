use serde::{Deserialize, Serialize};

/// `[[entities.constraints]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    pub name: String,

    pub kind: ConstraintKind,

    /// Fields of the owning entity the constraint covers
    #[serde(default)]
    pub fields: Vec<String>,

    /// Boolean expression for `check` constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Referenced `Entity` or `Entity.field` for `foreign-key` constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    Unique,
    Check,
    #[serde(alias = "foreign_key")]
    ForeignKey,
}

/// `[[entities.indexes]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    pub name: String,

    #[serde(default)]
    pub kind: IndexKind,

    pub fields: Vec<String>,

    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexKind {
    #[default]
    #[serde(alias = "btree")]
    Ordered,
    Hash,
    #[serde(alias = "multi_field", alias = "composite")]
    MultiField,
}

impl IndexKind {
    /// Minimum number of fields an index of this kind covers
    pub fn min_fields(&self) -> usize {
        match self {
            IndexKind::MultiField => 2,
            IndexKind::Ordered | IndexKind::Hash => 1,
        }
    }
}
