use std::fmt;

use serde::{Deserialize, Serialize};

/// `[[entities.relationships]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipSpec {
    /// Member name on the owning struct
    pub name: String,

    pub kind: Cardinality,

    /// Name of the related entity
    pub target: String,

    /// Column holding the key. Lives on the owning entity for
    /// many-to-one/one-to-one and on the target for one-to-many.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    #[serde(default)]
    pub on_delete: CascadePolicy,

    #[serde(default)]
    pub on_update: CascadePolicy,
}

impl RelationshipSpec {
    pub fn new(name: impl Into<String>, kind: Cardinality, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            foreign_key: None,
            on_delete: CascadePolicy::default(),
            on_update: CascadePolicy::default(),
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[serde(alias = "one_to_one", alias = "has-one")]
    OneToOne,
    #[serde(alias = "one_to_many", alias = "has-many")]
    OneToMany,
    #[serde(alias = "many_to_one", alias = "belongs-to")]
    ManyToOne,
    #[serde(alias = "many_to_many")]
    ManyToMany,
}

/// Which side of a relationship carries its foreign key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySide {
    Owner,
    Target,
    JoinTable,
}

impl Cardinality {
    pub fn is_to_many(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    pub fn key_side(&self) -> KeySide {
        match self {
            Cardinality::OneToOne | Cardinality::ManyToOne => KeySide::Owner,
            Cardinality::OneToMany => KeySide::Target,
            Cardinality::ManyToMany => KeySide::JoinTable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Referential action applied on delete/update of the referenced row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadePolicy {
    Cascade,
    Restrict,
    #[serde(alias = "set_null")]
    SetNull,
    #[serde(alias = "set_default")]
    SetDefault,
    #[default]
    #[serde(alias = "no_action")]
    NoAction,
}

impl CascadePolicy {
    /// SQL spelling of the action
    pub fn sql(&self) -> &'static str {
        match self {
            CascadePolicy::Cascade => "CASCADE",
            CascadePolicy::Restrict => "RESTRICT",
            CascadePolicy::SetNull => "SET NULL",
            CascadePolicy::SetDefault => "SET DEFAULT",
            CascadePolicy::NoAction => "NO ACTION",
        }
    }
}
