use std::fmt;

use kiln_core::to_snake_case;
use serde::{Deserialize, Serialize};

use crate::{ConstraintSpec, IndexSpec, RelationshipSpec};

/// `[[entities]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub relationships: Vec<RelationshipSpec>,

    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,

    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl EntitySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            relationships: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipSpec) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Look up a field by its declared name or its snake_case form.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        let wanted = to_snake_case(name);
        self.fields
            .iter()
            .find(|f| f.name == name || to_snake_case(&f.name) == wanted)
    }

    pub fn has_required_fields(&self) -> bool {
        self.fields.iter().any(|f| f.required)
    }
}

/// `[[entities.fields]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,

    /// Logical type name, looked up in the target's type-mapping table
    #[serde(rename = "type")]
    pub logical_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub nullable: bool,

    /// Numeric lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Numeric upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,

    /// Rule tokens such as `min:0`, `pattern:^[a-z]+$` or `email`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<String>,

    /// Variants of an enumerated field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Cross-entity reference, `Entity` or `Entity.field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, logical_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logical_type: logical_type.into(),
            required: false,
            unique: false,
            nullable: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            default: None,
            validation: Vec::new(),
            values: Vec::new(),
            references: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.validation.push(rule.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the generated member is wrapped in `Option`.
    pub fn is_optional(&self) -> bool {
        self.nullable || !self.required
    }

    pub fn reference(&self) -> Option<FieldReference> {
        self.references.as_deref().map(FieldReference::parse)
    }
}

/// Parsed form of a `references = "Entity.field"` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReference {
    pub entity: String,
    pub field: Option<String>,
}

impl FieldReference {
    pub fn parse(value: &str) -> Self {
        match value.split_once('.') {
            Some((entity, field)) => Self {
                entity: entity.trim().to_string(),
                field: Some(field.trim().to_string()),
            },
            None => Self {
                entity: value.trim().to_string(),
                field: None,
            },
        }
    }
}

/// Default value literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::String(s) => write!(f, "{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_by_snake_case() {
        let entity = EntitySpec::new("Order").with_field(FieldSpec::new("TotalAmount", "decimal"));
        assert!(entity.field("TotalAmount").is_some());
        assert!(entity.field("total_amount").is_some());
        assert!(entity.field("amount").is_none());
    }

    #[test]
    fn test_optionality() {
        assert!(FieldSpec::new("note", "text").is_optional());
        assert!(!FieldSpec::new("note", "text").required().is_optional());

        let mut field = FieldSpec::new("note", "text").required();
        field.nullable = true;
        assert!(field.is_optional());
    }

    #[test]
    fn test_reference_parse() {
        assert_eq!(
            FieldReference::parse("Customer.id"),
            FieldReference {
                entity: "Customer".into(),
                field: Some("id".into())
            }
        );
        assert_eq!(FieldReference::parse("Customer").field, None);
    }

    #[test]
    fn test_literal_defaults_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            a: Literal,
            b: Literal,
            c: Literal,
            d: Literal,
        }

        let holder: Holder = toml::from_str("a = true\nb = 3\nc = 1.5\nd = \"x\"").unwrap();
        assert_eq!(holder.a, Literal::Bool(true));
        assert_eq!(holder.b, Literal::Integer(3));
        assert_eq!(holder.c, Literal::Float(1.5));
        assert_eq!(holder.d, Literal::String("x".into()));
        assert_eq!(holder.c.to_string(), "1.5");
        assert_eq!(holder.d.to_string(), "\"x\"");
    }
}
