//! Field and type mapping.
//!
//! A [`TypeMapper`] owns a static table from logical field types to
//! target-language types, plus the annotations that go with them. Lookups
//! never fail: unknown types resolve to the mapper's opaque entry and the
//! caller records a warning.

mod rules;

use kiln_spec::Literal;
use serde::Serialize;

pub use rules::{ValidationRule, field_rules};

use crate::{NamingConvention, element::PatternDecl};

/// Broad category of a mapped type; decides which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Structured,
    Binary,
    Enumerated,
    Collection,
    Network,
    Opaque,
}

/// One row of a mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMapping {
    /// Logical names (canonical first, then aliases)
    pub names: &'static [&'static str],
    /// Target-language type
    pub target: &'static str,
    /// Serialization annotation for a required member
    pub serde: Option<&'static str>,
    /// Serialization annotation when the member is optional
    pub serde_optional: Option<&'static str>,
    /// Validation rule implied by the type (`email`, `url`)
    pub validation: Option<&'static str>,
    /// Storage column type
    pub storage: &'static str,
    pub class: TypeClass,
    /// Usable as an in-memory repository key
    pub key_capable: bool,
}

impl TypeMapping {
    pub fn name(&self) -> &'static str {
        self.names.first().copied().unwrap_or("opaque")
    }

    pub fn implied_rule(&self) -> Option<ValidationRule> {
        self.validation.map(ValidationRule::parse)
    }

    pub fn serde_for(&self, optional: bool) -> Option<&'static str> {
        if optional {
            self.serde_optional
        } else {
            self.serde
        }
    }
}

/// Outcome of a lookup
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub mapping: &'a TypeMapping,
    /// False when the logical type fell back to the opaque entry
    pub known: bool,
}

/// Member being annotated, as seen by rule translation.
#[derive(Debug, Clone)]
pub struct MemberContext<'a> {
    pub entity: &'a str,
    /// Spec-level field name
    pub field: &'a str,
    pub mapping: &'a TypeMapping,
    pub optional: bool,
}

/// A rule that could not be expressed for a member.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRule {
    pub rule: ValidationRule,
    pub reason: String,
}

/// Annotations produced for one member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTranslation {
    /// Validation annotation arguments, e.g. `length(max = 40)`
    pub annotations: Vec<String>,
    /// Compiled-once patterns the annotations refer to
    pub patterns: Vec<PatternDecl>,
    pub dropped: Vec<DroppedRule>,
}

/// Target-language type mapping.
pub trait TypeMapper: Send + Sync {
    /// Target language name, for reports
    fn language(&self) -> &'static str;

    fn table(&self) -> &'static [TypeMapping];

    /// Entry used for unknown logical types
    fn opaque(&self) -> &'static TypeMapping;

    fn naming(&self) -> &NamingConvention;

    /// Resolve a logical type. Case, surrounding whitespace and `-` vs `_`
    /// are ignored.
    fn resolve(&self, logical: &str) -> Resolved<'static> {
        let key = logical.trim().to_ascii_lowercase().replace('-', "_");
        match self.table().iter().find(|m| m.names.contains(&key.as_str())) {
            Some(mapping) => Resolved {
                mapping,
                known: true,
            },
            None => Resolved {
                mapping: self.opaque(),
                known: false,
            },
        }
    }

    fn optional_of(&self, ty: &str) -> String;

    fn list_of(&self, ty: &str) -> String;

    /// Indirection for recursive to-one members
    fn boxed(&self, ty: &str) -> String;

    /// Expression for an absent optional value
    fn none_expr(&self) -> &'static str;

    fn some_expr(&self, expr: &str) -> String;

    fn empty_list_expr(&self) -> &'static str;

    /// Key type of repositories without a key member
    fn position_key(&self) -> &'static str;

    /// Translate rules into validation annotations; rules that cannot be
    /// expressed for the member go to [`RuleTranslation::dropped`].
    fn translate_rules(&self, member: &MemberContext<'_>, rules: &[ValidationRule])
    -> RuleTranslation;

    /// Expression for a default value, `None` when the literal does not fit the type.
    fn default_expr(
        &self,
        mapping: &TypeMapping,
        literal: &Literal,
        enum_type: Option<&str>,
    ) -> Option<String>;
}
