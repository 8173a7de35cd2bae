//! Rust type mapper implementation.

use kiln_codegen::{
    NamingConvention,
    element::PatternDecl,
    mapping::{
        DroppedRule, MemberContext, RuleTranslation, TypeClass, TypeMapper, TypeMapping,
        ValidationRule,
    },
};
use kiln_spec::Literal;
use regex::Regex;

use crate::RUST_NAMING;

const fn row(
    names: &'static [&'static str],
    target: &'static str,
    storage: &'static str,
    class: TypeClass,
    key_capable: bool,
) -> TypeMapping {
    TypeMapping {
        names,
        target,
        serde: None,
        serde_optional: None,
        validation: None,
        storage,
        class,
        key_capable,
    }
}

const fn validated(
    names: &'static [&'static str],
    rule: &'static str,
    storage: &'static str,
    key_capable: bool,
) -> TypeMapping {
    TypeMapping {
        names,
        target: "String",
        serde: None,
        serde_optional: None,
        validation: Some(rule),
        storage,
        class: TypeClass::Text,
        key_capable,
    }
}

static RUST_TABLE: &[TypeMapping] = &[
    row(&["text", "string", "str", "varchar"], "String", "TEXT", TypeClass::Text, true),
    row(&["char", "character"], "String", "CHAR(1)", TypeClass::Text, false),
    row(&["long_text", "longtext", "markdown"], "String", "TEXT", TypeClass::Text, false),
    row(&["slug"], "String", "VARCHAR(255)", TypeClass::Text, true),
    row(&["phone", "phone_number"], "String", "VARCHAR(32)", TypeClass::Text, false),
    row(&["country_code", "country"], "String", "CHAR(2)", TypeClass::Text, false),
    row(&["color", "colour"], "String", "VARCHAR(7)", TypeClass::Text, false),
    row(&["password_hash", "secret"], "String", "TEXT", TypeClass::Text, false),
    validated(&["email", "email_address"], "email", "VARCHAR(320)", true),
    validated(&["url", "uri", "link"], "url", "TEXT", false),
    row(&["uuid", "guid", "identifier", "id"], "uuid::Uuid", "UUID", TypeClass::Text, true),
    row(&["smallint", "int16", "short"], "i16", "SMALLINT", TypeClass::Integer, true),
    row(&["integer", "int", "int32"], "i32", "INTEGER", TypeClass::Integer, true),
    row(&["bigint", "int64", "long"], "i64", "BIGINT", TypeClass::Integer, true),
    row(&["unsigned", "uint64", "counter"], "u64", "BIGINT", TypeClass::Integer, true),
    row(&["year"], "i16", "SMALLINT", TypeClass::Integer, false),
    row(&["duration", "duration_secs"], "i64", "BIGINT", TypeClass::Integer, false),
    row(&["float", "float32", "real"], "f32", "REAL", TypeClass::Float, false),
    row(&["double", "float64", "number"], "f64", "DOUBLE PRECISION", TypeClass::Float, false),
    row(&["percentage", "percent", "ratio"], "f64", "NUMERIC(5, 2)", TypeClass::Float, false),
    row(&["latitude", "longitude"], "f64", "DOUBLE PRECISION", TypeClass::Float, false),
    row(&["decimal", "numeric"], "rust_decimal::Decimal", "NUMERIC(19, 4)", TypeClass::Decimal, false),
    row(&["currency", "money"], "rust_decimal::Decimal", "NUMERIC(19, 4)", TypeClass::Decimal, false),
    row(&["boolean", "bool", "flag"], "bool", "BOOLEAN", TypeClass::Boolean, false),
    row(
        &["timestamp", "datetime", "instant"],
        "chrono::DateTime<chrono::Utc>",
        "TIMESTAMPTZ",
        TypeClass::Temporal,
        false,
    ),
    row(&["local_datetime", "naive_datetime"], "chrono::NaiveDateTime", "TIMESTAMP", TypeClass::Temporal, false),
    row(&["date"], "chrono::NaiveDate", "DATE", TypeClass::Temporal, false),
    row(&["time"], "chrono::NaiveTime", "TIME", TypeClass::Temporal, false),
    row(&["json", "structured", "object", "map"], "serde_json::Value", "JSONB", TypeClass::Structured, false),
    row(&["array", "list"], "Vec<serde_json::Value>", "JSONB", TypeClass::Collection, false),
    row(&["tags", "string_list"], "Vec<String>", "TEXT[]", TypeClass::Collection, false),
    TypeMapping {
        names: &["binary", "bytes", "blob"],
        target: "Vec<u8>",
        serde: Some("with = \"serde_bytes\""),
        serde_optional: Some("with = \"serde_bytes\""),
        validation: None,
        storage: "BYTEA",
        class: TypeClass::Binary,
        key_capable: false,
    },
    row(&["enum", "enumerated", "choice"], "String", "TEXT", TypeClass::Enumerated, false),
    row(&["ip_address", "ip", "inet"], "std::net::IpAddr", "INET", TypeClass::Network, true),
];

static RUST_OPAQUE: TypeMapping = row(&["opaque"], "serde_json::Value", "JSONB", TypeClass::Opaque, false);

/// Rust type mapper implementation.
///
/// Generated models derive `serde` and `validator`; the table names the
/// crates the generated manifest depends on (`uuid`, `chrono`,
/// `rust_decimal`, `serde_bytes`, `serde_json`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeMapper;

impl RustTypeMapper {
    pub fn new() -> Self {
        Self
    }
}

/// Collected `min`/`max` style arguments for one annotation.
#[derive(Default)]
struct Bounds {
    min: Option<String>,
    max: Option<String>,
}

impl Bounds {
    fn annotation(&self, name: &str) -> Option<String> {
        let args: Vec<String> = [("min", &self.min), ("max", &self.max)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key} = {v}")))
            .collect();
        (!args.is_empty()).then(|| format!("{name}({})", args.join(", ")))
    }
}

/// Whether an integer literal is in range for `target`; out-of-range
/// literals are a hard error in Rust.
fn integer_fits(target: &str, value: i64) -> bool {
    match target {
        "i16" => i16::try_from(value).is_ok(),
        "i32" => i32::try_from(value).is_ok(),
        "u64" => value >= 0,
        _ => true,
    }
}

/// 2^63 and 2^64, the first integers past `i64` and `u64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Integer literal for `value` as `target`, if it is in range.
fn integer_literal(target: &str, value: f64) -> Option<String> {
    match target {
        "i16" => (value >= f64::from(i16::MIN) && value <= f64::from(i16::MAX))
            .then(|| (value as i16).to_string()),
        "i32" => (value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX))
            .then(|| (value as i32).to_string()),
        "u64" => (value >= 0.0 && value < U64_LIMIT).then(|| (value as u64).to_string()),
        _ => (value >= -I64_LIMIT && value < I64_LIMIT).then(|| (value as i64).to_string()),
    }
}

/// Rust literal for a numeric bound on a member of the given mapping.
fn bound_literal(mapping: &TypeMapping, value: f64) -> Result<String, String> {
    match mapping.class {
        TypeClass::Integer => {
            if value.fract() != 0.0 {
                return Err(format!("bound {value} is not an integer"));
            }
            integer_literal(mapping.target, value)
                .ok_or_else(|| format!("bound {value} is out of range for {}", mapping.target))
        }
        TypeClass::Float => Ok(format!("{value:?}")),
        TypeClass::Decimal => Err("validator has no range check for decimal members".into()),
        _ => Err(format!("numeric bounds do not apply to {} members", mapping.name())),
    }
}

fn is_text(mapping: &TypeMapping) -> bool {
    mapping.target == "String" && mapping.class != TypeClass::Enumerated
}

impl TypeMapper for RustTypeMapper {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn table(&self) -> &'static [TypeMapping] {
        RUST_TABLE
    }

    fn opaque(&self) -> &'static TypeMapping {
        &RUST_OPAQUE
    }

    fn naming(&self) -> &NamingConvention {
        &RUST_NAMING
    }

    fn optional_of(&self, ty: &str) -> String {
        format!("Option<{ty}>")
    }

    fn list_of(&self, ty: &str) -> String {
        format!("Vec<{ty}>")
    }

    fn boxed(&self, ty: &str) -> String {
        format!("Box<{ty}>")
    }

    fn none_expr(&self) -> &'static str {
        "None"
    }

    fn some_expr(&self, expr: &str) -> String {
        format!("Some({expr})")
    }

    fn empty_list_expr(&self) -> &'static str {
        "Vec::new()"
    }

    fn position_key(&self) -> &'static str {
        "usize"
    }

    fn translate_rules(
        &self,
        member: &MemberContext<'_>,
        rules: &[ValidationRule],
    ) -> RuleTranslation {
        let mapping = member.mapping;
        let mut translation = RuleTranslation::default();
        let mut range = Bounds::default();
        let mut length = Bounds::default();
        let mut others = Vec::new();

        let mut reject = |rule: &ValidationRule, reason: String| {
            translation.dropped.push(DroppedRule {
                rule: rule.clone(),
                reason,
            });
        };

        for rule in rules {
            match rule {
                ValidationRule::Min(n) | ValidationRule::Max(n) => {
                    match bound_literal(mapping, *n) {
                        Ok(literal) if matches!(rule, ValidationRule::Min(_)) => {
                            range.min = Some(literal)
                        }
                        Ok(literal) => range.max = Some(literal),
                        Err(reason) => reject(rule, reason),
                    }
                }
                ValidationRule::MinLength(n) | ValidationRule::MaxLength(n) => {
                    if !is_text(mapping) && mapping.class != TypeClass::Collection {
                        reject(
                            rule,
                            format!("length bounds do not apply to {} members", mapping.name()),
                        );
                    } else if matches!(rule, ValidationRule::MinLength(_)) {
                        length.min = Some(n.to_string());
                    } else {
                        length.max = Some(n.to_string());
                    }
                }
                ValidationRule::Email | ValidationRule::Url if is_text(mapping) => {
                    others.push(rule.to_string());
                }
                ValidationRule::Email | ValidationRule::Url => reject(
                    rule,
                    format!("'{rule}' only applies to text members, not {}", mapping.name()),
                ),
                ValidationRule::Pattern(pattern) if is_text(mapping) => {
                    if let Err(err) = Regex::new(pattern) {
                        let detail = err.to_string();
                        let detail = detail.lines().last().unwrap_or_default().trim();
                        reject(rule, format!("pattern does not compile: {detail}"));
                        continue;
                    }
                    let mut name = format!("{}_{}_pattern", member.entity, member.field);
                    if !translation.patterns.is_empty() {
                        name.push_str(&format!("_{}", translation.patterns.len() + 1));
                    }
                    let name = RUST_NAMING.constant_name(&name);
                    others.push(format!("regex(path = *{name})"));
                    translation.patterns.push(PatternDecl {
                        name,
                        regex: pattern.clone(),
                    });
                }
                ValidationRule::Pattern(_) => reject(
                    rule,
                    format!("patterns only apply to text members, not {}", mapping.name()),
                ),
                ValidationRule::Required if member.optional => others.push("required".into()),
                // Non-optional members are always present.
                ValidationRule::Required => {}
                ValidationRule::Unsupported(_) => {
                    reject(rule, "unrecognized validation rule".into())
                }
            }
        }

        translation.annotations.extend(range.annotation("range"));
        translation.annotations.extend(length.annotation("length"));
        translation.annotations.extend(others);
        translation
    }

    fn default_expr(
        &self,
        mapping: &TypeMapping,
        literal: &Literal,
        enum_type: Option<&str>,
    ) -> Option<String> {
        if let Some(ty) = enum_type {
            return match literal {
                Literal::String(value) => Some(format!("{ty}::{}", RUST_NAMING.type_name(value))),
                _ => None,
            };
        }

        match (mapping.class, literal) {
            (_, Literal::String(value)) if mapping.target == "String" => {
                Some(format!("{value:?}.to_string()"))
            }
            (TypeClass::Integer, Literal::Integer(i)) if integer_fits(mapping.target, *i) => {
                Some(i.to_string())
            }
            (TypeClass::Float, Literal::Float(x)) if x.is_finite() => Some(format!("{x:?}")),
            (TypeClass::Float, Literal::Integer(i)) => Some(format!("{i}.0")),
            (TypeClass::Decimal, Literal::Integer(i)) => {
                Some(format!("rust_decimal::Decimal::from({i}_i64)"))
            }
            (TypeClass::Decimal, Literal::String(s)) if s.parse::<f64>().is_ok() => {
                Some(format!("{s:?}.parse().unwrap_or_default()"))
            }
            (TypeClass::Boolean, Literal::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }
}
