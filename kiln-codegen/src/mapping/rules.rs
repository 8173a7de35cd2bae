//! Validation rule grammar.
//!
//! Rules come from two places: the `validation` token list of a field and
//! its bound keys (`min`, `max`, `min_length`, `max_length`). Both are
//! normalized into [`ValidationRule`] before a target translates them.

use std::fmt;

use kiln_spec::FieldSpec;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    Min(f64),
    Max(f64),
    MinLength(u64),
    MaxLength(u64),
    Pattern(String),
    Email,
    Url,
    Required,
    /// A token outside the grammar, kept verbatim for the warning
    Unsupported(String),
}

impl ValidationRule {
    /// Parse one rule token.
    ///
    /// Tokens are `min:N`, `max:N`, `min_length:N`, `max_length:N`,
    /// `pattern:<regex>`, `email`, `url` and `required`. Anything else,
    /// including a malformed number, parses as [`ValidationRule::Unsupported`].
    pub fn parse(token: &str) -> Self {
        let trimmed = token.trim();
        let unsupported = || ValidationRule::Unsupported(trimmed.to_string());

        let Some((name, arg)) = trimmed.split_once(':') else {
            return match trimmed.to_ascii_lowercase().as_str() {
                "email" => ValidationRule::Email,
                "url" => ValidationRule::Url,
                "required" => ValidationRule::Required,
                _ => unsupported(),
            };
        };

        let number = || arg.trim().parse::<f64>().ok().filter(|n| n.is_finite());
        let length = || arg.trim().parse::<u64>().ok();

        let parsed = match name.trim().to_ascii_lowercase().as_str() {
            "min" => number().map(ValidationRule::Min),
            "max" => number().map(ValidationRule::Max),
            "min_length" => length().map(ValidationRule::MinLength),
            "max_length" => length().map(ValidationRule::MaxLength),
            "pattern" | "regex" if !arg.is_empty() => Some(ValidationRule::Pattern(arg.to_string())),
            _ => None,
        };
        parsed.unwrap_or_else(unsupported)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ValidationRule::Unsupported(_))
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Min(n) => write!(f, "min:{n}"),
            ValidationRule::Max(n) => write!(f, "max:{n}"),
            ValidationRule::MinLength(n) => write!(f, "min_length:{n}"),
            ValidationRule::MaxLength(n) => write!(f, "max_length:{n}"),
            ValidationRule::Pattern(p) => write!(f, "pattern:{p}"),
            ValidationRule::Email => f.write_str("email"),
            ValidationRule::Url => f.write_str("url"),
            ValidationRule::Required => f.write_str("required"),
            ValidationRule::Unsupported(token) => f.write_str(token),
        }
    }
}

/// Collect every rule that applies to `field`, in a stable order.
///
/// Bound keys come first, then the token list, then the rule implied by
/// the field's type (e.g. `email`). Exact duplicates are dropped.
pub fn field_rules(field: &FieldSpec, implied: Option<ValidationRule>) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    let mut push = |rule: ValidationRule| {
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    };

    if let Some(min) = field.min {
        push(ValidationRule::Min(min));
    }
    if let Some(max) = field.max {
        push(ValidationRule::Max(max));
    }
    if let Some(min) = field.min_length {
        push(ValidationRule::MinLength(min));
    }
    if let Some(max) = field.max_length {
        push(ValidationRule::MaxLength(max));
    }
    for token in &field.validation {
        push(ValidationRule::parse(token));
    }
    if let Some(rule) = implied {
        push(rule);
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grammar() {
        assert_eq!(ValidationRule::parse("min:0"), ValidationRule::Min(0.0));
        assert_eq!(ValidationRule::parse(" max: 10.5 "), ValidationRule::Max(10.5));
        assert_eq!(
            ValidationRule::parse("max_length:40"),
            ValidationRule::MaxLength(40)
        );
        assert_eq!(ValidationRule::parse("EMAIL"), ValidationRule::Email);
        assert_eq!(ValidationRule::parse("required"), ValidationRule::Required);
        assert_eq!(
            ValidationRule::parse("pattern:^[A-Z]{3}:[0-9]+$"),
            ValidationRule::Pattern("^[A-Z]{3}:[0-9]+$".into())
        );
    }

    #[test]
    fn test_parse_unsupported() {
        assert!(!ValidationRule::parse("luhn").is_supported());
        assert!(!ValidationRule::parse("min:abc").is_supported());
        assert!(!ValidationRule::parse("min:NaN").is_supported());
        assert!(!ValidationRule::parse("pattern:").is_supported());
        assert!(!ValidationRule::parse("max_length:-1").is_supported());
        assert_eq!(ValidationRule::parse(" luhn ").to_string(), "luhn");
    }

    #[test]
    fn test_field_rules_merge_and_dedup() {
        let mut field = FieldSpec::new("email", "email")
            .with_rule("max_length:120")
            .with_rule("email");
        field.max_length = Some(120);

        let rules = field_rules(&field, Some(ValidationRule::Email));
        assert_eq!(
            rules,
            vec![ValidationRule::MaxLength(120), ValidationRule::Email]
        );
    }
}
