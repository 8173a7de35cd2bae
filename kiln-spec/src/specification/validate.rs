//! Validation context and identifier rules for specification parsing.

use std::sync::Arc;

use kiln_core::{is_rust_keyword, to_pascal_case, to_snake_case};
use miette::SourceSpan;

use crate::{Result, error::SourceContext};

/// Keywords that cannot be written as raw identifiers (`r#self` is invalid).
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Parsing and validation context that carries source information.
///
/// Nested contexts share the source and extend the path, so an error in
/// the fields of `Order` reads "field in 'Order'".
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    source: Arc<SourceContext>,
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    pub fn src(&self) -> &str {
        self.source.src()
    }

    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path,
        }
    }

    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages, e.g. "field in 'Order'".
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Span of the first `name = "<name>"` occurrence.
    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_value_span(self.src(), "name", name, false)
    }

    /// Span of the last `name = "<name>"` occurrence, used for duplicates.
    pub fn find_last_span(&self, name: &str) -> Option<SourceSpan> {
        find_value_span(self.src(), "name", name, true)
    }

    /// Span of the first `<key> = "<value>"` occurrence.
    pub fn find_value_span(&self, key: &str, value: &str) -> Option<SourceSpan> {
        find_value_span(self.src(), key, value, false)
    }

    /// Span of a quoted list entry such as `"placed_at"` in `fields = [...]`.
    pub fn find_quoted_span(&self, value: &str) -> Option<SourceSpan> {
        let pattern = format!("\"{value}\"");
        self.src()
            .find(&pattern)
            .map(|pos| SourceSpan::from((pos + 1, value.len())))
    }

    /// Validate an entity or module name.
    ///
    /// Entities become type and module names, so neither the name itself
    /// nor its PascalCase or snake_case form may be a keyword.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        let reserved = is_rust_keyword(name)
            || is_rust_keyword(&to_pascal_case(name))
            || is_rust_keyword(&to_snake_case(name));
        if reserved {
            return Err(self.source.reserved_keyword_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }

        self.validate_identifier(name, kind)
    }

    /// Validate a struct member name.
    ///
    /// Members are keyword-escaped during generation, so only the keywords
    /// that have no raw form are rejected.
    pub fn validate_member_name(&self, name: &str, kind: &str) -> Result<()> {
        if NON_RAW_KEYWORDS.contains(&to_snake_case(name).as_str()) {
            return Err(self.source.reserved_keyword_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }

        self.validate_identifier(name, kind)
    }

    fn validate_identifier(&self, name: &str, kind: &str) -> Result<()> {
        match validate_identifier(name) {
            Some(reason) => Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                reason,
                self.find_span(name),
            )),
            None => Ok(()),
        }
    }
}

/// Find `<key> = "<value>"` (or single-quoted) and return the span of the value.
pub(crate) fn find_value_span(src: &str, key: &str, value: &str, last: bool) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let pattern = format!("{key} = {quote}{value}{quote}");
        let found = if last {
            src.rfind(&pattern)
        } else {
            src.find(&pattern)
        };
        if let Some(pos) = found {
            let start = pos + key.len() + 4;
            return Some(SourceSpan::from((start, value.len())));
        }
    }

    // No fallback - better to have no span than point to wrong location
    None
}

/// Validate that a name can be turned into an identifier.
/// Returns None if valid, Some(reason) if invalid.
///
/// Dashes are allowed (`order-item`) and are folded away by case conversion.
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    let mut prev_was_dash = false;
    for c in chars {
        if c == '-' {
            if prev_was_dash {
                return Some("name cannot contain consecutive dashes");
            }
            prev_was_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            prev_was_dash = false;
        } else {
            return Some("name must contain only letters, numbers, underscores, and dashes");
        }
    }

    if prev_was_dash {
        return Some("name cannot end with a dash");
    }

    if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Some("name must contain at least one letter or number");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("order").is_none());
        assert!(validate_identifier("OrderItem").is_none());
        assert!(validate_identifier("total_amount").is_none());
        assert!(validate_identifier("_internal").is_none());
        assert!(validate_identifier("line2").is_none());
        assert!(validate_identifier("order-item").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("-name").is_some());
        assert!(validate_identifier("order item").is_some());
        assert!(validate_identifier("order.item").is_some());
        assert!(validate_identifier("order--item").is_some());
        assert!(validate_identifier("order-").is_some());
        assert!(validate_identifier("__").is_some());
    }

    #[test]
    fn test_entity_names_reject_keyword_forms() {
        let ctx = ParseContext::new("", "kiln.toml");
        assert!(ctx.validate_name("Order", "entity").is_ok());
        assert!(ctx.validate_name("type", "entity").is_err());
        // PascalCase form is `Self`
        assert!(ctx.validate_name("self", "entity").is_err());
        // snake_case form is `match`
        assert!(ctx.validate_name("Match", "entity").is_err());
    }

    #[test]
    fn test_member_names_allow_escapable_keywords() {
        let ctx = ParseContext::new("", "kiln.toml");
        assert!(ctx.validate_member_name("type", "field").is_ok());
        assert!(ctx.validate_member_name("match", "field").is_ok());
        assert!(ctx.validate_member_name("self", "field").is_err());
        assert!(ctx.validate_member_name("Super", "field").is_err());
    }

    #[test]
    fn test_find_value_span() {
        let src = "[[entities]]\nname = \"Order\"\n";
        let span = find_value_span(src, "name", "Order", false).unwrap();
        assert_eq!(span.offset(), 21);
        assert_eq!(span.len(), 5);
        assert_eq!(&src[21..26], "Order");
    }

    #[test]
    fn test_find_last_span_for_duplicates() {
        let src = "name = 'A'\nname = 'A'\n";
        let first = find_value_span(src, "name", "A", false).unwrap();
        let last = find_value_span(src, "name", "A", true).unwrap();
        assert_eq!(first.offset(), 8);
        assert_eq!(last.offset(), 19);
    }

    #[test]
    fn test_context_for_nested_path() {
        let ctx = ParseContext::new("", "kiln.toml");
        assert_eq!(ctx.context_for("entity"), "entity");
        assert_eq!(ctx.push("Order").context_for("field"), "field in 'Order'");
    }
}
