//! Target-language naming conventions.

/// How a target language spells generated names.
///
/// Entity names become type and module names, field names become member
/// identifiers, and reserved words are escaped rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    /// Entity or enum value to type name (e.g., "order_item" -> "OrderItem")
    pub to_type: fn(&str) -> String,
    /// Entity name to module/file stem (e.g., "OrderItem" -> "order_item")
    pub to_module: fn(&str) -> String,
    /// Field name to member identifier
    pub to_member: fn(&str) -> String,
    /// Name to constant identifier (e.g., "OrderItem" -> "ORDER_ITEM")
    pub to_constant: fn(&str) -> String,
    pub reserved_words: &'static [&'static str],
    /// Escape a reserved word (e.g., "type" -> "r#type" in Rust)
    pub escape_reserved: fn(&str) -> String,
}

impl NamingConvention {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Get a safe name, escaping if necessary.
    pub fn safe_name(&self, name: &str) -> String {
        if self.is_reserved(name) {
            (self.escape_reserved)(name)
        } else {
            name.to_string()
        }
    }

    pub fn type_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_type)(name))
    }

    /// Module names are used as file stems and are never escaped.
    pub fn module_name(&self, name: &str) -> String {
        (self.to_module)(name)
    }

    pub fn member_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_member)(name))
    }

    /// Member identifier without escaping, i.e. the name as it appears on the wire.
    pub fn bare_member_name(&self, name: &str) -> String {
        (self.to_member)(name)
    }

    pub fn constant_name(&self, name: &str) -> String {
        (self.to_constant)(name)
    }
}

/// English plural of a snake_case name, for table and collection names.
///
/// Only the last word is inflected: `order_item` becomes `order_items`.
pub fn pluralize(name: &str) -> String {
    let ends_with_consonant_y = name.ends_with('y')
        && name
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));

    if ends_with_consonant_y {
        format!("{}ies", &name[..name.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|end| name.ends_with(end)) {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use kiln_core::{to_pascal_case, to_snake_case};

    use super::*;

    const TEST_NAMING: NamingConvention = NamingConvention {
        to_type: to_pascal_case,
        to_module: to_snake_case,
        to_member: to_snake_case,
        to_constant: |s| to_snake_case(s).to_uppercase(),
        reserved_words: &["type", "match"],
        escape_reserved: |s| format!("r#{s}"),
    };

    #[test]
    fn test_member_escaping() {
        assert_eq!(TEST_NAMING.member_name("Type"), "r#type");
        assert_eq!(TEST_NAMING.bare_member_name("Type"), "type");
        assert_eq!(TEST_NAMING.member_name("TotalAmount"), "total_amount");
    }

    #[test]
    fn test_type_module_constant() {
        assert_eq!(TEST_NAMING.type_name("order_item"), "OrderItem");
        assert_eq!(TEST_NAMING.module_name("OrderItem"), "order_item");
        assert_eq!(TEST_NAMING.constant_name("OrderItem"), "ORDER_ITEM");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("order_item"), "order_items");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("survey"), "surveys");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("batch"), "batches");
    }
}
