//! Rust-specific naming conventions.

use kiln_codegen::NamingConvention;
use kiln_core::{RUST_KEYWORDS, to_pascal_case, to_snake_case};

/// Keywords that cannot be raw identifiers.
const NOT_RAW: &[&str] = &["crate", "self", "Self", "super"];

fn escape_rust_reserved(name: &str) -> String {
    if NOT_RAW.contains(&name) {
        format!("{name}_")
    } else {
        format!("r#{name}")
    }
}

fn to_constant(name: &str) -> String {
    to_snake_case(name).to_uppercase()
}

/// Rust naming conventions.
pub const RUST_NAMING: NamingConvention = NamingConvention {
    to_type: to_pascal_case,
    to_module: to_snake_case,
    to_member: to_snake_case,
    to_constant,
    reserved_words: RUST_KEYWORDS,
    escape_reserved: escape_rust_reserved,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_naming_type() {
        assert_eq!(RUST_NAMING.type_name("order_item"), "OrderItem");
        assert_eq!(RUST_NAMING.type_name("pending"), "Pending");
    }

    #[test]
    fn test_rust_naming_module() {
        assert_eq!(RUST_NAMING.module_name("OrderItem"), "order_item");
        assert_eq!(RUST_NAMING.constant_name("OrderItem"), "ORDER_ITEM");
    }

    #[test]
    fn test_rust_naming_member() {
        assert_eq!(RUST_NAMING.member_name("TotalAmount"), "total_amount");
        assert_eq!(RUST_NAMING.member_name("customerId"), "customer_id");
    }

    #[test]
    fn test_rust_escape_reserved() {
        assert_eq!(RUST_NAMING.member_name("type"), "r#type");
        assert_eq!(RUST_NAMING.member_name("self"), "self_");
        assert_eq!(RUST_NAMING.type_name("self"), "Self_");
        assert_eq!(RUST_NAMING.member_name("hello"), "hello");
    }
}
