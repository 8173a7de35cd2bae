//! Table definitions for in-memory repositories.
//!
//! The DDL is emitted next to each repository as a constant so a storage
//! backend can be added later without re-reading the specification.

use kiln_spec::{
    ConstraintKind, EntitySpec, FieldReference, FieldSpec, IndexKind, KeySide, Literal,
    Specification,
};

use crate::{NamingConvention, mapping::TypeMapper, naming::pluralize};

/// Table name for an entity (`OrderItem` -> `order_items`).
pub fn table_name(naming: &NamingConvention, entity: &str) -> String {
    pluralize(&naming.module_name(entity))
}

/// Render `CREATE TABLE` plus `CREATE INDEX` statements for `entity`.
///
/// `key` is the member used as primary key, if any.
pub fn table_ddl(
    spec: &Specification,
    entity: &EntitySpec,
    mapper: &dyn TypeMapper,
    key: Option<&FieldSpec>,
) -> String {
    let naming = mapper.naming();
    let table = table_name(naming, &entity.name);
    let column = |name: &str| quote(&naming.bare_member_name(name));

    let mut defs = Vec::new();

    for field in &entity.fields {
        let mapping = mapper.resolve(&field.logical_type).mapping;
        let is_key = key.is_some_and(|k| k.name == field.name);

        let mut def = format!("{} {}", column(&field.name), mapping.storage);
        if is_key {
            def.push_str(" PRIMARY KEY");
        } else {
            if !field.is_optional() {
                def.push_str(" NOT NULL");
            }
            if field.unique {
                def.push_str(" UNIQUE");
            }
        }
        if let Some(default) = &field.default {
            def.push_str(" DEFAULT ");
            def.push_str(&sql_literal(default));
        }
        defs.push(def);
    }

    for constraint in &entity.constraints {
        let columns = column_list(&constraint.fields, &column);
        let body = match constraint.kind {
            ConstraintKind::Unique => format!("UNIQUE ({columns})"),
            ConstraintKind::Check => {
                format!("CHECK ({})", constraint.expression.as_deref().unwrap_or("TRUE"))
            }
            ConstraintKind::ForeignKey => {
                let Some(reference) = constraint.references.as_deref() else {
                    continue;
                };
                format!(
                    "FOREIGN KEY ({columns}) REFERENCES {}",
                    reference_target(spec, mapper, &FieldReference::parse(reference))
                )
            }
        };
        defs.push(format!("CONSTRAINT {} {body}", quote(&constraint.name)));
    }

    // Keys this entity holds for its own to-one relationships.
    for rel in &entity.relationships {
        if rel.kind.key_side() != KeySide::Owner {
            continue;
        }
        let (Some(fk), Some(target)) = (rel.foreign_key.as_deref(), spec.entity(&rel.target))
        else {
            continue;
        };
        if entity.field(fk).is_none() {
            continue;
        }
        defs.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
            column(fk),
            quote(&table_name(naming, &target.name)),
            quote(&primary_key_column(target, mapper)),
            rel.on_delete.sql(),
            rel.on_update.sql(),
        ));
    }

    // Keys other entities' one-to-many relationships place on this one.
    for owner in &spec.entities {
        for rel in &owner.relationships {
            if rel.kind.key_side() != KeySide::Target
                || spec.entity(&rel.target).is_none_or(|t| t.name != entity.name)
            {
                continue;
            }
            let Some(fk) = rel.foreign_key.as_deref() else {
                continue;
            };
            if entity.field(fk).is_none() {
                continue;
            }
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
                column(fk),
                quote(&table_name(naming, &owner.name)),
                quote(&primary_key_column(owner, mapper)),
                rel.on_delete.sql(),
                rel.on_update.sql(),
            ));
        }
    }

    for field in &entity.fields {
        if let Some(reference) = field.reference() {
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}",
                column(&field.name),
                reference_target(spec, mapper, &reference)
            ));
        }
    }

    let mut ddl = format!("CREATE TABLE IF NOT EXISTS {} (\n", quote(&table));
    ddl.push_str(
        &defs
            .iter()
            .map(|d| format!("    {d}"))
            .collect::<Vec<_>>()
            .join(",\n"),
    );
    ddl.push_str("\n);");

    for index in &entity.indexes {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let using = if index.kind == IndexKind::Hash {
            "USING HASH "
        } else {
            ""
        };
        ddl.push_str(&format!(
            "\nCREATE {unique}INDEX IF NOT EXISTS {} ON {} {using}({});",
            quote(&index.name),
            quote(&table),
            column_list(&index.fields, &column)
        ));
    }

    ddl
}

/// Primary key column of `entity`, `id` when it has no key member.
fn primary_key_column(entity: &EntitySpec, mapper: &dyn TypeMapper) -> String {
    crate::dispatch::repository_key(entity, mapper)
        .map(|field| mapper.naming().bare_member_name(&field.name))
        .unwrap_or_else(|| "id".to_string())
}

fn reference_target(
    spec: &Specification,
    mapper: &dyn TypeMapper,
    reference: &FieldReference,
) -> String {
    let naming = mapper.naming();
    let (table, column) = match spec.entity(&reference.entity) {
        Some(target) => (
            table_name(naming, &target.name),
            match &reference.field {
                Some(field) => naming.bare_member_name(field),
                None => primary_key_column(target, mapper),
            },
        ),
        None => (
            table_name(naming, &reference.entity),
            reference
                .field
                .as_deref()
                .map_or_else(|| "id".to_string(), |f| naming.bare_member_name(f)),
        ),
    };
    format!("{} ({})", quote(&table), quote(&column))
}

fn column_list(fields: &[String], column: &impl Fn(&str) -> String) -> String {
    fields
        .iter()
        .map(|f| column(f))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn sql_literal(literal: &Literal) -> String {
    match literal {
        Literal::Bool(true) => "TRUE".to_string(),
        Literal::Bool(false) => "FALSE".to_string(),
        Literal::Integer(i) => i.to_string(),
        Literal::Float(x) => format!("{x:?}"),
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use kiln_spec::{
        Cardinality, CascadePolicy, ConstraintSpec, IndexSpec, ProjectConfig, RelationshipSpec,
    };

    use super::*;
    use crate::testing::StubMapper;

    fn shop() -> Specification {
        let mut customer = EntitySpec::new("Customer")
            .with_field(FieldSpec::new("id", "uuid").required())
            .with_field(FieldSpec::new("email", "text").required().unique());
        customer.indexes.push(IndexSpec {
            name: "customer_email_idx".into(),
            kind: IndexKind::Hash,
            fields: vec!["email".into()],
            unique: false,
        });

        let mut order_rel = RelationshipSpec::new("customer", Cardinality::ManyToOne, "Customer")
            .with_foreign_key("customer_id");
        order_rel.on_delete = CascadePolicy::Cascade;

        let mut order = EntitySpec::new("Order")
            .with_field(FieldSpec::new("id", "uuid").required())
            .with_field(FieldSpec::new("customer_id", "uuid").required())
            .with_field(FieldSpec::new("TotalAmount", "decimal").required())
            .with_relationship(order_rel)
            .with_relationship(
                RelationshipSpec::new("items", Cardinality::OneToMany, "OrderItem")
                    .with_foreign_key("order_id"),
            );
        order.fields[2].default = Some(Literal::Integer(0));
        order.constraints.push(ConstraintSpec {
            name: "order_total_positive".into(),
            kind: ConstraintKind::Check,
            fields: vec!["TotalAmount".into()],
            expression: Some("total_amount >= 0".into()),
            references: None,
        });

        let item = EntitySpec::new("OrderItem")
            .with_field(FieldSpec::new("order_id", "uuid").required())
            .with_field(FieldSpec::new("note", "text"));

        Specification::new(ProjectConfig::new("shop", "microservice"))
            .with_entity(customer)
            .with_entity(order)
            .with_entity(item)
    }

    #[test]
    fn test_owner_side_foreign_key() {
        let spec = shop();
        let order = spec.entity("Order").unwrap();
        let ddl = table_ddl(&spec, order, &StubMapper, order.field("id"));

        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS \"orders\" (\n    \"id\" UUID PRIMARY KEY,\n    \"customer_id\" UUID NOT NULL,\n    \"total_amount\" NUMERIC NOT NULL DEFAULT 0,\n    CONSTRAINT \"order_total_positive\" CHECK (total_amount >= 0),\n    FOREIGN KEY (\"customer_id\") REFERENCES \"customers\" (\"id\") ON DELETE CASCADE ON UPDATE NO ACTION\n);"
        );
    }

    #[test]
    fn test_target_side_foreign_key() {
        let spec = shop();
        let item = spec.entity("OrderItem").unwrap();
        let ddl = table_ddl(&spec, item, &StubMapper, None);

        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"order_items\" ("));
        assert!(ddl.contains("\"note\" TEXT,"));
        assert!(ddl.contains(
            "FOREIGN KEY (\"order_id\") REFERENCES \"orders\" (\"id\") ON DELETE NO ACTION ON UPDATE NO ACTION"
        ));
    }

    #[test]
    fn test_indexes() {
        let spec = shop();
        let customer = spec.entity("Customer").unwrap();
        let ddl = table_ddl(&spec, customer, &StubMapper, customer.field("id"));

        assert!(ddl.contains("\"email\" TEXT NOT NULL UNIQUE"));
        assert!(ddl.ends_with(
            "CREATE INDEX IF NOT EXISTS \"customer_email_idx\" ON \"customers\" USING HASH (\"email\");"
        ));
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(sql_literal(&Literal::String("it's".into())), "'it''s'");
        assert_eq!(sql_literal(&Literal::Bool(true)), "TRUE");
        assert_eq!(sql_literal(&Literal::Float(1.5)), "1.5");
    }
}
