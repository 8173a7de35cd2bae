//! Entity-to-element dispatch.
//!
//! Turns each entity of a checked specification into the code elements the
//! requested features call for. Element order is entity declaration order,
//! then struct, constructor, interface, repository, service, handler; the
//! writer's last-write-wins rule depends on it.

use std::collections::HashSet;

use kiln_spec::{EntitySpec, Feature, FieldSpec, RelationshipSpec, Specification};

use crate::{
    Diagnostic, SpecificationError,
    ddl::{table_ddl, table_name},
    element::{
        CodeElement, EnumDecl, FieldDecl, FieldInit, FunctionDecl, HandlerDecl, InterfaceDecl,
        ParamDecl, PatternDecl, RepositoryDecl, RepositoryOp, ServiceDecl, StructDecl,
        UniqueMember, VariantDecl,
    },
    mapping::{MemberContext, TypeClass, TypeMapper, field_rules},
    naming::pluralize,
};

/// Elements produced for a specification plus the mapping warnings
/// recorded on the way.
#[derive(Debug, Default)]
pub struct Dispatched {
    pub elements: Vec<CodeElement>,
    pub warnings: Vec<Diagnostic>,
}

pub struct Dispatcher<'a> {
    spec: &'a Specification,
    mapper: &'a dyn TypeMapper,
    features: Vec<Feature>,
}

impl<'a> Dispatcher<'a> {
    /// `features` are closed over their prerequisites.
    pub fn new(spec: &'a Specification, mapper: &'a dyn TypeMapper, features: &[Feature]) -> Self {
        Self {
            spec,
            mapper,
            features: Feature::normalize(features),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Reject specifications that cannot be generated at all.
    pub fn check(&self) -> Result<(), SpecificationError> {
        if let Some(unresolved) = self.spec.unresolved_relationships().into_iter().next() {
            return Err(SpecificationError::UnresolvedRelationship {
                entity: unresolved.entity,
                relationship: unresolved.relationship,
                target: unresolved.target,
            });
        }

        let naming = self.mapper.naming();
        let mut entities = HashSet::new();
        for entity in &self.spec.entities {
            if !entities.insert(naming.type_name(&entity.name)) {
                return Err(SpecificationError::DuplicateEntity {
                    name: entity.name.clone(),
                });
            }

            let mut members = HashSet::new();
            let names = entity
                .fields
                .iter()
                .map(|f| &f.name)
                .chain(entity.relationships.iter().map(|r| &r.name));
            for name in names {
                if !members.insert(naming.bare_member_name(name)) {
                    return Err(SpecificationError::DuplicateField {
                        entity: entity.name.clone(),
                        field: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check the specification, then build every element.
    ///
    /// Fails before producing anything when [`Dispatcher::check`] fails.
    pub fn dispatch(&self) -> Result<Dispatched, SpecificationError> {
        self.check()?;

        let mut out = Dispatched::default();
        for entity in &self.spec.entities {
            self.dispatch_entity(entity, &mut out);
        }
        Ok(out)
    }

    pub fn dispatch_entity(&self, entity: &EntitySpec, out: &mut Dispatched) {
        let _span = tracing::debug_span!("dispatch", entity = %entity.name).entered();
        let before = out.elements.len();

        let model = self.struct_decl(entity, &mut out.warnings);
        let constructor = entity
            .has_required_fields()
            .then(|| self.constructor(entity, &model, &mut out.warnings));
        out.elements.push(CodeElement::Struct(model));
        if let Some(constructor) = constructor {
            out.elements.push(CodeElement::Function(constructor));
        }

        let naming = self.mapper.naming();
        let ty = naming.type_name(&entity.name);
        let module = naming.module_name(&entity.name);
        let interface = format!("{ty}Repository");
        let key = repository_key(entity, self.mapper);
        let key_ty = match key {
            Some(field) => self.mapper.resolve(&field.logical_type).mapping.target.to_string(),
            None => self.mapper.position_key().to_string(),
        };

        for feature in &self.features {
            match feature {
                Feature::Repository => {
                    out.elements.push(CodeElement::Interface(InterfaceDecl {
                        name: interface.clone(),
                        entity: ty.clone(),
                        module: module.clone(),
                        key_ty: key_ty.clone(),
                        operations: RepositoryOp::ALL.to_vec(),
                    }));
                    out.elements.push(CodeElement::Repository(RepositoryDecl {
                        name: format!("InMemory{ty}Repository"),
                        entity: ty.clone(),
                        interface: interface.clone(),
                        module: format!("{module}_memory"),
                        key_ty: key_ty.clone(),
                        key_field: key.map(|f| naming.member_name(&f.name)),
                        unique_fields: entity
                            .fields
                            .iter()
                            .filter(|f| f.unique && key.is_none_or(|k| k.name != f.name))
                            .map(|f| UniqueMember {
                                ident: naming.member_name(&f.name),
                                optional: f.is_optional(),
                            })
                            .collect(),
                        table: table_name(naming, &entity.name),
                        ddl_const: format!("{}_TABLE_DDL", naming.constant_name(&entity.name)),
                        ddl: table_ddl(self.spec, entity, self.mapper, key),
                    }));
                }
                Feature::Service => out.elements.push(CodeElement::Service(ServiceDecl {
                    name: format!("{ty}Service"),
                    entity: ty.clone(),
                    interface: interface.clone(),
                    module: module.clone(),
                    key_ty: key_ty.clone(),
                })),
                Feature::Handlers => out.elements.push(CodeElement::Handler(HandlerDecl {
                    entity: ty.clone(),
                    item: module.clone(),
                    collection: pluralize(&module),
                    service: format!("{ty}Service"),
                    interface: interface.clone(),
                    module: module.clone(),
                    key_ty: key_ty.clone(),
                })),
            }
        }

        tracing::debug!(elements = out.elements.len() - before, "dispatched entity");
    }

    fn struct_decl(&self, entity: &EntitySpec, warnings: &mut Vec<Diagnostic>) -> StructDecl {
        let naming = self.mapper.naming();
        let ty = naming.type_name(&entity.name);

        let mut decl = StructDecl {
            name: ty.clone(),
            module: naming.module_name(&entity.name),
            doc: entity.description.clone(),
            fields: Vec::new(),
            enums: Vec::new(),
            patterns: Vec::new(),
            imports: Vec::new(),
        };

        for field in &entity.fields {
            let member = self.field_decl(entity, field, &mut decl, warnings);
            decl.fields.push(member);
        }
        for rel in &entity.relationships {
            let member = self.relationship_decl(rel);
            if let Some(target) = &member.relation
                && *target != ty
                && !decl.imports.contains(target)
            {
                decl.imports.push(target.clone());
            }
            decl.fields.push(member);
        }
        decl
    }

    fn field_decl(
        &self,
        entity: &EntitySpec,
        field: &FieldSpec,
        decl: &mut StructDecl,
        warnings: &mut Vec<Diagnostic>,
    ) -> FieldDecl {
        let naming = self.mapper.naming();
        let location = format!("{}.{}", entity.name, field.name);
        let optional = field.is_optional();

        let resolved = self.mapper.resolve(&field.logical_type);
        let mapping = resolved.mapping;
        if !resolved.known {
            warnings.push(
                Diagnostic::warning(
                    "mapping",
                    format!(
                        "unknown type '{}', generated as {}",
                        field.logical_type, mapping.target
                    ),
                )
                .at(&location),
            );
        }

        let mut base = mapping.target.to_string();
        if mapping.class == TypeClass::Enumerated {
            if field.values.is_empty() {
                warnings.push(
                    Diagnostic::warning(
                        "mapping",
                        format!("enumerated field has no values, generated as {base}"),
                    )
                    .at(&location),
                );
            } else {
                let enum_decl = self.enum_decl(entity, field);
                base = enum_decl.name.clone();
                decl.enums.push(enum_decl);
            }
        }

        let mut serde = Vec::new();
        if naming.bare_member_name(&field.name) != field.name {
            serde.push(format!("rename = \"{}\"", field.name));
        }
        if let Some(attr) = mapping.serde_for(optional) {
            serde.push(attr.to_string());
            if optional {
                serde.push("default".to_string());
            }
        }

        let rules = field_rules(field, mapping.implied_rule());
        let translation = self.mapper.translate_rules(
            &MemberContext {
                entity: &entity.name,
                field: &field.name,
                mapping,
                optional,
            },
            &rules,
        );
        for dropped in &translation.dropped {
            warnings.push(
                Diagnostic::warning(
                    "mapping",
                    format!("validation rule '{}' dropped: {}", dropped.rule, dropped.reason),
                )
                .at(&location),
            );
        }
        for pattern in translation.patterns {
            push_pattern(&mut decl.patterns, pattern);
        }

        FieldDecl {
            name: field.name.clone(),
            ident: naming.member_name(&field.name),
            ty: if optional {
                self.mapper.optional_of(&base)
            } else {
                base
            },
            optional,
            serde,
            validate: translation.annotations,
            doc: field.description.clone(),
            relation: None,
        }
    }

    fn enum_decl(&self, entity: &EntitySpec, field: &FieldSpec) -> EnumDecl {
        let naming = self.mapper.naming();
        let variants: Vec<VariantDecl> = field
            .values
            .iter()
            .map(|value| VariantDecl {
                ident: naming.type_name(value),
                value: value.clone(),
            })
            .collect();

        let default_variant = match &field.default {
            Some(kiln_spec::Literal::String(value)) => variants
                .iter()
                .find(|v| v.value == *value)
                .map(|v| v.ident.clone()),
            _ => None,
        };

        EnumDecl {
            name: naming.type_name(&format!("{}_{}", entity.name, field.name)),
            doc: Some(format!("Values of `{}.{}`.", entity.name, field.name)),
            variants,
            default_variant,
        }
    }

    fn relationship_decl(&self, rel: &RelationshipSpec) -> FieldDecl {
        let naming = self.mapper.naming();
        let target_name = self
            .spec
            .entity(&rel.target)
            .map_or(rel.target.as_str(), |e| e.name.as_str());
        let target = naming.type_name(target_name);

        let mut serde = Vec::new();
        if naming.bare_member_name(&rel.name) != rel.name {
            serde.push(format!("rename = \"{}\"", rel.name));
        }
        serde.push("default".to_string());

        let (ty, optional) = if rel.kind.is_to_many() {
            (self.mapper.list_of(&target), false)
        } else {
            serde.push("skip_serializing_if = \"Option::is_none\"".to_string());
            (self.mapper.optional_of(&self.mapper.boxed(&target)), true)
        };

        FieldDecl {
            name: rel.name.clone(),
            ident: naming.member_name(&rel.name),
            ty,
            optional,
            serde,
            validate: Vec::new(),
            doc: Some(format!("{} `{}`", capitalize(rel.kind.as_str()), target)),
            relation: Some(target),
        }
    }

    /// `new` taking every required field in declaration order.
    fn constructor(
        &self,
        entity: &EntitySpec,
        model: &StructDecl,
        warnings: &mut Vec<Diagnostic>,
    ) -> FunctionDecl {
        let mut params = Vec::new();
        let mut inits = Vec::new();
        let mut imports = vec![model.name.clone()];
        let enum_of = |member: &FieldDecl| {
            model
                .enums
                .iter()
                .find(|e| member.ty == e.name || member.ty == self.mapper.optional_of(&e.name))
        };

        for (field, member) in entity.fields.iter().zip(&model.fields) {
            if field.required {
                params.push(ParamDecl {
                    name: member.ident.clone(),
                    ty: member.ty.clone(),
                });
                inits.push(FieldInit {
                    ident: member.ident.clone(),
                    expr: member.ident.clone(),
                });
                if let Some(enum_decl) = enum_of(member)
                    && !imports.contains(&enum_decl.name)
                {
                    imports.push(enum_decl.name.clone());
                }
                continue;
            }

            let expr = match &field.default {
                Some(literal) => {
                    let mapping = self.mapper.resolve(&field.logical_type).mapping;
                    let enum_type = enum_of(member).map(|e| e.name.as_str());
                    match self.mapper.default_expr(mapping, literal, enum_type) {
                        Some(expr) => {
                            if let Some(name) = enum_type
                                && !imports.iter().any(|i| i == name)
                            {
                                imports.push(name.to_string());
                            }
                            self.mapper.some_expr(&expr)
                        }
                        None => {
                            warnings.push(
                                Diagnostic::warning(
                                    "mapping",
                                    format!("default {literal} does not fit the field type, left empty"),
                                )
                                .at(format!("{}.{}", entity.name, field.name)),
                            );
                            self.mapper.none_expr().to_string()
                        }
                    }
                }
                None => self.mapper.none_expr().to_string(),
            };
            inits.push(FieldInit {
                ident: member.ident.clone(),
                expr,
            });
        }

        for (rel, member) in entity
            .relationships
            .iter()
            .zip(&model.fields[entity.fields.len()..])
        {
            let expr = if rel.kind.is_to_many() {
                self.mapper.empty_list_expr()
            } else {
                self.mapper.none_expr()
            };
            inits.push(FieldInit {
                ident: member.ident.clone(),
                expr: expr.to_string(),
            });
        }

        FunctionDecl {
            name: "new".to_string(),
            owner: model.name.clone(),
            module: format!("{}_new", model.module),
            doc: Some(format!("Create a `{}` from its required fields.", model.name)),
            params,
            inits,
            imports,
        }
    }
}

/// Member used as the key of an entity's repository.
///
/// The field named `id` if it qualifies, else the first unique field.
/// Only non-optional fields of a key-capable type qualify.
pub fn repository_key<'e>(entity: &'e EntitySpec, mapper: &dyn TypeMapper) -> Option<&'e FieldSpec> {
    let naming = mapper.naming();
    let candidates: Vec<&FieldSpec> = entity
        .fields
        .iter()
        .filter(|f| !f.is_optional() && mapper.resolve(&f.logical_type).mapping.key_capable)
        .collect();

    candidates
        .iter()
        .find(|f| naming.bare_member_name(&f.name) == "id")
        .or_else(|| candidates.iter().find(|f| f.unique))
        .copied()
}

fn push_pattern(patterns: &mut Vec<PatternDecl>, pattern: PatternDecl) {
    if !patterns.iter().any(|p| p.name == pattern.name) {
        patterns.push(pattern);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use kiln_spec::{Cardinality, Literal, ProjectConfig};

    use super::*;
    use crate::{Layer, testing::StubMapper};

    fn order_spec() -> Specification {
        let order = EntitySpec::new("Order")
            .with_field(FieldSpec::new("id", "uuid").required())
            .with_field(
                FieldSpec::new("TotalAmount", "decimal")
                    .required()
                    .with_rule("min:0"),
            )
            .with_field({
                let mut status =
                    FieldSpec::new("status", "enum").with_values(["pending", "shipped"]);
                status.default = Some(Literal::String("pending".into()));
                status
            })
            .with_field(FieldSpec::new("notes", "text").with_rule("luhn"))
            .with_relationship(
                RelationshipSpec::new("items", Cardinality::OneToMany, "OrderItem")
                    .with_foreign_key("order_id"),
            );
        let item = EntitySpec::new("OrderItem")
            .with_field(FieldSpec::new("order_id", "uuid").required())
            .with_field(FieldSpec::new("payload", "hologram"))
            .with_relationship(RelationshipSpec::new(
                "order",
                Cardinality::ManyToOne,
                "Order",
            ));

        Specification::new(ProjectConfig::new("shop", "microservice"))
            .with_entity(order)
            .with_entity(item)
    }

    fn kinds(dispatched: &Dispatched) -> Vec<(&'static str, String)> {
        dispatched
            .elements
            .iter()
            .map(|e| (e.kind(), e.module().to_string()))
            .collect()
    }

    #[test]
    fn test_element_order() {
        let spec = order_spec();
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[Feature::Handlers])
            .dispatch()
            .unwrap();

        assert_eq!(
            kinds(&dispatched),
            vec![
                ("struct", "order".to_string()),
                ("function", "order_new".to_string()),
                ("interface", "order".to_string()),
                ("repository", "order_memory".to_string()),
                ("service", "order".to_string()),
                ("handler", "order".to_string()),
                ("struct", "order_item".to_string()),
                ("function", "order_item_new".to_string()),
                ("interface", "order_item".to_string()),
                ("repository", "order_item_memory".to_string()),
                ("service", "order_item".to_string()),
                ("handler", "order_item".to_string()),
            ]
        );
    }

    #[test]
    fn test_struct_members() {
        let spec = order_spec();
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap();
        let CodeElement::Struct(order) = &dispatched.elements[0] else {
            panic!("expected struct");
        };

        let members: Vec<(&str, &str)> = order
            .fields
            .iter()
            .map(|f| (f.ident.as_str(), f.ty.as_str()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("id", "Uuid"),
                ("total_amount", "Decimal"),
                ("status", "Option<OrderStatus>"),
                ("notes", "Option<String>"),
                ("items", "Vec<OrderItem>"),
            ]
        );
        assert_eq!(order.fields[1].serde, vec!["rename = \"TotalAmount\""]);
        assert_eq!(order.fields[4].serde, vec!["default"]);
        assert_eq!(order.imports, vec!["OrderItem"]);
        assert_eq!(order.enums[0].name, "OrderStatus");
        assert_eq!(order.enums[0].default_variant.as_deref(), Some("Pending"));
        assert!(dispatched.elements.iter().all(|e| e.layer() == Layer::Models));
    }

    #[test]
    fn test_to_one_relationship_is_boxed_option() {
        let spec = order_spec();
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap();
        let CodeElement::Struct(item) = &dispatched.elements[2] else {
            panic!("expected struct");
        };
        let order = item.fields.iter().find(|f| f.ident == "order").unwrap();
        assert_eq!(order.ty, "Option<Box<Order>>");
        assert!(order.optional);
        assert!(order.serde.contains(&"skip_serializing_if = \"Option::is_none\"".to_string()));
    }

    #[test]
    fn test_mapping_warnings() {
        let spec = order_spec();
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap();

        let locations: Vec<&str> = dispatched
            .warnings
            .iter()
            .map(|w| w.location.as_deref().unwrap_or_default())
            .collect();
        // decimal min dropped, unknown token dropped, unknown type
        assert_eq!(
            locations,
            vec!["Order.TotalAmount", "Order.notes", "OrderItem.payload"]
        );
        assert!(dispatched.warnings.iter().all(|w| w.phase == "mapping"));
        assert!(dispatched.warnings[2].message.contains("hologram"));
    }

    #[test]
    fn test_constructor() {
        let spec = order_spec();
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap();
        let CodeElement::Function(ctor) = &dispatched.elements[1] else {
            panic!("expected constructor");
        };

        let params: Vec<&str> = ctor.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["id", "total_amount"]);
        let inits: Vec<(&str, &str)> = ctor
            .inits
            .iter()
            .map(|i| (i.ident.as_str(), i.expr.as_str()))
            .collect();
        assert_eq!(
            inits,
            vec![
                ("id", "id"),
                ("total_amount", "total_amount"),
                ("status", "Some(OrderStatus::Pending)"),
                ("notes", "None"),
                ("items", "Vec::new()"),
            ]
        );
    }

    #[test]
    fn test_no_constructor_without_required_fields() {
        let spec = Specification::new(ProjectConfig::new("notes", "library"))
            .with_entity(EntitySpec::new("Note").with_field(FieldSpec::new("body", "text")));
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap();
        assert_eq!(kinds(&dispatched), vec![("struct", "note".to_string())]);
    }

    #[test]
    fn test_repository_key() {
        let spec = order_spec();
        let order = spec.entity("Order").unwrap();
        assert_eq!(repository_key(order, &StubMapper).unwrap().name, "id");

        let keyless = EntitySpec::new("Event").with_field(FieldSpec::new("at", "text").required());
        assert!(repository_key(&keyless, &StubMapper).is_none());

        let by_unique = EntitySpec::new("Sku")
            .with_field(FieldSpec::new("label", "text").required())
            .with_field(FieldSpec::new("code", "text").required().unique());
        assert_eq!(repository_key(&by_unique, &StubMapper).unwrap().name, "code");
    }

    #[test]
    fn test_position_keyed_repository() {
        let spec = Specification::new(ProjectConfig::new("log", "worker")).with_entity(
            EntitySpec::new("Event").with_field(FieldSpec::new("at", "text").required()),
        );
        let dispatched = Dispatcher::new(&spec, &StubMapper, &[Feature::Repository])
            .dispatch()
            .unwrap();
        let CodeElement::Repository(repo) = &dispatched.elements[3] else {
            panic!("expected repository");
        };
        assert_eq!(repo.key_ty, "usize");
        assert!(repo.key_field.is_none());
        assert_eq!(repo.table, "events");
        assert_eq!(repo.ddl_const, "EVENT_TABLE_DDL");
    }

    #[test]
    fn test_unresolved_relationship_fails_before_elements() {
        let spec = Specification::new(ProjectConfig::new("shop", "microservice")).with_entity(
            EntitySpec::new("Order").with_relationship(RelationshipSpec::new(
                "items",
                Cardinality::OneToMany,
                "OrderItem",
            )),
        );
        let err = Dispatcher::new(&spec, &StubMapper, &[]).dispatch().unwrap_err();
        assert!(matches!(
            err,
            SpecificationError::UnresolvedRelationship { ref target, .. } if target == "OrderItem"
        ));
    }

    #[test]
    fn test_duplicate_members() {
        let spec = Specification::new(ProjectConfig::new("shop", "microservice")).with_entity(
            EntitySpec::new("Order")
                .with_field(FieldSpec::new("TotalAmount", "decimal"))
                .with_field(FieldSpec::new("total_amount", "decimal")),
        );
        let err = Dispatcher::new(&spec, &StubMapper, &[]).check().unwrap_err();
        assert!(matches!(err, SpecificationError::DuplicateField { .. }));

        let spec = Specification::new(ProjectConfig::new("shop", "microservice"))
            .with_entity(EntitySpec::new("order_item"))
            .with_entity(EntitySpec::new("OrderItem"));
        let err = Dispatcher::new(&spec, &StubMapper, &[]).check().unwrap_err();
        assert!(matches!(err, SpecificationError::DuplicateEntity { .. }));
    }
}
