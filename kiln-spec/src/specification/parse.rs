//! Specification parsing from files and strings.

use std::{collections::HashSet, path::Path, str::FromStr};

use kiln_core::{to_pascal_case, to_snake_case};

use super::{Specification, validate::ParseContext};
use crate::{
    ConstraintKind, EntitySpec, Error, FieldReference, FieldSpec, KeySide, Result,
    error::SourceContext,
};

impl FromStr for Specification {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_specification(s, "kiln.toml")
    }
}

impl Specification {
    /// Parse a kiln.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_specification(&content, &path.display().to_string())
    }

    /// Parse a kiln.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_specification(content, filename)
    }
}

/// Parse a specification from content with the given filename for error reporting.
pub fn parse_specification(content: &str, filename: &str) -> Result<Specification> {
    let source_ctx = SourceContext::new(content, filename);
    let spec: Specification = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_specification(&spec, &ParseContext::new(content, filename))?;
    Ok(spec)
}

fn validate_specification<'a>(spec: &'a Specification, ctx: &ParseContext<'a>) -> Result<()> {
    let errors = ctx.source_context();

    if spec.project.name.trim().is_empty() {
        return Err(errors.validation_error("project name cannot be empty", None));
    }
    if spec.project.archetype.trim().is_empty() {
        return Err(errors.validation_error(
            "project archetype cannot be empty",
            ctx.find_value_span("archetype", ""),
        ));
    }
    ctx.push("project")
        .validate_name(&spec.project.module_name(), "module")?;

    let mut seen = HashSet::new();
    for entity in &spec.entities {
        ctx.validate_name(&entity.name, "entity")?;
        if !seen.insert(to_pascal_case(&entity.name)) {
            return Err(errors.duplicate_error(
                "entity",
                &entity.name,
                ctx.find_last_span(&entity.name),
            ));
        }
    }

    for entity in &spec.entities {
        validate_entity(spec, entity, &ctx.push(&entity.name))?;
    }

    Ok(())
}

fn validate_entity(spec: &Specification, entity: &EntitySpec, ctx: &ParseContext) -> Result<()> {
    let errors = ctx.source_context();

    // Fields and relationships share the struct's member namespace.
    let mut members = HashSet::new();

    for field in &entity.fields {
        ctx.validate_member_name(&field.name, "field")?;
        if !members.insert(to_snake_case(&field.name)) {
            return Err(errors.duplicate_error(
                format!("field in '{}'", entity.name),
                &field.name,
                ctx.find_last_span(&field.name),
            ));
        }
        validate_field(spec, entity, field, ctx)?;
    }

    for rel in &entity.relationships {
        ctx.validate_member_name(&rel.name, "relationship")?;
        if !members.insert(to_snake_case(&rel.name)) {
            return Err(errors.duplicate_error(
                format!("member in '{}'", entity.name),
                &rel.name,
                ctx.find_last_span(&rel.name),
            ));
        }

        let Some(target) = spec.entity(&rel.target) else {
            return Err(errors.unresolved_error(
                format!("{}.{}", entity.name, rel.name),
                &rel.target,
                ctx.find_value_span("target", &rel.target),
            ));
        };

        if let Some(fk) = &rel.foreign_key {
            let holder = match rel.kind.key_side() {
                KeySide::Owner => Some(entity),
                KeySide::Target => Some(target),
                KeySide::JoinTable => None,
            };
            if let Some(holder) = holder
                && holder.field(fk).is_none()
            {
                return Err(errors.unknown_field_error(
                    &holder.name,
                    fk,
                    format!("foreign key of relationship '{}'", rel.name),
                    ctx.find_value_span("foreign_key", fk),
                ));
            }
        }
    }

    let mut names = HashSet::new();
    for constraint in &entity.constraints {
        if !names.insert(constraint.name.as_str()) {
            return Err(errors.duplicate_error(
                "constraint",
                &constraint.name,
                ctx.find_last_span(&constraint.name),
            ));
        }
        if constraint.fields.is_empty() && constraint.kind != ConstraintKind::Check {
            return Err(errors.validation_error(
                format!("constraint '{}' must list at least one field", constraint.name),
                ctx.find_span(&constraint.name),
            ));
        }
        check_fields_exist(entity, &constraint.fields, "constraint", ctx)?;

        match constraint.kind {
            ConstraintKind::Check if constraint.expression.is_none() => {
                return Err(errors.validation_error(
                    format!("check constraint '{}' needs an expression", constraint.name),
                    ctx.find_span(&constraint.name),
                ));
            }
            ConstraintKind::ForeignKey => {
                let Some(reference) = &constraint.references else {
                    return Err(errors.validation_error(
                        format!(
                            "foreign-key constraint '{}' needs `references`",
                            constraint.name
                        ),
                        ctx.find_span(&constraint.name),
                    ));
                };
                check_reference(spec, &constraint.name, reference, ctx)?;
            }
            _ => {}
        }
    }

    for index in &entity.indexes {
        if !names.insert(index.name.as_str()) {
            return Err(errors.duplicate_error(
                "index",
                &index.name,
                ctx.find_last_span(&index.name),
            ));
        }
        if index.fields.len() < index.kind.min_fields() {
            return Err(errors.validation_error(
                format!(
                    "index '{}' must cover at least {} field(s)",
                    index.name,
                    index.kind.min_fields()
                ),
                ctx.find_span(&index.name),
            ));
        }
        check_fields_exist(entity, &index.fields, "index", ctx)?;
    }

    Ok(())
}

fn validate_field(
    spec: &Specification,
    entity: &EntitySpec,
    field: &FieldSpec,
    ctx: &ParseContext,
) -> Result<()> {
    let errors = ctx.source_context();
    let span = ctx.find_span(&field.name);
    let owner = format!("{}.{}", entity.name, field.name);

    if field.logical_type.trim().is_empty() {
        return Err(errors.validation_error(format!("field '{owner}' has an empty type"), span));
    }

    if let (Some(min), Some(max)) = (field.min, field.max)
        && min > max
    {
        return Err(errors.validation_error(format!("field '{owner}' has min > max"), span));
    }
    if let (Some(min), Some(max)) = (field.min_length, field.max_length)
        && min > max
    {
        return Err(errors.validation_error(
            format!("field '{owner}' has min_length > max_length"),
            span,
        ));
    }

    if field.logical_type == "enum" && field.values.is_empty() {
        return Err(errors.validation_error(
            format!("enumerated field '{owner}' needs `values`"),
            span,
        ));
    }
    let mut variants = HashSet::new();
    for value in &field.values {
        let variant = to_pascal_case(value);
        if !variant.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(errors.validation_error(
                format!("enum value '{value}' of '{owner}' cannot be turned into a variant name"),
                ctx.find_quoted_span(value),
            ));
        }
        if !variants.insert(variant) {
            return Err(errors.duplicate_error(
                format!("enum value of '{owner}'"),
                value,
                ctx.find_quoted_span(value),
            ));
        }
    }

    if let Some(reference) = &field.references {
        check_reference(spec, &owner, reference, ctx)?;
    }

    Ok(())
}

fn check_reference(
    spec: &Specification,
    owner: &str,
    reference: &str,
    ctx: &ParseContext,
) -> Result<()> {
    let errors = ctx.source_context();
    let FieldReference { entity, field } = FieldReference::parse(reference);

    let Some(target) = spec.entity(&entity) else {
        return Err(errors.unresolved_error(
            owner,
            &entity,
            ctx.find_value_span("references", reference),
        ));
    };

    if let Some(field) = field
        && target.field(&field).is_none()
    {
        return Err(errors.unknown_field_error(
            &target.name,
            &field,
            format!("reference of '{owner}'"),
            ctx.find_value_span("references", reference),
        ));
    }

    Ok(())
}

fn check_fields_exist(
    entity: &EntitySpec,
    fields: &[String],
    kind: &str,
    ctx: &ParseContext,
) -> Result<()> {
    for name in fields {
        if entity.field(name).is_none() {
            return Err(ctx.source_context().unknown_field_error(
                &entity.name,
                name,
                ctx.context_for(kind),
                ctx.find_quoted_span(name),
            ));
        }
    }
    Ok(())
}
