//! Built-in templates for the repository, service and handler layers.
//!
//! Each template is registered under the slug that
//! [`CodeElement::template`](kiln_codegen::CodeElement::template) names and
//! receives the element's declaration as parameters. A template directory
//! loaded at runtime overrides them slug by slug.

use kiln_codegen::template::{
    InMemoryTemplateStore, ParameterKind, ParameterSchema, ParameterSpec, TemplateSource,
};

pub const REPOSITORY_SLUG: &str = "repository";
pub const SERVICE_SLUG: &str = "service";
pub const HANDLER_SLUG: &str = "handler";

const REPOSITORY_TEMPLATE: &str = r###"//! In-memory storage for `{{ entity }}`.
{%- if key_field %}

use std::collections::BTreeMap;
{%- endif %}

use super::{{ interface }};
use crate::{
    error::{Error, Result},
    models::{{ entity }},
};

/// Schema of the `{{ table }}` table for a relational store.
pub const {{ ddl_const }}: &str = r##"{{ ddl }}"##;
{%- if key_field %}

/// `{{ interface }}` backed by an ordered map keyed on `{{ key_field }}`.
#[derive(Debug, Default)]
pub struct {{ name }} {
    rows: BTreeMap<{{ key_ty }}, {{ entity }}>,
}
{%- else %}

/// `{{ interface }}` backed by a vector; keys are row positions and are
/// never reused after a delete.
#[derive(Debug, Default)]
pub struct {{ name }} {
    rows: Vec<Option<{{ entity }}>>,
}
{%- endif %}

impl {{ name }} {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
{%- if key_field %}
        self.rows.len()
{%- else %}
        self.rows.iter().flatten().count()
{%- endif %}
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
{%- if unique_fields %}

    /// Reject `entity` when another row holds one of its unique values.
    fn ensure_unique(&self, entity: &{{ entity }}, skip: Option<&{{ key_ty }}>) -> Result<()> {
{%- if key_field %}
        for (key, row) in &self.rows {
            if skip == Some(key) {
                continue;
            }
{%- else %}
        for (key, row) in self.rows.iter().enumerate() {
            let Some(row) = row else {
                continue;
            };
            if skip == Some(&key) {
                continue;
            }
{%- endif %}
{%- for unique in unique_fields %}
{%- if unique.optional %}
            if entity.{{ unique.ident }}.is_some() && row.{{ unique.ident }} == entity.{{ unique.ident }} {
{%- else %}
            if row.{{ unique.ident }} == entity.{{ unique.ident }} {
{%- endif %}
                return Err(Error::Conflict {
                    entity: "{{ entity }}",
                    field: "{{ unique.ident }}",
                });
            }
{%- endfor %}
        }
        Ok(())
    }
{%- endif %}
}

impl {{ interface }} for {{ name }} {
    fn insert(&mut self, entity: {{ entity }}) -> Result<{{ key_ty }}> {
{%- if unique_fields %}
        self.ensure_unique(&entity, None)?;
{%- endif %}
{%- if key_field %}
        let key = entity.{{ key_field }}.clone();
        if self.rows.contains_key(&key) {
            return Err(Error::Conflict {
                entity: "{{ entity }}",
                field: "{{ key_field }}",
            });
        }
        self.rows.insert(key.clone(), entity);
        Ok(key)
{%- else %}
        self.rows.push(Some(entity));
        Ok(self.rows.len() - 1)
{%- endif %}
    }

    fn get(&self, key: &{{ key_ty }}) -> Result<{{ entity }}> {
{%- if key_field %}
        self.rows.get(key).cloned()
{%- else %}
        self.rows.get(*key).and_then(Option::as_ref).cloned()
{%- endif %}
            .ok_or(Error::NotFound { entity: "{{ entity }}" })
    }

    fn list(&self) -> Result<Vec<{{ entity }}>> {
{%- if key_field %}
        Ok(self.rows.values().cloned().collect())
{%- else %}
        Ok(self.rows.iter().flatten().cloned().collect())
{%- endif %}
    }

    fn update(&mut self, key: &{{ key_ty }}, entity: {{ entity }}) -> Result<{{ entity }}> {
{%- if key_field %}
        if entity.{{ key_field }} != *key {
            return Err(Error::InvalidKey(format!("{:?}", entity.{{ key_field }})));
        }
{%- endif %}
{%- if unique_fields %}
        self.ensure_unique(&entity, Some(key))?;
{%- endif %}
{%- if key_field %}
        let slot = self.rows.get_mut(key);
{%- else %}
        let slot = self.rows.get_mut(*key).and_then(Option::as_mut);
{%- endif %}
        match slot {
            Some(row) => {
                *row = entity.clone();
                Ok(entity)
            }
            None => Err(Error::NotFound { entity: "{{ entity }}" }),
        }
    }

    fn delete(&mut self, key: &{{ key_ty }}) -> Result<{{ entity }}> {
{%- if key_field %}
        self.rows.remove(key)
{%- else %}
        self.rows.get_mut(*key).and_then(Option::take)
{%- endif %}
            .ok_or(Error::NotFound { entity: "{{ entity }}" })
    }
}
"###;

const SERVICE_TEMPLATE: &str = r###"//! Business operations for `{{ entity }}`.

use validator::Validate;

use crate::{
    error::Result,
    models::{{ entity }},
    repositories::{{ interface }},
};

/// Validates `{{ entity }}` values before they reach a `{{ interface }}`.
#[derive(Debug)]
pub struct {{ name }}<R> {
    repository: R,
}

impl<R: {{ interface }}> {{ name }}<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn create(&mut self, entity: {{ entity }}) -> Result<{{ key_ty }}> {
        entity.validate()?;
        self.repository.insert(entity)
    }

    pub fn get(&self, key: &{{ key_ty }}) -> Result<{{ entity }}> {
        self.repository.get(key)
    }

    pub fn list(&self) -> Result<Vec<{{ entity }}>> {
        self.repository.list()
    }

    pub fn update(&mut self, key: &{{ key_ty }}, entity: {{ entity }}) -> Result<{{ entity }}> {
        entity.validate()?;
        self.repository.update(key, entity)
    }

    pub fn delete(&mut self, key: &{{ key_ty }}) -> Result<{{ entity }}> {
        self.repository.delete(key)
    }
}
"###;

const HANDLER_TEMPLATE: &str = r###"//! JSON handlers for `{{ entity }}`.
//!
//! Handlers take a request body or a path key as text and answer with a
//! JSON value; transport is left to the caller.

use serde_json::Value;

use crate::{
    error::{Error, Result},
    models::{{ entity }},
    repositories::{{ interface }},
    services::{{ service }},
};

fn parse_key(raw: &str) -> Result<{{ key_ty }}> {
    raw.parse().map_err(|_| Error::InvalidKey(raw.to_string()))
}

pub fn create_{{ item }}<R: {{ interface }}>(service: &mut {{ service }}<R>, body: &str) -> Result<Value> {
    let entity: {{ entity }} = serde_json::from_str(body)?;
    let key = service.create(entity)?;
    Ok(serde_json::to_value(key)?)
}

pub fn get_{{ item }}<R: {{ interface }}>(service: &{{ service }}<R>, key: &str) -> Result<Value> {
    let entity = service.get(&parse_key(key)?)?;
    Ok(serde_json::to_value(entity)?)
}

pub fn list_{{ collection }}<R: {{ interface }}>(service: &{{ service }}<R>) -> Result<Value> {
    Ok(serde_json::to_value(service.list()?)?)
}

pub fn update_{{ item }}<R: {{ interface }}>(
    service: &mut {{ service }}<R>,
    key: &str,
    body: &str,
) -> Result<Value> {
    let entity: {{ entity }} = serde_json::from_str(body)?;
    let updated = service.update(&parse_key(key)?, entity)?;
    Ok(serde_json::to_value(updated)?)
}

pub fn delete_{{ item }}<R: {{ interface }}>(service: &mut {{ service }}<R>, key: &str) -> Result<Value> {
    let deleted = service.delete(&parse_key(key)?)?;
    Ok(serde_json::to_value(deleted)?)
}
"###;

fn strings(names: &[&str]) -> Vec<ParameterSpec> {
    names
        .iter()
        .map(|name| ParameterSpec::required(*name, ParameterKind::String))
        .collect()
}

fn repository_schema() -> ParameterSchema {
    let mut params = strings(&[
        "name",
        "entity",
        "interface",
        "key_ty",
        "table",
        "ddl_const",
        "ddl",
    ]);
    params.push(ParameterSpec::optional("key_field", ParameterKind::String));
    params.push(ParameterSpec::required("unique_fields", ParameterKind::List));
    ParameterSchema::new(params)
}

/// The built-in templates, one per templated element kind.
pub fn builtin_templates() -> Vec<TemplateSource> {
    vec![
        TemplateSource::new(REPOSITORY_SLUG, REPOSITORY_TEMPLATE)
            .with_id("builtin/repository")
            .with_schema(repository_schema()),
        TemplateSource::new(SERVICE_SLUG, SERVICE_TEMPLATE)
            .with_id("builtin/service")
            .with_schema(ParameterSchema::new(
                strings(&["name", "entity", "interface", "key_ty"]),
            )),
        TemplateSource::new(HANDLER_SLUG, HANDLER_TEMPLATE)
            .with_id("builtin/handler")
            .with_schema(ParameterSchema::new(
                strings(&["entity", "item", "collection", "service", "interface", "key_ty"]),
            )),
    ]
}

/// A store seeded with [`builtin_templates`].
pub fn builtin_store() -> InMemoryTemplateStore {
    builtin_templates()
        .into_iter()
        .fold(InMemoryTemplateStore::new(), InMemoryTemplateStore::with)
}
