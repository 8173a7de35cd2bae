use std::error::Error as _;

use serde_json::Value;
use tera::{Context, Tera};

use super::{ParameterSchema, Parameters, TemplateSource};
use crate::TemplateError;

/// A parsed template ready to render.
#[derive(Debug)]
pub struct CompiledTemplate {
    slug: String,
    id: String,
    schema: ParameterSchema,
    /// Store version of the source this was compiled from
    version: u64,
    tera: Tera,
}

impl CompiledTemplate {
    /// Parse the template text. Malformed syntax fails here, before any
    /// parameters are looked at.
    pub fn compile(source: &TemplateSource) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        // Generated source is not HTML.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&source.slug, &source.text)
            .map_err(|e| TemplateError::Syntax {
                slug: source.slug.clone(),
                message: error_chain(&e),
            })?;

        Ok(Self {
            slug: source.slug.clone(),
            id: source.id.clone(),
            schema: source.schema.clone(),
            version: source.version,
            tera,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Render with `params`.
    ///
    /// Every required parameter must be present and non-null; a missing
    /// one is an error, never an empty substitution.
    pub fn render(&self, params: &Parameters) -> Result<String, TemplateError> {
        for spec in self.schema.parameters() {
            match params.get(&spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(TemplateError::MissingParameter {
                        slug: self.slug.clone(),
                        name: spec.name.clone(),
                    });
                }
                Some(value) if !value.is_null() && !spec.kind.accepts(value) => {
                    return Err(TemplateError::InvalidParameter {
                        slug: self.slug.clone(),
                        name: spec.name.clone(),
                        expected: spec.kind.describe(),
                    });
                }
                _ => {}
            }
        }

        let context = Context::from_value(Value::Object(params.clone())).map_err(|e| {
            TemplateError::Render {
                slug: self.slug.clone(),
                message: error_chain(&e),
            }
        })?;

        self.tera
            .render(&self.slug, &context)
            .map_err(|e| TemplateError::Render {
                slug: self.slug.clone(),
                message: error_chain(&e),
            })
    }
}

/// Parse and render in one step.
pub fn render(
    slug: &str,
    text: &str,
    schema: &ParameterSchema,
    params: &Parameters,
) -> Result<String, TemplateError> {
    let source = TemplateSource::new(slug, text).with_schema(schema.clone());
    CompiledTemplate::compile(&source)?.render(params)
}

/// Tera reports the useful detail in the source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
