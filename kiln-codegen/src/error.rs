use std::path::PathBuf;

use kiln_core::PathError;
use miette::Diagnostic;
use thiserror::Error;

/// Problems with the specification itself. Any of these aborts the
/// request before a single file is written.
#[derive(Debug, Error, Diagnostic)]
pub enum SpecificationError {
    #[error("relationship '{entity}.{relationship}' targets unknown entity '{target}'")]
    #[diagnostic(
        code(kiln::unresolved_relationship),
        help("declare an entity named '{target}' or fix the relationship target")
    )]
    UnresolvedRelationship {
        entity: String,
        relationship: String,
        target: String,
    },

    #[error("entity '{name}' is declared more than once")]
    #[diagnostic(code(kiln::duplicate_entity))]
    DuplicateEntity { name: String },

    #[error("entity '{entity}' declares member '{field}' more than once")]
    #[diagnostic(
        code(kiln::duplicate_field),
        help("member names are compared after snake_case conversion")
    )]
    DuplicateField { entity: String, field: String },

    #[error("unknown archetype '{name}'")]
    #[diagnostic(code(kiln::unknown_archetype), help("supported archetypes: {known}"))]
    UnknownArchetype { name: String, known: String },

    #[error("archetype '{archetype}' has no binary to build")]
    #[diagnostic(
        code(kiln::build_without_binary),
        help("use compile mode 'check' or pick an archetype with a binary entry point")
    )]
    BuildWithoutBinary { archetype: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("no template with slug '{slug}'")]
    #[diagnostic(code(kiln::template::not_found))]
    NotFound { slug: String },

    #[error("template '{slug}' does not parse: {message}")]
    #[diagnostic(code(kiln::template::syntax))]
    Syntax { slug: String, message: String },

    #[error("template '{slug}' requires parameter '{name}'")]
    #[diagnostic(code(kiln::template::missing_parameter))]
    MissingParameter { slug: String, name: String },

    #[error("parameter '{name}' of template '{slug}' must be {expected}")]
    #[diagnostic(code(kiln::template::invalid_parameter))]
    InvalidParameter {
        slug: String,
        name: String,
        expected: &'static str,
    },

    #[error("failed to render template '{slug}': {message}")]
    #[diagnostic(code(kiln::template::render))]
    Render { slug: String, message: String },

    #[error("failed to load template from '{path}': {message}")]
    #[diagnostic(code(kiln::template::load))]
    Load { path: PathBuf, message: String },
}

/// Failures while writing the project tree.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to create directory '{path}'")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
