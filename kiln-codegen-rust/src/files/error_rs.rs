use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};

use super::GENERATED_HEADER;

/// Error type shared by the generated repositories, services and handlers.
pub struct ErrorRs;

impl ProjectFile for ErrorRs {
    fn path(&self) -> PathBuf {
        PathBuf::from("src/error.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        r#"//! Errors returned by generated code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{entity} with the same `{field}` already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
"#
        .to_string()
    }
}
