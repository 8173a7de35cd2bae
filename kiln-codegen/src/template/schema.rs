use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected shape of a parameter value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    #[default]
    Any,
    String,
    Boolean,
    Number,
    List,
    Object,
}

impl ParameterKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParameterKind::Any => true,
            ParameterKind::String => value.is_string(),
            ParameterKind::Boolean => value.is_boolean(),
            ParameterKind::Number => value.is_number(),
            ParameterKind::List => value.is_array(),
            ParameterKind::Object => value.is_object(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ParameterKind::Any => "any value",
            ParameterKind::String => "a string",
            ParameterKind::Boolean => "a boolean",
            ParameterKind::Number => "a number",
            ParameterKind::List => "a list",
            ParameterKind::Object => "an object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }
}

/// Parameters a template declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    parameters: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn new(parameters: Vec<ParameterSpec>) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn required(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }
}
