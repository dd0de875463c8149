//! Data sources and resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named reactive value scoped to an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum DataSource {
    Variable {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope_instance_id: Option<String>,
        name: String,
        value: VariableValue,
    },
    Parameter {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope_instance_id: Option<String>,
        name: String,
    },
    Resource {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope_instance_id: Option<String>,
        name: String,
        resource_id: String,
    },
}

impl DataSource {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Variable { id, .. } | Self::Parameter { id, .. } | Self::Resource { id, .. } => id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Variable { name, .. }
            | Self::Parameter { name, .. }
            | Self::Resource { name, .. } => name,
        }
    }

    /// Instance the data source is scoped to, if any.
    #[must_use]
    pub fn scope_instance_id(&self) -> Option<&str> {
        match self {
            Self::Variable {
                scope_instance_id, ..
            }
            | Self::Parameter {
                scope_instance_id, ..
            }
            | Self::Resource {
                scope_instance_id, ..
            } => scope_instance_id.as_deref(),
        }
    }

    /// Resource id when this is a resource data source.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Resource { resource_id, .. } => Some(resource_id),
            _ => None,
        }
    }
}

/// Initial value of a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableValue {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

/// A declarative fetch definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    /// HTTP method in lower case.
    pub method: String,
    /// Expression producing the request URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_params: Vec<Header>,
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Expression producing the request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Name and expression pair used for headers and search params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    /// Expression producing the value.
    pub value: String,
}
