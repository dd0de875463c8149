//! Build snapshot and the generation input envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{Table, lenient, lenient_list, lenient_map};
use crate::{
    Asset, Breakpoint, DataSource, Instance, Page, Pages, Prop, Resource, StyleDecl, StyleSource,
    StyleSourceSelection,
};

/// A published snapshot of the project graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub project_id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient")]
    pub instances: Table<Instance>,
    #[serde(default, deserialize_with = "lenient")]
    pub props: Table<Prop>,
    #[serde(default, deserialize_with = "lenient")]
    pub data_sources: Table<DataSource>,
    #[serde(default, deserialize_with = "lenient")]
    pub resources: Table<Resource>,
    #[serde(default, deserialize_with = "lenient")]
    pub breakpoints: Table<Breakpoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub styles: Table<StyleDecl>,
    #[serde(default, deserialize_with = "lenient")]
    pub style_sources: Table<StyleSource>,
    #[serde(default, deserialize_with = "lenient")]
    pub style_source_selections: Table<StyleSourceSelection>,
    pub pages: Pages,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<Deployment>,
}

/// Where and under which name a build is published.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_domain: Option<String>,
}

impl Deployment {
    /// Whether this is a static export named `name`.
    #[must_use]
    pub fn is_static_named(&self, name: &str) -> bool {
        self.destination.as_deref() == Some("static") && self.name.as_deref() == Some(name)
    }
}

/// Owner of the project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub email: Option<String>,
}

/// Everything needed to generate one static site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    pub build: Build,
    /// Pages by id.
    #[serde(default, deserialize_with = "lenient_map")]
    pub pages: BTreeMap<String, Page>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub assets: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl BuildData {
    /// Parse build data from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse build data from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
