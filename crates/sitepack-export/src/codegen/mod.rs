//! Code generation collaborators.
//!
//! Each stage of page generation sits behind a trait so it can be replaced.
//! The `Default*` types are the built-in implementations.

mod component;
mod css;
mod expression;
mod page_meta;
mod props;
mod resources;
mod sitemap;

use std::collections::HashMap;

use serde::Serialize;
use sitepack_model::{
    Asset, Breakpoint, DataSource, Instance, Page, Pages, Prop, Resource, StyleDecl,
    StyleSourceSelection, Table,
};

use crate::registry::{ComponentMeta, FrameworkMeta};
use crate::scope::Scope;

pub use component::DefaultComponentGenerator;
pub use css::{DefaultCssGenerator, css_property};
pub use expression::{decode_data_source_id, rewrite_expression};
pub use page_meta::DefaultPageMetaGenerator;
pub use props::DefaultPropNormalizer;
pub use resources::DefaultResourcesGenerator;
pub use sitemap::DefaultSitemapGenerator;

/// Inputs for prop normalization.
pub struct PropContext<'a> {
    pub assets: &'a [Asset],
    pub asset_base_url: &'a str,
    pub pages: &'a Pages,
}

/// Rewrites asset and page references into plain values.
pub trait PropNormalizer: Send + Sync {
    fn normalize(&self, props: &[Prop], ctx: &PropContext<'_>) -> Vec<Prop>;
}

/// Inputs for generating a page component.
pub struct ComponentContext<'a> {
    /// Name of the generated component.
    pub name: &'a str,
    pub root_instance_id: &'a str,
    /// Parameters passed through the component's props.
    pub parameters: &'a [DataSource],
    pub instances: &'a Table<Instance>,
    pub props: &'a Table<Prop>,
    pub data_sources: &'a Table<DataSource>,
    /// Instance id to generated class names.
    pub classes: &'a HashMap<String, Vec<String>>,
    pub framework: &'a FrameworkMeta,
}

/// Emits the React component rendering a page tree.
pub trait ComponentGenerator: Send + Sync {
    fn generate(&self, scope: &mut Scope, ctx: &ComponentContext<'_>) -> String;
}

/// Page-level inputs shared by the server module generators.
pub struct PageContext<'a> {
    pub page: &'a Page,
    pub props: &'a Table<Prop>,
    pub data_sources: &'a Table<DataSource>,
    pub resources: &'a Table<Resource>,
    pub assets: &'a [Asset],
}

/// Emits `getResources`, the page's data loader.
pub trait ResourcesGenerator: Send + Sync {
    fn generate(&self, scope: &mut Scope, ctx: &PageContext<'_>) -> String;
}

/// Emits `getPageMeta`, the page's head metadata source.
pub trait PageMetaGenerator: Send + Sync {
    fn generate(&self, scope: &mut Scope, ctx: &PageContext<'_>) -> String;
}

/// Inputs for the global stylesheet.
pub struct CssContext<'a> {
    pub instances: &'a Table<Instance>,
    pub assets: &'a [Asset],
    pub breakpoints: &'a Table<Breakpoint>,
    pub styles: &'a Table<StyleDecl>,
    pub style_source_selections: &'a Table<StyleSourceSelection>,
    /// Metadata of components used by generated pages.
    pub metas: &'a HashMap<String, ComponentMeta>,
    pub asset_base_url: &'a str,
    pub atomic: bool,
}

/// Generated stylesheet and the classes each instance must carry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CssOutput {
    pub css: String,
    pub classes: HashMap<String, Vec<String>>,
}

/// Emits the global stylesheet.
pub trait CssGenerator: Send + Sync {
    fn generate(&self, ctx: &CssContext<'_>) -> CssOutput;
}

/// One sitemap entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub path: String,
    pub last_modified: String,
}

/// Lists the pages that belong in the sitemap.
pub trait SitemapGenerator: Send + Sync {
    fn generate(&self, pages: &Pages, updated_at: &str) -> Vec<SitemapEntry>;
}

/// JavaScript literal for a JSON value.
pub(crate) fn js_literal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "undefined".to_owned())
}
