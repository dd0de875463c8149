//! Static site generation for sitepack.
//!
//! This crate provides:
//! - [`StaticSiteBuilder`]: turns a published build into a prerendered React app
//! - [`Partitioner`]: the per-page slice of the project graph
//! - [`codegen`]: replaceable code generation stages
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn run(json: &str) -> Result<(), Box<dyn std::error::Error>> {
//! use sitepack_export::{BuildConfig, StaticSiteBuilder};
//! use sitepack_model::BuildData;
//!
//! let data = BuildData::from_json(json)?;
//! let builder = StaticSiteBuilder::new(BuildConfig::default());
//! let export = builder.build(&data).await?;
//! std::fs::write("site.zip", &export.archive)?;
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod codegen;
mod form;
mod imports;
mod markup;
mod partition;
mod registry;
mod route;
mod scope;
mod templates;
#[cfg(test)]
mod testing;

pub use builder::{BuildConfig, BuildError, DEFAULT_ASSET_BASE_URL, StaticExport, StaticSiteBuilder};
pub use form::replace_form_actions;
pub use imports::{ImportTable, import_from};
pub use markup::html_to_jsx;
pub use partition::{InstanceArena, PageData, Partitioner};
pub use registry::{
    ComponentEntry, ComponentMeta, ComponentRegistry, FrameworkMeta, Library, RegistryError,
    is_core_component,
};
pub use route::{FileRoutes, RouteGenerator, params_extractor, route_name, vike_route};
pub use scope::{RESERVED_IDENTIFIERS, Scope, normalize_identifier};
pub use sitepack_archive::ArchiveOptions;
