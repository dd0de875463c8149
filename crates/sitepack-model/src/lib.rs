//! Project graph and build data model.
//!
//! Types mirror the camelCase JSON produced by the design tool's build store.
//! Build tables are ordered `(id, value)` pairs; entries that fail to parse are
//! dropped with a debug event rather than failing the whole document.

mod asset;
mod build;
mod data;
mod instance;
mod page;
mod style;
mod table;

pub use asset::{Asset, AssetKind, FontMeta, ImageMeta};
pub use build::{Build, BuildData, Deployment, User};
pub use data::{DataSource, Header, Resource, VariableValue};
pub use instance::{Instance, InstanceChild, PageRef, Prop, PropValue};
pub use page::{
    CompilerSettings, CustomMeta, Folder, Page, PageMeta, Pages, ProjectMeta, Redirect,
    is_pathname_pattern, page_path,
};
pub use style::{
    Breakpoint, ImageValue, MediaRange, StyleDecl, StyleSource, StyleSourceSelection, StyleValue,
    compare_media,
};
pub use table::Table;

/// Synthetic instance wrapping every page root.
pub const ROOT_INSTANCE_ID: &str = ":root";

/// Data source id of the global system variable.
pub const SYSTEM_VARIABLE_ID: &str = ":system";

/// Component rendered as a plain HTML element.
pub const ELEMENT_COMPONENT: &str = "ws:element";

/// Folder whose slug never contributes to page paths.
pub const ROOT_FOLDER_ID: &str = "root";
