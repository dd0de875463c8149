//! Static site assembly.
//!
//! [`StaticSiteBuilder`] turns one [`BuildData`] into the files of a
//! prerendered React app and packs them into a ZIP archive.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sitepack_archive::{ArchiveError, ArchiveOptions};
use sitepack_model::{
    BuildData, DataSource, ELEMENT_COMPONENT, InstanceChild, MediaRange, Prop, SYSTEM_VARIABLE_ID,
    compare_media, is_pathname_pattern, page_path,
};
use sitepack_vfs::{MemoryFs, VfsError, VirtualFile};

use crate::codegen::{
    ComponentContext, ComponentGenerator, CssContext, CssGenerator, DefaultComponentGenerator,
    DefaultCssGenerator, DefaultPageMetaGenerator, DefaultPropNormalizer,
    DefaultResourcesGenerator, DefaultSitemapGenerator, PageContext, PageMetaGenerator,
    PropContext, PropNormalizer, ResourcesGenerator, SitemapGenerator, js_literal,
};
use crate::form::replace_form_actions;
use crate::imports::{ImportTable, import_from};
use crate::markup::html_to_jsx;
use crate::partition::{PageData, Partitioner};
use crate::registry::{
    ComponentMeta, ComponentRegistry, FrameworkMeta, core_metas, is_core_component,
    split_descriptor,
};
use crate::route::{FileRoutes, RouteGenerator, vike_route};
use crate::scope::Scope;
use crate::templates::{
    CONSTANTS_MJS, CONSTANTS_PATH, CSS_PATH, ConstantsVars, DATA_TS, GENERATED_DIR, HEAD_TSX,
    ImportVars, ON_RENDER_HTML, ON_RENDER_HTML_PATH, PAGE_TSX, RendererVars, SCAFFOLD,
};

/// Default URL prefix for asset files.
pub const DEFAULT_ASSET_BASE_URL: &str = "/assets/";

const MODULE_HEADER: &str = "/* eslint-disable */\n/* Generated from the published build. Do not edit. */\n";

const CUSTOM_CODE_HELPERS: &str = r"
const Script = ({children, ...props}: Record<string, string | boolean>) => {
  if (children == null) {
    return <script {...props} />;
  }

  return <script {...props} dangerouslySetInnerHTML={{__html: children}} />;
};
const Style = ({children, ...props}: Record<string, string | boolean>) => {
  if (children == null) {
    return <style {...props} />;
  }

  return <style {...props} dangerouslySetInnerHTML={{__html: children}} />;
};
";

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Prefix prepended to asset file names. Ends with `/`.
    pub asset_base_url: String,
    pub archive: ArchiveOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_owned(),
            archive: ArchiveOptions::default(),
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn with_asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.asset_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_archive(mut self, archive: ArchiveOptions) -> Self {
        self.archive = archive;
        self
    }
}

/// Error aborting a generation run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Virtual filesystem error: {0}")]
    Vfs(#[from] VfsError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct StaticExport {
    /// Generated files in path order.
    pub files: Vec<VirtualFile>,
    /// ZIP archive of `files`.
    pub archive: Vec<u8>,
}

/// Generates a static site from build data.
///
/// Each generation stage is a replaceable collaborator; [`Default`] wires
/// in the built-in ones.
///
/// # Example
///
/// ```ignore
/// use sitepack_export::{BuildConfig, StaticSiteBuilder};
///
/// let builder = StaticSiteBuilder::new(BuildConfig::default());
/// let export = builder.build(&data).await?;
/// std::fs::write("site.zip", &export.archive)?;
/// ```
pub struct StaticSiteBuilder {
    config: BuildConfig,
    registry: ComponentRegistry,
    props: Box<dyn PropNormalizer>,
    components: Box<dyn ComponentGenerator>,
    resources: Box<dyn ResourcesGenerator>,
    page_meta: Box<dyn PageMetaGenerator>,
    css: Box<dyn CssGenerator>,
    sitemap: Box<dyn SitemapGenerator>,
    routes: Box<dyn RouteGenerator>,
}

impl Default for StaticSiteBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

impl StaticSiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            registry: ComponentRegistry::default(),
            props: Box::new(DefaultPropNormalizer),
            components: Box::new(DefaultComponentGenerator),
            resources: Box::new(DefaultResourcesGenerator),
            page_meta: Box::new(DefaultPageMetaGenerator),
            css: Box::new(DefaultCssGenerator),
            sitemap: Box::new(DefaultSitemapGenerator),
            routes: Box::new(FileRoutes),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Replace the component registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_prop_normalizer(mut self, normalizer: impl PropNormalizer + 'static) -> Self {
        self.props = Box::new(normalizer);
        self
    }

    #[must_use]
    pub fn with_component_generator(mut self, generator: impl ComponentGenerator + 'static) -> Self {
        self.components = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_resources_generator(mut self, generator: impl ResourcesGenerator + 'static) -> Self {
        self.resources = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_page_meta_generator(mut self, generator: impl PageMetaGenerator + 'static) -> Self {
        self.page_meta = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_css_generator(mut self, generator: impl CssGenerator + 'static) -> Self {
        self.css = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_sitemap_generator(mut self, generator: impl SitemapGenerator + 'static) -> Self {
        self.sitemap = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_route_generator(mut self, generator: impl RouteGenerator + 'static) -> Self {
        self.routes = Box::new(generator);
        self
    }

    /// Generate the site files and pack them.
    pub async fn build(&self, data: &BuildData) -> Result<StaticExport, BuildError> {
        let files = self.generate_files(data)?.into_files();
        let archive = sitepack_archive::pack(files.clone(), self.config.archive.clone()).await?;
        tracing::info!(
            project_id = %data.build.project_id,
            files = files.len(),
            bytes = archive.len(),
            "Generated static site"
        );
        Ok(StaticExport { files, archive })
    }

    /// Generate the site files without packing them.
    pub fn generate_files(&self, data: &BuildData) -> Result<MemoryFs, BuildError> {
        let span = tracing::info_span!("generate_static_site", project_id = %data.build.project_id);
        let _guard = span.enter();

        let mut fs = MemoryFs::new();
        self.write_scaffold(&mut fs)?;

        let framework = FrameworkMeta::from_registry(&self.registry);
        let asset_base_url = self.config.asset_base_url.as_str();

        let raw_props: Vec<Prop> = data.build.props.iter().map(|(_, prop)| prop.clone()).collect();
        let props = self.props.normalize(
            &raw_props,
            &PropContext {
                assets: &data.assets,
                asset_base_url,
                pages: &data.build.pages,
            },
        );

        let partitioner = Partitioner::new(data, &props);
        let mut used_metas = core_metas();
        let mut partitions = Vec::with_capacity(data.pages.len());
        for page in data.pages.values() {
            let page_data = partitioner.partition(page);
            for (_, instance) in &page_data.instances {
                if let Some(meta) = framework.metas.get(&instance.component) {
                    used_metas.insert(instance.component.clone(), meta.clone());
                }
            }
            partitions.push(page_data);
        }

        let css = self.css.generate(&CssContext {
            instances: &data.build.instances,
            assets: &data.assets,
            breakpoints: &data.build.breakpoints,
            styles: &data.build.styles,
            style_source_selections: &data.build.style_source_selections,
            metas: &used_metas,
            asset_base_url,
            atomic: data.build.pages.atomic_styles(),
        });
        fs.write(CSS_PATH, css.css)?;

        let site = SiteContext {
            data,
            framework: &framework,
            used_metas: &used_metas,
            classes: &css.classes,
        };
        for page_data in partitions {
            self.write_page(&mut fs, &site, page_data)?;
        }

        let sitemap = self
            .sitemap
            .generate(&data.build.pages, &data.build.updated_at);
        let sitemap = serde_json::to_string_pretty(&sitemap).unwrap_or_else(|_| "[]".to_owned());
        fs.write(
            &format!("{GENERATED_DIR}/$resources.sitemap.xml.ts"),
            format!("export const sitemap = {sitemap};"),
        )?;

        for redirect in &data.build.pages.redirects {
            let route = self.routes.route_name(&redirect.old);
            fs.write(
                &format!("{GENERATED_DIR}/{route}.ts"),
                format!(
                    "export const url = {};\nexport const status = {};",
                    js_literal(&redirect.new),
                    redirect.status.unwrap_or(301)
                ),
            )?;
        }

        tracing::debug!(files = fs.len(), bytes = fs.total_size(), "Generated site files");
        Ok(fs)
    }

    fn write_scaffold(&self, fs: &mut MemoryFs) -> Result<(), VfsError> {
        for (path, content) in SCAFFOLD {
            fs.write(path, content)?;
        }
        fs.write(
            CONSTANTS_PATH,
            CONSTANTS_MJS.render(&ConstantsVars {
                asset_base_url: &self.config.asset_base_url,
            }),
        )?;
        let home_client = format!("{GENERATED_DIR}/{}", self.routes.route_name("/"));
        fs.write(
            ON_RENDER_HTML_PATH,
            ON_RENDER_HTML.render(&RendererVars {
                home_client: &import_from(&home_client, ON_RENDER_HTML_PATH),
            }),
        )
    }

    fn write_page(&self, fs: &mut MemoryFs, site: &SiteContext<'_>, page_data: PageData) -> Result<(), VfsError> {
        let data = site.data;
        let page = &page_data.page;
        let path = page_path(&page.id, &data.build.pages);
        if is_pathname_pattern(&path) {
            tracing::debug!(page_id = %page.id, path = %path, "Skipping dynamic page");
            return Ok(());
        }
        tracing::debug!(page_id = %page.id, path = %path, "Generating page");

        let mut instances = page_data.instances;
        let mut root_instance_id = page.root_instance_id.clone();
        if page.is_xml() {
            let first_child = instances
                .iter()
                .find(|(id, _)| *id == root_instance_id)
                .and_then(|(_, body)| body.children.first());
            if let Some(InstanceChild::Id { value }) = first_child {
                root_instance_id = value.clone();
            }
            instances.retain(|(_, instance)| {
                is_core_component(&instance.component)
                    || site
                        .used_metas
                        .get(&instance.component)
                        .is_some_and(|meta| meta.category == "xml")
            });
        }

        let mut scope = Scope::for_page();
        let mut imports = ImportTable::new();
        for (_, instance) in &instances {
            let (id, descriptor) = if instance.component == ELEMENT_COMPONENT {
                let Some(descriptor) = instance
                    .tag
                    .as_deref()
                    .and_then(|tag| site.framework.tags.get(tag))
                else {
                    continue;
                };
                (descriptor.as_str(), descriptor)
            } else {
                let Some(descriptor) = site.framework.components.get(&instance.component) else {
                    continue;
                };
                (instance.component.as_str(), descriptor)
            };
            if let Some((module, specifier)) = split_descriptor(descriptor) {
                imports.add(module, id, specifier);
            }
        }
        let import_lines = imports.render(|id, specifier| scope.name_for(id, specifier));

        let mut props = page_data.props;
        let mut resources = page_data.resources;
        replace_form_actions(&instances, &mut props, &mut resources);

        let mut parameters = Vec::with_capacity(2);
        for id in [page.system_data_source_id.as_deref(), Some(SYSTEM_VARIABLE_ID)]
            .into_iter()
            .flatten()
        {
            parameters.push(DataSource::Parameter {
                id: id.to_owned(),
                scope_instance_id: None,
                name: "system".to_owned(),
            });
        }

        let component = self.components.generate(
            &mut scope,
            &ComponentContext {
                name: "Page",
                root_instance_id: &root_instance_id,
                parameters: &parameters,
                instances: &instances,
                props: &props,
                data_sources: &page_data.data_sources,
                classes: site.classes,
                framework: site.framework,
            },
        );

        let client = client_module(
            data,
            &import_lines,
            &page_data.font_assets,
            &page_data.background_image_assets,
            path == "/",
            &component,
        );

        let page_ctx = PageContext {
            page,
            props: &props,
            data_sources: &page_data.data_sources,
            resources: &resources,
            assets: &data.assets,
        };
        let resources_source = self.resources.generate(&mut scope, &page_ctx);
        let page_meta_source = self.page_meta.generate(&mut scope, &page_ctx);
        let mut server = String::from(MODULE_HEADER);
        server.push_str("\nimport type { PageMeta } from \"@webstudio-is/sdk\";\n");
        server.push_str(&resources_source);
        server.push('\n');
        server.push_str(&page_meta_source);
        server.push('\n');
        server.push_str(&self.routes.params_extractor(&page.path));
        let _ = writeln!(server, "\nexport const contactEmail = {};", optional_literal(contact_email(data)));

        let route = self.routes.route_name(&path);
        let client_path = format!("{GENERATED_DIR}/{route}");
        let server_path = format!("{client_path}.server");
        fs.write(&format!("{client_path}.tsx"), client)?;
        fs.write(&format!("{server_path}.tsx"), server)?;

        let vike = vike_route(&path);
        for (file, template) in [("+Page.tsx", PAGE_TSX), ("+Head.tsx", HEAD_TSX), ("+data.ts", DATA_TS)] {
            let shell = format!("pages/{vike}/{file}");
            let vars = ImportVars::relative_to(&shell, &client_path, &server_path);
            fs.write(&shell, template.render(&vars))?;
        }
        Ok(())
    }
}

/// Site-wide tables shared by every page.
struct SiteContext<'a> {
    data: &'a BuildData,
    framework: &'a FrameworkMeta,
    used_metas: &'a HashMap<String, ComponentMeta>,
    classes: &'a HashMap<String, Vec<String>>,
}

#[derive(Serialize)]
struct BreakpointEntry<'a> {
    id: &'a str,
    #[serde(flatten)]
    range: MediaRange,
}

fn client_module(
    data: &BuildData,
    import_lines: &str,
    font_assets: &[String],
    background_image_assets: &[String],
    is_root: bool,
    component: &str,
) -> String {
    let project_meta = data.build.pages.meta.as_ref();
    let site_name = project_meta.and_then(|meta| meta.site_name.as_deref());
    let favicon = project_meta
        .and_then(|meta| meta.favicon_asset_id.as_deref())
        .and_then(|id| data.assets.iter().find(|asset| asset.id == id))
        .map(|asset| asset.name.as_str());

    let mut breakpoints: Vec<BreakpointEntry<'_>> = data
        .build
        .breakpoints
        .iter()
        .map(|(_, breakpoint)| BreakpointEntry {
            id: &breakpoint.id,
            range: breakpoint.media_range(),
        })
        .collect();
    breakpoints.sort_by(|a, b| compare_media(&a.range, &b.range));

    let mut out = String::from(MODULE_HEADER);
    out.push_str("\nimport { Fragment, useState } from \"react\";\n");
    out.push_str("import { useResource, useVariableState } from \"@webstudio-is/react-sdk/runtime\";\n");
    out.push_str(import_lines);
    let _ = writeln!(out, "\nexport const projectId = {};", js_literal(&data.build.project_id));
    let _ = writeln!(
        out,
        "\nexport const lastPublished = {};",
        js_literal(&iso_timestamp(&data.build.created_at))
    );
    let _ = writeln!(out, "\nexport const siteName = {};", optional_literal(site_name));
    let _ = writeln!(out, "\nexport const breakpoints = {};", js_literal(&breakpoints));
    let _ = writeln!(
        out,
        "\nexport const favIconAsset: string | undefined =\n  {};",
        optional_literal(favicon)
    );
    out.push_str("\n// Font assets on current page (can be preloaded)\n");
    let _ = writeln!(out, "export const pageFontAssets: string[] =\n  {}", js_literal(font_assets));
    let _ = writeln!(
        out,
        "\nexport const pageBackgroundImageAssets: string[] =\n  {}",
        js_literal(background_image_assets)
    );

    if is_root {
        let code = project_meta
            .and_then(|meta| meta.code.as_deref())
            .filter(|code| !code.trim().is_empty());
        if code.is_some() {
            out.push_str(CUSTOM_CODE_HELPERS);
        }
        let jsx = code.map(html_to_jsx).unwrap_or_default();
        let _ = writeln!(out, "\nexport const CustomCode = () => {{\n  return (<>{jsx}</>);\n}}");
    }

    out.push('\n');
    out.push_str(component);
    out.push_str("\nexport { Page }\n");
    out
}

/// `created_at` as ISO-8601 UTC with milliseconds, or unchanged when unparsable.
fn iso_timestamp(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at).map_or_else(
        |_| created_at.to_owned(),
        |date| {
            date.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string()
        },
    )
}

fn contact_email(data: &BuildData) -> Option<&str> {
    data.build
        .pages
        .meta
        .as_ref()
        .and_then(|meta| meta.contact_email.as_deref())
        .filter(|email| !email.is_empty())
        .or_else(|| {
            data.user
                .as_ref()
                .and_then(|user| user.email.as_deref())
                .filter(|email| !email.is_empty())
        })
}

fn optional_literal(value: Option<&str>) -> String {
    value.map_or_else(|| "undefined".to_owned(), js_literal)
}
