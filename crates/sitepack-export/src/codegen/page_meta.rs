//! `getPageMeta` generation.

use std::collections::HashMap;
use std::fmt::Write;

use sitepack_model::{DataSource, SYSTEM_VARIABLE_ID};

use super::expression::rewrite_expression;
use super::{PageContext, PageMetaGenerator, js_literal};
use crate::scope::Scope;

/// Emits the head metadata of a page.
///
/// Meta fields are expressions over the system variable, resource data and
/// variables. Variables are inlined with their initial value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPageMetaGenerator;

impl PageMetaGenerator for DefaultPageMetaGenerator {
    fn generate(&self, scope: &mut Scope, ctx: &PageContext<'_>) -> String {
        let page = ctx.page;
        let data_sources: HashMap<&str, &DataSource> = ctx
            .data_sources
            .iter()
            .map(|(id, data_source)| (id.as_str(), data_source))
            .collect();

        let mut resolve = |id: &str| -> Option<String> {
            if id == SYSTEM_VARIABLE_ID || page.system_data_source_id.as_deref() == Some(id) {
                return Some("system".to_owned());
            }
            match data_sources.get(id)? {
                DataSource::Variable { value, .. } => Some(js_literal(&value.value)),
                DataSource::Resource {
                    name, resource_id, ..
                } => Some(format!("resources[\"{}\"]", scope.name_for(resource_id, name))),
                DataSource::Parameter { .. } => None,
            }
        };
        let mut field = |expression: Option<&str>| match expression {
            Some(expression) => rewrite_expression(expression, &mut resolve),
            None => "undefined".to_owned(),
        };

        let meta = &page.meta;
        let title = field(Some(page.title.as_str()));
        let description = field(meta.description.as_deref());
        let exclude = field(meta.exclude_page_from_search.as_deref());
        let language = field(meta.language.as_deref());
        let social_image_url = field(meta.social_image_url.as_deref());
        let status = field(meta.status.as_deref());
        let redirect = field(meta.redirect.as_deref());
        let custom: Vec<(String, String)> = meta
            .custom
            .iter()
            .filter(|custom| !custom.property.trim().is_empty())
            .map(|custom| (js_literal(&custom.property), field(Some(custom.content.as_str()))))
            .collect();

        let social_image_asset = meta
            .social_image_asset_id
            .as_deref()
            .and_then(|id| ctx.assets.iter().find(|asset| asset.id == id))
            .map_or_else(|| "undefined".to_owned(), |asset| js_literal(&asset.name));

        let mut out = String::new();
        out.push_str("export const getPageMeta = ({\n");
        out.push_str("  system,\n");
        out.push_str("  resources,\n");
        out.push_str("}: {\n");
        out.push_str("  system: System;\n");
        out.push_str("  resources: Record<string, any>;\n");
        out.push_str("}): PageMeta => {\n");
        out.push_str("  return {\n");
        let _ = writeln!(out, "    title: {title},");
        let _ = writeln!(out, "    description: {description},");
        let _ = writeln!(out, "    excludePageFromSearch: {exclude},");
        let _ = writeln!(out, "    language: {language},");
        let _ = writeln!(out, "    socialImageAssetName: {social_image_asset},");
        let _ = writeln!(out, "    socialImageUrl: {social_image_url},");
        let _ = writeln!(out, "    status: {status},");
        let _ = writeln!(out, "    redirect: {redirect},");
        out.push_str("    custom: [\n");
        for (property, content) in custom {
            let _ = writeln!(out, "      {{ property: {property}, content: {content} }},");
        }
        out.push_str("    ],\n");
        out.push_str("  };\n");
        out.push_str("};\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;
    use sitepack_model::{CustomMeta, Page, Table};

    fn generate(page: &Page, data_sources: &Table<DataSource>) -> String {
        let data = sample_build();
        let ctx = PageContext {
            page,
            props: &Vec::new(),
            data_sources,
            resources: &Vec::new(),
            assets: &data.assets,
        };
        DefaultPageMetaGenerator.generate(&mut Scope::for_page(), &ctx)
    }

    #[test]
    fn test_home_meta() {
        let data = sample_build();

        let source = generate(&data.pages["home"], &Vec::new());

        assert_eq!(
            source,
            "export const getPageMeta = ({\n  system,\n  resources,\n}: {\n  system: System;\n  resources: Record<string, any>;\n}): PageMeta => {\n\
             \x20 return {\n\
             \x20   title: \"Home\",\n\
             \x20   description: \"Welcome to Acme\",\n\
             \x20   excludePageFromSearch: undefined,\n\
             \x20   language: \"en\",\n\
             \x20   socialImageAssetName: undefined,\n\
             \x20   socialImageUrl: undefined,\n\
             \x20   status: undefined,\n\
             \x20   redirect: undefined,\n\
             \x20   custom: [\n\
             \x20   ],\n\
             \x20 };\n\
             };\n"
        );
    }

    #[test]
    fn test_expressions_reference_system_resources_and_variables() {
        let data = sample_build();
        let data_sources: Table<DataSource> = data
            .build
            .data_sources
            .iter()
            .filter(|(id, _)| id == "ds-posts" || id == "ds-count")
            .cloned()
            .collect();
        let mut page = data.pages["home"].clone();
        page.title = "$ws$dataSource$ds__DASH__posts.data.title + $ws$dataSource$ds__DASH__count".to_owned();
        page.meta.status = Some("$ws$dataSource$home__DASH__system.params.code".to_owned());
        page.meta.social_image_asset_id = Some("img-hero".to_owned());
        page.meta.custom = vec![
            CustomMeta {
                property: "og:type".to_owned(),
                content: "\"website\"".to_owned(),
            },
            CustomMeta {
                property: " ".to_owned(),
                content: "\"dropped\"".to_owned(),
            },
        ];

        let source = generate(&page, &data_sources);

        assert!(source.contains("    title: resources[\"posts\"].data.title + 0,\n"));
        assert!(source.contains("    status: system.params.code,\n"));
        assert!(source.contains("    socialImageAssetName: \"hero.png\",\n"));
        assert!(source.contains("      { property: \"og:type\", content: \"website\" },\n"));
        assert!(!source.contains("dropped"));
    }
}
