//! `getResources` generation.

use std::collections::HashMap;
use std::fmt::Write;

use sitepack_model::{DataSource, Header, PropValue, Resource, SYSTEM_VARIABLE_ID};

use super::expression::{referenced_ids, rewrite_expression};
use super::{PageContext, ResourcesGenerator, js_literal};
use crate::scope::Scope;

/// Emits the page's resource requests.
///
/// `getResources` returns two maps keyed by the same names the page
/// component passes to `useResource`: `data` for resources bound to data
/// sources and `action` for resources bound to props such as form actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResourcesGenerator;

impl ResourcesGenerator for DefaultResourcesGenerator {
    fn generate(&self, scope: &mut Scope, ctx: &PageContext<'_>) -> String {
        let mut local = Scope::new(["_props", "_data", "_action"]);
        let mut names: HashMap<String, String> = HashMap::new();
        let mut out = String::new();

        out.push_str("import type { System, ResourceRequest } from \"@webstudio-is/sdk\";\n");
        out.push_str("export const getResources = (_props: { system: System }) => {\n");

        let data_sources: HashMap<&str, &DataSource> = ctx
            .data_sources
            .iter()
            .map(|(id, data_source)| (id.as_str(), data_source))
            .collect();
        let system_ids = [ctx.page.system_data_source_id.as_deref(), Some(SYSTEM_VARIABLE_ID)];

        for id in ctx.resources.iter().flat_map(|(_, resource)| resource_ids(resource)) {
            if names.contains_key(&id) {
                continue;
            }
            if system_ids.contains(&Some(id.as_str())) {
                let name = local.name_for(&id, "system");
                let _ = writeln!(out, "  const {name} = _props.system;");
                names.insert(id, name);
            } else if let Some(DataSource::Variable { name, value, .. }) = data_sources.get(id.as_str()) {
                let name = local.name_for(&id, name);
                let _ = writeln!(out, "  let {name} = {};", js_literal(&value.value));
                names.insert(id, name);
            }
        }

        let mut consts: HashMap<&str, String> = HashMap::new();
        for (_, resource) in ctx.resources {
            let name = local.name_for(&resource.id, &resource.name);
            let resolve = |id: &str| names.get(id).cloned();
            let _ = writeln!(out, "  const {name}: ResourceRequest = {{");
            let _ = writeln!(out, "    id: {},", js_literal(&resource.id));
            let _ = writeln!(out, "    name: {},", js_literal(&resource.name));
            let _ = writeln!(out, "    url: {},", rewrite_expression(&resource.url, resolve));
            let _ = writeln!(out, "    method: {},", js_literal(&resource.method));
            write_pairs(&mut out, "searchParams", &resource.search_params, resolve);
            write_pairs(&mut out, "headers", &resource.headers, resolve);
            if let Some(body) = &resource.body {
                let _ = writeln!(out, "    body: {},", rewrite_expression(body, resolve));
            }
            out.push_str("  }\n");
            consts.insert(resource.id.as_str(), name);
        }

        out.push_str("  const _data = new Map<string, ResourceRequest>([\n");
        for (_, data_source) in ctx.data_sources {
            let DataSource::Resource {
                name, resource_id, ..
            } = data_source
            else {
                continue;
            };
            if let Some(request) = consts.get(resource_id.as_str()) {
                let key = scope.name_for(resource_id, name);
                let _ = writeln!(out, "    [\"{key}\", {request}],");
            }
        }
        out.push_str("  ])\n");

        out.push_str("  const _action = new Map<string, ResourceRequest>([\n");
        for (_, prop) in ctx.props {
            let PropValue::Resource(resource_id) = &prop.value else {
                continue;
            };
            if let Some(request) = consts.get(resource_id.as_str()) {
                let key = scope.name_for(resource_id, &prop.name);
                let _ = writeln!(out, "    [\"{key}\", {request}],");
            }
        }
        out.push_str("  ])\n");

        out.push_str("  return { data: _data, action: _action }\n");
        out.push_str("}\n");
        out
    }
}

fn resource_ids(resource: &Resource) -> Vec<String> {
    let mut ids: Vec<String> = referenced_ids(&resource.url).collect();
    for pair in resource.search_params.iter().chain(&resource.headers) {
        ids.extend(referenced_ids(&pair.value));
    }
    if let Some(body) = &resource.body {
        ids.extend(referenced_ids(body));
    }
    ids
}

fn write_pairs(
    out: &mut String,
    field: &str,
    pairs: &[Header],
    resolve: impl Fn(&str) -> Option<String>,
) {
    if pairs.is_empty() && field != "headers" {
        return;
    }
    let _ = writeln!(out, "    {field}: [");
    for pair in pairs {
        let _ = writeln!(
            out,
            "      {{ name: {}, value: {} }},",
            js_literal(&pair.name),
            rewrite_expression(&pair.value, &resolve)
        );
    }
    out.push_str("    ],\n");
}
