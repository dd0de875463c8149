//! Route file names and route parameter extraction.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

static NAMED_SPLAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":(\w+)\*$").unwrap());

/// File-name-safe route identifier for a page path.
///
/// `/` becomes `_index`. Literal segments are bracketed, `:param` becomes
/// `$param`, `:param?` becomes `($param)` and any splat becomes `$`.
#[must_use]
pub fn route_name(path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return "_index".to_owned();
    }
    let base = path
        .split('/')
        .map(|segment| {
            if segment.ends_with('*') {
                "$".to_owned()
            } else if let Some(param) = segment.strip_prefix(':') {
                match param.strip_suffix('?') {
                    Some(optional) => format!("(${optional})"),
                    None => format!("${param}"),
                }
            } else {
                format!("[{segment}]")
            }
        })
        .collect::<Vec<_>>()
        .join(".");
    if path.ends_with('*') {
        base
    } else {
        format!("{base}._index")
    }
}

/// Source of `getRemixParams`, which renames splat parameters.
///
/// A named splat `:name*` moves the framework's `*` key to `name`; an
/// anonymous trailing `/*` moves it to `0`.
#[must_use]
pub fn params_extractor(path: &str) -> String {
    let mut out = String::new();
    out.push_str("type Params = Record<string, string | undefined>;\n");
    out.push_str("export const getRemixParams = ({ ...params }: Params): Params => {\n");
    if let Some(name) = NAMED_SPLAT.captures(path).and_then(|c| c.get(1)) {
        let _ = writeln!(out, "  params[\"{}\"] = params[\"*\"]", name.as_str());
        out.push_str("  delete params[\"*\"]\n");
    }
    if path.ends_with("/*") {
        out.push_str("  params[0] = params[\"*\"]\n");
        out.push_str("  delete params[\"*\"]\n");
    }
    out.push_str("  return params\n");
    out.push_str("}\n");
    out
}

/// Directory under `pages/` for a page path.
#[must_use]
pub fn vike_route(path: &str) -> &str {
    if path == "/" { "index" } else { path.trim_start_matches('/') }
}

/// Generates route file names and parameter extractors.
pub trait RouteGenerator: Send + Sync {
    fn route_name(&self, path: &str) -> String;
    fn params_extractor(&self, path: &str) -> String;
}

/// Route naming compatible with the generated app's file router.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileRoutes;

impl RouteGenerator for FileRoutes {
    fn route_name(&self, path: &str) -> String {
        route_name(path)
    }

    fn params_extractor(&self, path: &str) -> String {
        params_extractor(path)
    }
}
