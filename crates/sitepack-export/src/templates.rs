//! Embedded project scaffold and page shell templates.
//!
//! Templates are plain files compiled into the binary. Placeholders of the
//! form `__NAME__` are filled in by a [`TemplateVars`] implementation.

use std::marker::PhantomData;

use crate::codegen::js_literal;
use crate::imports::import_from;

/// Path of the shared constants module.
pub const CONSTANTS_PATH: &str = "app/constants.mjs";
/// Path of the global stylesheet.
pub const CSS_PATH: &str = "app/__generated__/index.css";
/// Directory holding generated page modules.
pub const GENERATED_DIR: &str = "app/__generated__";

/// Variable set that can be substituted into a template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Variables for `app/constants.mjs`.
pub struct ConstantsVars<'a> {
    pub asset_base_url: &'a str,
}

impl TemplateVars for ConstantsVars<'_> {
    fn apply(&self, content: &str) -> String {
        content.replace("__ASSET_BASE_URL__", &js_literal(self.asset_base_url))
    }
}

/// Variables for the HTML renderer, which imports the home page module.
pub struct RendererVars<'a> {
    pub home_client: &'a str,
}

impl TemplateVars for RendererVars<'_> {
    fn apply(&self, content: &str) -> String {
        content.replace("__HOME_CLIENT__", self.home_client)
    }
}

/// Relative import paths substituted into page shells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportVars {
    pub constants: String,
    pub client: String,
    pub css: String,
    pub server: String,
}

impl ImportVars {
    /// Import paths as seen from `importer` for the page modules `client` and `server`.
    #[must_use]
    pub fn relative_to(importer: &str, client: &str, server: &str) -> Self {
        Self {
            constants: import_from(CONSTANTS_PATH, importer),
            client: import_from(client, importer),
            css: import_from(CSS_PATH, importer),
            server: import_from(server, importer),
        }
    }
}

impl TemplateVars for ImportVars {
    fn apply(&self, content: &str) -> String {
        content
            .replace("__CONSTANTS__", &self.constants)
            .replace("__CLIENT__", &self.client)
            .replace("__CSS__", &self.css)
            .replace("__SERVER__", &self.server)
    }
}

/// Files copied into every export unchanged, by destination path.
pub const SCAFFOLD: [(&str, &str); 8] = [
    ("package.json", include_str!("../templates/package.json")),
    ("tsconfig.json", include_str!("../templates/tsconfig.json")),
    ("vite.config.ts", include_str!("../templates/vite.config.ts")),
    ("vike.d.ts", include_str!("../templates/vike.d.ts")),
    ("pages/+config.ts", include_str!("../templates/pages-config.ts")),
    (
        "renderer/+onRenderClient.tsx",
        include_str!("../templates/on-render-client.tsx"),
    ),
    (".npmrc", include_str!("../templates/npmrc")),
    ("README.md", include_str!("../templates/README.md")),
];

pub const CONSTANTS_MJS: Template<ConstantsVars<'static>> =
    Template::new(include_str!("../templates/constants.mjs"));

/// Destination of [`ON_RENDER_HTML`].
pub const ON_RENDER_HTML_PATH: &str = "renderer/+onRenderHtml.tsx";

pub const ON_RENDER_HTML: Template<RendererVars<'static>> =
    Template::new(include_str!("../templates/on-render-html.tsx"));

/// `pages/<route>/+Page.tsx`.
pub const PAGE_TSX: Template<ImportVars> = Template::new(include_str!("../templates/page.tsx"));

/// `pages/<route>/+Head.tsx`.
pub const HEAD_TSX: Template<ImportVars> = Template::new(include_str!("../templates/head.tsx"));

/// `pages/<route>/+data.ts`.
pub const DATA_TS: Template<ImportVars> = Template::new(include_str!("../templates/data.ts"));

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constants_use_asset_base_url() {
        let rendered = CONSTANTS_MJS.render(&ConstantsVars {
            asset_base_url: "https://cdn.acme.test/",
        });

        assert!(rendered.contains("export const assetBaseUrl = \"https://cdn.acme.test/\";"));
        assert!(!rendered.contains("__ASSET_BASE_URL__"));
    }

    #[test]
    fn test_constants_escape_asset_base_url() {
        let rendered = CONSTANTS_MJS.render(&ConstantsVars {
            asset_base_url: r#"/a"b\c/"#,
        });

        assert!(rendered.contains(r#"export const assetBaseUrl = "/a\"b\\c/";"#));
    }

    #[test]
    fn test_import_vars_relative_to_page_shell() {
        let vars = ImportVars::relative_to(
            "pages/about/+Head.tsx",
            "app/__generated__/[about]._index",
            "app/__generated__/[about]._index.server",
        );

        assert_eq!(vars.constants, "../../app/constants.mjs");
        assert_eq!(vars.client, "../../app/__generated__/[about]._index");
        assert_eq!(vars.css, "../../app/__generated__/index.css");
        assert_eq!(vars.server, "../../app/__generated__/[about]._index.server");
    }

    #[test]
    fn test_page_shells_have_no_placeholders_left() {
        let vars = ImportVars::relative_to("pages/index/+Page.tsx", "a", "b");

        for template in [PAGE_TSX, HEAD_TSX, DATA_TS] {
            let rendered = template.render(&vars);
            assert!(!rendered.contains("__CONSTANTS__"));
            assert!(!rendered.contains("__CLIENT__"));
            assert!(!rendered.contains("__CSS__"));
            assert!(!rendered.contains("__SERVER__"));
        }
    }

    #[test]
    fn test_renderer_imports_home_module() {
        let rendered = ON_RENDER_HTML.render(&RendererVars {
            home_client: "../app/__generated__/_index",
        });

        assert!(rendered.contains("} from \"../app/__generated__/_index\";"));
    }

    #[test]
    fn test_scaffold_paths_are_unique() {
        let mut paths: Vec<_> = SCAFFOLD.iter().map(|(path, _)| *path).collect();
        paths.sort_unstable();
        paths.dedup();

        assert_eq!(paths.len(), SCAFFOLD.len());
    }
}
