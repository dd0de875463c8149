//! Global stylesheet generation.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use sha2::{Digest, Sha256};
use sitepack_model::{
    Asset, Breakpoint, ImageValue, StyleDecl, StyleValue, compare_media,
};

use super::{CssContext, CssGenerator, CssOutput};
use crate::registry::short_name;

/// Stylesheet generator.
///
/// Every instance gets a readable `w-<label>` class. In atomic mode each
/// declaration additionally becomes its own `c<hash>` class shared by all
/// instances using the same declaration; otherwise rules are written
/// against the `w-` class.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCssGenerator;

struct Rule {
    breakpoint_id: String,
    selector: String,
    declarations: Vec<(String, String)>,
}

impl Rule {
    fn set(&mut self, property: String, value: String) {
        match self.declarations.iter_mut().find(|(name, _)| *name == property) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((property, value)),
        }
    }
}

impl CssGenerator for DefaultCssGenerator {
    fn generate(&self, ctx: &CssContext<'_>) -> CssOutput {
        let assets: HashMap<&str, &Asset> =
            ctx.assets.iter().map(|asset| (asset.id.as_str(), asset)).collect();
        let breakpoints: HashMap<&str, &Breakpoint> = ctx
            .breakpoints
            .iter()
            .map(|(id, breakpoint)| (id.as_str(), breakpoint))
            .collect();

        let mut decls_by_source: HashMap<&str, Vec<&StyleDecl>> = HashMap::new();
        for (_, decl) in ctx.styles {
            decls_by_source
                .entry(decl.style_source_id.as_str())
                .or_default()
                .push(decl);
        }
        let selections: HashMap<&str, &[String]> = ctx
            .style_source_selections
            .iter()
            .map(|(_, selection)| (selection.instance_id.as_str(), selection.values.as_slice()))
            .collect();

        let mut class_names = ClassNames::default();
        let mut classes: HashMap<String, Vec<String>> = HashMap::new();
        let mut rules: Vec<Rule> = Vec::new();
        let mut atomic_seen: HashSet<String> = HashSet::new();

        for (_, instance) in ctx.instances {
            let label = instance
                .label
                .as_deref()
                .or_else(|| {
                    ctx.metas
                        .get(&instance.component)
                        .and_then(|meta| meta.label.as_deref())
                })
                .unwrap_or_else(|| short_name(&instance.component));
            let base_class = class_names.allocate(label);
            let instance_classes = classes.entry(instance.id.clone()).or_default();
            instance_classes.push(base_class.clone());

            let Some(source_ids) = selections.get(instance.id.as_str()) else {
                continue;
            };
            let decls = source_ids
                .iter()
                .filter_map(|id| decls_by_source.get(id.as_str()))
                .flatten();

            for decl in decls {
                if !breakpoints.contains_key(decl.breakpoint_id.as_str()) {
                    tracing::debug!(breakpoint_id = %decl.breakpoint_id, "Skipping style on unknown breakpoint");
                    continue;
                }
                let Some(value) = css_value(&decl.value, &assets, ctx.asset_base_url) else {
                    continue;
                };
                let property = css_property(&decl.property);
                let state = decl.state.as_deref().unwrap_or_default();

                if ctx.atomic {
                    let class = atomic_class(&decl.breakpoint_id, state, &property, &value);
                    if !instance_classes.contains(&class) {
                        instance_classes.push(class.clone());
                    }
                    if atomic_seen.insert(class.clone()) {
                        rules.push(Rule {
                            breakpoint_id: decl.breakpoint_id.clone(),
                            selector: format!(".{class}{state}"),
                            declarations: vec![(property, value)],
                        });
                    }
                } else {
                    let selector = format!(".{base_class}{state}");
                    let existing = rules.iter_mut().find(|rule| {
                        rule.breakpoint_id == decl.breakpoint_id && rule.selector == selector
                    });
                    match existing {
                        Some(rule) => rule.set(property, value),
                        None => rules.push(Rule {
                            breakpoint_id: decl.breakpoint_id.clone(),
                            selector,
                            declarations: vec![(property, value)],
                        }),
                    }
                }
            }
        }

        let mut ordered: Vec<&Breakpoint> = breakpoints.values().copied().collect();
        ordered.sort_by(|a, b| {
            compare_media(&a.media_range(), &b.media_range()).then_with(|| a.id.cmp(&b.id))
        });

        let mut css = String::new();
        for breakpoint in ordered {
            let block: Vec<&Rule> = rules
                .iter()
                .filter(|rule| rule.breakpoint_id == breakpoint.id)
                .collect();
            if block.is_empty() {
                continue;
            }
            match breakpoint.media_query() {
                None => {
                    for rule in block {
                        write_rule(&mut css, rule, "");
                    }
                }
                Some(query) => {
                    let _ = writeln!(css, "@media {query} {{");
                    for rule in block {
                        write_rule(&mut css, rule, "  ");
                    }
                    css.push_str("}\n");
                }
            }
        }

        CssOutput { css, classes }
    }
}

fn write_rule(out: &mut String, rule: &Rule, indent: &str) {
    let _ = writeln!(out, "{indent}{} {{", rule.selector);
    for (property, value) in &rule.declarations {
        let _ = writeln!(out, "{indent}  {property}: {value};");
    }
    let _ = writeln!(out, "{indent}}}");
}

/// Allocates unique `w-` class names.
#[derive(Default)]
struct ClassNames {
    used: HashSet<String>,
}

impl ClassNames {
    fn allocate(&mut self, label: &str) -> String {
        let base = format!("w-{}", class_slug(label));
        let mut name = base.clone();
        let mut index = 0;
        while self.used.contains(&name) {
            index += 1;
            name = format!("{base}-{index}");
        }
        self.used.insert(name.clone());
        name
    }
}

fn class_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "element".to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn atomic_class(breakpoint_id: &str, state: &str, property: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{breakpoint_id}|{state}|{property}|{value}").as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("c{}", &digest[..8])
}

/// Convert a camelCase style property to its CSS name.
///
/// Custom properties (`--x`) are kept as is; `Webkit`/`Moz` prefixes and a
/// leading `ms` become vendor prefixes.
///
/// ```
/// use sitepack_export::codegen::css_property;
///
/// assert_eq!(css_property("backgroundColor"), "background-color");
/// assert_eq!(css_property("WebkitLineClamp"), "-webkit-line-clamp");
/// assert_eq!(css_property("--brand"), "--brand");
/// ```
#[must_use]
pub fn css_property(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_owned();
    }
    let mut out = String::with_capacity(property.len() + 4);
    if property.starts_with("ms") && property[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn css_value(value: &StyleValue, assets: &HashMap<&str, &Asset>, base_url: &str) -> Option<String> {
    match value {
        StyleValue::Unit { unit, value } => Some(if unit == "number" {
            format!("{value}")
        } else {
            format!("{value}{unit}")
        }),
        StyleValue::Keyword { value } | StyleValue::Unparsed { value } => Some(value.clone()),
        StyleValue::FontFamily { value } => Some(
            value
                .iter()
                .map(|family| {
                    if family.contains(' ') {
                        format!("\"{family}\"")
                    } else {
                        family.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        StyleValue::Rgb { r, g, b, alpha } => Some(format!("rgb({r} {g} {b} / {alpha})")),
        StyleValue::Image { hidden: true, .. } => None,
        StyleValue::Image {
            value: ImageValue::Asset { value },
            ..
        } => Some(match assets.get(value.as_str()) {
            Some(asset) => format!("url(\"{base_url}{}\")", asset.name),
            None => "none".to_owned(),
        }),
        StyleValue::Image {
            value: ImageValue::Url { url },
            ..
        } => Some(format!("url(\"{url}\")")),
        StyleValue::Layers { value } => join_values(value, ", ", assets, base_url),
        StyleValue::Tuple { value } => join_values(value, " ", assets, base_url),
        StyleValue::Var { value, fallback } => Some(
            match fallback
                .as_deref()
                .and_then(|fallback| css_value(fallback, assets, base_url))
            {
                Some(fallback) => format!("var(--{value}, {fallback})"),
                None => format!("var(--{value})"),
            },
        ),
        StyleValue::Function { name, args } => {
            css_value(args, assets, base_url).map(|args| format!("{name}({args})"))
        }
        StyleValue::Invalid { .. } | StyleValue::Unsupported => None,
    }
}

fn join_values(
    values: &[StyleValue],
    separator: &str,
    assets: &HashMap<&str, &Asset>,
    base_url: &str,
) -> Option<String> {
    let parts: Vec<String> = values
        .iter()
        .filter_map(|value| css_value(value, assets, base_url))
        .collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ComponentRegistry, FrameworkMeta};
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;

    fn generate(atomic: bool) -> CssOutput {
        let data = sample_build();
        let framework = FrameworkMeta::from_registry(&ComponentRegistry::new());
        let ctx = CssContext {
            instances: &data.build.instances,
            assets: &data.assets,
            breakpoints: &data.build.breakpoints,
            styles: &data.build.styles,
            style_source_selections: &data.build.style_source_selections,
            metas: &framework.metas,
            asset_base_url: "/assets/",
            atomic,
        };
        DefaultCssGenerator.generate(&ctx)
    }

    #[test]
    fn test_css_property() {
        assert_eq!(css_property("color"), "color");
        assert_eq!(css_property("paddingLeft"), "padding-left");
        assert_eq!(css_property("msTransform"), "-ms-transform");
        assert_eq!(css_property("MozAppearance"), "-moz-appearance");
    }

    #[test]
    fn test_class_slug() {
        assert_eq!(class_slug("Hero"), "hero");
        assert_eq!(class_slug("Main  Nav!"), "main-nav");
        assert_eq!(class_slug("***"), "element");
    }

    #[test]
    fn test_every_instance_gets_a_readable_class() {
        let output = generate(true);

        assert_eq!(output.classes["home-box"][0], "w-hero");
        assert_eq!(output.classes["home-body"][0], "w-body");
        assert_eq!(output.classes["about-body"][0], "w-body-1");
        assert_eq!(output.classes["sitemap-url"][0], "w-xmlnode-1");
        assert_eq!(output.classes["orphan"], vec!["w-box-1".to_owned()]);
    }

    #[test]
    fn test_non_atomic_rules() {
        let output = generate(false);

        assert_eq!(
            output.css,
            ".w-hero {\n  font-family: Inter, sans-serif;\n  color: red;\n  background-image: url(\"/assets/hero.png\");\n}\n\
             .w-hero:hover {\n  color: blue;\n}\n\
             .w-body-1 {\n  font-family: \"Serif Pro\";\n}\n\
             .w-heading {\n  margin-top: 1.5rem;\n}\n\
             @media all and (max-width: 991px) {\n  .w-hero {\n    padding-left: 10px;\n  }\n}\n"
        );
        assert_eq!(output.classes["home-box"], vec!["w-hero".to_owned()]);
    }

    #[test]
    fn test_atomic_classes() {
        let output = generate(true);
        let hero = &output.classes["home-box"];

        assert_eq!(hero.len(), 6);
        for class in &hero[1..] {
            assert!(class.starts_with('c'));
            assert_eq!(class.len(), 9);
            assert!(output.css.contains(&format!(".{class}")));
        }
        let media = output.css.find("@media").unwrap();
        assert!(output.css[media..].contains("padding-left: 10px;"));
    }

    #[test]
    fn test_atomic_classes_are_shared() {
        let a = atomic_class("bp", "", "color", "red");
        let b = atomic_class("bp", "", "color", "red");
        let c = atomic_class("bp", ":hover", "color", "red");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_values() {
        let assets = HashMap::new();
        let value = |json: &str| {
            let value: StyleValue = serde_json::from_str(json).unwrap();
            css_value(&value, &assets, "/a/")
        };

        assert_eq!(value(r#"{"type":"unit","unit":"number","value":2}"#).as_deref(), Some("2"));
        assert_eq!(
            value(r#"{"type":"rgb","r":1,"g":2,"b":3,"alpha":0.5}"#).as_deref(),
            Some("rgb(1 2 3 / 0.5)")
        );
        assert_eq!(
            value(r#"{"type":"var","value":"gap","fallback":{"type":"unit","unit":"px","value":4}}"#).as_deref(),
            Some("var(--gap, 4px)")
        );
        assert_eq!(
            value(r#"{"type":"tuple","value":[{"type":"unit","unit":"px","value":1},{"type":"keyword","value":"solid"}]}"#).as_deref(),
            Some("1px solid")
        );
        assert_eq!(
            value(r#"{"type":"image","value":{"type":"asset","value":"gone"}}"#).as_deref(),
            Some("none")
        );
        assert_eq!(value(r#"{"type":"invalid","value":"??"}"#), None);
    }
}
