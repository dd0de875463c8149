//! Prop normalization against project assets and pages.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sitepack_model::{Asset, AssetKind, PageRef, Prop, PropValue, page_path};

use super::{PropContext, PropNormalizer};

/// Characters left unescaped in `#fragment` anchors.
const FRAGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolves `asset` props to URLs and `page` props to paths.
///
/// `width` and `height` asset props on images resolve to the image's
/// dimensions. Props pointing at missing assets or pages are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPropNormalizer;

impl PropNormalizer for DefaultPropNormalizer {
    fn normalize(&self, props: &[Prop], ctx: &PropContext<'_>) -> Vec<Prop> {
        let assets: HashMap<&str, &Asset> = ctx
            .assets
            .iter()
            .map(|asset| (asset.id.as_str(), asset))
            .collect();

        props
            .iter()
            .filter_map(|prop| {
                let value = match &prop.value {
                    PropValue::Asset(asset_id) => {
                        let Some(asset) = assets.get(asset_id.as_str()) else {
                            tracing::debug!(prop_id = %prop.id, asset_id = %asset_id, "Dropping prop for missing asset");
                            return None;
                        };
                        asset_value(&prop.name, asset, ctx.asset_base_url)
                    }
                    PropValue::Page(target) => {
                        let page_id = target.page_id();
                        if !ctx.pages.all().any(|page| page.id == page_id) {
                            tracing::debug!(prop_id = %prop.id, page_id = %page_id, "Dropping prop for missing page");
                            return None;
                        }
                        PropValue::String(page_href(target, props, ctx))
                    }
                    other => other.clone(),
                };
                Some(Prop {
                    value,
                    ..prop.clone()
                })
            })
            .collect()
    }
}

fn asset_value(name: &str, asset: &Asset, base_url: &str) -> PropValue {
    match (&asset.kind, name) {
        (AssetKind::Image { meta }, "width") => PropValue::Number(meta.width),
        (AssetKind::Image { meta }, "height") => PropValue::Number(meta.height),
        _ => PropValue::String(format!("{base_url}{}", asset.name)),
    }
}

fn page_href(target: &PageRef, props: &[Prop], ctx: &PropContext<'_>) -> String {
    let path = page_path(target.page_id(), ctx.pages);
    let PageRef::Instance { instance_id, .. } = target else {
        return path;
    };
    let anchor = props.iter().find_map(|prop| match &prop.value {
        PropValue::String(id) if prop.instance_id == *instance_id && prop.name == "id" => Some(id),
        _ => None,
    });
    match anchor {
        Some(id) => format!("{path}#{}", encode_fragment(id)),
        None => path,
    }
}

fn encode_fragment(fragment: &str) -> String {
    utf8_percent_encode(fragment, FRAGMENT_ENCODE_SET).to_string()
}
