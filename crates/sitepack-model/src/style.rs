//! Breakpoints, style sources and style declarations.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

/// A responsive breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    /// Raw media condition, used instead of widths when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Breakpoint {
    /// Base breakpoint: no width bounds and no condition.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.min_width.is_none() && self.max_width.is_none() && self.condition.is_none()
    }

    #[must_use]
    pub fn media_range(&self) -> MediaRange {
        MediaRange {
            min_width: self.min_width,
            max_width: self.max_width,
        }
    }

    /// Media query text without the `@media` keyword, or `None` for the base breakpoint.
    #[must_use]
    pub fn media_query(&self) -> Option<String> {
        if let Some(condition) = &self.condition {
            return Some(format!("({condition})"));
        }
        match (self.min_width, self.max_width) {
            (None, None) => None,
            (Some(min), None) => Some(format!("all and (min-width: {min}px)")),
            (None, Some(max)) => Some(format!("all and (max-width: {max}px)")),
            (Some(min), Some(max)) => Some(format!(
                "all and (min-width: {min}px) and (max-width: {max}px)"
            )),
        }
    }
}

/// Width bounds of a media query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

/// Order media ranges the way their rules must appear in CSS.
///
/// Unbounded ranges come first, then max-width ranges from widest to
/// narrowest, then min-width ranges from narrowest to widest.
#[must_use]
pub fn compare_media(a: &MediaRange, b: &MediaRange) -> Ordering {
    fn rank(range: &MediaRange) -> (u8, i64) {
        match (range.min_width, range.max_width) {
            (None, None) => (0, 0),
            (None, Some(max)) => (1, -i64::from(max)),
            (Some(min), _) => (2, i64::from(min)),
        }
    }
    rank(a).cmp(&rank(b))
}

/// A bucket of style declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleSource {
    Token { id: String, name: String },
    Local { id: String },
}

impl StyleSource {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Token { id, .. } | Self::Local { id } => id,
        }
    }
}

/// Style sources applied to an instance, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSourceSelection {
    pub instance_id: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// One CSS declaration in a style source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDecl {
    pub style_source_id: String,
    pub breakpoint_id: String,
    /// Pseudo state such as `:hover`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Property in camelCase.
    pub property: String,
    #[serde(deserialize_with = "lenient_style_value")]
    pub value: StyleValue,
}

/// Typed CSS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleValue {
    Unit {
        unit: String,
        value: f64,
    },
    Keyword {
        value: String,
    },
    Unparsed {
        value: String,
    },
    FontFamily {
        value: Vec<String>,
    },
    Rgb {
        r: f64,
        g: f64,
        b: f64,
        alpha: f64,
    },
    Image {
        value: ImageValue,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        hidden: bool,
    },
    Layers {
        value: Vec<StyleValue>,
    },
    Tuple {
        value: Vec<StyleValue>,
    },
    Var {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<Box<StyleValue>>,
    },
    Function {
        name: String,
        args: Box<StyleValue>,
    },
    Invalid {
        value: String,
    },
    #[serde(other)]
    Unsupported,
}

/// Source of an image value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageValue {
    /// Asset id.
    Asset { value: String },
    Url { url: String },
}

fn lenient_style_value<'de, D>(deserializer: D) -> Result<StyleValue, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or(StyleValue::Unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(min: Option<u32>, max: Option<u32>) -> MediaRange {
        MediaRange {
            min_width: min,
            max_width: max,
        }
    }

    #[test]
    fn test_compare_media_order() {
        let mut ranges = vec![
            range(Some(1280), None),
            range(None, Some(479)),
            range(None, None),
            range(None, Some(991)),
            range(Some(768), None),
        ];

        ranges.sort_by(compare_media);

        assert_eq!(
            ranges,
            vec![
                range(None, None),
                range(None, Some(991)),
                range(None, Some(479)),
                range(Some(768), None),
                range(Some(1280), None),
            ]
        );
    }

    #[test]
    fn test_media_query() {
        let bp = |min, max| Breakpoint {
            id: "b".to_owned(),
            label: String::new(),
            min_width: min,
            max_width: max,
            condition: None,
        };

        assert_eq!(bp(None, None).media_query(), None);
        assert_eq!(
            bp(None, Some(991)).media_query().as_deref(),
            Some("all and (max-width: 991px)")
        );
        assert!(bp(None, None).is_base());
    }

    #[test]
    fn test_background_layers() {
        let decl: StyleDecl = serde_json::from_str(
            r#"{"styleSourceId":"s","breakpointId":"b","property":"backgroundImage",
                "value":{"type":"layers","value":[
                    {"type":"image","value":{"type":"asset","value":"a1"}},
                    {"type":"keyword","value":"none"}
                ]}}"#,
        )
        .unwrap();

        let StyleValue::Layers { value } = decl.value else {
            panic!("expected layers");
        };
        assert_eq!(
            value[0],
            StyleValue::Image {
                value: ImageValue::Asset {
                    value: "a1".to_owned()
                },
                hidden: false,
            }
        );
    }

    #[test]
    fn test_unknown_value_type_is_unsupported() {
        let decl: StyleDecl = serde_json::from_str(
            r#"{"styleSourceId":"s","breakpointId":"b","property":"boxShadow",
                "value":{"type":"shadow","position":"outset"}}"#,
        )
        .unwrap();

        assert_eq!(decl.value, StyleValue::Unsupported);
    }

    #[test]
    fn test_malformed_value_is_unsupported() {
        let decl: StyleDecl = serde_json::from_str(
            r#"{"styleSourceId":"s","breakpointId":"b","property":"width",
                "value":{"type":"unit","unit":"px"}}"#,
        )
        .unwrap();

        assert_eq!(decl.value, StyleValue::Unsupported);
    }
}
