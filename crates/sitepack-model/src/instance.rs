//! Component instances and their props.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node in the component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub component: String,
    /// HTML tag override for `ws:element` instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<InstanceChild>,
}

impl Instance {
    /// Ids of child instances, in order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match child {
            InstanceChild::Id { value } => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Child slot of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InstanceChild {
    /// Reference to another instance.
    Id { value: String },
    /// Literal text.
    Text { value: String },
    /// Expression evaluated at render time.
    Expression { value: String },
    #[serde(other)]
    Unknown,
}

/// A named value attached to an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prop {
    pub id: String,
    pub instance_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(flatten)]
    pub value: PropValue,
}

impl Prop {
    /// Resource id when this is a resource prop.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        match &self.value {
            PropValue::Resource(id) => Some(id),
            _ => None,
        }
    }
}

/// Typed prop payload, tagged by `type` with the payload under `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PropValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Json(Value),
    /// Asset id.
    Asset(String),
    Page(PageRef),
    #[serde(rename = "string[]")]
    StringArray(Vec<String>),
    /// Data source id of a parameter.
    Parameter(String),
    /// Resource id.
    Resource(String),
    /// Expression source.
    Expression(String),
    Action(Value),
    AnimationAction(Value),
}

/// Target of a `page` prop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Page(String),
    #[serde(rename_all = "camelCase")]
    Instance { page_id: String, instance_id: String },
}

impl PageRef {
    #[must_use]
    pub fn page_id(&self) -> &str {
        match self {
            Self::Page(id) | Self::Instance { page_id: id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_instance_children() {
        let instance: Instance = serde_json::from_str(
            r#"{"type":"instance","id":"box","component":"Box","children":[
                {"type":"id","value":"a"},
                {"type":"text","value":"hello"},
                {"type":"expression","value":"$ws$dataSource$x"},
                {"type":"id","value":"b"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(instance.child_ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            instance.children[1],
            InstanceChild::Text {
                value: "hello".to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_child_type() {
        let child: InstanceChild =
            serde_json::from_str(r#"{"type":"slot","value":"x"}"#).unwrap();

        assert_eq!(child, InstanceChild::Unknown);
    }

    #[test]
    fn test_prop_variants() {
        let resource: Prop = serde_json::from_str(
            r#"{"id":"p1","instanceId":"i1","name":"data","type":"resource","value":"r1"}"#,
        )
        .unwrap();
        let list: Prop = serde_json::from_str(
            r#"{"id":"p2","instanceId":"i1","name":"items","type":"string[]","value":["a"]}"#,
        )
        .unwrap();
        let page: Prop = serde_json::from_str(
            r#"{"id":"p3","instanceId":"i1","name":"href","type":"page","value":{"pageId":"pg","instanceId":"sec"}}"#,
        )
        .unwrap();

        assert_eq!(resource.resource_id(), Some("r1"));
        assert_eq!(list.value, PropValue::StringArray(vec!["a".to_owned()]));
        match page.value {
            PropValue::Page(target) => assert_eq!(target.page_id(), "pg"),
            other => panic!("unexpected prop value {other:?}"),
        }
    }

    #[test]
    fn test_prop_serializes_flat() {
        let prop = Prop {
            id: "p".to_owned(),
            instance_id: "i".to_owned(),
            name: "title".to_owned(),
            required: None,
            value: PropValue::String("Hi".to_owned()),
        };

        let json = serde_json::to_value(&prop).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id":"p","instanceId":"i","name":"title","type":"string","value":"Hi"})
        );
    }
}
