//! Form action rewriting.
//!
//! Static forms cannot post to the design tool's endpoints, so a literal
//! `action` on a `Form` instance is turned into a resource the page's
//! `getResources` exposes under the `action` map.

use std::collections::HashSet;

use sitepack_model::{Instance, Prop, PropValue, Resource, Table};

const FORM_COMPONENT: &str = "Form";

/// Replace literal `action`/`method` props of forms with a resource.
///
/// The new resource takes the form instance's id. Its method is the
/// lower-cased `method` prop when that is one of `get`, `post`, `put` or
/// `delete`, and `post` otherwise.
pub fn replace_form_actions(
    instances: &Table<Instance>,
    props: &mut Table<Prop>,
    resources: &mut Table<Resource>,
) {
    let forms: HashSet<&str> = instances
        .iter()
        .filter(|(_, instance)| instance.component == FORM_COMPONENT)
        .map(|(id, _)| id.as_str())
        .collect();
    if forms.is_empty() {
        return;
    }

    let mut methods = Vec::new();
    props.retain(|(_, prop)| match (&prop.value, prop.name.as_str()) {
        (PropValue::String(method), "method") if forms.contains(prop.instance_id.as_str()) => {
            methods.push((prop.instance_id.clone(), method.to_ascii_lowercase()));
            false
        }
        _ => true,
    });

    for (_, prop) in props.iter_mut() {
        if prop.name != "action" || !forms.contains(prop.instance_id.as_str()) {
            continue;
        }
        let PropValue::String(action) = &prop.value else {
            continue;
        };
        if action.is_empty() {
            continue;
        }
        let method = methods
            .iter()
            .find(|(instance_id, _)| *instance_id == prop.instance_id)
            .map(|(_, method)| method.as_str())
            .filter(|method| matches!(*method, "get" | "post" | "put" | "delete"))
            .unwrap_or("post");

        let resource = Resource {
            id: prop.instance_id.clone(),
            name: prop.name.clone(),
            control: None,
            method: method.to_owned(),
            url: serde_json::to_string(action).unwrap_or_else(|_| "\"\"".to_owned()),
            search_params: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        tracing::debug!(instance_id = %prop.instance_id, method, "Replacing form action with resource");
        resources.push((resource.id.clone(), resource));
        prop.value = PropValue::Resource(prop.instance_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_action_becomes_resource() {
        let data = sample_build();
        let mut props = data.build.props.clone();
        let mut resources = Vec::new();

        replace_form_actions(&data.build.instances, &mut props, &mut resources);

        assert!(!props.iter().any(|(id, _)| id == "form-method"));
        let action = props.iter().find(|(id, _)| id == "form-action").unwrap();
        assert_eq!(action.1.value, PropValue::Resource("home-form".to_owned()));
        assert_eq!(resources.len(), 1);
        let resource = &resources[0].1;
        assert_eq!(resource.id, "home-form");
        assert_eq!(resource.name, "action");
        assert_eq!(resource.method, "get");
        assert_eq!(resource.url, "\"/subscribe\"");
    }

    #[test]
    fn test_unknown_method_defaults_to_post() {
        let instances: Table<Instance> =
            serde_json::from_str(r#"[["f",{"id":"f","component":"Form","children":[]}]]"#).unwrap();
        let mut props: Table<Prop> = serde_json::from_str(
            r#"[["a",{"id":"a","instanceId":"f","name":"action","type":"string","value":"/x"}],
                ["m",{"id":"m","instanceId":"f","name":"method","type":"string","value":"PATCH"}]]"#,
        )
        .unwrap();
        let mut resources = Vec::new();

        replace_form_actions(&instances, &mut props, &mut resources);

        assert_eq!(resources[0].1.method, "post");
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_non_forms_are_untouched() {
        let instances: Table<Instance> =
            serde_json::from_str(r#"[["b",{"id":"b","component":"Box","children":[]}]]"#).unwrap();
        let mut props: Table<Prop> = serde_json::from_str(
            r#"[["a",{"id":"a","instanceId":"b","name":"action","type":"string","value":"/x"}]]"#,
        )
        .unwrap();
        let original = props.clone();
        let mut resources = Vec::new();

        replace_form_actions(&instances, &mut props, &mut resources);

        assert_eq!(props, original);
        assert!(resources.is_empty());
    }
}
