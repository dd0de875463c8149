//! Page component generation.
//!
//! Renders a page's instance tree as a React component: parameters first,
//! then variable and resource hooks, then the JSX tree.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use sitepack_model::{DataSource, ELEMENT_COMPONENT, Instance, InstanceChild, Prop, PropValue};

use super::expression::{decode_data_source_id, rewrite_expression};
use super::{ComponentContext, ComponentGenerator, js_literal};
use crate::registry::{
    BLOCK_COMPONENT, BLOCK_TEMPLATE_COMPONENT, COLLECTION_COMPONENT, DESCENDANT_COMPONENT,
    ROOT_COMPONENT, short_name,
};
use crate::scope::Scope;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\s*)\$ws\$dataSource\$([A-Za-z0-9_]+)\s*=\s*([^=].*?);?\s*$").unwrap()
});

/// Prop that conditionally hides an instance.
const SHOW_PROP: &str = "data-ws-show";

/// Built-in React component generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultComponentGenerator;

impl ComponentGenerator for DefaultComponentGenerator {
    fn generate(&self, scope: &mut Scope, ctx: &ComponentContext<'_>) -> String {
        let mut out = String::new();
        let mut names: HashMap<String, String> = HashMap::new();
        let mut setters: HashMap<String, String> = HashMap::new();

        let mut prop_names: Vec<&str> = Vec::new();
        for parameter in ctx.parameters {
            if !prop_names.contains(&parameter.name()) {
                prop_names.push(parameter.name());
            }
        }
        let signature: String = prop_names
            .iter()
            .map(|name| format!(" {name}: any;"))
            .collect();
        let _ = writeln!(out, "const {} = (_props: {{{signature} }}) => {{", ctx.name);

        for parameter in ctx.parameters {
            let name = scope.name_for(parameter.id(), parameter.name());
            let _ = writeln!(out, "const {name} = _props.{};", parameter.name());
            names.insert(parameter.id().to_owned(), name);
        }

        for (_, data_source) in ctx.data_sources {
            match data_source {
                DataSource::Variable { id, name, value, .. } => {
                    let value_name = scope.name_for(id, name);
                    let setter = scope.name_for(&format!("{id}:setter"), &format!("set${value_name}"));
                    let _ = writeln!(
                        out,
                        "let [{value_name}, {setter}] = useVariableState<any>({});",
                        js_literal(&value.value)
                    );
                    names.insert(id.clone(), value_name);
                    setters.insert(id.clone(), setter);
                }
                DataSource::Resource {
                    id,
                    name,
                    resource_id,
                    ..
                } => {
                    let value_name = scope.name_for(id, name);
                    let resource_name = scope.name_for(resource_id, name);
                    let _ = writeln!(out, "let {value_name} = useResource(\"{resource_name}\");");
                    names.insert(id.clone(), value_name);
                }
                DataSource::Parameter { .. } => {}
            }
        }

        let mut renderer = Renderer {
            ctx,
            scope,
            instances: ctx
                .instances
                .iter()
                .map(|(id, instance)| (id.as_str(), instance))
                .collect(),
            props: group_props(ctx),
            names,
            setters,
            visited: HashSet::new(),
        };
        let jsx = renderer.render(ctx.root_instance_id);
        let jsx = if jsx.is_empty() { "<></>\n" } else { jsx.as_str() };
        let _ = write!(out, "return {}", jsx.trim_start());
        out.push_str("}\n");
        out
    }
}

fn group_props<'a>(ctx: &ComponentContext<'a>) -> HashMap<&'a str, Vec<&'a Prop>> {
    let mut grouped: HashMap<&str, Vec<&Prop>> = HashMap::new();
    for (_, prop) in ctx.props {
        grouped.entry(prop.instance_id.as_str()).or_default().push(prop);
    }
    grouped
}

/// Pending work while walking the instance tree.
enum Step<'a> {
    Instance { id: &'a str, depth: usize },
    Text { value: &'a str, depth: usize },
    Expression { value: &'a str, depth: usize },
    Close(Closing),
}

/// Markup that ends an opened instance once its children are written.
struct Closing {
    indent: String,
    conditional: bool,
    kind: ClosingKind,
}

enum ClosingKind {
    /// `open_end` is where the opening tag's `>` starts, `body_start` where children begin.
    Element {
        tag: String,
        open_end: usize,
        body_start: usize,
    },
    Collection,
}

impl Closing {
    fn finish(self, out: &mut String) {
        let indent = &self.indent;
        match self.kind {
            ClosingKind::Element {
                tag,
                open_end,
                body_start,
            } => {
                if out.len() == body_start {
                    out.truncate(open_end);
                    out.push_str(" />");
                } else {
                    let _ = write!(out, "{indent}</{tag}>");
                }
            }
            ClosingKind::Collection => {
                let _ = write!(out, "{indent}  </Fragment>\n{indent})}}");
            }
        }
        if self.conditional {
            let _ = write!(out, "\n{indent}}}");
        }
        out.push('\n');
    }
}

struct Renderer<'c, 'a, 's> {
    ctx: &'c ComponentContext<'a>,
    scope: &'s mut Scope,
    instances: HashMap<&'a str, &'a Instance>,
    props: HashMap<&'a str, Vec<&'a Prop>>,
    /// Data source id to local variable.
    names: HashMap<String, String>,
    /// Variable id to setter.
    setters: HashMap<String, String>,
    visited: HashSet<String>,
}

impl<'a> Renderer<'_, 'a, '_> {
    fn expression(&self, expression: &str) -> String {
        rewrite_expression(expression, |id| self.names.get(id).cloned())
    }

    /// Render the tree under `root` depth-first with an explicit stack.
    ///
    /// Every rendered instance is followed by a newline. Returns an empty
    /// string when nothing under `root` renders.
    fn render(&mut self, root: &'a str) -> String {
        let mut out = String::new();
        let mut stack = vec![Step::Instance { id: root, depth: 1 }];
        while let Some(step) = stack.pop() {
            match step {
                Step::Instance { id, depth } => self.enter(id, depth, &mut out, &mut stack),
                Step::Text { value, depth } => {
                    let lines: Vec<String> = value.split('\n').map(|line| format!("{{{}}}", js_literal(line))).collect();
                    let _ = writeln!(out, "{}{}", "  ".repeat(depth), lines.join("\n<br />\n"));
                }
                Step::Expression { value, depth } => {
                    let _ = writeln!(out, "{}{{{}}}", "  ".repeat(depth), self.expression(value));
                }
                Step::Close(closing) => closing.finish(&mut out),
            }
        }
        out
    }

    /// Open one instance and schedule its children followed by its closing.
    fn enter(&mut self, id: &'a str, depth: usize, out: &mut String, stack: &mut Vec<Step<'a>>) {
        let Some(instance) = self.instances.get(id).copied() else {
            return;
        };
        if !self.visited.insert(id.to_owned()) {
            tracing::debug!(instance_id = %id, "Skipping instance already rendered");
            return;
        }
        let indent = "  ".repeat(depth);
        let props = self.props.get(id).cloned().unwrap_or_default();

        let mut condition = None;
        for prop in &props {
            if prop.name != SHOW_PROP {
                continue;
            }
            match &prop.value {
                PropValue::Boolean(false) => return,
                PropValue::Expression(expression) => condition = Some(self.expression(expression)),
                _ => {}
            }
        }

        let component = instance.component.as_str();
        if matches!(component, DESCENDANT_COMPONENT | BLOCK_TEMPLATE_COMPONENT) {
            return;
        }
        if let Some(condition) = &condition {
            let _ = writeln!(out, "{indent}{{({condition}) &&");
        }

        let (kind, child_depth) = match component {
            COLLECTION_COMPONENT => {
                self.open_collection(instance, &props, &indent, out);
                (ClosingKind::Collection, depth + 2)
            }
            ROOT_COMPONENT | BLOCK_COMPONENT => {
                (Self::open_element(out, &indent, "Fragment".to_owned(), ""), depth + 1)
            }
            _ => {
                let tag = self.tag_for(instance);
                let attributes = self.attributes(instance, &props);
                (Self::open_element(out, &indent, tag, &attributes), depth + 1)
            }
        };
        stack.push(Step::Close(Closing {
            indent,
            conditional: condition.is_some(),
            kind,
        }));

        for child in instance.children.iter().rev() {
            let step = match child {
                InstanceChild::Id { value } => Step::Instance {
                    id: value,
                    depth: child_depth,
                },
                InstanceChild::Text { value } => Step::Text {
                    value,
                    depth: child_depth,
                },
                InstanceChild::Expression { value } => Step::Expression {
                    value,
                    depth: child_depth,
                },
                InstanceChild::Unknown => continue,
            };
            stack.push(step);
        }
    }

    fn open_element(out: &mut String, indent: &str, tag: String, attributes: &str) -> ClosingKind {
        let _ = write!(out, "{indent}<{tag}{attributes}");
        let open_end = out.len();
        out.push_str(">\n");
        ClosingKind::Element {
            tag,
            open_end,
            body_start: out.len(),
        }
    }

    fn tag_for(&mut self, instance: &Instance) -> String {
        let framework = self.ctx.framework;
        if instance.component == ELEMENT_COMPONENT {
            let tag = instance.tag.as_deref().unwrap_or("div");
            return match framework.tags.get(tag) {
                Some(descriptor) => self.scope.name_for(descriptor, short_name(descriptor)),
                None => tag.to_owned(),
            };
        }
        if framework.components.contains_key(&instance.component) {
            self.scope
                .name_for(&instance.component, short_name(&instance.component))
        } else {
            tracing::debug!(component = %instance.component, "Unknown component rendered as fragment");
            "Fragment".to_owned()
        }
    }

    fn open_collection(&mut self, instance: &Instance, props: &[&Prop], indent: &str, out: &mut String) {
        let mut data = "undefined".to_owned();
        let mut item = None;
        let mut key = None;
        for prop in props {
            match (prop.name.as_str(), &prop.value) {
                ("data", PropValue::Expression(expression)) => data = self.expression(expression),
                ("data", PropValue::Json(value)) => data = js_literal(value),
                ("item", PropValue::Parameter(id)) => item = Some(id.clone()),
                ("itemKey", PropValue::Parameter(id)) => key = Some(id.clone()),
                _ => {}
            }
        }
        let item_name = self.declare(item.as_deref(), &format!("{}:item", instance.id), "collectionItem");
        let key_name = self.declare(key.as_deref(), &format!("{}:key", instance.id), "collectionItemKey");
        let _ = writeln!(
            out,
            "{indent}{{{data}?.map?.(({item_name}: any, {key_name}: any) =>\n\
             {indent}  <Fragment key={{{key_name}}}>"
        );
    }

    fn declare(&mut self, data_source_id: Option<&str>, fallback_id: &str, preferred: &str) -> String {
        let id = data_source_id.unwrap_or(fallback_id);
        let name = self.scope.name_for(id, preferred);
        self.names.insert(id.to_owned(), name.clone());
        name
    }

    fn attributes(&mut self, instance: &Instance, props: &[&Prop]) -> String {
        let mut out = String::new();
        let classes = self
            .ctx
            .classes
            .get(&instance.id)
            .map(|classes| classes.join(" "))
            .unwrap_or_default();
        let mut class_name = (!classes.is_empty()).then(|| js_literal(&classes));

        for prop in props {
            if prop.name == SHOW_PROP {
                continue;
            }
            let value = match &prop.value {
                PropValue::Number(number) => format!("{number}"),
                PropValue::Boolean(flag) => flag.to_string(),
                PropValue::String(text) => js_literal(text),
                PropValue::StringArray(items) => js_literal(items),
                PropValue::Json(value) => js_literal(value),
                PropValue::Resource(resource_id) => {
                    js_literal(&self.scope.name_for(resource_id, &prop.name))
                }
                PropValue::Expression(expression) => self.expression(expression),
                PropValue::Action(value) => self.action(value),
                PropValue::Asset(_)
                | PropValue::Page(_)
                | PropValue::Parameter(_)
                | PropValue::AnimationAction(_) => continue,
            };
            if prop.name == "className" {
                class_name = Some(match class_name {
                    Some(generated) => format!("{generated} + \" \" + {value}"),
                    None => value,
                });
                continue;
            }
            let _ = write!(out, " {}={{{value}}}", prop.name);
        }

        match class_name {
            Some(class_name) => format!(" className={{{class_name}}}{out}"),
            None => out,
        }
    }

    /// Best-effort callback for an action prop.
    ///
    /// Assignments to variables become setter calls.
    fn action(&self, value: &Value) -> String {
        let Some(executes) = value.as_array() else {
            return "undefined".to_owned();
        };
        let mut args: Vec<String> = Vec::new();
        let mut body = String::new();
        for execute in executes {
            if let Some(list) = execute.get("args").and_then(Value::as_array) {
                for arg in list.iter().filter_map(Value::as_str) {
                    if !args.iter().any(|existing| existing == arg) {
                        args.push(arg.to_owned());
                    }
                }
            }
            let code = execute.get("code").and_then(Value::as_str).unwrap_or_default();
            let assigned = ASSIGNMENT.replace_all(code, |caps: &Captures<'_>| {
                let id = decode_data_source_id(&caps[2]);
                match self.setters.get(&id) {
                    Some(setter) => format!("{}{setter}({})", &caps[1], caps[3].trim()),
                    None => caps[0].to_owned(),
                }
            });
            let _ = writeln!(body, "{}", self.expression(&assigned));
        }
        let params: Vec<String> = args.iter().map(|arg| format!("{arg}: any")).collect();
        format!("({}) => {{\n{body}}}", params.join(", "))
    }
}
