//! Component libraries and the framework metadata table.
//!
//! A [`ComponentRegistry`] lists the component libraries the generated app can
//! import from. [`FrameworkMeta`] flattens it into lookup tables for one
//! generation run.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sitepack_model::ELEMENT_COMPONENT;

/// Base component library. Its components are keyed by bare name.
pub const BASE_LIBRARY: &str = "@webstudio-is/sdk-components-react";
pub const RADIX_LIBRARY: &str = "@webstudio-is/sdk-components-react-radix";
pub const ANIMATION_LIBRARY: &str = "@webstudio-is/sdk-components-animation";

/// Root component of every page tree.
pub const ROOT_COMPONENT: &str = "ws:root";
pub const COLLECTION_COMPONENT: &str = "ws:collection";
pub const DESCENDANT_COMPONENT: &str = "ws:descendant";
pub const BLOCK_COMPONENT: &str = "ws:block";
pub const BLOCK_TEMPLATE_COMPONENT: &str = "ws:block-template";

const CORE_COMPONENTS: [(&str, &str, &str); 6] = [
    (ROOT_COMPONENT, "hidden", "Global Root"),
    (ELEMENT_COMPONENT, "general", "Element"),
    (COLLECTION_COMPONENT, "data", "Collection"),
    (DESCENDANT_COMPONENT, "internal", "Descendant"),
    (BLOCK_COMPONENT, "general", "Content Block"),
    (BLOCK_TEMPLATE_COMPONENT, "hidden", "Block Template"),
];

const BASE_COMPONENTS: &[(&str, &str)] = &[
    ("Slot", "general"),
    ("Fragment", "hidden"),
    ("HtmlEmbed", "general"),
    ("MarkdownEmbed", "general"),
    ("Body", "general"),
    ("Box", "general"),
    ("Text", "typography"),
    ("Heading", "typography"),
    ("Paragraph", "typography"),
    ("Link", "general"),
    ("RichTextLink", "hidden"),
    ("Span", "hidden"),
    ("Bold", "hidden"),
    ("Italic", "hidden"),
    ("Superscript", "hidden"),
    ("Subscript", "hidden"),
    ("Button", "forms"),
    ("List", "typography"),
    ("ListItem", "typography"),
    ("Separator", "general"),
    ("CodeText", "typography"),
    ("Image", "media"),
    ("Blockquote", "typography"),
    ("Form", "forms"),
    ("Label", "forms"),
    ("Input", "forms"),
    ("Textarea", "forms"),
    ("Select", "forms"),
    ("Option", "forms"),
    ("Checkbox", "forms"),
    ("RadioButton", "forms"),
    ("Vimeo", "media"),
    ("VimeoPreviewImage", "hidden"),
    ("VimeoPlayButton", "hidden"),
    ("VimeoSpinner", "hidden"),
    ("YouTube", "media"),
    ("Video", "media"),
    ("Time", "localization"),
    ("XmlNode", "xml"),
    ("XmlTime", "xml"),
];

const RADIX_COMPONENTS: &[(&str, &str)] = &[
    ("Collapsible", "radix"),
    ("CollapsibleTrigger", "hidden"),
    ("CollapsibleContent", "hidden"),
    ("Dialog", "radix"),
    ("DialogTrigger", "hidden"),
    ("DialogOverlay", "hidden"),
    ("DialogContent", "hidden"),
    ("DialogClose", "hidden"),
    ("DialogTitle", "hidden"),
    ("DialogDescription", "hidden"),
    ("Sheet", "radix"),
    ("SheetTrigger", "hidden"),
    ("SheetOverlay", "hidden"),
    ("SheetContent", "hidden"),
    ("SheetClose", "hidden"),
    ("SheetTitle", "hidden"),
    ("SheetDescription", "hidden"),
    ("Popover", "radix"),
    ("PopoverTrigger", "hidden"),
    ("PopoverContent", "hidden"),
    ("PopoverClose", "hidden"),
    ("Tooltip", "radix"),
    ("TooltipTrigger", "hidden"),
    ("TooltipContent", "hidden"),
    ("Tabs", "radix"),
    ("TabsList", "hidden"),
    ("TabsTrigger", "hidden"),
    ("TabsContent", "hidden"),
    ("Label", "radix"),
    ("Accordion", "radix"),
    ("AccordionItem", "hidden"),
    ("AccordionHeader", "hidden"),
    ("AccordionTrigger", "hidden"),
    ("AccordionContent", "hidden"),
    ("NavigationMenu", "radix"),
    ("NavigationMenuList", "hidden"),
    ("NavigationMenuItem", "hidden"),
    ("NavigationMenuTrigger", "hidden"),
    ("NavigationMenuContent", "hidden"),
    ("NavigationMenuLink", "hidden"),
    ("NavigationMenuViewport", "hidden"),
    ("Select", "radix"),
    ("SelectTrigger", "hidden"),
    ("SelectValue", "hidden"),
    ("SelectContent", "hidden"),
    ("SelectViewport", "hidden"),
    ("SelectItem", "hidden"),
    ("SelectItemIndicator", "hidden"),
    ("SelectItemText", "hidden"),
    ("Switch", "radix"),
    ("SwitchThumb", "hidden"),
    ("Checkbox", "radix"),
    ("CheckboxIndicator", "hidden"),
    ("RadioGroup", "radix"),
    ("RadioGroupItem", "hidden"),
    ("RadioGroupIndicator", "hidden"),
];

const ANIMATION_COMPONENTS: &[(&str, &str)] = &[
    ("AnimateChildren", "animations"),
    ("AnimateText", "animations"),
    ("StaggerAnimation", "animations"),
    ("VideoAnimation", "animations"),
];

/// Whether `component` is a built-in core component.
#[must_use]
pub fn is_core_component(component: &str) -> bool {
    CORE_COMPONENTS.iter().any(|(name, _, _)| *name == component)
}

/// Metadata for the core components, keyed by component name.
#[must_use]
pub fn core_metas() -> HashMap<String, ComponentMeta> {
    CORE_COMPONENTS
        .iter()
        .map(|(name, category, label)| {
            (
                (*name).to_owned(),
                ComponentMeta {
                    category: (*category).to_owned(),
                    label: Some((*label).to_owned()),
                },
            )
        })
        .collect()
}

/// Metadata describing one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMeta {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One component exported by a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A component library module and its exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub module: String,
    /// Whether components are keyed `<module>:<name>` instead of by bare name.
    #[serde(default = "default_namespaced")]
    pub namespaced: bool,
    pub components: Vec<ComponentEntry>,
}

fn default_namespaced() -> bool {
    true
}

impl Library {
    fn from_table(module: &str, namespaced: bool, components: &[(&str, &str)]) -> Self {
        Self {
            module: module.to_owned(),
            namespaced,
            components: components
                .iter()
                .map(|(name, category)| ComponentEntry {
                    name: (*name).to_owned(),
                    category: (*category).to_owned(),
                    label: None,
                })
                .collect(),
        }
    }

    /// Key under which instances reference `name`.
    #[must_use]
    pub fn key(&self, name: &str) -> String {
        if self.namespaced {
            format!("{}:{name}", self.module)
        } else {
            name.to_owned()
        }
    }
}

/// Error loading a registry extension.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read component registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid component registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered set of component libraries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRegistry {
    libraries: Vec<Library>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self {
            libraries: vec![
                Library::from_table(BASE_LIBRARY, false, BASE_COMPONENTS),
                Library::from_table(RADIX_LIBRARY, true, RADIX_COMPONENTS),
                Library::from_table(ANIMATION_LIBRARY, true, ANIMATION_COMPONENTS),
            ],
        }
    }
}

impl ComponentRegistry {
    /// Registry with the built-in libraries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library, merging components into an existing entry for the same module.
    #[must_use]
    pub fn with_library(mut self, library: Library) -> Self {
        match self
            .libraries
            .iter_mut()
            .find(|existing| existing.module == library.module)
        {
            Some(existing) => {
                for component in library.components {
                    match existing
                        .components
                        .iter_mut()
                        .find(|c| c.name == component.name)
                    {
                        Some(slot) => *slot = component,
                        None => existing.components.push(component),
                    }
                }
            }
            None => self.libraries.push(library),
        }
        self
    }

    /// Extend the registry with libraries listed in a JSON document.
    ///
    /// The document is an array of `{ "module", "components": [{ "name", "category" }] }`.
    pub fn extend_from_json(self, json: &str) -> Result<Self, RegistryError> {
        let libraries: Vec<Library> = serde_json::from_str(json)?;
        Ok(libraries.into_iter().fold(self, Self::with_library))
    }

    /// Extend the registry with the JSON document at `path`.
    pub fn extend_from_file(self, path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading component registry extension");
        self.extend_from_json(&json)
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }
}

/// Lookup tables derived from a registry for one generation run.
#[derive(Debug, Clone, Default)]
pub struct FrameworkMeta {
    /// Component key to metadata.
    pub metas: HashMap<String, ComponentMeta>,
    /// Component key to `<module>:<export>` descriptor.
    pub components: HashMap<String, String>,
    /// HTML tag to descriptor, for `ws:element` overrides.
    pub tags: HashMap<String, String>,
}

impl FrameworkMeta {
    /// Flatten a registry into lookup tables.
    #[must_use]
    pub fn from_registry(registry: &ComponentRegistry) -> Self {
        let mut meta = Self::default();
        for library in registry.libraries() {
            for component in &library.components {
                let key = library.key(&component.name);
                meta.components
                    .insert(key.clone(), format!("{}:{}", library.module, component.name));
                meta.metas.insert(
                    key,
                    ComponentMeta {
                        category: component.category.clone(),
                        label: component.label.clone(),
                    },
                );
            }
        }
        for (tag, name) in [("textarea", "Textarea"), ("input", "Input"), ("select", "Select")] {
            meta.tags
                .insert(tag.to_owned(), format!("{BASE_LIBRARY}:{name}"));
        }
        meta
    }
}

/// Split a `<module>:<export>` descriptor.
#[must_use]
pub fn split_descriptor(descriptor: &str) -> Option<(&str, &str)> {
    descriptor.rsplit_once(':')
}

/// Short display name of a component key (`module:Name` becomes `Name`).
#[must_use]
pub fn short_name(component: &str) -> &str {
    component.rsplit_once(':').map_or(component, |(_, name)| name)
}
