//! Per-page data partitioning.
//!
//! For each page the partitioner computes the instances reachable from the
//! page root and the exact subset of props, data sources, resources and
//! styles they need, plus the font and background-image assets the page's
//! styles reference.

use std::collections::{HashMap, HashSet};

use sitepack_model::{
    Asset, BuildData, DataSource, ImageValue, Instance, Page, Prop, Resource, ROOT_INSTANCE_ID,
    StyleDecl, StyleValue, Table,
};

/// Instances indexed by id.
#[derive(Debug)]
pub struct InstanceArena<'a> {
    by_id: HashMap<&'a str, &'a Instance>,
}

impl<'a> InstanceArena<'a> {
    #[must_use]
    pub fn new(instances: &'a Table<Instance>) -> Self {
        Self {
            by_id: instances
                .iter()
                .map(|(id, instance)| (id.as_str(), instance))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a Instance> {
        self.by_id.get(id).copied()
    }

    /// Ids reachable from `root` through `id` children, including `root` itself.
    ///
    /// Referenced ids are included even when no instance exists for them.
    #[must_use]
    pub fn reachable_from(&self, root: &str) -> HashSet<String> {
        let mut visited = HashSet::from([root.to_owned()]);
        let mut worklist = vec![root.to_owned()];
        while let Some(id) = worklist.pop() {
            let Some(instance) = self.get(&id) else {
                tracing::debug!(instance_id = %id, "Referenced instance is missing");
                continue;
            };
            for child in instance.child_ids() {
                if visited.insert(child.to_owned()) {
                    worklist.push(child.to_owned());
                }
            }
        }
        visited
    }
}

/// Data needed to generate one page.
#[derive(Debug, Clone)]
pub struct PageData {
    pub page: Page,
    /// Reachable ids, including [`ROOT_INSTANCE_ID`].
    pub reachable: HashSet<String>,
    pub instances: Table<Instance>,
    pub props: Table<Prop>,
    pub data_sources: Table<DataSource>,
    pub resources: Table<Resource>,
    /// Style declarations applying to reachable instances.
    pub styles: Vec<StyleDecl>,
    /// Filenames of font assets used by the page's styles.
    pub font_assets: Vec<String>,
    /// Filenames of image assets used as background layers.
    pub background_image_assets: Vec<String>,
}

/// Splits a build into self-contained per-page subsets.
pub struct Partitioner<'a> {
    data: &'a BuildData,
    arena: InstanceArena<'a>,
    props: &'a [Prop],
}

impl<'a> Partitioner<'a> {
    /// Create a partitioner over `data` using already-normalized `props`.
    #[must_use]
    pub fn new(data: &'a BuildData, props: &'a [Prop]) -> Self {
        Self {
            data,
            arena: InstanceArena::new(&data.build.instances),
            props,
        }
    }

    /// Compute the data subset for `page`.
    #[must_use]
    pub fn partition(&self, page: &Page) -> PageData {
        let build = &self.data.build;

        let mut reachable = self.arena.reachable_from(&page.root_instance_id);
        reachable.insert(ROOT_INSTANCE_ID.to_owned());

        let instances: Table<Instance> = build
            .instances
            .iter()
            .filter(|(_, instance)| reachable.contains(&instance.id))
            .cloned()
            .collect();

        let mut resource_ids = HashSet::new();
        let mut props = Vec::new();
        for prop in self.props {
            if reachable.contains(&prop.instance_id) {
                if let Some(resource_id) = prop.resource_id() {
                    resource_ids.insert(resource_id.to_owned());
                }
                props.push((prop.id.clone(), prop.clone()));
            }
        }

        let mut data_sources = Vec::new();
        for (id, data_source) in &build.data_sources {
            let scoped = data_source
                .scope_instance_id()
                .is_some_and(|scope| reachable.contains(scope));
            if scoped {
                if let Some(resource_id) = data_source.resource_id() {
                    resource_ids.insert(resource_id.to_owned());
                }
                data_sources.push((id.clone(), data_source.clone()));
            }
        }

        let resources: Table<Resource> = build
            .resources
            .iter()
            .filter(|(id, _)| resource_ids.contains(id))
            .cloned()
            .collect();

        let style_source_ids: HashSet<&str> = build
            .style_source_selections
            .iter()
            .filter(|(_, selection)| reachable.contains(&selection.instance_id))
            .flat_map(|(_, selection)| selection.values.iter().map(String::as_str))
            .collect();

        let styles: Vec<StyleDecl> = build
            .styles
            .iter()
            .filter(|(_, decl)| style_source_ids.contains(decl.style_source_id.as_str()))
            .map(|(_, decl)| decl.clone())
            .collect();

        let font_assets = font_assets(&styles, &self.data.assets);
        let background_image_assets = background_image_assets(&styles, &self.data.assets);

        tracing::debug!(
            page_id = %page.id,
            instances = instances.len(),
            props = props.len(),
            resources = resources.len(),
            styles = styles.len(),
            "Partitioned page"
        );

        PageData {
            page: page.clone(),
            reachable,
            instances,
            props,
            data_sources,
            resources,
            styles,
            font_assets,
            background_image_assets,
        }
    }
}

fn font_assets(styles: &[StyleDecl], assets: &[Asset]) -> Vec<String> {
    let families: HashSet<&str> = styles
        .iter()
        .filter(|decl| decl.property == "fontFamily")
        .filter_map(|decl| match &decl.value {
            StyleValue::FontFamily { value } => Some(value),
            _ => None,
        })
        .flatten()
        .map(String::as_str)
        .collect();

    assets
        .iter()
        .filter(|asset| asset.font_family().is_some_and(|family| families.contains(family)))
        .map(|asset| asset.name.clone())
        .collect()
}

fn background_image_assets(styles: &[StyleDecl], assets: &[Asset]) -> Vec<String> {
    let ids: HashSet<&str> = styles
        .iter()
        .filter(|decl| decl.property == "backgroundImage")
        .filter_map(|decl| match &decl.value {
            StyleValue::Layers { value } => Some(value),
            _ => None,
        })
        .flatten()
        .filter_map(|layer| match layer {
            StyleValue::Image {
                value: ImageValue::Asset { value },
                ..
            } => Some(value.as_str()),
            _ => None,
        })
        .collect();

    assets
        .iter()
        .filter(|asset| asset.is_image() && ids.contains(asset.id.as_str()))
        .map(|asset| asset.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;

    fn ids<T>(table: &Table<T>) -> Vec<&str> {
        table.iter().map(|(id, _)| id.as_str()).collect()
    }

    #[test]
    fn test_reachable_follows_id_children_only() {
        let data = sample_build();
        let arena = InstanceArena::new(&data.build.instances);

        let mut reachable: Vec<_> = arena.reachable_from("home-body").into_iter().collect();
        reachable.sort();

        assert_eq!(reachable, vec!["home-body", "home-box", "home-form", "home-text"]);
    }

    #[test]
    fn test_reachable_survives_cycles() {
        let instances: Table<Instance> = serde_json::from_str(
            r#"[["a",{"id":"a","component":"Box","children":[{"type":"id","value":"b"}]}],
                ["b",{"id":"b","component":"Box","children":[{"type":"id","value":"a"},{"type":"id","value":"ghost"}]}]]"#,
        )
        .unwrap();
        let arena = InstanceArena::new(&instances);

        let reachable = arena.reachable_from("a");

        assert_eq!(reachable.len(), 3);
        assert!(reachable.contains("ghost"));
    }

    #[test]
    fn test_page_isolation() {
        let data = sample_build();
        let props: Vec<Prop> = data.build.props.iter().map(|(_, p)| p.clone()).collect();
        let partitioner = Partitioner::new(&data, &props);

        let about = partitioner.partition(&data.pages["about"]);

        assert_eq!(ids(&about.instances), vec!["about-body"]);
        assert!(about.reachable.contains(ROOT_INSTANCE_ID));
        for (_, prop) in &about.props {
            assert!(about.reachable.contains(&prop.instance_id));
        }
        for (_, ds) in &about.data_sources {
            assert!(about.reachable.contains(ds.scope_instance_id().unwrap()));
        }
        assert!(about.resources.is_empty());
    }

    #[test]
    fn test_resource_closure() {
        let data = sample_build();
        let props: Vec<Prop> = data.build.props.iter().map(|(_, p)| p.clone()).collect();
        let partitioner = Partitioner::new(&data, &props);

        let home = partitioner.partition(&data.pages["home"]);

        assert_eq!(ids(&home.data_sources), vec!["ds-posts", "ds-count", "home-system"]);
        assert_eq!(ids(&home.resources), vec!["res-posts"]);
        assert!(!ids(&home.props).contains(&"about-title"));
    }

    #[test]
    fn test_unscoped_data_source_is_excluded() {
        let data = sample_build();
        let partitioner = Partitioner::new(&data, &[]);

        let home = partitioner.partition(&data.pages["home"]);

        assert!(!ids(&home.data_sources).contains(&"ds-global"));
    }

    #[test]
    fn test_page_assets_come_from_page_styles() {
        let data = sample_build();
        let partitioner = Partitioner::new(&data, &[]);

        let home = partitioner.partition(&data.pages["home"]);
        let about = partitioner.partition(&data.pages["about"]);

        assert_eq!(home.font_assets, vec!["inter.woff2"]);
        assert_eq!(home.background_image_assets, vec!["hero.png"]);
        assert_eq!(about.font_assets, vec!["serif.woff2"]);
        assert!(about.background_image_assets.is_empty());
    }

    #[test]
    fn test_root_only_page() {
        let data = sample_build();
        let partitioner = Partitioner::new(&data, &[]);
        let mut page = data.pages["about"].clone();
        page.root_instance_id = "nothing-here".to_owned();

        let subset = partitioner.partition(&page);

        assert!(subset.instances.is_empty());
        assert!(subset.reachable.contains(ROOT_INSTANCE_ID));
        assert!(subset.styles.is_empty());
    }
}
