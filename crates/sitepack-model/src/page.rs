//! Pages, folders and project-level metadata.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ROOT_FOLDER_ID;
use crate::table::lenient_list;

/// A page in the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    /// Expression producing the document title.
    #[serde(default)]
    pub title: String,
    /// Path relative to the enclosing folder.
    pub path: String,
    pub root_instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data_source_id: Option<String>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl Page {
    /// Whether the page renders an XML document.
    #[must_use]
    pub fn is_xml(&self) -> bool {
        self.meta.document_type.as_deref() == Some("xml")
    }
}

/// Page metadata. Most values are expressions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_page_from_search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_image_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// `html` or `xml`; absent means `html`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomMeta>,
}

/// A custom `<meta>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMeta {
    pub property: String,
    /// Expression producing the content.
    pub content: String,
}

/// A folder grouping pages and other folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Page or folder ids.
    #[serde(default)]
    pub children: Vec<String>,
}

/// Project-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_asset_id: Option<String>,
    /// Custom HTML injected into the site root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atomic_styles: Option<bool>,
}

/// A permanent or temporary redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub old: String,
    pub new: String,
    /// Accepts a number or a numeric string.
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<u16>,
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Number(u16),
        Text(String),
    }

    Ok(match Option::<Status>::deserialize(deserializer)? {
        Some(Status::Number(code)) => Some(code),
        Some(Status::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// The page tree of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pages {
    pub home_page: Page,
    #[serde(default, deserialize_with = "lenient_list")]
    pub pages: Vec<Page>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub folders: Vec<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProjectMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerSettings>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<Redirect>,
}

impl Pages {
    /// Home page followed by every other page.
    pub fn all(&self) -> impl Iterator<Item = &Page> {
        std::iter::once(&self.home_page).chain(&self.pages)
    }

    /// Whether atomic CSS is enabled. Defaults to true.
    #[must_use]
    pub fn atomic_styles(&self) -> bool {
        self.compiler
            .as_ref()
            .and_then(|compiler| compiler.atomic_styles)
            .unwrap_or(true)
    }
}

/// Full path of a page, including the slugs of its enclosing folders.
///
/// The root folder contributes nothing. The result always starts with `/`;
/// the home page and unknown ids resolve to `/`.
#[must_use]
pub fn page_path(page_id: &str, pages: &Pages) -> String {
    let folders: HashMap<&str, &Folder> = pages
        .folders
        .iter()
        .map(|folder| (folder.id.as_str(), folder))
        .collect();
    let parents: HashMap<&str, &str> = pages
        .folders
        .iter()
        .flat_map(|folder| {
            folder
                .children
                .iter()
                .map(move |child| (child.as_str(), folder.id.as_str()))
        })
        .collect();

    let mut segments = Vec::new();
    let Some(page) = pages.all().find(|page| page.id == page_id) else {
        return "/".to_owned();
    };
    segments.push(page.path.as_str());

    let mut current = parents.get(page.id.as_str()).copied();
    let mut depth = 0;
    while let Some(folder_id) = current {
        // Guard against cyclic folder trees.
        depth += 1;
        if depth > folders.len() {
            break;
        }
        let Some(folder) = folders.get(folder_id) else {
            break;
        };
        if folder.id != ROOT_FOLDER_ID {
            segments.push(folder.slug.as_str());
        }
        current = parents.get(folder_id).copied();
    }

    let joined = segments
        .iter()
        .rev()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

/// Whether a path contains dynamic segments (`:param` or wildcards).
#[must_use]
pub fn is_pathname_pattern(path: &str) -> bool {
    path.split('/')
        .any(|segment| segment.starts_with(':') || segment.contains('*'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(id: &str, path: &str) -> Page {
        Page {
            id: id.to_owned(),
            name: id.to_owned(),
            title: "\"Title\"".to_owned(),
            path: path.to_owned(),
            root_instance_id: format!("{id}-body"),
            system_data_source_id: None,
            meta: PageMeta::default(),
        }
    }

    fn folder(id: &str, slug: &str, children: &[&str]) -> Folder {
        Folder {
            id: id.to_owned(),
            name: id.to_owned(),
            slug: slug.to_owned(),
            children: children.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    fn sample_pages() -> Pages {
        Pages {
            home_page: page("home", ""),
            pages: vec![page("about", "/about"), page("post", "/:slug")],
            folders: vec![
                folder(ROOT_FOLDER_ID, "", &["home", "about", "blog"]),
                folder("blog", "blog", &["post"]),
            ],
            meta: None,
            compiler: None,
            redirects: Vec::new(),
        }
    }

    #[test]
    fn test_page_path() {
        let pages = sample_pages();

        assert_eq!(page_path("home", &pages), "/");
        assert_eq!(page_path("about", &pages), "/about");
        assert_eq!(page_path("post", &pages), "/blog/:slug");
        assert_eq!(page_path("missing", &pages), "/");
    }

    #[test]
    fn test_page_path_ignores_root_slug() {
        let mut pages = sample_pages();
        pages.folders[0].slug = "ignored".to_owned();

        assert_eq!(page_path("about", &pages), "/about");
    }

    #[test]
    fn test_is_pathname_pattern() {
        assert!(is_pathname_pattern("/blog/:slug"));
        assert!(is_pathname_pattern("/files/*"));
        assert!(is_pathname_pattern("/docs/:path*"));
        assert!(!is_pathname_pattern("/"));
        assert!(!is_pathname_pattern("/about/team"));
        assert!(!is_pathname_pattern("/time:less"));
    }

    #[test]
    fn test_redirect_status_forms() {
        let redirects: Vec<Redirect> = serde_json::from_str(
            r#"[{"old":"/a","new":"/b","status":302},
                {"old":"/c","new":"/d","status":"301"},
                {"old":"/e","new":"/f"}]"#,
        )
        .unwrap();

        assert_eq!(redirects[0].status, Some(302));
        assert_eq!(redirects[1].status, Some(301));
        assert_eq!(redirects[2].status, None);
    }

    #[test]
    fn test_atomic_styles_default() {
        let mut pages = sample_pages();
        assert!(pages.atomic_styles());

        pages.compiler = Some(CompilerSettings {
            atomic_styles: Some(false),
        });
        assert!(!pages.atomic_styles());
    }

    #[test]
    fn test_xml_document_type() {
        let mut sitemap = page("sitemap", "/sitemap.xml");
        sitemap.meta.document_type = Some("xml".to_owned());

        assert!(sitemap.is_xml());
        assert!(!page("home", "").is_xml());
    }
}
