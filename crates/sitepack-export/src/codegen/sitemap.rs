//! Sitemap entries for static HTML pages.

use sitepack_model::{Pages, is_pathname_pattern, page_path};

use super::{SitemapEntry, SitemapGenerator};

/// Lists static HTML pages that are not excluded from search.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSitemapGenerator;

impl SitemapGenerator for DefaultSitemapGenerator {
    fn generate(&self, pages: &Pages, updated_at: &str) -> Vec<SitemapEntry> {
        let last_modified = updated_at.split('T').next().unwrap_or(updated_at);
        pages
            .all()
            .filter(|page| !page.is_xml())
            .filter(|page| {
                page.meta
                    .exclude_page_from_search
                    .as_deref()
                    .is_none_or(|exclude| exclude.trim() != "true")
            })
            .map(|page| page_path(&page.id, pages))
            .filter(|path| !is_pathname_pattern(path))
            .map(|path| SitemapEntry {
                path,
                last_modified: last_modified.to_owned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_build;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sitemap_entries() {
        let data = sample_build();

        let entries = DefaultSitemapGenerator.generate(&data.build.pages, &data.build.updated_at);

        assert_eq!(
            entries,
            vec![
                SitemapEntry {
                    path: "/".to_owned(),
                    last_modified: "2024-05-07".to_owned(),
                },
                SitemapEntry {
                    path: "/about".to_owned(),
                    last_modified: "2024-05-07".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_entries_serialize_camel_case() {
        let entry = SitemapEntry {
            path: "/".to_owned(),
            last_modified: "2024-01-01".to_owned(),
        };

        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"path":"/","lastModified":"2024-01-01"}"#
        );
    }
}
