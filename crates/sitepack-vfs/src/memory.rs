//! Path-keyed in-memory file store.

use std::collections::BTreeMap;

use crate::{FileContent, GlobPattern, VfsError, VirtualFile};

/// Normalize a path for storage.
///
/// Backslashes become forward slashes, then any leading `./` and `/`
/// prefixes are stripped.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_owned()
}

/// In-memory filesystem keyed by normalized path.
///
/// Writes overwrite earlier entries at the same normalized path. Listings are
/// returned in ascending path order.
///
/// # Example
///
/// ```
/// use sitepack_vfs::MemoryFs;
///
/// let fs = MemoryFs::new()
///     .with_file("package.json", "{}")
///     .with_file("app/constants.mjs", "export const assetBaseUrl = \"/assets/\";");
///
/// let paths: Vec<_> = fs.list().iter().map(|f| f.path.as_str()).collect();
/// assert_eq!(paths, ["app/constants.mjs", "package.json"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: BTreeMap<String, VirtualFile>,
}

impl MemoryFs {
    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    ///
    /// # Panics
    ///
    /// Panics if the path normalizes to an empty string.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<FileContent>) -> Self {
        self.write(path, content)
            .expect("builder paths must not be empty");
        self
    }

    /// Store content at the normalized path, replacing any existing entry.
    pub fn write(&mut self, path: &str, content: impl Into<FileContent>) -> Result<(), VfsError> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(VfsError::InvalidPath(path.to_owned()));
        }
        self.files.insert(
            normalized.clone(),
            VirtualFile {
                path: normalized,
                content: content.into(),
            },
        );
        Ok(())
    }

    /// Content stored at `path`.
    pub fn read(&self, path: &str) -> Result<&FileContent, VfsError> {
        let normalized = normalize_path(path);
        self.files
            .get(&normalized)
            .map(|file| &file.content)
            .ok_or(VfsError::NotFound(normalized))
    }

    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    /// Remove the entry at `path`. Returns whether an entry was removed.
    pub fn delete(&mut self, path: &str) -> bool {
        self.files.remove(&normalize_path(path)).is_some()
    }

    /// All files in ascending path order.
    #[must_use]
    pub fn list(&self) -> Vec<&VirtualFile> {
        self.files.values().collect()
    }

    /// Files whose path matches the glob, in ascending path order.
    pub fn list_matching(&self, pattern: &str) -> Result<Vec<&VirtualFile>, VfsError> {
        let glob = GlobPattern::new(pattern)?;
        Ok(self
            .files
            .values()
            .filter(|file| glob.matches(&file.path))
            .collect())
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Sum of content sizes in bytes.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.files.values().map(|file| file.content.len()).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume the filesystem, returning files in ascending path order.
    #[must_use]
    pub fn into_files(self) -> Vec<VirtualFile> {
        self.files.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./app/index.css"), "app/index.css");
        assert_eq!(normalize_path("/app/index.css"), "app/index.css");
        assert_eq!(normalize_path("app\\__generated__\\x.tsx"), "app/__generated__/x.tsx");
        assert_eq!(normalize_path(".//./a"), "a");
        assert_eq!(normalize_path("../a"), "../a");
    }

    #[test]
    fn test_write_then_read() {
        let mut fs = MemoryFs::new();
        fs.write("README.md", "# Site").unwrap();

        assert_eq!(fs.read("README.md").unwrap().as_text(), Some("# Site"));
    }

    #[test]
    fn test_write_overwrites_after_normalization() {
        let mut fs = MemoryFs::new();
        fs.write("/app/a.ts", "first").unwrap();
        fs.write("./app/a.ts", "second").unwrap();

        assert_eq!(fs.len(), 1);
        assert_eq!(fs.read("app/a.ts").unwrap().as_text(), Some("second"));
    }

    #[test]
    fn test_write_empty_path_fails() {
        let mut fs = MemoryFs::new();

        let err = fs.write("./", "x").unwrap_err();

        assert!(matches!(err, VfsError::InvalidPath(_)));
        assert!(fs.is_empty());
    }

    #[test]
    fn test_read_missing() {
        let fs = MemoryFs::new();

        let err = fs.read("/missing.ts").unwrap_err();

        assert!(matches!(err, VfsError::NotFound(path) if path == "missing.ts"));
    }

    #[test]
    fn test_exists_and_delete() {
        let mut fs = MemoryFs::new().with_file("a.ts", "");

        assert!(fs.exists("./a.ts"));
        assert!(fs.delete("/a.ts"));
        assert!(!fs.exists("a.ts"));
        assert!(!fs.delete("a.ts"));
    }

    #[test]
    fn test_list_is_sorted() {
        let fs = MemoryFs::new()
            .with_file("pages/index/+Page.tsx", "")
            .with_file("app/__generated__/index.css", "")
            .with_file(".npmrc", "");

        let paths: Vec<_> = fs.list().iter().map(|f| f.path.clone()).collect();

        assert_eq!(
            paths,
            vec![".npmrc", "app/__generated__/index.css", "pages/index/+Page.tsx"]
        );
    }

    #[test]
    fn test_list_matching() {
        let fs = MemoryFs::new()
            .with_file("app/__generated__/index.css", "")
            .with_file("pages/index/+Page.tsx", "");

        let matched = fs.list_matching("app/**").unwrap();

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].path, "app/__generated__/index.css");
    }

    #[test]
    fn test_total_size_mixes_text_and_bytes() {
        let fs = MemoryFs::new()
            .with_file("a.txt", "ab")
            .with_file("b.bin", vec![1u8, 2, 3]);

        assert_eq!(fs.total_size(), 5);
    }

    #[test]
    fn test_clear() {
        let mut fs = MemoryFs::new().with_file("a.txt", "x");

        fs.clear();

        assert!(fs.is_empty());
        assert_eq!(fs.total_size(), 0);
    }

    #[test]
    fn test_into_files_keeps_order() {
        let fs = MemoryFs::new().with_file("b", "").with_file("a", "");

        let files = fs.into_files();

        assert_eq!(files[0].path, "a");
        assert_eq!(files[1].path, "b");
    }
}
