//! Glob matching over normalized paths.
//!
//! Only two wildcards are recognised: `*` matches any run of characters other
//! than `/`, and `**` matches any run of characters including `/`. Every other
//! character, including `?` and `[`, matches itself.

use regex::Regex;

use crate::VfsError;

/// Compiled glob, anchored to the whole path.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self, VfsError> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|source| VfsError::InvalidGlob {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Whether the normalized path matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    let mut buf = [0u8; 4];
    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_star_crosses_directories() {
        let glob = GlobPattern::new("app/**").unwrap();

        assert!(glob.matches("app/__generated__/index.css"));
        assert!(!glob.matches("pages/index/+Page.tsx"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let glob = GlobPattern::new("pages/*/+Page.tsx").unwrap();

        assert!(glob.matches("pages/index/+Page.tsx"));
        assert!(!glob.matches("pages/blog/post/+Page.tsx"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let glob = GlobPattern::new("*.json").unwrap();

        assert!(glob.matches("package.json"));
        assert!(!glob.matches("app/package.json"));
        assert!(!glob.matches("package.json.bak"));
    }

    #[test]
    fn test_other_characters_are_literal() {
        let glob = GlobPattern::new("app/$resources.sitemap.xml.ts").unwrap();

        assert!(glob.matches("app/$resources.sitemap.xml.ts"));
        assert!(!glob.matches("app/$resourcesXsitemap.xml.ts"));

        let question = GlobPattern::new("a?.ts").unwrap();
        assert!(question.matches("a?.ts"));
        assert!(!question.matches("ab.ts"));
    }

    #[test]
    fn test_as_str_keeps_source() {
        assert_eq!(GlobPattern::new("app/**").unwrap().as_str(), "app/**");
    }
}
