//! File entries stored in the virtual filesystem.

use std::fmt;

/// Content of a virtual file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    /// Raw bytes of the content. Text is returned as UTF-8.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Text content, if this is a text file.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for FileContent {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// A normalized path paired with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Normalized path (no leading `./` or `/`, forward slashes only).
    pub path: String,
    pub content: FileContent,
}

impl VirtualFile {
    /// Create a file entry. The path is normalized.
    #[must_use]
    pub fn new(path: &str, content: impl Into<FileContent>) -> Self {
        Self {
            path: crate::normalize_path(path),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_len_counts_utf8_bytes() {
        let content = FileContent::from("héllo");

        assert_eq!(content.len(), 6);
    }

    #[test]
    fn test_bytes_have_no_text() {
        let content = FileContent::from(vec![0u8, 159, 146, 150]);

        assert_eq!(content.as_text(), None);
        assert_eq!(content.as_bytes(), &[0, 159, 146, 150]);
    }

    #[test]
    fn test_virtual_file_normalizes_path() {
        let file = VirtualFile::new(".\\app\\index.css", "");

        assert_eq!(file.path, "app/index.css");
    }
}
