//! In-memory virtual filesystem.
//!
//! [`MemoryFs`] is the staging area for generated site output. Files are kept in
//! a path-ordered map, so listings are deterministic and can be handed directly
//! to the archive packager.
//!
//! # Example
//!
//! ```
//! use sitepack_vfs::MemoryFs;
//!
//! let mut fs = MemoryFs::new();
//! fs.write("./app/index.css", "body {}").unwrap();
//!
//! assert!(fs.exists("app/index.css"));
//! assert_eq!(fs.list_matching("app/**").unwrap().len(), 1);
//! ```

mod file;
mod memory;
mod pattern;

pub use file::{FileContent, VirtualFile};
pub use memory::{MemoryFs, normalize_path};
pub use pattern::GlobPattern;

/// Error returned by virtual filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// No file stored at the given path.
    #[error("File not found: {0}")]
    NotFound(String),
    /// Path normalizes to an empty string.
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),
    /// Glob could not be compiled.
    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
