//! ZIP packaging for generated site files.
//!
//! [`pack`] writes every [`VirtualFile`] into a single in-memory ZIP buffer,
//! optionally nested under a root folder. Entries use DEFLATE and a fixed
//! timestamp, so identical input produces identical bytes.

use std::io::{Cursor, Write};

use sitepack_vfs::VirtualFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Default DEFLATE level.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Options for [`pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Folder every entry is nested under.
    pub root_folder: Option<String>,
    /// DEFLATE level, 0 to 9.
    pub compression_level: i64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            root_folder: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl ArchiveOptions {
    /// Nest entries under `folder`.
    #[must_use]
    pub fn with_root_folder(mut self, folder: impl Into<String>) -> Self {
        self.root_folder = Some(folder.into());
        self
    }

    /// Override the DEFLATE level.
    #[must_use]
    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = level;
        self
    }

    fn entry_name(&self, path: &str) -> String {
        match self
            .root_folder
            .as_deref()
            .map(|folder| folder.trim_matches('/'))
            .filter(|folder| !folder.is_empty())
        {
            Some(folder) => format!("{folder}/{path}"),
            None => path.to_owned(),
        }
    }
}

/// Error returned when packaging fails.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// A file could not be written into the archive.
    #[error("Failed to encode {path:?} into archive: {source}")]
    Encoding {
        path: String,
        #[source]
        source: EncodingFault,
    },
    /// The archive could not be finalized.
    #[error("Failed to finalize archive: {0}")]
    Finish(#[source] zip::result::ZipError),
    /// The blocking packaging task did not complete.
    #[error("Archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Underlying cause of an [`ArchiveError::Encoding`].
#[derive(Debug, thiserror::Error)]
pub enum EncodingFault {
    #[error("empty path")]
    EmptyPath,
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Package files into a ZIP buffer off the async executor.
pub async fn pack(files: Vec<VirtualFile>, options: ArchiveOptions) -> Result<Vec<u8>, ArchiveError> {
    tokio::task::spawn_blocking(move || pack_blocking(&files, &options)).await?
}

/// Package files into a ZIP buffer on the current thread.
pub fn pack_blocking(files: &[VirtualFile], options: &ArchiveOptions) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(options.compression_level))
        .last_modified_time(DateTime::default());

    for file in files {
        write_entry(&mut zip, file, options, file_options).map_err(|source| {
            ArchiveError::Encoding {
                path: file.path.clone(),
                source,
            }
        })?;
    }

    let buffer = zip.finish().map_err(ArchiveError::Finish)?.into_inner();
    tracing::debug!(
        entries = files.len(),
        bytes = buffer.len(),
        "Packaged archive"
    );
    Ok(buffer)
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    file: &VirtualFile,
    options: &ArchiveOptions,
    file_options: SimpleFileOptions,
) -> Result<(), EncodingFault> {
    if file.path.is_empty() {
        return Err(EncodingFault::EmptyPath);
    }
    zip.start_file(options.entry_name(&file.path), file_options)?;
    zip.write_all(file.content.as_bytes())?;
    Ok(())
}
