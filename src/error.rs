//! Error types for document access.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A document could not be opened. This is the only failure that aborts a comparison.
#[derive(Error, Debug)]
pub enum DocumentOpenError {
    /// The file could not be read from disk.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file failed pre-validation (header, size bounds, EOF marker).
    #[error("{} is not a usable PDF: {}", .path.display(), .reason)]
    NotPdf { path: PathBuf, reason: String },

    /// The parser rejected the document structure.
    #[error("failed to parse {}: {}", .path.display(), .message)]
    Parse { path: PathBuf, message: String },

    /// The parser panicked while loading the document.
    #[error("parser panicked while loading {}", .path.display())]
    Panicked { path: PathBuf },
}

impl DocumentOpenError {
    /// Path of the document that failed to open.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::NotPdf { path, .. }
            | Self::Parse { path, .. }
            | Self::Panicked { path } => path,
        }
    }
}

/// A structural read against an open document failed.
///
/// Comparators turn these into `AccessFailure` discrepancies; they never
/// reach the caller of a comparison.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("malformed document structure: {0}")]
    Structure(String),

    #[error("text extraction failed on page {page}: {message}")]
    TextExtraction { page: u32, message: String },
}

impl From<lopdf::Error> for AccessError {
    fn from(err: lopdf::Error) -> Self {
        AccessError::Structure(err.to_string())
    }
}
