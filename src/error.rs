//! Error types for the edgequake-text2pdf library.
//!
//! Three error kinds map onto the three ways an ingestion can fail:
//!
//! * [`ValidationError`] — the caller's input is unusable (empty text, bad
//!   pagination). Always recoverable by fixing the input.
//! * [`GenerationError`] — the PDF artifact could not be written (disk full,
//!   permission denied, renderer failure). No record is touched.
//! * [`StoreError`] — the record store failed to read or write.
//!
//! [`Text2PdfError`] is the union returned from the pipeline entry points.
//! Each kind is preserved as-is so callers can `match` (or call
//! [`Text2PdfError::kind`]) instead of inspecting message strings.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the top-level pipeline operations.
#[derive(Debug, Error)]
pub enum Text2PdfError {
    /// Caller-supplied input was rejected before any work was done.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rendering or writing the artifact failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`Text2PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Generation,
    Store,
    Config,
}

impl Text2PdfError {
    /// Which part of the pipeline produced this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Text2PdfError::Validation(_) => ErrorKind::Validation,
            Text2PdfError::Generation(_) => ErrorKind::Generation,
            Text2PdfError::Store(_) => ErrorKind::Store,
            Text2PdfError::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}

/// Input rejected by the validator or by [`crate::query::SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text is empty or whitespace only.
    #[error("Text is empty")]
    Empty,

    /// Text exceeds the configured maximum length (in characters).
    #[error("Text is too long: {len} characters (maximum {max})")]
    TooLong { len: usize, max: usize },

    /// Text has no letters or digits, only punctuation and symbols.
    #[error("Text contains no analyzable content (no letters or digits)")]
    NoAnalyzableContent,

    /// `page` or `limit` is out of range.
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// Sort order string is neither `newest` nor `oldest`.
    #[error("Invalid sort order '{0}': expected 'newest' or 'oldest'")]
    InvalidSortOrder(String),
}

/// Artifact generation failed. No locator is returned alongside this error.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Creating the output directory or writing the file failed.
    #[error("Failed to write artifact '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF renderer rejected the document.
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// Unexpected internal error (e.g. the blocking task panicked).
    #[error("Internal generation error: {0}")]
    Internal(String),
}

/// The record store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    /// A persisted timestamp could not be parsed back.
    #[error("Invalid timestamp '{value}' in column {column}")]
    InvalidTimestamp { column: &'static str, value: String },

    /// Lock poisoning, task join failure and similar.
    #[error("Internal store error: {0}")]
    Internal(String),
}
