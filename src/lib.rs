//! # edgequake-text2pdf
//!
//! Ingest free-form text: tokenize it, detect its languages, render it to a
//! PDF and keep one deduplicated, searchable record per distinct text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text
//!  │
//!  ├─ 1. Validate   reject empty, oversized or symbol-only input
//!  ├─ 2. Tokenize   words / punctuation / whitespace + language detection
//!  ├─ 3. Render     A4 PDF via printpdf, atomic write (spawn_blocking)
//!  ├─ 4. Upsert     one SQLite row per text, ON CONFLICT(text) DO UPDATE
//!  └─ 5. Output     tokens, languages, artifact locator, saved record
//! ```
//!
//! Listing goes straight to the store: case-insensitive substring filter,
//! newest/oldest ordering, 1-indexed pages and a total match count.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_text2pdf::{PipelineConfig, SearchQuery, TextPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .output_dir("artifacts")
//!         .database_path("texts.db")
//!         .build()?;
//!     let pipeline = TextPipeline::from_config(&config)?;
//!
//!     let result = pipeline.process_text("The quick brown fox.").await?;
//!     println!("{} → {:?}", result.file_path.display(), result.languages);
//!
//!     let page = pipeline.list_texts(&SearchQuery::new(1, 10)?.search("fox")).await?;
//!     println!("{} matching texts", page.total_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `text2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Logging
//!
//! The library only emits [`tracing`] events; installing a subscriber is up
//! to the host application (the `text2pdf` binary uses `tracing-subscriber`).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CountMetric, PipelineConfig, PipelineConfigBuilder};
pub use error::{ErrorKind, GenerationError, StoreError, Text2PdfError, ValidationError};
pub use ingest::TextPipeline;
pub use output::{Artifact, IngestResult, TextPage, TextRecord, TokenSummary};
pub use pipeline::artifact::{ArtifactGenerator, PdfArtifactGenerator};
pub use pipeline::tokenize::{DefaultTokenizer, TextTokenizer, Token, TokenKind, Tokens};
pub use pipeline::validate::{DefaultValidator, TextValidator};
pub use query::{SearchQuery, SortOrder, MAX_PAGE_LIMIT};
pub use store::{RecordStore, SqliteRecordStore};
