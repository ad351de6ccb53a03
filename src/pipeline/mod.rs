//! Pipeline stages for text ingestion.
//!
//! Each submodule implements exactly one step behind a small trait, so the
//! orchestrator in [`crate::ingest`] can be assembled from test doubles.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ tokenize ──▶ artifact ──▶ store::upsert
//! (pure)       (pure)       (disk I/O)   (SQLite)
//! ```
//!
//! 1. [`validate`] — reject empty, oversized or symbol-only text
//! 2. [`tokenize`] — lazy token stream, word count; [`language`] detects the
//!    languages present
//! 3. [`artifact`] — render a PDF and write it atomically; blocking, run in
//!    `spawn_blocking`

pub mod artifact;
pub mod language;
pub mod tokenize;
pub mod validate;
