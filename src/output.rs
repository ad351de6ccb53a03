//! Result types produced by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The persisted entity: one row per distinct `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Store-assigned row id. Only used to break `created_at` ties.
    pub id: i64,
    /// Canonical content; the natural key.
    pub text: String,
    /// Size metric from the most recent successful generation.
    pub count: u64,
    /// Locator of the most recent generated artifact. The file may have been
    /// removed since; nothing here checks.
    pub artifact_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tokenizer output. Computed on every ingestion, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenSummary {
    /// Word and punctuation tokens in text order (whitespace runs omitted).
    pub tokens: Vec<String>,
    /// Number of word tokens.
    pub word_count: usize,
    /// Detected ISO 639-1 language codes. Empty when inconclusive.
    pub languages: BTreeSet<String>,
}

/// A generated document on durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub file_name: String,
    pub file_path: PathBuf,
    pub count: u64,
}

/// Everything `process_text` returns: tokenizer output, generator output and
/// the persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResult {
    pub file_name: String,
    pub file_path: PathBuf,
    pub count: u64,
    pub tokens: Vec<String>,
    pub word_count: usize,
    pub languages: BTreeSet<String>,
    pub saved_record: TextRecord,
}

impl IngestResult {
    pub(crate) fn assemble(summary: TokenSummary, artifact: Artifact, record: TextRecord) -> Self {
        Self {
            file_name: artifact.file_name,
            file_path: artifact.file_path,
            count: artifact.count,
            tokens: summary.tokens,
            word_count: summary.word_count,
            languages: summary.languages,
            saved_record: record,
        }
    }
}

/// One page of stored records plus the unpaginated match count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextPage {
    pub texts: Vec<TextRecord>,
    pub total_count: u64,
}
