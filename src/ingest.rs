//! Pipeline orchestrator: the `process_text` and `list_texts` entry points.
//!
//! [`TextPipeline`] owns one implementation of each stage behind a trait
//! object and is otherwise stateless. It holds no locks: concurrent calls for
//! the same text are made safe by [`RecordStore::upsert`] alone, and calls for
//! different texts run fully in parallel.
//!
//! Blocking stages (artifact generation, store access) run on tokio's
//! blocking pool. There is no cancellation or timeout contract here; a
//! surrounding transport that needs one should wrap the futures with
//! `tokio::time::timeout`.

use crate::config::PipelineConfig;
use crate::error::{GenerationError, StoreError, Text2PdfError};
use crate::output::{IngestResult, TextPage};
use crate::pipeline::artifact::{ArtifactGenerator, PdfArtifactGenerator};
use crate::pipeline::tokenize::{DefaultTokenizer, TextTokenizer};
use crate::pipeline::validate::{DefaultValidator, TextValidator};
use crate::query::SearchQuery;
use crate::store::{RecordStore, SqliteRecordStore};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Validator → tokenizer → artifact generator → record store.
#[derive(Clone)]
pub struct TextPipeline {
    validator: Arc<dyn TextValidator>,
    tokenizer: Arc<dyn TextTokenizer>,
    generator: Arc<dyn ArtifactGenerator>,
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for TextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPipeline")
            .field("validator", &"<dyn TextValidator>")
            .field("tokenizer", &"<dyn TextTokenizer>")
            .field("generator", &"<dyn ArtifactGenerator>")
            .field("store", &"<dyn RecordStore>")
            .finish()
    }
}

impl TextPipeline {
    /// Assemble a pipeline from explicit stage implementations.
    pub fn new(
        validator: Arc<dyn TextValidator>,
        tokenizer: Arc<dyn TextTokenizer>,
        generator: Arc<dyn ArtifactGenerator>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            validator,
            tokenizer,
            generator,
            store,
        }
    }

    /// Build the default stages from `config`: [`DefaultValidator`],
    /// [`DefaultTokenizer`], [`PdfArtifactGenerator`] and a
    /// [`SqliteRecordStore`] (file-backed when `database_path` is set).
    pub fn from_config(config: &PipelineConfig) -> Result<Self, Text2PdfError> {
        let store = match config.database_path {
            Some(ref path) => SqliteRecordStore::open(path)?,
            None => SqliteRecordStore::open_in_memory()?,
        };
        Ok(Self::new(
            Arc::new(DefaultValidator::new(config.max_text_chars)),
            Arc::new(DefaultTokenizer),
            Arc::new(PdfArtifactGenerator::from_config(config)),
            Arc::new(store),
        ))
    }

    /// The record store this pipeline writes to.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Ingest one text.
    ///
    /// # Errors
    /// - [`Text2PdfError::Validation`] — nothing else ran
    /// - [`Text2PdfError::Generation`] — no record was created or updated
    /// - [`Text2PdfError::Store`] — the artifact exists but the record was
    ///   not written
    pub async fn process_text(&self, text: impl AsRef<str>) -> Result<IngestResult, Text2PdfError> {
        let start = Instant::now();
        let text = text.as_ref();

        // ── Step 1: Validate ─────────────────────────────────────────────────
        if let Err(e) = self.validator.validate(text) {
            debug!("Rejected input: {}", e);
            return Err(e.into());
        }

        // ── Step 2: Tokenize ─────────────────────────────────────────────────
        let summary = self.tokenizer.tokenize(text);
        debug!(
            "Tokenized: {} tokens, {} words, languages {:?}",
            summary.tokens.len(),
            summary.word_count,
            summary.languages
        );

        // ── Step 3: Generate artifact ────────────────────────────────────────
        let generator = Arc::clone(&self.generator);
        let owned = text.to_string();
        let artifact = tokio::task::spawn_blocking(move || generator.generate(&owned))
            .await
            .map_err(|e| GenerationError::Internal(format!("Generation task panicked: {e}")))?
            .inspect_err(|e| warn!("Artifact generation failed: {}", e))?;
        debug!("Artifact written to {}", artifact.file_path.display());

        // ── Step 4: Upsert record ────────────────────────────────────────────
        let store = Arc::clone(&self.store);
        let owned = text.to_string();
        let count = artifact.count;
        let path = artifact.file_path.to_string_lossy().into_owned();
        let record = tokio::task::spawn_blocking(move || store.upsert(&owned, count, &path))
            .await
            .map_err(|e| StoreError::Internal(format!("Store task panicked: {e}")))?
            .inspect_err(|e| warn!("Record upsert failed: {}", e))?;

        info!(
            "Ingested text id={} ({} words, count {}) in {}ms",
            record.id,
            summary.word_count,
            record.count,
            start.elapsed().as_millis()
        );

        // ── Step 5: Combine ──────────────────────────────────────────────────
        Ok(IngestResult::assemble(summary, artifact, record))
    }

    /// List stored records. Pure delegation to [`RecordStore::query`].
    pub async fn list_texts(&self, query: &SearchQuery) -> Result<TextPage, Text2PdfError> {
        let store = Arc::clone(&self.store);
        let query = query.clone();
        let page = tokio::task::spawn_blocking(move || store.query(&query))
            .await
            .map_err(|e| StoreError::Internal(format!("Store task panicked: {e}")))??;
        Ok(page)
    }

    /// Ingest many texts with at most `concurrency` in flight.
    ///
    /// Returns one result per input, in input order. A failure for one text
    /// does not stop the others.
    pub async fn process_batch<I, S>(
        &self,
        texts: I,
        concurrency: usize,
    ) -> Vec<Result<IngestResult, Text2PdfError>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results: Vec<(usize, Result<IngestResult, Text2PdfError>)> =
            stream::iter(texts.into_iter().enumerate().map(|(idx, text)| async move {
                (idx, self.process_text(text).await)
            }))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);
        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            "Batch complete: {}/{} ingested",
            results.len() - failed,
            results.len()
        );
        results.into_iter().map(|(_, r)| r).collect()
    }
}
