//! Integration tests for the ingestion pipeline.
//!
//! Everything runs against a throwaway temp directory and SQLite database, so
//! no environment setup is needed:
//!   cargo test --test pipeline -- --nocapture

use edgequake_text2pdf::pipeline::tokenize::tokenize_text;
use edgequake_text2pdf::{
    Artifact, ArtifactGenerator, DefaultTokenizer, DefaultValidator, ErrorKind, GenerationError,
    PdfArtifactGenerator, PipelineConfig, RecordStore, SearchQuery, SortOrder,
    SqliteRecordStore, StoreError, Text2PdfError, TextPage, TextPipeline, TextRecord,
    ValidationError,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Wraps the real generator and counts calls.
struct CountingGenerator {
    inner: PdfArtifactGenerator,
    calls: AtomicUsize,
}

impl ArtifactGenerator for CountingGenerator {
    fn generate(&self, text: &str) -> Result<Artifact, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(text)
    }
}

/// Fails every call, like a full disk would.
struct FailingGenerator;

impl ArtifactGenerator for FailingGenerator {
    fn generate(&self, _text: &str) -> Result<Artifact, GenerationError> {
        Err(GenerationError::Io {
            path: PathBuf::from("/full/disk.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
        })
    }
}

/// Skips the disk entirely; used where many records are needed quickly.
struct InMemoryGenerator;

impl ArtifactGenerator for InMemoryGenerator {
    fn generate(&self, text: &str) -> Result<Artifact, GenerationError> {
        Ok(Artifact {
            file_name: "mem.pdf".into(),
            file_path: PathBuf::from("/mem/mem.pdf"),
            count: text.chars().count() as u64,
        })
    }
}

/// Every operation fails, like a locked or corrupt database.
struct FailingStore;

impl RecordStore for FailingStore {
    fn upsert(&self, _text: &str, _count: u64, _path: &str) -> Result<TextRecord, StoreError> {
        Err(StoreError::Internal("database is locked".into()))
    }

    fn query(&self, _query: &SearchQuery) -> Result<TextPage, StoreError> {
        Err(StoreError::Internal("database is locked".into()))
    }

    fn find_by_text(&self, _text: &str) -> Result<Option<TextRecord>, StoreError> {
        Err(StoreError::Internal("database is locked".into()))
    }
}

struct Fixture {
    pipeline: TextPipeline,
    store: Arc<SqliteRecordStore>,
    generator: Arc<CountingGenerator>,
    _dir: TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = Arc::new(CountingGenerator {
        inner: PdfArtifactGenerator::new(dir.path().join("artifacts")),
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(SqliteRecordStore::open_in_memory().expect("store"));
    let pipeline = TextPipeline::new(
        Arc::new(DefaultValidator::default()),
        Arc::new(DefaultTokenizer),
        generator.clone(),
        store.clone(),
    );
    Fixture {
        pipeline,
        store,
        generator,
        _dir: dir,
    }
}

fn pipeline_with(generator: Arc<dyn ArtifactGenerator>) -> (TextPipeline, Arc<SqliteRecordStore>) {
    let store = Arc::new(SqliteRecordStore::open_in_memory().expect("store"));
    let pipeline = TextPipeline::new(
        Arc::new(DefaultValidator::default()),
        Arc::new(DefaultTokenizer),
        generator,
        store.clone(),
    );
    (pipeline, store)
}

fn all() -> SearchQuery {
    SearchQuery::new(1, 100).unwrap()
}

// ── Ingestion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_writes_artifact_and_record() {
    let f = fixture();
    let out = f
        .pipeline
        .process_text("The quick brown fox jumps over the lazy dog.")
        .await
        .expect("ingest");

    assert!(out.file_path.exists(), "artifact missing: {}", out.file_path.display());
    assert!(out.file_path.starts_with(f.generator.inner.output_dir()));
    assert!(std::fs::read(&out.file_path).unwrap().starts_with(b"%PDF"));
    assert_eq!(out.saved_record.artifact_path, out.file_path.to_string_lossy());
    assert_eq!(out.saved_record.count, out.count);
    assert_eq!(out.count, 44);
    assert_eq!(out.word_count, 9);
    assert_eq!(out.languages.iter().collect::<Vec<_>>(), vec!["en"]);
    assert!(out.saved_record.updated_at >= out.saved_record.created_at);
}

#[tokio::test]
async fn ingest_is_idempotent_per_text() {
    let f = fixture();
    let first = f.pipeline.process_text("hello world").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = f.pipeline.process_text("hello world").await.unwrap();

    let page = f.pipeline.list_texts(&all()).await.unwrap();
    assert_eq!(page.total_count, 1);
    let stored = &page.texts[0];

    assert_eq!(stored.id, first.saved_record.id);
    assert_ne!(first.file_path, second.file_path);
    assert_eq!(stored.artifact_path, second.file_path.to_string_lossy());
    assert_eq!(stored.count, second.count);
    assert_eq!(stored.created_at, first.saved_record.created_at);
    assert!(stored.updated_at > first.saved_record.updated_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingest_of_same_text_yields_one_record() {
    let f = fixture();
    let handles: Vec<_> = (0..12)
        .map(|_| {
            let p = f.pipeline.clone();
            tokio::spawn(async move { p.process_text("same text, many callers").await })
        })
        .collect();

    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await.unwrap().expect("ingest").saved_record.id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "all callers must see the same record");

    let page = f.pipeline.list_texts(&all()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(f.generator.calls.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn batch_ingest_reports_each_input() {
    let f = fixture();
    let results = f
        .pipeline
        .process_batch(["first text", "...", "second text", "first text"], 3)
        .await;

    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(Text2PdfError::Validation(ValidationError::NoAnalyzableContent))
    ));
    assert!(results[2].is_ok());
    assert!(results[3].is_ok());
    assert_eq!(f.pipeline.list_texts(&all()).await.unwrap().total_count, 2);
}

// ── Validation short-circuit ────────────────────────────────────────────────

#[tokio::test]
async fn invalid_input_touches_nothing() {
    let f = fixture();
    for bad in ["", "   \n\t ", "!!! ??? ..."] {
        let err = f.pipeline.process_text(bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "input {bad:?}");
    }
    assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.query(&all()).unwrap().total_count, 0);
}

#[tokio::test]
async fn oversized_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .output_dir(dir.path().join("out"))
        .max_text_chars(10)
        .build()
        .unwrap();
    let pipeline = TextPipeline::from_config(&config).unwrap();

    let err = pipeline.process_text("far more than ten characters").await.unwrap_err();
    assert!(matches!(
        err,
        Text2PdfError::Validation(ValidationError::TooLong { max: 10, .. })
    ));
    assert!(!dir.path().join("out").exists());
}

// ── Generation failure isolation ────────────────────────────────────────────

#[tokio::test]
async fn generation_failure_creates_no_record() {
    let (pipeline, store) = pipeline_with(Arc::new(FailingGenerator));
    let err = pipeline.process_text("never stored").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generation);
    assert!(err.to_string().contains("No space left"));
    assert!(store.find_by_text("never stored").unwrap().is_none());
    assert_eq!(store.query(&all()).unwrap().total_count, 0);
}

#[tokio::test]
async fn generation_failure_leaves_existing_record_untouched() {
    let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
    let before = store.upsert("kept as is", 10, "/old.pdf").unwrap();

    let pipeline = TextPipeline::new(
        Arc::new(DefaultValidator::default()),
        Arc::new(DefaultTokenizer),
        Arc::new(FailingGenerator),
        store.clone(),
    );
    assert!(pipeline.process_text("kept as is").await.is_err());

    let after = pipeline.store().find_by_text("kept as is").unwrap().unwrap();
    assert_eq!(after, before);
}

// ── Store failure ───────────────────────────────────────────────────────────

#[tokio::test]
async fn store_failure_propagates_after_generation() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(CountingGenerator {
        inner: PdfArtifactGenerator::new(dir.path()),
        calls: AtomicUsize::new(0),
    });
    let pipeline = TextPipeline::new(
        Arc::new(DefaultValidator::default()),
        Arc::new(DefaultTokenizer),
        generator.clone(),
        Arc::new(FailingStore),
    );

    let err = pipeline.process_text("cannot be saved").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(matches!(err, Text2PdfError::Store(StoreError::Internal(_))));
    assert!(err.to_string().contains("database is locked"));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let err = pipeline.list_texts(&all()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

// ── Tokenizer ───────────────────────────────────────────────────────────────

#[test]
fn tokenizer_is_deterministic() {
    let text = "Bonjour le monde, c'est une belle journée!\nThe weather is fine today.";
    let a = tokenize_text(text);
    let b = tokenize_text(text);
    assert_eq!(a, b);
    assert_eq!(a.languages.iter().collect::<Vec<_>>(), vec!["en", "fr"]);
}

// ── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pagination_splits_newest_first() {
    let (pipeline, _store) = pipeline_with(Arc::new(InMemoryGenerator));
    for i in 0..25 {
        pipeline.process_text(format!("record number {i}")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let page1 = pipeline.list_texts(&SearchQuery::new(1, 10).unwrap()).await.unwrap();
    let page2 = pipeline.list_texts(&SearchQuery::new(2, 10).unwrap()).await.unwrap();
    let page3 = pipeline.list_texts(&SearchQuery::new(3, 10).unwrap()).await.unwrap();

    assert_eq!(page1.total_count, 25);
    assert_eq!(page2.total_count, 25);
    assert_eq!(page2.texts.len(), 10);
    assert_eq!(page3.texts.len(), 5);

    let oldest_on_page1 = page1.texts.iter().map(|r| r.created_at).min().unwrap();
    assert!(page2.texts.iter().all(|r| r.created_at < oldest_on_page1));
    assert_eq!(page1.texts[0].text, "record number 24");
    assert_eq!(page3.texts[4].text, "record number 0");
}

#[tokio::test]
async fn oldest_sort_reverses_order() {
    let (pipeline, _store) = pipeline_with(Arc::new(InMemoryGenerator));
    for t in ["one", "two", "three"] {
        pipeline.process_text(t).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let q = SearchQuery::new(1, 2).unwrap().sort(SortOrder::Oldest);
    let page = pipeline.list_texts(&q).await.unwrap();
    let texts: Vec<&str> = page.texts.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn search_filters_case_insensitively() {
    let (pipeline, _store) = pipeline_with(Arc::new(InMemoryGenerator));
    for t in ["hello world", "goodbye", "Hello there"] {
        pipeline.process_text(t).await.unwrap();
    }

    let q = SearchQuery::new(1, 10).unwrap().search("hello");
    let page = pipeline.list_texts(&q).await.unwrap();
    assert_eq!(page.total_count, 2);
    let mut texts: Vec<&str> = page.texts.iter().map(|r| r.text.as_str()).collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["Hello there", "hello world"]);

    let empty = SearchQuery::new(1, 10).unwrap().search("");
    assert_eq!(pipeline.list_texts(&empty).await.unwrap().total_count, 3);
}

// ── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_backed_pipeline_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .output_dir(dir.path().join("artifacts"))
        .database_path(dir.path().join("texts.db"))
        .build()
        .unwrap();

    {
        let pipeline = TextPipeline::from_config(&config).unwrap();
        pipeline.process_text("persist me").await.unwrap();
    }

    let pipeline = TextPipeline::from_config(&config).unwrap();
    let page = pipeline.list_texts(&all()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.texts[0].text, "persist me");
    assert!(PathBuf::from(&page.texts[0].artifact_path).exists());
}
