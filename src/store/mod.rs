//! Record persistence.
//!
//! [`RecordStore`] is the single synchronization point of the pipeline: the
//! orchestrator holds no locks and relies entirely on `upsert` being atomic
//! per `text`. Implementations are blocking and are called from
//! `spawn_blocking`.

pub mod sqlite;

use crate::error::StoreError;
use crate::output::{TextPage, TextRecord};
use crate::query::SearchQuery;

pub use sqlite::SqliteRecordStore;

/// Keeps one [`TextRecord`] per distinct text.
pub trait RecordStore: Send + Sync {
    /// Insert a record for `text`, or update `count`, `artifact_path` and
    /// `updated_at` of the existing one. Never creates a duplicate, including
    /// under concurrent calls for the same text.
    fn upsert(&self, text: &str, count: u64, artifact_path: &str) -> Result<TextRecord, StoreError>;

    /// One page of records matching `query`, plus the total number of matches
    /// ignoring pagination.
    fn query(&self, query: &SearchQuery) -> Result<TextPage, StoreError>;

    /// Exact-match lookup by natural key.
    fn find_by_text(&self, text: &str) -> Result<Option<TextRecord>, StoreError>;
}
