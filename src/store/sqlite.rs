//! SQLite-backed [`RecordStore`].
//!
//! Uniqueness is enforced by `UNIQUE(text)` and every write is a single
//! `INSERT … ON CONFLICT(text) DO UPDATE … RETURNING` statement, so two
//! writers racing on the same text both succeed and both see the one row.
//!
//! Case-insensitive search runs against `text_folded`, a lower-cased copy
//! written alongside `text`. Folding happens in Rust because SQLite's
//! `lower()` only handles ASCII.

use crate::error::StoreError;
use crate::output::{TextPage, TextRecord};
use crate::query::{SearchQuery, SortOrder};
use crate::store::RecordStore;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS schema_version (
         version    INTEGER PRIMARY KEY,
         applied_at TEXT NOT NULL
     );
     CREATE TABLE IF NOT EXISTS texts (
         id            INTEGER PRIMARY KEY AUTOINCREMENT,
         text          TEXT NOT NULL UNIQUE,
         text_folded   TEXT NOT NULL,
         count         INTEGER NOT NULL DEFAULT 0,
         artifact_path TEXT NOT NULL,
         created_at    TEXT NOT NULL,
         updated_at    TEXT NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_texts_created_at ON texts (created_at, id);
     INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'));",
)];

const RECORD_COLUMNS: &str = "id, text, count, artifact_path, created_at, updated_at";

/// A [`RecordStore`] over one SQLite connection.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore").finish_non_exhaustive()
    }
}

impl SqliteRecordStore {
    /// Open (or create) a database file and run pending migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!("Opened record store at {}", path.display());
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        // journal_mode returns the resulting mode as a row ("memory" for in-memory dbs).
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".into()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn upsert(&self, text: &str, count: u64, artifact_path: &str) -> Result<TextRecord, StoreError> {
        let count = i64::try_from(count)
            .map_err(|_| StoreError::Internal(format!("count {count} exceeds i64")))?;
        let conn = self.lock()?;
        // Stamped under the lock so created_at order follows row id order.
        let now = format_timestamp(Utc::now());

        let record = conn.query_row(
            &format!(
                "INSERT INTO texts (text, text_folded, count, artifact_path, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(text) DO UPDATE SET
                   count = excluded.count,
                   artifact_path = excluded.artifact_path,
                   updated_at = MAX(texts.updated_at, excluded.updated_at)
                 RETURNING {RECORD_COLUMNS}"
            ),
            params![text, text.to_lowercase(), count, artifact_path, now],
            row_to_raw,
        )?;
        let record = record.into_record()?;
        debug!("Upserted text record id={}", record.id);
        Ok(record)
    }

    fn query(&self, query: &SearchQuery) -> Result<TextPage, StoreError> {
        let order = match query.sort_order() {
            SortOrder::Newest => "created_at DESC, id DESC",
            SortOrder::Oldest => "created_at ASC, id ASC",
        };
        let term = query.search_term().map(str::to_lowercase);
        let filter = "(:term IS NULL OR instr(text_folded, :term) > 0)";

        let mut conn = self.lock()?;
        // Page and count read the same snapshot.
        let tx = conn.transaction()?;
        let (raw, total_count) = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM texts WHERE {filter}
                 ORDER BY {order} LIMIT :limit OFFSET :offset"
            ))?;
            let raw = stmt
                .query_map(
                    named_params! {
                        ":term": term,
                        ":limit": query.limit() as i64,
                        ":offset": query.offset() as i64,
                    },
                    row_to_raw,
                )?
                .collect::<Result<Vec<_>, _>>()?;

            let total_count: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM texts WHERE {filter}"),
                named_params! { ":term": term },
                |row| row.get(0),
            )?;
            (raw, total_count)
        };
        tx.commit()?;

        let texts = raw
            .into_iter()
            .map(RawRecord::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Query page={} limit={} matched {} of {}",
            query.page(),
            query.limit(),
            texts.len(),
            total_count
        );

        Ok(TextPage {
            texts,
            total_count: total_count.max(0) as u64,
        })
    }

    fn find_by_text(&self, text: &str) -> Result<Option<TextRecord>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM texts WHERE text = ?1"),
                [text],
                row_to_raw,
            )
            .optional()?;
        raw.map(RawRecord::into_record).transpose()
    }
}

/// Run all pending migrations.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            info!("Running record store migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }
    Ok(())
}

/// Current schema version, 0 before the first migration.
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

/// Row as stored, before timestamp parsing.
struct RawRecord {
    id: i64,
    text: String,
    count: i64,
    artifact_path: String,
    created_at: String,
    updated_at: String,
}

impl RawRecord {
    fn into_record(self) -> Result<TextRecord, StoreError> {
        Ok(TextRecord {
            id: self.id,
            count: self.count.max(0) as u64,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            text: self.text,
            artifact_path: self.artifact_path,
        })
    }
}

fn row_to_raw(row: &Row) -> Result<RawRecord, rusqlite::Error> {
    Ok(RawRecord {
        id: row.get(0)?,
        text: row.get(1)?,
        count: row.get(2)?,
        artifact_path: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

// Fixed-width RFC 3339 so lexical order equals chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp {
            column,
            value: value.to_string(),
        })
}
