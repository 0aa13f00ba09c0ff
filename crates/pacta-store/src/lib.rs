//! Pacta Storage Layer
//!
//! Implements the SpanStore trait over SQLite.
//!
//! # Architecture
//!
//! - The full span JSON is stored in a `payload` column and is the
//!   record of truth; `trace_id`, `type`, `entity`, `started_at`, and
//!   `signer_id` are extracted into indexed columns for lookups.
//! - Spans are append-only: a duplicate id is a conflict and the
//!   store is unchanged after a failed append. No update path exists.
//! - Contracts live in their own table and are freely upserted; they
//!   are derived state and can always be rebuilt from the spans.
//!
//! # Examples
//!
//! ```no_run
//! use pacta_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for span operations
//! ```
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe. Each thread should have
//! its own SqliteStore instance.

#![warn(missing_docs)]

use std::path::Path;

use pacta_domain::{Contract, Span, SpanQuery, SpanStore};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::warn;

pub mod export;

pub use export::{export_spans, ExportFormat};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Duplicate span id on append; the store is unchanged
    #[error("Span already exists: {0}")]
    Conflict(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unknown export format name
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// Capability token for maintenance operations that break the
/// append-only guarantee. Constructing one at a call site marks the
/// operation as a deliberate escape hatch; normal flow never does.
#[derive(Debug)]
pub struct Maintenance;

/// SQLite-based implementation of SpanStore
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pacta_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("ledger.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Delete all spans and the contract view of one trace.
    ///
    /// Maintenance escape hatch only: this breaks the append-only
    /// guarantee and is gated behind the [`Maintenance`] token. Never
    /// called from normal flow.
    pub fn purge_trace(&mut self, _token: Maintenance, trace_id: &str) -> Result<usize, StoreError> {
        warn!(trace_id, "purging trace: append-only guarantee broken by maintenance");
        let removed = self
            .conn
            .execute("DELETE FROM spans WHERE trace_id = ?1", params![trace_id])?;
        self.conn
            .execute("DELETE FROM contracts WHERE id = ?1", params![trace_id])?;
        Ok(removed)
    }

    /// All contract views, most recently updated first
    pub fn contracts(&self) -> Result<Vec<Contract>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM contracts ORDER BY updated_at DESC")?;
        let contracts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        contracts
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(StoreError::from))
            .collect()
    }

    fn span_from_payload(payload: &str) -> Result<Span, StoreError> {
        serde_json::from_str(payload).map_err(StoreError::from)
    }

    fn collect_spans(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Span>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let payloads = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| Self::span_from_payload(p))
            .collect()
    }
}

impl SpanStore for SqliteStore {
    type Error = StoreError;

    fn append(&mut self, span: &Span) -> Result<(), Self::Error> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM spans WHERE id = ?1",
                params![span.id.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Conflict(span.id.to_string()));
        }

        let payload = serde_json::to_string(span)?;
        self.conn.execute(
            "INSERT INTO spans (id, trace_id, type, entity, started_at, signer_id, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                span.id.as_str(),
                &span.trace_id,
                &span.span_type,
                &span.entity,
                &span.started_at,
                span.signer_id(),
                &payload,
            ],
        )?;

        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Span>, Self::Error> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM spans WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        payload.map(|p| Self::span_from_payload(&p)).transpose()
    }

    fn query(&self, query: &SpanQuery) -> Result<Vec<Span>, Self::Error> {
        let mut sql = String::from("SELECT payload FROM spans WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(trace_id) = &query.trace_id {
            sql.push_str(" AND trace_id = ?");
            params.push(Box::new(trace_id.clone()));
        }

        if let Some(span_type) = &query.span_type {
            sql.push_str(" AND type = ?");
            params.push(Box::new(span_type.clone()));
        }

        if let Some(entity) = &query.entity {
            sql.push_str(" AND entity = ?");
            params.push(Box::new(entity.clone()));
        }

        if let Some(signer_id) = &query.signer_id {
            sql.push_str(" AND signer_id = ?");
            params.push(Box::new(signer_id.clone()));
        }

        if let Some(from) = &query.from {
            sql.push_str(" AND started_at >= ?");
            params.push(Box::new(from.clone()));
        }

        if let Some(to) = &query.to {
            sql.push_str(" AND started_at <= ?");
            params.push(Box::new(to.clone()));
        }

        sql.push_str(" ORDER BY started_at DESC, rowid DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        self.collect_spans(&sql, &param_refs)
    }

    fn trace_spans(&self, trace_id: &str) -> Result<Vec<Span>, Self::Error> {
        self.collect_spans(
            "SELECT payload FROM spans WHERE trace_id = ?1 ORDER BY started_at ASC, rowid ASC",
            &[&trace_id as &dyn rusqlite::ToSql],
        )
    }

    fn all_spans(&self) -> Result<Vec<Span>, Self::Error> {
        self.collect_spans("SELECT payload FROM spans ORDER BY rowid ASC", &[])
    }

    fn contract(&self, trace_id: &str) -> Result<Option<Contract>, Self::Error> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM contracts WHERE id = ?1",
                params![trace_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }

    fn upsert_contract(&mut self, contract: &Contract) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(contract)?;
        self.conn.execute(
            "INSERT INTO contracts (id, updated_at, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
             updated_at = excluded.updated_at, payload = excluded.payload",
            params![&contract.id, &contract.updated_at, &payload],
        )?;
        Ok(())
    }
}
