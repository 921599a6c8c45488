//! Row store - the persisted relational store behind a generic
//! select / insert / filter interface
//!
//! Rows travel as `serde_json::Value` objects keyed by column name. Three
//! backends are provided:
//!
//! - [`MemoryStore`]: process-local tables, used by tests and `backend = "memory"`
//! - [`FileStore`]: one JSON file per row under a base directory
//! - [`PostgrestStore`]: a PostgREST / Supabase endpoint over HTTP

pub mod file;
pub mod memory;
pub mod postgrest;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Tables known to the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Collections,
    GalleryItems,
}

impl Table {
    pub const ALL: [Table; 2] = [Self::Collections, Self::GalleryItems];

    /// Table name in the store
    pub fn name(&self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::GalleryItems => "gallery_items",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordering on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Equality filters plus optional ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
}

impl RowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `column` equals `value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Order rows by `column`
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Whether a row passes every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column).and_then(Value::as_str) == Some(value.as_str()))
    }
}

/// Store-level failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A single-row select matched nothing
    #[error("no rows returned")]
    NoRows,

    /// Transport or IO failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request
    #[error("{message} ({code})")]
    Rejected { code: String, message: String },

    /// The response could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Generic access to the persisted tables
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Backend name for logging
    fn backend_name(&self) -> &str;

    /// Select all rows matching `query`
    async fn select(&self, table: Table, query: &RowQuery) -> StoreResult<Vec<Value>>;

    /// Select exactly one row. Zero rows is [`StoreError::NoRows`].
    async fn select_single(&self, table: Table, query: &RowQuery) -> StoreResult<Value> {
        let mut rows = self.select(table, query).await?;
        match rows.len() {
            0 => Err(StoreError::NoRows),
            1 => Ok(rows.remove(0)),
            n => Err(StoreError::Rejected {
                code: "MULTIPLE_ROWS".to_string(),
                message: format!("expected a single row from {}, got {}", table, n),
            }),
        }
    }

    /// Insert one row and return it as stored (with generated id and timestamps)
    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value>;
}

/// Open the store selected by configuration
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn RowStore>> {
    let store: Arc<dyn RowStore> = match config.backend {
        StoreBackend::Memory => Arc::new(
            MemoryStore::with_collections(&config.collections)
                .await
                .map_err(|e| Error::Config(format!("invalid store.collections: {}", e)))?,
        ),
        StoreBackend::File => Arc::new(FileStore::open(config.data_dir.clone()).await?),
        StoreBackend::Postgrest => {
            let url = config.url.as_deref().ok_or_else(|| {
                Error::Config("store.url is required for the postgrest backend".to_string())
            })?;
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                Error::Config(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            Arc::new(PostgrestStore::new(url, api_key)?)
        }
    };

    tracing::info!(backend = store.backend_name(), "Row store ready");
    Ok(store)
}

/// Filter and order rows in memory. Sorting is stable, so ties keep
/// insertion order.
pub(crate) fn apply_query(rows: &[Value], query: &RowQuery) -> Vec<Value> {
    let mut selected: Vec<Value> = rows.iter().filter(|r| query.matches(r)).cloned().collect();

    if let Some(order) = &query.order {
        selected.sort_by(|a, b| {
            let left = a.get(&order.column).and_then(Value::as_str);
            let right = b.get(&order.column).and_then(Value::as_str);
            if order.ascending {
                left.cmp(&right)
            } else {
                right.cmp(&left)
            }
        });
    }

    selected
}

/// Fill in `id`, `created_at` and `updated_at` the way the database would,
/// rejecting duplicate ids.
pub(crate) fn stamp_new_row(row: Value, existing: &[Value]) -> StoreResult<Value> {
    let Value::Object(mut map) = row else {
        return Err(StoreError::Malformed(
            "insert row must be a JSON object".to_string(),
        ));
    };

    let id = match map.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    };
    if existing
        .iter()
        .any(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        return Err(StoreError::Rejected {
            code: "23505".to_string(),
            message: format!("duplicate key value violates unique constraint (id = {})", id),
        });
    }

    let now = now_timestamp();
    map.insert("id".to_string(), Value::String(id));
    for column in ["created_at", "updated_at"] {
        if map.get(column).map_or(true, Value::is_null) {
            map.insert(column.to_string(), Value::String(now.clone()));
        }
    }

    Ok(Value::Object(map))
}

/// RFC 3339 timestamp with fixed microsecond precision, so lexical order is
/// chronological order
fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
