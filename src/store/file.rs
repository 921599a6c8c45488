//! Row store with file-based JSON persistence
//!
//! Directory layout:
//! ```text
//! <base_dir>/
//! ├── collections/
//! │   ├── <uuid>.json
//! │   └── ...
//! └── gallery_items/
//!     ├── <uuid>.json
//!     └── ...
//! ```
//!
//! Each file also carries a `_seq` insertion counter. It breaks ties between
//! equal `created_at` values on reload and never leaves the store.

use super::{apply_query, stamp_new_row, RowQuery, RowStore, StoreError, StoreResult, Table};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::cmp::Ordering;
use tokio::sync::RwLock;

/// On-disk insertion counter column
const SEQ_COLUMN: &str = "_seq";

/// Rows of one table plus the next insertion counter
#[derive(Debug, Default)]
struct TableRows {
    rows: Vec<Value>,
    next_seq: u64,
}

/// In-memory tables backed by one JSON file per row
pub struct FileStore {
    base_dir: PathBuf,
    tables: RwLock<HashMap<Table, TableRows>>,
}

impl FileStore {
    /// Open (or create) a store at the given base directory
    pub async fn open(base_dir: PathBuf) -> std::io::Result<Self> {
        let mut tables = HashMap::new();
        for table in Table::ALL {
            let dir = base_dir.join(table.name());
            tokio::fs::create_dir_all(&dir).await?;

            let mut rows = Self::load_json_files(&dir);
            rows.sort_by(compare_loaded);
            let next_seq = rows.iter().filter_map(row_seq).max().map_or(0, |seq| seq + 1);
            for row in &mut rows {
                if let Some(map) = row.as_object_mut() {
                    map.remove(SEQ_COLUMN);
                }
            }

            tracing::debug!(table = table.name(), rows = rows.len(), "Loaded table from disk");
            tables.insert(table, TableRows { rows, next_seq });
        }

        Ok(Self {
            base_dir,
            tables: RwLock::new(tables),
        })
    }

    /// Default base directory (`<data dir>/garden/store`)
    pub fn default_dir() -> PathBuf {
        dirs_next::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("garden")
            .join("store")
    }

    /// Load all JSON object files from a directory
    fn load_json_files(dir: &Path) -> Vec<Value> {
        let mut rows = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return rows;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<Value>(&data) {
                    Ok(row) if row.is_object() => rows.push(row),
                    Ok(_) => {
                        tracing::warn!("Skipping {}: not a JSON object", path.display());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        rows
    }

    /// Write a row file. The insert is acknowledged only after this succeeds.
    async fn persist_row(&self, table: Table, row: &Value, seq: u64) -> StoreResult<()> {
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Malformed("row has no id".to_string()))?;
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::Rejected {
                code: "INVALID_ID".to_string(),
                message: format!("id {:?} cannot be used as a file name", id),
            });
        }

        let path = self.base_dir.join(table.name()).join(format!("{}.json", id));
        let mut on_disk = row.clone();
        if let Some(map) = on_disk.as_object_mut() {
            map.insert(SEQ_COLUMN.to_string(), Value::from(seq));
        }
        let json = serde_json::to_string_pretty(&on_disk)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        tokio::fs::write(&path, json).await.map_err(|e| {
            tracing::warn!("Failed to persist {} row {}: {}", table, id, e);
            StoreError::Unavailable(e.to_string())
        })
    }
}

#[async_trait]
impl RowStore for FileStore {
    fn backend_name(&self) -> &str {
        "file"
    }

    async fn select(&self, table: Table, query: &RowQuery) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(&table)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default();
        Ok(apply_query(rows, query))
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        // Held across the write so concurrent inserts cannot both pass the
        // duplicate-id check
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();
        let stored = stamp_new_row(row, &data.rows)?;
        self.persist_row(table, &stored, data.next_seq).await?;
        data.next_seq += 1;
        data.rows.push(stored.clone());
        Ok(stored)
    }
}

fn row_seq(row: &Value) -> Option<u64> {
    row.get(SEQ_COLUMN).and_then(Value::as_u64)
}

/// Creation order, then insertion counter. Hand-written files without a
/// counter sort after counted rows with the same timestamp, then by id.
fn compare_loaded(a: &Value, b: &Value) -> Ordering {
    let created = |row: &Value| row.get("created_at").and_then(Value::as_str).map(str::to_owned);
    let id = |row: &Value| row.get("id").and_then(Value::as_str).map(str::to_owned);
    created(a)
        .cmp(&created(b))
        .then_with(|| row_seq(a).unwrap_or(u64::MAX).cmp(&row_seq(b).unwrap_or(u64::MAX)))
        .then_with(|| id(a).cmp(&id(b)))
}
