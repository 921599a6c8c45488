//! In-memory row store

use super::{apply_query, stamp_new_row, RowQuery, RowStore, StoreError, StoreResult, Table};
use crate::config::CollectionSeed;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local tables. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    unavailable: AtomicBool,
    operations: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the given collections, in order
    pub async fn with_collections(seeds: &[CollectionSeed]) -> StoreResult<Self> {
        let store = Self::new();
        store.seed_collections(seeds).await?;
        Ok(store)
    }

    /// Append collections directly, bypassing the switch and the operation
    /// counter. Returns the stored rows.
    pub async fn seed_collections(&self, seeds: &[CollectionSeed]) -> StoreResult<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(Table::Collections).or_default();
        let mut stored = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let row = stamp_new_row(
                serde_json::json!({"name": seed.name, "description": seed.description}),
                rows,
            )?;
            rows.push(row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of select/insert calls received so far
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn begin(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn select(&self, table: Table, query: &RowQuery) -> StoreResult<Vec<Value>> {
        self.begin()?;
        let tables = self.tables.read().await;
        let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        Ok(apply_query(rows, query))
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        self.begin()?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let stored = stamp_new_row(row, rows)?;
        rows.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_select() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Table::Collections, json!({"name": "Reading", "description": null}))
            .await
            .unwrap();
        assert!(stored["id"].is_string());

        let rows = store
            .select(Table::Collections, &RowQuery::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Reading");

        // Tables are independent
        let items = store
            .select(Table::GalleryItems, &RowQuery::new())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_seed_collections() {
        let seeds = vec![
            CollectionSeed {
                name: "Reading".to_string(),
                description: Some("Books and papers".to_string()),
            },
            CollectionSeed {
                name: "Music".to_string(),
                description: None,
            },
        ];
        let store = MemoryStore::with_collections(&seeds).await.unwrap();
        assert_eq!(store.operation_count(), 0);

        let rows = store
            .select(Table::Collections, &RowQuery::new().order_by("created_at", true))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Reading", "Music"]);
        assert!(rows[1]["description"].is_null());
        assert!(rows.iter().all(|r| r["id"].is_string()));
    }

    #[tokio::test]
    async fn test_select_single_no_rows() {
        let store = MemoryStore::new();
        let err = store
            .select_single(Table::GalleryItems, &RowQuery::new().eq("id", "missing"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NoRows);
    }

    #[tokio::test]
    async fn test_unavailable_and_operation_count() {
        let store = MemoryStore::new();
        assert_eq!(store.operation_count(), 0);

        store.set_unavailable(true);
        let err = store
            .select(Table::Collections, &RowQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.operation_count(), 1);

        store.set_unavailable(false);
        tokio_test::assert_ok!(store.select(Table::Collections, &RowQuery::new()).await);
        assert_eq!(store.operation_count(), 2);
    }
}
