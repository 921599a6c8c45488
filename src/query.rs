//! Query layer - read operations and the single create operation
//!
//! Every store failure, including rows that fail to decode, becomes a
//! [`QueryFailure`] naming the operation. A single-row lookup that matches
//! nothing is `Ok(None)`, not a failure.

use crate::error::QueryFailure;
use crate::model::{Collection, CreateItemInput, GalleryItem};
use crate::rows::{
    input_to_insert, row_to_collection, row_to_item, CollectionRow, GalleryItemRow,
};
use crate::store::{RowQuery, RowStore, StoreError, Table};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

const FETCH_COLLECTIONS: &str = "fetch collections";
const FETCH_COLLECTION: &str = "fetch collection";
const FETCH_ITEMS: &str = "fetch gallery items";
const FETCH_ITEM: &str = "fetch gallery item";
const CREATE_ITEM: &str = "create gallery item";

/// Typed queries over the gallery tables
#[derive(Clone)]
pub struct GalleryQueries {
    store: Arc<dyn RowStore>,
}

impl GalleryQueries {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// All collections, oldest first
    pub async fn fetch_collections(&self) -> Result<Vec<Collection>, QueryFailure> {
        let rows = self
            .store
            .select(Table::Collections, &by_creation())
            .await
            .map_err(|e| failure(FETCH_COLLECTIONS, e))?;
        decode_all::<CollectionRow>(FETCH_COLLECTIONS, rows)
            .map(|rows| rows.into_iter().map(row_to_collection).collect())
    }

    /// One collection by id
    pub async fn fetch_collection_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Collection>, QueryFailure> {
        let query = RowQuery::new().eq("id", id);
        match self.store.select_single(Table::Collections, &query).await {
            Ok(row) => decode::<CollectionRow>(FETCH_COLLECTION, row)
                .map(|row| Some(row_to_collection(row))),
            Err(StoreError::NoRows) => Ok(None),
            Err(e) => Err(failure(FETCH_COLLECTION, e)),
        }
    }

    /// All gallery items, oldest first
    pub async fn fetch_items(&self) -> Result<Vec<GalleryItem>, QueryFailure> {
        let rows = self
            .store
            .select(Table::GalleryItems, &by_creation())
            .await
            .map_err(|e| failure(FETCH_ITEMS, e))?;
        decode_all::<GalleryItemRow>(FETCH_ITEMS, rows)
            .map(|rows| rows.into_iter().map(row_to_item).collect())
    }

    /// Gallery items filed under `collection_id`, oldest first
    pub async fn fetch_items_by_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<GalleryItem>, QueryFailure> {
        let query = by_creation().eq("collection_id", collection_id);
        let rows = self
            .store
            .select(Table::GalleryItems, &query)
            .await
            .map_err(|e| failure(FETCH_ITEMS, e))?;
        decode_all::<GalleryItemRow>(FETCH_ITEMS, rows)
            .map(|rows| rows.into_iter().map(row_to_item).collect())
    }

    /// One gallery item by id
    pub async fn fetch_item_by_id(&self, id: &str) -> Result<Option<GalleryItem>, QueryFailure> {
        let query = RowQuery::new().eq("id", id);
        match self.store.select_single(Table::GalleryItems, &query).await {
            Ok(row) => decode::<GalleryItemRow>(FETCH_ITEM, row).map(|row| Some(row_to_item(row))),
            Err(StoreError::NoRows) => Ok(None),
            Err(e) => Err(failure(FETCH_ITEM, e)),
        }
    }

    /// Insert one item. Issues exactly one store call and never retries.
    ///
    /// The input is trusted; run it through
    /// [`validate_draft`](crate::validate::validate_draft) first.
    pub async fn create_item(&self, input: &CreateItemInput) -> Result<GalleryItem, QueryFailure> {
        let insert = serde_json::to_value(input_to_insert(input))
            .map_err(|e| failure(CREATE_ITEM, StoreError::Malformed(e.to_string())))?;
        let row = self
            .store
            .insert(Table::GalleryItems, insert)
            .await
            .map_err(|e| failure(CREATE_ITEM, e))?;
        let item = row_to_item(decode::<GalleryItemRow>(CREATE_ITEM, row)?);

        tracing::info!(id = %item.id, kind = %item.kind, "Created gallery item");
        Ok(item)
    }
}

fn by_creation() -> RowQuery {
    RowQuery::new().order_by("created_at", true)
}

fn failure(operation: &'static str, error: StoreError) -> QueryFailure {
    tracing::error!("Error during {}: {}", operation, error);
    QueryFailure::new(operation, error.to_string())
}

fn decode<T: DeserializeOwned>(operation: &'static str, row: Value) -> Result<T, QueryFailure> {
    serde_json::from_value(row).map_err(|e| failure(operation, StoreError::Malformed(e.to_string())))
}

fn decode_all<T: DeserializeOwned>(
    operation: &'static str,
    rows: Vec<Value>,
) -> Result<Vec<T>, QueryFailure> {
    rows.into_iter().map(|row| decode(operation, row)).collect()
}
