//! Gallery session - owns the in-memory entity sequences
//!
//! The current [`GallerySnapshot`] is replaced wholesale on reload. A
//! successful create publishes a new snapshot with one item appended; the
//! previous snapshot and the items it shares are never touched.
//!
//! Reload and create are serialized by a writer lock held across the store
//! round-trip, so a reload can never publish rows fetched before a
//! concurrent create and drop the created item. Readers only take the
//! snapshot lock.

use crate::error::Result;
use crate::model::{Collection, GalleryItem};
use crate::query::GalleryQueries;
use crate::validate::{validate_draft, ItemDraft};
use crate::view::{project, Projection, ViewState};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Immutable view of the gallery at one point in time
#[derive(Debug, Clone, Default)]
pub struct GallerySnapshot {
    pub collections: Vec<Arc<Collection>>,
    pub items: Vec<Arc<GalleryItem>>,
}

impl GallerySnapshot {
    /// Project this snapshot for a view state
    pub fn project(&self, state: &ViewState) -> Projection<'_> {
        project(&self.collections, &self.items, state)
    }

    /// The collection an item is filed under. Dangling references resolve
    /// to `None`.
    pub fn collection_of(&self, item: &GalleryItem) -> Option<&Collection> {
        let id = item.collection_id.as_deref()?;
        self.collections
            .iter()
            .find(|c| c.id == id)
            .map(Arc::as_ref)
    }

    fn with_item(&self, item: Arc<GalleryItem>) -> Self {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(item);
        Self {
            collections: self.collections.clone(),
            items,
        }
    }
}

/// Single-consumer gallery state over the query layer
pub struct GallerySession {
    queries: GalleryQueries,
    snapshot: RwLock<Arc<GallerySnapshot>>,
    writer: Mutex<()>,
}

impl GallerySession {
    /// Create an empty session. Call [`load`](Self::load) to populate it.
    pub fn new(queries: GalleryQueries) -> Self {
        Self {
            queries,
            snapshot: RwLock::new(Arc::new(GallerySnapshot::default())),
            writer: Mutex::new(()),
        }
    }

    pub fn queries(&self) -> &GalleryQueries {
        &self.queries
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<GallerySnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Fetch collections and items concurrently and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn load(&self) -> Result<Arc<GallerySnapshot>> {
        let _writer = self.writer.lock().await;
        let (collections, items) = futures::future::try_join(
            self.queries.fetch_collections(),
            self.queries.fetch_items(),
        )
        .await?;

        let snapshot = Arc::new(GallerySnapshot {
            collections: collections.into_iter().map(Arc::new).collect(),
            items: items.into_iter().map(Arc::new).collect(),
        });
        *self.snapshot.write().await = snapshot.clone();

        tracing::info!(
            collections = snapshot.collections.len(),
            items = snapshot.items.len(),
            "Gallery loaded"
        );
        Ok(snapshot)
    }

    /// Validate a draft, create the item and append it to the snapshot.
    ///
    /// A draft that fails validation never reaches the store.
    pub async fn add_item(&self, draft: ItemDraft) -> Result<Arc<GalleryItem>> {
        let input = validate_draft(draft).map_err(|e| {
            tracing::debug!("Rejected item draft: {}", e);
            e
        })?;
        let _writer = self.writer.lock().await;
        let item = Arc::new(self.queries.create_item(&input).await?);

        let mut current = self.snapshot.write().await;
        *current = Arc::new(current.with_item(item.clone()));
        Ok(item)
    }

    /// Project the current snapshot and render it as JSON
    pub async fn view(&self, state: &ViewState) -> Result<serde_json::Value> {
        let snapshot = self.snapshot().await;
        Ok(serde_json::to_value(snapshot.project(state))?)
    }
}
