//! HTTP handlers for the Gallery API
//!
//! - GET    /api/v1/collections        - all collections
//! - GET    /api/v1/collections/:id    - collection detail
//! - GET    /api/v1/items              - all items, or `?collection=<id>`
//! - GET    /api/v1/items/:id          - item detail
//! - POST   /api/v1/items              - validate and create an item
//! - GET    /api/v1/view               - flat or grouped projection
//! - POST   /api/v1/reload             - refetch the session snapshot

use crate::error::Error;
use crate::gallery::session::GallerySession;
use crate::gallery::types::*;
use crate::validate::ItemDraft;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for gallery handlers
#[derive(Clone)]
pub struct GalleryState {
    pub session: Arc<GallerySession>,
}

/// Create the gallery router with all REST endpoints
pub fn gallery_router(state: GalleryState) -> Router {
    Router::new()
        .route("/api/v1/collections", get(list_collections))
        .route("/api/v1/collections/:id", get(get_collection))
        .route("/api/v1/items", get(list_items).post(create_item))
        .route("/api/v1/items/:id", get(get_item))
        .route("/api/v1/view", get(get_view))
        .route("/api/v1/reload", post(reload))
        .with_state(state)
}

// =============================================================================
// Responses
// =============================================================================

fn ok<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(value)).into_response()
}

fn error_response(err: Error) -> Response {
    let (status, body) = ApiError::from_error(&err);
    (status, Json(body)).into_response()
}

fn not_found(what: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found(format!("{} {} not found", what, id))),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/collections
async fn list_collections(State(state): State<GalleryState>) -> Response {
    match state.session.queries().fetch_collections().await {
        Ok(collections) => ok(StatusCode::OK, collections),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/v1/collections/:id
async fn get_collection(State(state): State<GalleryState>, Path(id): Path<String>) -> Response {
    match state.session.queries().fetch_collection_by_id(&id).await {
        Ok(Some(collection)) => ok(StatusCode::OK, collection),
        Ok(None) => not_found("Collection", &id),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/v1/items
async fn list_items(
    State(state): State<GalleryState>,
    Query(params): Query<ListItemsQuery>,
) -> Response {
    let queries = state.session.queries();
    let result = match params.collection.as_deref().filter(|c| !c.is_empty()) {
        Some(collection_id) => queries.fetch_items_by_collection(collection_id).await,
        None => queries.fetch_items().await,
    };
    match result {
        Ok(items) => ok(StatusCode::OK, items),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/v1/items/:id
async fn get_item(State(state): State<GalleryState>, Path(id): Path<String>) -> Response {
    match state.session.queries().fetch_item_by_id(&id).await {
        Ok(Some(item)) => ok(StatusCode::OK, item),
        Ok(None) => not_found("Item", &id),
        Err(e) => error_response(e.into()),
    }
}

/// POST /api/v1/items
async fn create_item(
    State(state): State<GalleryState>,
    Json(draft): Json<ItemDraft>,
) -> Response {
    match state.session.add_item(draft).await {
        Ok(item) => ok(StatusCode::CREATED, item.as_ref()),
        Err(e) => error_response(e),
    }
}

/// GET /api/v1/view
async fn get_view(State(state): State<GalleryState>, Query(params): Query<ViewQuery>) -> Response {
    let view_state = match params.into_state() {
        Ok(view_state) => view_state,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message))).into_response()
        }
    };
    match state.session.view(&view_state).await {
        Ok(projection) => ok(StatusCode::OK, projection),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/reload
async fn reload(State(state): State<GalleryState>) -> Response {
    match state.session.load().await {
        Ok(snapshot) => ok(
            StatusCode::OK,
            ReloadSummary {
                collections: snapshot.collections.len(),
                items: snapshot.items.len(),
            },
        ),
        Err(e) => error_response(e),
    }
}
