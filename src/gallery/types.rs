//! Wire types for the gallery API
//!
//! Entities are served as-is (see [`crate::model`]); this module only holds
//! query parameters and the error envelope.

use crate::error::Error;
use crate::view::{ViewMode, ViewState};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Query for `GET /api/v1/items`
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub collection: Option<String>,
}

/// Query for `GET /api/v1/view`
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub mode: Option<String>,
    pub collection: Option<String>,
}

impl ViewQuery {
    /// Resolve into a view state. An empty collection means no selection.
    pub fn into_state(self) -> Result<ViewState, String> {
        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse::<ViewMode>()?,
            None => ViewMode::default(),
        };
        let selected = self.collection.filter(|id| !id.is_empty());
        Ok(ViewState::new(mode, selected))
    }
}

/// Result of `POST /api/v1/reload`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    pub collections: usize,
    pub items: usize,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_FAILED", message)
    }

    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new("QUERY_FAILED", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Status and envelope for a crate error
    pub fn from_error(err: &Error) -> (StatusCode, Self) {
        match err {
            Error::Validation(failure) => (StatusCode::BAD_REQUEST, Self::validation(failure.to_string())),
            Error::Query(failure) => (StatusCode::BAD_GATEWAY, Self::query_failed(failure.to_string())),
            Error::Auth(gate) => (StatusCode::UNAUTHORIZED, Self::unauthorized(gate.to_string())),
            other => (StatusCode::INTERNAL_SERVER_ERROR, Self::internal(other.to_string())),
        }
    }
}
