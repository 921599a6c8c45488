//! Unified API router for Garden
//!
//! Merges the module routers into a single axum `Router` with CORS and
//! request tracing.
//!
//! ## Endpoint Map
//!
//! | Prefix                 | Module  | Session | Description                   |
//! |------------------------|---------|---------|-------------------------------|
//! | `/health`              | api     | no      | Health probe                  |
//! | `/api/auth`            | auth    | no      | Password login                |
//! | `/api/v1/collections*` | gallery | yes     | Collections                   |
//! | `/api/v1/items*`       | gallery | yes     | Items, create                 |
//! | `/api/v1/view`         | gallery | yes     | Flat or grouped projection    |
//! | `/api/v1/reload`       | gallery | yes     | Refetch the session snapshot  |

use crate::auth::{auth_router, require_session, AuthState};
use crate::gallery::{gallery_router, GalleryState};
use axum::{
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Garden HTTP application
///
/// The gallery routes sit behind the session middleware; health and login
/// stay public.
pub fn build_app(gallery_state: GalleryState, auth_state: AuthState, cors_origins: &[String]) -> Router {
    // Route-level so unknown paths still fall through to 404
    let protected = gallery_router(gallery_state).route_layer(middleware::from_fn_with_state(
        auth_state.clone(),
        require_session,
    ));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_router(auth_state))
        .merge(protected)
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        // Cookies only travel cross-origin with an explicit origin list
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed).allow_credentials(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordGate;
    use crate::config::AuthConfig;
    use crate::gallery::GallerySession;
    use crate::query::GalleryQueries;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(GallerySession::new(GalleryQueries::new(store)));
        let gate = Arc::new(PasswordGate::new(
            Some("garden"),
            b"api-test-key",
            &AuthConfig::default(),
        ));
        build_app(GalleryState { session }, AuthState { gate }, &[])
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let resp = make_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gallery_requires_session() {
        for uri in ["/api/v1/items", "/api/v1/collections", "/api/v1/view"] {
            let resp = make_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        for uri in ["/no/such/route", "/api/v1/nothing-here"] {
            let resp = make_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_login_then_list_items() {
        let app = make_app();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"password":"garden"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/items")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_build_cors_empty_origins() {
        let _cors = build_cors(&[]);
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "http://localhost:5173".to_string(),
            "https://garden.example.com".to_string(),
        ]);
    }
}
