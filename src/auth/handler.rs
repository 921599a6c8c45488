//! HTTP surface of the password gate
//!
//! - POST /api/auth - exchange the site password for a session cookie
//!
//! [`require_session`] guards the gallery API: requests without a valid
//! session cookie get 401.

use crate::auth::gate::{GateError, PasswordGate};
use crate::gallery::types::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for the gate handlers and middleware
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<PasswordGate>,
}

/// Create the auth router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth", post(login))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: String,
}

/// POST /api/auth
async fn login(State(state): State<AuthState>, Json(request): Json<LoginRequest>) -> Response {
    match state.gate.check(&request.password) {
        Ok(()) => {
            let token = state.gate.issue(chrono::Utc::now().timestamp());
            tracing::info!("Issued site session");
            (
                StatusCode::OK,
                [(header::SET_COOKIE, state.gate.session_cookie(&token))],
                Json(serde_json::json!({"success": true})),
            )
                .into_response()
        }
        Err(GateError::NotConfigured) => {
            tracing::error!("Login attempted but no site password is configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": GateError::NotConfigured.to_string()})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected login attempt");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Middleware: pass the request on only with a valid session cookie
pub async fn require_session(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let verified = cookie_value(request.headers(), state.gate.cookie_name())
        .map(|token| state.gate.verify(token, chrono::Utc::now().timestamp()));

    match verified {
        Some(Ok(_)) => next.run(request).await,
        _ => {
            tracing::debug!(path = %request.uri().path(), "Rejected request without session");
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiError::unauthorized(GateError::InvalidSession.to_string())),
            )
                .into_response()
        }
    }
}

/// Value of cookie `name` across all `Cookie` headers
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    fn make_state(password: Option<&str>) -> AuthState {
        AuthState {
            gate: Arc::new(PasswordGate::new(
                password,
                b"handler-test-key",
                &AuthConfig::default(),
            )),
        }
    }

    fn make_app(state: AuthState) -> Router {
        let protected = Router::new()
            .route("/api/v1/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                require_session,
            ));
        auth_router(state).merge(protected)
    }

    fn login_request(password: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "password": password }).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let app = make_app(make_state(Some("garden")));
        let resp = app.oneshot(login_request("garden")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("site-auth="));
        assert!(cookie.contains("HttpOnly"));
        assert_eq!(body_json(resp).await["success"], true);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = make_app(make_state(Some("garden")));
        let resp = app.oneshot(login_request("weeds")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(resp).await["error"], "Invalid password");
    }

    #[tokio::test]
    async fn test_login_unconfigured() {
        let app = make_app(make_state(None));
        let resp = app.oneshot(login_request("anything")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "Server configuration error");
    }

    #[tokio::test]
    async fn test_protected_route_requires_cookie() {
        let app = make_app(make_state(Some("garden")));
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_cookie_from_login_opens_protected_route() {
        let app = make_app(make_state(Some("garden")));
        let resp = app.clone().oneshot(login_request("garden")).await.unwrap();
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/ping")
                    .header(header::COOKIE, format!("theme=dark; {}", pair))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forged_cookie_rejected() {
        let app = make_app(make_state(Some("garden")));
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/ping")
                    .header(header::COOKIE, "site-auth=MTcwMDAwMDAwMA.c2lnbmF0dXJl")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, "a=1; site-auth=tok.sig".parse().unwrap());
        headers.append(header::COOKIE, "b=2".parse().unwrap());
        assert_eq!(cookie_value(&headers, "site-auth"), Some("tok.sig"));
        assert_eq!(cookie_value(&headers, "b"), Some("2"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
