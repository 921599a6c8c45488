//! Auth module - site password gate
//!
//! A single shared password guards the gallery. Logging in sets a signed,
//! HttpOnly session cookie that the gallery API middleware checks.

pub mod gate;
pub mod handler;

pub use gate::{GateError, PasswordGate};
pub use handler::{auth_router, require_session, AuthState};
