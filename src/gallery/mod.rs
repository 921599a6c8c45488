//! Gallery module - session state and the REST surface over it
//!
//! The session holds the loaded collections and items; handlers read from
//! the query layer directly or project the session snapshot.

pub mod handler;
pub mod session;
pub mod types;

pub use handler::{gallery_router, GalleryState};
pub use session::{GallerySession, GallerySnapshot};
