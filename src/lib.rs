//! Garden - a password-gated personal gallery
//!
//! Garden keeps a small collection of images, text notes, links and PDFs,
//! optionally filed into named collections, in a row store. It validates new
//! items before they are written, projects the loaded items as a flat list
//! or grouped by collection, and serves all of it over a password-gated HTTP
//! API.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum)            CLI (clap)
//!  ┌──────────────┐      ┌──────────────┐
//!  │ auth gallery │      │ items view   │
//!  └──────┬───────┘      │ add          │
//!         │              └──────┬───────┘
//!  ┌──────▼─────────────────────▼───────┐
//!  │  GallerySession (snapshot, add)    │
//!  │  validate  ·  view (projector)     │
//!  └─────────────────┬──────────────────┘
//!  ┌─────────────────▼──────────────────┐
//!  │  GalleryQueries  ·  rows (mapper)  │
//!  └─────────────────┬──────────────────┘
//!  ┌─────────────────▼──────────────────┐
//!  │ RowStore: memory | file | postgrest│
//!  └────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: entities and the item kind tag
//! - [`rows`]: persisted row shapes and the read/write mappers
//! - [`store`]: the row store seam and its backends
//! - [`query`]: typed fetch and create operations
//! - [`validate`]: creation input validation
//! - [`view`]: flat and grouped projections
//! - [`gallery`]: session state and the gallery REST API
//! - [`auth`]: site password gate and session middleware
//! - [`api`]: the combined HTTP router
//! - [`config`]: configuration management

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gallery;
pub mod model;
pub mod query;
pub mod rows;
pub mod store;
pub mod validate;
pub mod view;

pub use config::GardenConfig;
pub use error::{Error, Result};
