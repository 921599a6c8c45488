//! Entity model - collections, gallery items and the closed set of item kinds

pub mod types;

pub use types::{Collection, CreateItemInput, GalleryItem, ItemKind, ItemMetadata};
