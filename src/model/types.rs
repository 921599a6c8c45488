//! Entity types for collections and gallery items
//!
//! Entities are the application-level shapes. All types use camelCase JSON
//! serialization and omit absent optional fields.

use serde::{Deserialize, Serialize};

/// Kind of a gallery item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Image,
    Text,
    Link,
    Pdf,
}

impl ItemKind {
    /// All kinds, in form order
    pub const ALL: [ItemKind; 4] = [Self::Image, Self::Text, Self::Link, Self::Pdf];

    /// Whether content of this kind must be an absolute URL
    pub fn requires_url(&self) -> bool {
        match self {
            Self::Image | Self::Link | Self::Pdf => true,
            Self::Text => false,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Text => "Text",
            Self::Link => "Link",
            Self::Pdf => "PDF",
        }
    }

    /// Prompt shown next to the content field
    pub fn content_hint(&self) -> &'static str {
        match self {
            Self::Image => "Enter the image URL",
            Self::Text => "Enter your text content",
            Self::Link => "Enter the link URL",
            Self::Pdf => "Enter the PDF URL",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
            Self::Link => write!(f, "link"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            "link" => Ok(Self::Link),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown item kind: {}", other)),
        }
    }
}

/// A named group of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Annotation attached to an item. Only the recognized keys exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ItemMetadata {
    /// True when no recognized field is set
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.author.is_none() && self.date.is_none()
    }
}

/// A single gallery item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
}

impl GalleryItem {
    /// Whether this item is filed under the given collection
    pub fn belongs_to(&self, collection_id: &str) -> bool {
        self.collection_id.as_deref() == Some(collection_id)
    }
}

/// Validated input for creating a gallery item
///
/// Produced by [`crate::validate::validate_draft`]; the create operation
/// trusts it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemInput {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
}

impl CreateItemInput {
    /// Input that would recreate `item` (minus store-assigned fields)
    pub fn from_item(item: &GalleryItem) -> Self {
        Self {
            kind: item.kind,
            title: item.title.clone(),
            content: item.content.clone(),
            collection_id: item.collection_id.clone(),
            metadata: item.metadata.clone(),
        }
    }
}
