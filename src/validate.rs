//! Creation validator
//!
//! Turns a raw [`ItemDraft`] into a [`CreateItemInput`]. Rules run in order
//! and the first failure wins:
//!
//! 1. trimmed content must be non-empty
//! 2. URL kinds need an absolute URL with scheme and authority
//! 3. title is trimmed, empty becomes absent
//! 4. collection id passes through unchecked, empty becomes absent
//! 5. metadata fields are trimmed; an empty bag becomes absent

use crate::error::ValidationFailure;
use crate::model::{CreateItemInput, ItemKind, ItemMetadata};
use serde::{Deserialize, Serialize};
use url::Url;

/// Unvalidated form input for a new item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<ItemMetadata>,
}

impl ItemDraft {
    /// Draft with only the required fields
    pub fn new(kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            content: content.into(),
            collection_id: None,
            metadata: None,
        }
    }
}

/// Validate a draft and normalize it into a creation input
pub fn validate_draft(draft: ItemDraft) -> Result<CreateItemInput, ValidationFailure> {
    let content = draft.content.trim();
    if content.is_empty() {
        return Err(ValidationFailure::EmptyContent);
    }
    if draft.kind.requires_url() && !is_absolute_url(content) {
        return Err(ValidationFailure::InvalidUrl);
    }

    Ok(CreateItemInput {
        kind: draft.kind,
        title: non_empty_trimmed(draft.title),
        content: content.to_string(),
        collection_id: draft.collection_id.filter(|id| !id.is_empty()),
        metadata: draft.metadata.and_then(normalize_metadata),
    })
}

/// Scheme plus authority, e.g. `https://host/...`
pub fn is_absolute_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_metadata(metadata: ItemMetadata) -> Option<ItemMetadata> {
    let metadata = ItemMetadata {
        description: non_empty_trimmed(metadata.description),
        author: non_empty_trimmed(metadata.author),
        date: non_empty_trimmed(metadata.date),
    };
    (!metadata.is_empty()).then_some(metadata)
}
