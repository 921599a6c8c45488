//! Persisted row shapes and their mapping to entities
//!
//! Read and write directions are separate functions. On read, a `null`
//! column becomes an absent optional field. On write, an absent optional
//! becomes an explicit `null`, because insert rows name every column.

use crate::model::{Collection, CreateItemInput, GalleryItem, ItemKind, ItemMetadata};
use serde::{Deserialize, Serialize};

/// Row of the `collections` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Row of the `gallery_items` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItemRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<ItemMetadata>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Insert row for `gallery_items`. `id` and timestamps are store-assigned.
///
/// Every optional column serializes, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItemInsert {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: Option<String>,
    pub content: String,
    pub collection_id: Option<String>,
    pub metadata: Option<ItemMetadata>,
}

/// Read path for collections
pub fn row_to_collection(row: CollectionRow) -> Collection {
    Collection {
        id: row.id,
        name: row.name,
        description: row.description,
    }
}

/// Read path for gallery items
pub fn row_to_item(row: GalleryItemRow) -> GalleryItem {
    GalleryItem {
        id: row.id,
        kind: row.kind,
        title: row.title,
        content: row.content,
        collection_id: row.collection_id,
        metadata: row.metadata,
    }
}

/// Write path for gallery items
pub fn input_to_insert(input: &CreateItemInput) -> GalleryItemInsert {
    GalleryItemInsert {
        kind: input.kind,
        title: input.title.clone(),
        content: input.content.clone(),
        collection_id: input.collection_id.clone(),
        metadata: input.metadata.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_columns_become_absent() {
        let row: GalleryItemRow = serde_json::from_value(json!({
            "id": "i1",
            "type": "text",
            "title": null,
            "content": "hello",
            "collection_id": null,
            "metadata": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let item = row_to_item(row);
        assert_eq!(item.title, None);
        assert_eq!(item.collection_id, None);
        assert_eq!(item.metadata, None);

        // Absent keys serialize away entirely
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("collectionId").is_none());
    }

    #[test]
    fn test_present_values_pass_through() {
        let row: GalleryItemRow = serde_json::from_value(json!({
            "id": "i2",
            "type": "link",
            "title": "  spaced  ",
            "content": "https://example.com",
            "collection_id": "c1",
            "metadata": {"description": "d", "author": "a", "date": "2024-05-01"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let item = row_to_item(row);
        assert_eq!(item.title.as_deref(), Some("  spaced  "));
        assert_eq!(item.collection_id.as_deref(), Some("c1"));
        let meta = item.metadata.unwrap();
        assert_eq!(meta.author.as_deref(), Some("a"));
        assert_eq!(meta.date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_unknown_metadata_keys_ignored() {
        let row: GalleryItemRow = serde_json::from_value(json!({
            "id": "i3",
            "type": "image",
            "content": "https://x.test/a.png",
            "metadata": {"description": "d", "camera": "x100"}
        }))
        .unwrap();
        let meta = row_to_item(row).metadata.unwrap();
        assert_eq!(meta.description.as_deref(), Some("d"));
    }

    #[test]
    fn test_collection_row_null_description() {
        let row: CollectionRow = serde_json::from_value(json!({
            "id": "c1",
            "name": "Reading",
            "description": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let collection = row_to_collection(row);
        assert_eq!(collection.name, "Reading");
        assert!(collection.description.is_none());
    }

    #[test]
    fn test_insert_uses_explicit_nulls() {
        let input = CreateItemInput {
            kind: ItemKind::Text,
            title: None,
            content: "hello".to_string(),
            collection_id: None,
            metadata: None,
        };
        let json = serde_json::to_value(input_to_insert(&input)).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.get("title"), Some(&serde_json::Value::Null));
        assert_eq!(obj.get("collection_id"), Some(&serde_json::Value::Null));
        assert_eq!(obj.get("metadata"), Some(&serde_json::Value::Null));
        assert_eq!(obj["type"], "text");
        assert!(obj.get("id").is_none());
        assert!(obj.get("created_at").is_none());
    }

    #[test]
    fn test_insert_metadata_writes_only_present_keys() {
        let input = CreateItemInput {
            kind: ItemKind::Pdf,
            title: Some("Paper".to_string()),
            content: "https://x.test/p.pdf".to_string(),
            collection_id: Some("c9".to_string()),
            metadata: Some(ItemMetadata {
                description: Some("notes".to_string()),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(input_to_insert(&input)).unwrap();
        assert_eq!(json["metadata"], json!({"description": "notes"}));
        assert_eq!(json["collection_id"], "c9");
    }
}
