//! View projector - flat and collection-grouped item sets
//!
//! Pure functions over borrowed entity sequences. Output keeps source order;
//! nothing here sorts.

use crate::model::{Collection, GalleryItem};
use serde::Serialize;
use std::borrow::Borrow;

/// How items are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// One list of items, optionally narrowed to a collection
    #[default]
    Flat,
    /// One group per collection
    Grouped,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Grouped => write!(f, "grouped"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" | "items" => Ok(Self::Flat),
            "grouped" | "collections" => Ok(Self::Grouped),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// Current mode plus the selected collection, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    mode: ViewMode,
    selected: Option<String>,
}

impl ViewState {
    pub fn new(mode: ViewMode, selected: Option<String>) -> Self {
        Self { mode, selected }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Switch mode. Entering grouped mode drops the selection.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        if mode == ViewMode::Grouped {
            self.selected = None;
        }
    }

    pub fn select(&mut self, collection_id: impl Into<String>) {
        self.selected = Some(collection_id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected collection, or `None` when nothing is selected or the
    /// id does not resolve
    pub fn selected_collection<'a, C: Borrow<Collection>>(
        &self,
        collections: &'a [C],
    ) -> Option<&'a Collection> {
        let id = self.selected.as_deref()?;
        collections
            .iter()
            .map(<C as Borrow<Collection>>::borrow)
            .find(|c| c.id == id)
    }
}

/// A collection with the items filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionGroup<'a> {
    pub collection: &'a Collection,
    pub items: Vec<&'a GalleryItem>,
}

/// What a view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Projection<'a> {
    Items { items: Vec<&'a GalleryItem> },
    Groups { groups: Vec<CollectionGroup<'a>> },
}

impl Projection<'_> {
    /// Every item shown, in display order
    pub fn item_count(&self) -> usize {
        match self {
            Self::Items { items } => items.len(),
            Self::Groups { groups } => groups.iter().map(|g| g.items.len()).sum(),
        }
    }
}

/// Project the entity sequences for a view state.
///
/// Grouped mode with a selection shows that collection's flat list.
pub fn project<'a, C, I>(collections: &'a [C], items: &'a [I], state: &ViewState) -> Projection<'a>
where
    C: Borrow<Collection>,
    I: Borrow<GalleryItem>,
{
    match (state.mode, state.selected()) {
        (ViewMode::Grouped, None) => Projection::Groups {
            groups: group_by_collection(collections, items),
        },
        (_, selected) => Projection::Items {
            items: flat_items(items, selected),
        },
    }
}

/// All items, or only those whose `collection_id` equals `selected`
pub fn flat_items<'a, I: Borrow<GalleryItem>>(
    items: &'a [I],
    selected: Option<&str>,
) -> Vec<&'a GalleryItem> {
    items
        .iter()
        .map(<I as Borrow<GalleryItem>>::borrow)
        .filter(|item| selected.map_or(true, |id| item.belongs_to(id)))
        .collect()
}

/// One group per collection, in collection order. Unfiled items and items
/// pointing at unknown collections are left out.
pub fn group_by_collection<'a, C, I>(
    collections: &'a [C],
    items: &'a [I],
) -> Vec<CollectionGroup<'a>>
where
    C: Borrow<Collection>,
    I: Borrow<GalleryItem>,
{
    collections
        .iter()
        .map(<C as Borrow<Collection>>::borrow)
        .map(|collection| CollectionGroup {
            collection,
            items: flat_items(items, Some(&collection.id)),
        })
        .collect()
}
