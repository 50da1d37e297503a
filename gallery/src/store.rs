//! Authoritative gallery state container.
//!
//! All mutation goes through [`GalleryStore::dispatch`] with a typed
//! [`GalleryAction`]; each dispatch is one atomic reducer transition, so
//! readers never observe a partially-applied update. Consumers receive the
//! store by injection rather than ambient lookup.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filters::{FiltersPatch, GalleryFilters};
use crate::identity::identify;
use crate::item::{Folder, GalleryItem, ItemPatch, MediaKind};

/// The item currently shown full-size, plus its position in the *filtered*
/// list. Positions in the raw list are meaningless to the viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerState {
    pub item: Option<GalleryItem>,
    pub index: usize,
    pub open: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryState {
    #[serde(default)]
    pub images: Vec<GalleryItem>,
    #[serde(default)]
    pub videos: Vec<GalleryItem>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(skip)]
    pub filters: GalleryFilters,
    #[serde(skip)]
    pub selection: BTreeSet<String>,
    #[serde(skip)]
    pub bulk_mode: bool,
    #[serde(skip)]
    pub viewer: ViewerState,
}

/// Typed action set applied by the reducer.
#[derive(Debug, Clone)]
pub enum GalleryAction {
    SetImages(Vec<GalleryItem>),
    SetVideos(Vec<GalleryItem>),
    AddImage(GalleryItem),
    AddVideo(GalleryItem),
    UpdateImage { id: String, patch: ItemPatch },
    UpdateVideo { id: String, patch: ItemPatch },
    RemoveImage { id: String },
    RemoveVideo { id: String },
    SetFilters(FiltersPatch),
    ClearFilters,
    SetViewer { item: Option<GalleryItem>, index: usize },
    SetViewerOpen(bool),
    CreateFolder(Folder),
    RenameFolder { id: String, name: String },
    DeleteFolder { id: String },
    SetFolderThumbnail { id: String, thumbnail: Option<String> },
    AddToFolder { folder_id: String, item_id: String, kind: MediaKind },
    RemoveFromFolder { folder_id: String, item_id: String },
    ToggleSelect(String),
    SelectMany(Vec<String>),
    ClearSelection,
    SetBulkMode(bool),
}

/// Derived view: images then videos, filtered by the conjunction of the
/// active predicates. Pure function of the inputs; order-stable so viewer
/// index bookkeeping stays valid.
pub fn filtered_items(state: &GalleryState) -> Vec<GalleryItem> {
    let folder = state
        .filters
        .folder
        .as_ref()
        .and_then(|id| state.folders.iter().find(|f| f.id == *id));
    state
        .images
        .iter()
        .chain(state.videos.iter())
        .filter(|item| state.filters.matches(item))
        .filter(|item| match folder {
            // An active folder filter for a missing folder matches nothing.
            None if state.filters.folder.is_some() => false,
            None => true,
            Some(f) => identify(item).map(|key| f.contains(&key)).unwrap_or(false),
        })
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct GalleryStore {
    state: GalleryState,
}

impl GalleryStore {
    pub fn new() -> Self {
        GalleryStore::default()
    }

    pub fn from_state(state: GalleryState) -> Self {
        GalleryStore { state }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn images(&self) -> &[GalleryItem] {
        &self.state.images
    }

    pub fn videos(&self) -> &[GalleryItem] {
        &self.state.videos
    }

    pub fn folders(&self) -> &[Folder] {
        &self.state.folders
    }

    pub fn filters(&self) -> &GalleryFilters {
        &self.state.filters
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.state.selection
    }

    pub fn bulk_mode(&self) -> bool {
        self.state.bulk_mode
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.state.viewer
    }

    pub fn filtered_items(&self) -> Vec<GalleryItem> {
        filtered_items(&self.state)
    }

    /// Look an item up by its resolved identity across both collections.
    pub fn find_by_key(&self, key: &str) -> Option<&GalleryItem> {
        self.state
            .images
            .iter()
            .chain(self.state.videos.iter())
            .find(|item| identify(item).as_deref() == Some(key))
    }

    /// Three-way fallback search across the *full* collection, used by
    /// deep-link resolution (a direct link must resolve even when filters
    /// would hide the item).
    pub fn find_by_any_key(&self, key: &str) -> Option<&GalleryItem> {
        self.state
            .images
            .iter()
            .chain(self.state.videos.iter())
            .find(|item| crate::identity::matches_key(item, key))
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, action)))]
    pub fn dispatch(&mut self, action: GalleryAction) {
        reduce(&mut self.state, action);
    }
}

fn reduce(state: &mut GalleryState, action: GalleryAction) {
    match action {
        GalleryAction::SetImages(items) => {
            state.images = dedup_by_identity(items);
        }
        GalleryAction::SetVideos(items) => {
            state.videos = dedup_by_identity(items);
        }
        GalleryAction::AddImage(item) => add_item(state, item, MediaKind::Image),
        GalleryAction::AddVideo(item) => add_item(state, item, MediaKind::Video),
        GalleryAction::UpdateImage { id, patch } => update_item(&mut state.images, &id, &patch),
        GalleryAction::UpdateVideo { id, patch } => update_item(&mut state.videos, &id, &patch),
        GalleryAction::RemoveImage { id } => remove_item(&mut state.images, &id),
        GalleryAction::RemoveVideo { id } => remove_item(&mut state.videos, &id),
        GalleryAction::SetFilters(patch) => state.filters.merge(patch),
        GalleryAction::ClearFilters => state.filters = GalleryFilters::default(),
        GalleryAction::SetViewer { item, index } => {
            state.viewer.open = item.is_some();
            state.viewer.item = item;
            state.viewer.index = index;
        }
        GalleryAction::SetViewerOpen(open) => {
            state.viewer.open = open;
            if !open {
                state.viewer.item = None;
                state.viewer.index = 0;
            }
        }
        GalleryAction::CreateFolder(folder) => {
            if !state.folders.iter().any(|f| f.id == folder.id) {
                state.folders.push(folder);
            }
        }
        GalleryAction::RenameFolder { id, name } => {
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == id) {
                folder.name = name;
            }
        }
        GalleryAction::DeleteFolder { id } => {
            // Membership only; gallery items are untouched.
            state.folders.retain(|f| f.id != id);
        }
        GalleryAction::SetFolderThumbnail { id, thumbnail } => {
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == id) {
                folder.custom_thumbnail = thumbnail;
            }
        }
        GalleryAction::AddToFolder { folder_id, item_id, kind } => {
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == folder_id) {
                let ids = match kind {
                    MediaKind::Image => &mut folder.image_ids,
                    MediaKind::Video => &mut folder.video_ids,
                };
                if !ids.contains(&item_id) {
                    ids.push(item_id);
                }
            }
        }
        GalleryAction::RemoveFromFolder { folder_id, item_id } => {
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == folder_id) {
                folder.image_ids.retain(|id| *id != item_id);
                folder.video_ids.retain(|id| *id != item_id);
            }
        }
        GalleryAction::ToggleSelect(key) => {
            if !state.selection.remove(&key) {
                state.selection.insert(key);
            }
        }
        GalleryAction::SelectMany(keys) => {
            state.selection.extend(keys);
        }
        GalleryAction::ClearSelection => {
            state.selection.clear();
            state.bulk_mode = false;
        }
        GalleryAction::SetBulkMode(on) => {
            state.bulk_mode = on;
            if !on {
                state.selection.clear();
            }
        }
    }
}

/// Append, deduplicating by resolved identity: completions may arrive out
/// of order and a reconciled item can be re-announced by hydration.
/// Identity is unique across both collections, so the duplicate check
/// spans images and videos regardless of the target.
fn add_item(state: &mut GalleryState, item: GalleryItem, target: MediaKind) {
    match identify(&item) {
        Some(key) => {
            let duplicate = state
                .images
                .iter()
                .chain(state.videos.iter())
                .any(|existing| identify(existing).as_deref() == Some(key.as_str()));
            if duplicate {
                tracing::debug!(%key, "skipping duplicate gallery item");
                return;
            }
            match target {
                MediaKind::Image => state.images.push(item),
                MediaKind::Video => state.videos.push(item),
            }
        }
        None => {
            tracing::warn!("dropping gallery item without any usable key");
        }
    }
}

fn dedup_by_identity(items: Vec<GalleryItem>) -> Vec<GalleryItem> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match identify(&item) {
            Some(key) if seen.insert(key.clone()) => out.push(item),
            Some(_) => {}
            None => tracing::warn!("dropping gallery item without any usable key"),
        }
    }
    out
}

/// Silent no-op when the identity is unknown: the item may have been
/// concurrently deleted. Idempotence is deliberate.
fn update_item(items: &mut [GalleryItem], id: &str, patch: &ItemPatch) {
    if let Some(item) = items
        .iter_mut()
        .find(|item| identify(item).as_deref() == Some(id))
    {
        patch.apply_to(item);
    }
}

fn remove_item(items: &mut Vec<GalleryItem>, id: &str) {
    items.retain(|item| identify(item).as_deref() != Some(id));
}
