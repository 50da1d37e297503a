//! Gallery data model and state container for GenStudio.

mod filters;
mod identity;
mod item;
mod store;

pub use filters::{FiltersPatch, GalleryFilters};
pub use identity::{identify, matches_key};
pub use item::{Folder, GalleryItem, ItemPatch, MediaKind, SavedFrom};
pub use store::{filtered_items, GalleryAction, GalleryState, GalleryStore, ViewerState};
