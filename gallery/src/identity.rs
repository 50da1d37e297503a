//! Identity resolution for gallery items.
//!
//! The same logical item can carry different populated keys depending on
//! whether it came from a fresh generation (`job_id`) or a hydrated backend
//! listing (`r2_file_id`, possibly no `job_id`). Every component that needs
//! equality goes through [`identify`] rather than comparing fields ad hoc.

use crate::item::GalleryItem;

/// Resolve the canonical key for an item: first non-empty of trimmed
/// `job_id`, trimmed `r2_file_id`, trimmed `url`.
///
/// `None` means the item has no usable key at all, which is a
/// data-integrity violation; callers skip such items instead of failing.
pub fn identify(item: &GalleryItem) -> Option<String> {
    let candidates = [
        item.job_id.as_deref(),
        item.r2_file_id.as_deref(),
        Some(item.url.as_str()),
    ];
    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    None
}

/// Three-way fallback match used when resolving a deep-link segment: the
/// key may have been minted from any of the three key spaces, so it is
/// compared against all of them.
pub fn matches_key(item: &GalleryItem, key: &str) -> bool {
    item.job_id.as_deref() == Some(key)
        || item.r2_file_id.as_deref() == Some(key)
        || item.url == key
}
