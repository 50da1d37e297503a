use serde::{Deserialize, Serialize};

use crate::item::{GalleryItem, MediaKind};

/// Predicate configuration for the derived gallery view.
///
/// Stateless; the filtered view is the conjunction of every set predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<MediaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Partial filter update; `Some`/non-empty fields overwrite, the rest are
/// left as they are. Resetting everything goes through `ClearFilters`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersPatch {
    pub liked: Option<Option<bool>>,
    pub public: Option<Option<bool>>,
    pub models: Option<Vec<String>>,
    pub kinds: Option<Vec<MediaKind>>,
    pub folder: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub product: Option<Option<String>>,
    pub style: Option<Option<String>>,
}

impl GalleryFilters {
    pub fn is_empty(&self) -> bool {
        *self == GalleryFilters::default()
    }

    pub fn merge(&mut self, patch: FiltersPatch) {
        if let Some(v) = patch.liked {
            self.liked = v;
        }
        if let Some(v) = patch.public {
            self.public = v;
        }
        if let Some(v) = patch.models {
            self.models = v;
        }
        if let Some(v) = patch.kinds {
            self.kinds = v;
        }
        if let Some(v) = patch.folder {
            self.folder = v;
        }
        if let Some(v) = patch.avatar {
            self.avatar = v;
        }
        if let Some(v) = patch.product {
            self.product = v;
        }
        if let Some(v) = patch.style {
            self.style = v;
        }
    }

    /// Conjunction of all set predicates. The folder predicate is matched
    /// against a resolved identity by the store, so it is checked there.
    pub fn matches(&self, item: &GalleryItem) -> bool {
        if let Some(liked) = self.liked {
            if item.is_liked != liked {
                return false;
            }
        }
        if let Some(public) = self.public {
            if item.is_public != public {
                return false;
            }
        }
        if !self.models.is_empty() && !self.models.iter().any(|m| *m == item.model) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&item.kind) {
            return false;
        }
        if let Some(avatar) = &self.avatar {
            if item.avatar_id.as_deref() != Some(avatar.as_str()) {
                return false;
            }
        }
        if let Some(product) = &self.product {
            if item.product_id.as_deref() != Some(product.as_str()) {
                return false;
            }
        }
        if let Some(style) = &self.style {
            if item.style_id.as_deref() != Some(style.as_str()) {
                return false;
            }
        }
        true
    }
}
