use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminant for the two media variants carried by the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Provenance recorded when an item was saved from another creator's public feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFrom {
    pub creator_id: String,
    pub creator_name: Option<String>,
}

/// A generated image or video.
///
/// Every item carries at least one non-empty key among `job_id`,
/// `r2_file_id` and `url`; identity resolution depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2_file_id: Option<String>,
    pub prompt: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_liked: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_from: Option<SavedFrom>,
}

impl GalleryItem {
    pub fn new(kind: MediaKind, url: impl Into<String>, prompt: impl Into<String>, model: impl Into<String>) -> Self {
        GalleryItem {
            kind,
            url: url.into(),
            job_id: None,
            r2_file_id: None,
            prompt: prompt.into(),
            model: model.into(),
            aspect_ratio: None,
            is_public: false,
            is_liked: false,
            timestamp: Utc::now(),
            avatar_id: None,
            product_id: None,
            style_id: None,
            saved_from: None,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_r2_file_id(mut self, r2_file_id: impl Into<String>) -> Self {
        self.r2_file_id = Some(r2_file_id.into());
        self
    }
}

/// Partial in-place update for a gallery item.
///
/// `None` fields are left untouched; this is also the shape sent to the
/// backing store for remote updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    /// `Some(None)` clears the field and serializes as an explicit null;
    /// `None` leaves it untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2_file_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ItemPatch {
    pub fn liked(value: bool) -> Self {
        ItemPatch { is_liked: Some(value), ..Default::default() }
    }

    pub fn public(value: bool) -> Self {
        ItemPatch { is_public: Some(value), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.is_public.is_none()
            && self.is_liked.is_none()
            && self.r2_file_id.is_none()
            && self.url.is_none()
    }

    /// Patch restoring the fields this patch would overwrite on `item`.
    pub fn inverse_for(&self, item: &GalleryItem) -> ItemPatch {
        ItemPatch {
            is_public: self.is_public.map(|_| item.is_public),
            is_liked: self.is_liked.map(|_| item.is_liked),
            r2_file_id: self.r2_file_id.as_ref().map(|_| item.r2_file_id.clone()),
            url: self.url.as_ref().map(|_| item.url.clone()),
        }
    }

    pub fn apply_to(&self, item: &mut GalleryItem) {
        if let Some(v) = self.is_public {
            item.is_public = v;
        }
        if let Some(v) = self.is_liked {
            item.is_liked = v;
        }
        if let Some(value) = &self.r2_file_id {
            item.r2_file_id = value.clone();
        }
        if let Some(url) = &self.url {
            item.url = url.clone();
        }
    }
}

/// User-created folder grouping item identifiers; membership only, items
/// are never deleted through a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_ids: Vec<String>,
    #[serde(default)]
    pub video_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail: Option<String>,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Folder {
            id: id.into(),
            name: name.into(),
            image_ids: Vec::new(),
            video_ids: Vec::new(),
            created_at: Utc::now(),
            custom_thumbnail: None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.image_ids.iter().any(|id| id == key) || self.video_ids.iter().any(|id| id == key)
    }
}
