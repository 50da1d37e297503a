//! In-memory backing store for tests and offline runs.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use gallery::{identify, GalleryItem, ItemPatch};

use crate::{BackendError, BackingStore};

/// Keeps items in memory; specific identifiers can be armed to refuse
/// deletion or reject updates, so partial-failure paths are reproducible.
#[derive(Default)]
pub struct MemoryBackend {
    items: Mutex<Vec<GalleryItem>>,
    refuse_delete: BTreeSet<String>,
    fail_update: BTreeSet<String>,
}

impl MemoryBackend {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        MemoryBackend { items: Mutex::new(items), ..Default::default() }
    }

    pub fn refusing_delete(mut self, id: impl Into<String>) -> Self {
        self.refuse_delete.insert(id.into());
        self
    }

    pub fn failing_update(mut self, id: impl Into<String>) -> Self {
        self.fail_update.insert(id.into());
        self
    }

    pub fn items(&self) -> Vec<GalleryItem> {
        self.items.lock().expect("backend poisoned").clone()
    }
}

#[async_trait]
impl BackingStore for MemoryBackend {
    async fn fetch_gallery(&self) -> Result<Vec<GalleryItem>, BackendError> {
        Ok(self.items())
    }

    async fn delete_item(&self, id: &str) -> Result<bool, BackendError> {
        if self.refuse_delete.contains(id) {
            return Ok(false);
        }
        let mut items = self.items.lock().expect("backend poisoned");
        let before = items.len();
        items.retain(|item| identify(item).as_deref() != Some(id));
        Ok(items.len() < before)
    }

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), BackendError> {
        if self.fail_update.contains(id) {
            return Err(BackendError::ApiError(format!("update rejected for {id}")));
        }
        let mut items = self.items.lock().expect("backend poisoned");
        if let Some(item) = items
            .iter_mut()
            .find(|item| identify(item).as_deref() == Some(id))
        {
            patch.apply_to(item);
        }
        Ok(())
    }
}
