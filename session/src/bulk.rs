//! Bulk-mode selection and confirmable group operations.

use std::sync::Mutex;

use backend::BackingStore;
use gallery::{identify, GalleryAction, GalleryStore, ItemPatch};

use crate::optimistic::{commit_item_patch, delete_item_everywhere};
use crate::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Publish,
    Unpublish,
    /// Resolve the selection for asset retrieval. Local only; the caller
    /// fetches the applied items' urls.
    Download,
    /// Group the selection into an existing folder. Membership only, no
    /// backend call.
    AddToFolder { folder_id: String },
}

/// Phase 1 of a destructive bulk operation: recorded without mutating
/// anything, awaiting an explicit confirm or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub action: BulkAction,
    pub count: usize,
    pub identifiers: Vec<String>,
}

/// Result of a confirmed bulk operation. Partial failure is first-class:
/// the failed subset is named exactly, never folded into total failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub applied: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Default)]
pub struct BulkCoordinator {
    pending: Option<PendingConfirmation>,
}

impl BulkCoordinator {
    pub fn new() -> Self {
        BulkCoordinator::default()
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn toggle(&self, store: &mut GalleryStore, key: impl Into<String>) {
        store.dispatch(GalleryAction::SetBulkMode(true));
        store.dispatch(GalleryAction::ToggleSelect(key.into()));
    }

    /// Select every identifier in the current *filtered* view; items hidden
    /// by an active filter are never silently included.
    pub fn select_all_visible(&self, store: &mut GalleryStore) {
        let keys: Vec<String> = store
            .filtered_items()
            .iter()
            .filter_map(identify)
            .collect();
        store.dispatch(GalleryAction::SetBulkMode(true));
        store.dispatch(GalleryAction::SelectMany(keys));
    }

    /// Clear the selection and exit bulk mode.
    pub fn clear(&mut self, store: &mut GalleryStore) {
        self.pending = None;
        store.dispatch(GalleryAction::ClearSelection);
    }

    /// Phase 1: record a confirmation request for the current selection.
    /// Nothing is mutated. Returns `None` when the selection is empty.
    pub fn request(
        &mut self,
        store: &GalleryStore,
        action: BulkAction,
    ) -> Option<&PendingConfirmation> {
        let identifiers: Vec<String> = store.selection().iter().cloned().collect();
        if identifiers.is_empty() {
            return None;
        }
        self.pending = Some(PendingConfirmation {
            action,
            count: identifiers.len(),
            identifiers,
        });
        self.pending.as_ref()
    }

    /// Discard the pending request with no effect.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Phase 2: perform the confirmed mutation set. Each identifier is
    /// handled independently; failures are collected, not propagated, so
    /// one bad item cannot abort the rest. Remote-coupled actions go
    /// through the optimistic helpers; download and folder-add are local.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, store, backing)))]
    pub async fn confirm(
        &mut self,
        store: &Mutex<GalleryStore>,
        backing: &dyn BackingStore,
    ) -> Result<BulkOutcome, SessionError> {
        // A folder deleted between request and confirm fails the whole
        // request; the pending confirmation survives for cancel.
        if let Some(PendingConfirmation {
            action: BulkAction::AddToFolder { folder_id },
            ..
        }) = &self.pending
        {
            let known = store
                .lock()
                .expect("gallery store poisoned")
                .folders()
                .iter()
                .any(|f| f.id == *folder_id);
            if !known {
                return Err(SessionError::UnknownFolder(folder_id.clone()));
            }
        }
        let pending = self.pending.take().ok_or(SessionError::NoPendingConfirmation)?;
        let mut outcome = BulkOutcome::default();

        for key in &pending.identifiers {
            let ok = match &pending.action {
                BulkAction::Delete => {
                    matches!(delete_item_everywhere(store, backing, key).await, Ok(true))
                }
                BulkAction::Publish => {
                    commit_item_patch(store, backing, key, ItemPatch::public(true))
                        .await
                        .is_ok()
                }
                BulkAction::Unpublish => {
                    commit_item_patch(store, backing, key, ItemPatch::public(false))
                        .await
                        .is_ok()
                }
                BulkAction::Download => store
                    .lock()
                    .expect("gallery store poisoned")
                    .find_by_key(key)
                    .is_some(),
                BulkAction::AddToFolder { folder_id } => {
                    let mut store = store.lock().expect("gallery store poisoned");
                    match store.find_by_key(key).map(|item| item.kind) {
                        Some(kind) => {
                            store.dispatch(GalleryAction::AddToFolder {
                                folder_id: folder_id.clone(),
                                item_id: key.clone(),
                                kind,
                            });
                            true
                        }
                        None => false,
                    }
                }
            };
            if ok {
                outcome.applied.push(key.clone());
            } else {
                outcome.failed.push(key.clone());
            }
        }

        if !outcome.failed.is_empty() {
            tracing::warn!(
                action = ?pending.action,
                failed = outcome.failed.len(),
                total = pending.count,
                "bulk operation partially failed"
            );
        }
        store
            .lock()
            .expect("gallery store poisoned")
            .dispatch(GalleryAction::ClearSelection);
        Ok(outcome)
    }
}
