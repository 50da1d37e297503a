//! Two-phase optimistic mutation helpers.
//!
//! Every mutation with a remote counterpart follows the same shape: apply
//! the local patch, attempt the remote call, and apply the inverse patch
//! if the remote side rejects it. Centralized here so the rollback
//! guarantee is uniform across like/publish/delete instead of ad hoc per
//! handler.

use std::sync::Mutex;

use backend::BackingStore;
use gallery::{GalleryAction, GalleryItem, GalleryStore, ItemPatch, MediaKind};

use crate::SessionError;

fn update_action(kind: MediaKind, id: String, patch: ItemPatch) -> GalleryAction {
    match kind {
        MediaKind::Image => GalleryAction::UpdateImage { id, patch },
        MediaKind::Video => GalleryAction::UpdateVideo { id, patch },
    }
}

fn add_action(item: GalleryItem) -> GalleryAction {
    match item.kind {
        MediaKind::Image => GalleryAction::AddImage(item),
        MediaKind::Video => GalleryAction::AddVideo(item),
    }
}

fn remove_action(kind: MediaKind, id: String) -> GalleryAction {
    match kind {
        MediaKind::Image => GalleryAction::RemoveImage { id },
        MediaKind::Video => GalleryAction::RemoveVideo { id },
    }
}

/// Apply `patch` to the item with resolved identity `key`, locally first,
/// then remotely; the local change is reverted if the remote update fails.
pub async fn commit_item_patch(
    store: &Mutex<GalleryStore>,
    backing: &dyn BackingStore,
    key: &str,
    patch: ItemPatch,
) -> Result<(), SessionError> {
    let (kind, inverse) = {
        let store = store.lock().expect("gallery store poisoned");
        let item = store
            .find_by_key(key)
            .ok_or_else(|| SessionError::UnknownItem(key.to_string()))?;
        (item.kind, patch.inverse_for(item))
    };

    store
        .lock()
        .expect("gallery store poisoned")
        .dispatch(update_action(kind, key.to_string(), patch.clone()));

    match backing.update_item(key, &patch).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(%key, error = %e, "remote update failed, reverting local patch");
            store
                .lock()
                .expect("gallery store poisoned")
                .dispatch(update_action(kind, key.to_string(), inverse));
            Err(SessionError::Backend(e.to_string()))
        }
    }
}

/// Remove the item locally and remotely. The local removal is reinstated
/// when the backend refuses or the call fails. `Ok(true)` means the item
/// is gone on both sides; `Ok(false)` that the backend refused.
pub async fn delete_item_everywhere(
    store: &Mutex<GalleryStore>,
    backing: &dyn BackingStore,
    key: &str,
) -> Result<bool, SessionError> {
    let snapshot = {
        let store = store.lock().expect("gallery store poisoned");
        store.find_by_key(key).cloned()
    };
    // Already gone locally: deletion is idempotent.
    let Some(snapshot) = snapshot else {
        return Ok(true);
    };

    store
        .lock()
        .expect("gallery store poisoned")
        .dispatch(remove_action(snapshot.kind, key.to_string()));

    match backing.delete_item(key).await {
        Ok(true) => Ok(true),
        Ok(false) => {
            tracing::warn!(%key, "backend refused delete, restoring item");
            store
                .lock()
                .expect("gallery store poisoned")
                .dispatch(add_action(snapshot));
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(%key, error = %e, "remote delete failed, restoring item");
            store
                .lock()
                .expect("gallery store poisoned")
                .dispatch(add_action(snapshot));
            Err(SessionError::Backend(e.to_string()))
        }
    }
}

/// Flip the like flag with rollback on persistence failure.
pub async fn toggle_like(
    store: &Mutex<GalleryStore>,
    backing: &dyn BackingStore,
    key: &str,
) -> Result<bool, SessionError> {
    let liked = {
        let store = store.lock().expect("gallery store poisoned");
        let item = store
            .find_by_key(key)
            .ok_or_else(|| SessionError::UnknownItem(key.to_string()))?;
        item.is_liked
    };
    commit_item_patch(store, backing, key, ItemPatch::liked(!liked)).await?;
    Ok(!liked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::testing::MemoryBackend;
    use gallery::MediaKind;

    fn store_with(items: Vec<GalleryItem>) -> Mutex<GalleryStore> {
        let mut store = GalleryStore::new();
        for item in items {
            store.dispatch(GalleryAction::AddImage(item));
        }
        Mutex::new(store)
    }

    fn image(key: &str) -> GalleryItem {
        GalleryItem::new(MediaKind::Image, format!("https://cdn/{key}.png"), "p", "m")
            .with_r2_file_id(key)
    }

    #[tokio::test]
    async fn successful_patch_sticks() {
        let store = store_with(vec![image("a")]);
        let backing = MemoryBackend::new(vec![image("a")]);
        commit_item_patch(&store, &backing, "a", ItemPatch::public(true))
            .await
            .unwrap();
        assert!(store.lock().unwrap().find_by_key("a").unwrap().is_public);
        assert!(backing.items()[0].is_public);
    }

    #[tokio::test]
    async fn failed_patch_is_rolled_back() {
        let store = store_with(vec![image("a")]);
        let backing = MemoryBackend::new(vec![image("a")]).failing_update("a");
        let err = commit_item_patch(&store, &backing, "a", ItemPatch::liked(true))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Backend(_)));
        assert!(!store.lock().unwrap().find_by_key("a").unwrap().is_liked);
    }

    #[tokio::test]
    async fn patching_an_unknown_item_errors_without_mutation() {
        let store = store_with(vec![]);
        let backing = MemoryBackend::new(vec![]);
        let err = commit_item_patch(&store, &backing, "ghost", ItemPatch::liked(true))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownItem(k) if k == "ghost"));
    }

    #[tokio::test]
    async fn refused_delete_restores_the_item() {
        let store = store_with(vec![image("a")]);
        let backing = MemoryBackend::new(vec![image("a")]).refusing_delete("a");
        let deleted = delete_item_everywhere(&store, &backing, "a").await.unwrap();
        assert!(!deleted);
        assert!(store.lock().unwrap().find_by_key("a").is_some());
    }

    #[tokio::test]
    async fn accepted_delete_removes_both_sides() {
        let store = store_with(vec![image("a")]);
        let backing = MemoryBackend::new(vec![image("a")]);
        assert!(delete_item_everywhere(&store, &backing, "a").await.unwrap());
        assert!(store.lock().unwrap().find_by_key("a").is_none());
        assert!(backing.items().is_empty());
    }

    #[tokio::test]
    async fn toggle_like_round_trips() {
        let store = store_with(vec![image("a")]);
        let backing = MemoryBackend::new(vec![image("a")]);
        assert!(toggle_like(&store, &backing, "a").await.unwrap());
        assert!(!toggle_like(&store, &backing, "a").await.unwrap());
        assert!(!store.lock().unwrap().find_by_key("a").unwrap().is_liked);
    }
}
