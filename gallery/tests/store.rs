use gallery::{
    filtered_items, identify, FiltersPatch, Folder, GalleryAction, GalleryItem, GalleryStore,
    ItemPatch, MediaKind,
};

fn image(job_id: &str, prompt: &str) -> GalleryItem {
    GalleryItem::new(MediaKind::Image, format!("https://cdn/{job_id}.png"), prompt, "gemini-2.5-flash-image")
        .with_job_id(job_id)
}

fn video(job_id: &str) -> GalleryItem {
    GalleryItem::new(MediaKind::Video, format!("https://cdn/{job_id}.mp4"), "clip", "veo-3")
        .with_job_id(job_id)
}

#[test]
fn add_image_appends_and_is_queryable_by_key() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    assert_eq!(store.images().len(), 1);
    assert_eq!(store.find_by_key("a").unwrap().prompt, "one");
}

#[test]
fn adds_never_produce_duplicate_identities() {
    let mut store = GalleryStore::new();
    // Same logical item announced twice, e.g. a fresh generation followed
    // by a hydration carrying the reconciled r2 id.
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::AddImage(image("a", "one again")));
    assert_eq!(store.images().len(), 1);

    store.dispatch(GalleryAction::AddImage(image("b", "two")));
    store.dispatch(GalleryAction::RemoveImage { id: "a".into() });
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    let keys: Vec<_> = store.images().iter().filter_map(identify).collect();
    let mut deduped = keys.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(keys.len(), deduped.len());
}

#[test]
fn identity_is_unique_across_images_and_videos() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("shared", "one")));
    store.dispatch(GalleryAction::AddVideo(video("shared")));
    assert_eq!(store.images().len(), 1);
    assert!(store.videos().is_empty());
}

#[test]
fn out_of_order_completions_are_accepted() {
    let mut store = GalleryStore::new();
    // A later-submitted job may complete first; order in the collection is
    // carried by the item timestamps, not by array position.
    store.dispatch(GalleryAction::AddImage(image("second", "late")));
    store.dispatch(GalleryAction::AddImage(image("first", "early")));
    assert_eq!(store.images().len(), 2);
}

#[test]
fn update_unknown_identity_is_a_silent_noop() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::UpdateImage {
        id: "missing".into(),
        patch: ItemPatch::liked(true),
    });
    assert!(!store.images()[0].is_liked);

    store.dispatch(GalleryAction::RemoveImage { id: "missing".into() });
    assert_eq!(store.images().len(), 1);
}

#[test]
fn update_matches_by_resolved_identity() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::UpdateImage { id: "a".into(), patch: ItemPatch::public(true) });
    assert!(store.images()[0].is_public);
}

#[test]
fn set_images_replaces_the_collection() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::SetImages(vec![image("b", "two"), image("c", "three")]));
    assert_eq!(store.images().len(), 2);
    assert!(store.find_by_key("a").is_none());
}

#[test]
fn filtered_items_is_deterministic_and_order_stable() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::AddImage(image("b", "two")));
    store.dispatch(GalleryAction::AddVideo(video("v1")));
    store.dispatch(GalleryAction::SetFilters(FiltersPatch {
        kinds: Some(vec![MediaKind::Image]),
        ..Default::default()
    }));

    let first = store.filtered_items();
    let second = filtered_items(store.state());
    assert_eq!(first, second);
    let keys: Vec<_> = first.iter().filter_map(identify).collect();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn filtered_view_concatenates_images_then_videos() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddVideo(video("v1")));
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    let keys: Vec<_> = store.filtered_items().iter().filter_map(identify).collect();
    assert_eq!(keys, vec!["a".to_string(), "v1".to_string()]);
}

#[test]
fn folder_filter_restricts_to_membership() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::AddImage(image("b", "two")));
    store.dispatch(GalleryAction::CreateFolder(Folder::new("f1", "Favourites")));
    store.dispatch(GalleryAction::AddToFolder {
        folder_id: "f1".into(),
        item_id: "a".into(),
        kind: MediaKind::Image,
    });
    store.dispatch(GalleryAction::SetFilters(FiltersPatch {
        folder: Some(Some("f1".into())),
        ..Default::default()
    }));
    let keys: Vec<_> = store.filtered_items().iter().filter_map(identify).collect();
    assert_eq!(keys, vec!["a".to_string()]);
}

#[test]
fn deleting_a_folder_keeps_the_items() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::CreateFolder(Folder::new("f1", "Favourites")));
    store.dispatch(GalleryAction::AddToFolder {
        folder_id: "f1".into(),
        item_id: "a".into(),
        kind: MediaKind::Image,
    });
    store.dispatch(GalleryAction::DeleteFolder { id: "f1".into() });
    assert!(store.folders().is_empty());
    assert_eq!(store.images().len(), 1);
}

#[test]
fn clear_filters_restores_the_full_view() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::AddVideo(video("v1")));
    store.dispatch(GalleryAction::SetFilters(FiltersPatch {
        kinds: Some(vec![MediaKind::Video]),
        ..Default::default()
    }));
    assert_eq!(store.filtered_items().len(), 1);
    store.dispatch(GalleryAction::ClearFilters);
    assert_eq!(store.filtered_items().len(), 2);
}

#[test]
fn selection_toggles_and_clears_with_bulk_mode() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::SetBulkMode(true));
    store.dispatch(GalleryAction::ToggleSelect("a".into()));
    store.dispatch(GalleryAction::ToggleSelect("b".into()));
    store.dispatch(GalleryAction::ToggleSelect("a".into()));
    assert_eq!(store.selection().len(), 1);
    assert!(store.selection().contains("b"));

    store.dispatch(GalleryAction::ClearSelection);
    assert!(store.selection().is_empty());
    assert!(!store.bulk_mode());
}

#[test]
fn viewer_state_tracks_item_and_filtered_index() {
    let mut store = GalleryStore::new();
    let item = image("a", "one");
    store.dispatch(GalleryAction::AddImage(item.clone()));
    store.dispatch(GalleryAction::SetViewer { item: Some(item.clone()), index: 0 });
    assert!(store.viewer().open);
    assert_eq!(store.viewer().item.as_ref(), Some(&item));

    store.dispatch(GalleryAction::SetViewerOpen(false));
    assert!(!store.viewer().open);
    assert!(store.viewer().item.is_none());
}

#[test]
fn state_snapshot_round_trips_items_and_folders() {
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(image("a", "one")));
    store.dispatch(GalleryAction::AddVideo(video("v1")));
    store.dispatch(GalleryAction::CreateFolder(Folder::new("f1", "Favourites")));

    let json = serde_json::to_string(store.state()).unwrap();
    let restored: gallery::GalleryState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.images, store.images());
    assert_eq!(restored.videos, store.videos());
    assert_eq!(restored.folders, store.folders());
}
