use std::sync::Mutex;

use backend::testing::MemoryBackend;
use gallery::{GalleryAction, GalleryItem, GalleryStore, MediaKind};
use session::{BulkAction, BulkCoordinator};

fn image(key: &str) -> GalleryItem {
    GalleryItem::new(
        MediaKind::Image,
        format!("https://cdn.example.com/{key}.png"),
        "p",
        "m",
    )
    .with_r2_file_id(key)
}

#[tokio::main]
async fn main() {
    let mut store = GalleryStore::new();
    for key in ["A", "B", "C"] {
        store.dispatch(GalleryAction::AddImage(image(key)));
    }
    let store = Mutex::new(store);
    let backing =
        MemoryBackend::new(vec![image("A"), image("B"), image("C")]).refusing_delete("B");

    let mut coordinator = BulkCoordinator::new();
    {
        let mut store = store.lock().expect("store");
        for key in ["A", "B", "C"] {
            coordinator.toggle(&mut store, key);
        }
        assert!(store.bulk_mode());
        assert_eq!(store.selection().len(), 3);
    }

    // Phase 1 records the request without mutating anything.
    let pending = coordinator
        .request(&store.lock().expect("store"), BulkAction::Delete)
        .expect("pending");
    assert_eq!(pending.count, 3);
    assert_eq!(store.lock().expect("store").images().len(), 3);

    // Phase 2 applies per item; the refused one is reported, not fatal.
    let outcome = coordinator
        .confirm(&store, &backing)
        .await
        .expect("confirm");
    assert_eq!(outcome.applied.len(), 2);
    assert_eq!(outcome.failed, vec!["B".to_string()]);

    let store = store.lock().expect("store");
    assert!(store.find_by_key("A").is_none());
    assert!(store.find_by_key("B").is_some());
    assert!(store.find_by_key("C").is_none());
    assert!(store.selection().is_empty());
    assert!(!store.bulk_mode());
}
