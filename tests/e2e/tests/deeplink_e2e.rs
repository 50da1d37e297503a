use gallery::{GalleryAction, GalleryItem, GalleryStore, MediaKind};
use session::ViewerRouter;

fn image(job_id: &str) -> GalleryItem {
    GalleryItem::new(
        MediaKind::Image,
        format!("https://cdn.example.com/{job_id}.png"),
        "p",
        "m",
    )
    .with_job_id(job_id)
}

#[tokio::main]
async fn main() {
    // Open an item, reload at the resulting URL, and land on the same item.
    let mut store = GalleryStore::new();
    let item = image("abc");
    store.dispatch(GalleryAction::AddImage(item.clone()));

    let mut router = ViewerRouter::new("/gallery");
    assert!(router.open_item(&mut store, &item));
    assert_eq!(router.path(), "/job/abc");

    let mut reloaded = ViewerRouter::new(router.path().to_string());
    let mut fresh = GalleryStore::new();
    // Before hydration the link cannot resolve and the viewer stays closed.
    assert!(!reloaded.resolve_current(&mut fresh));
    assert!(!fresh.viewer().open);

    fresh.dispatch(GalleryAction::AddImage(item.clone()));
    assert!(reloaded.resolve_current(&mut fresh));
    assert_eq!(fresh.viewer().item.as_ref(), Some(&item));

    // Items with only a URL key round-trip through the encoded route.
    let url_item = GalleryItem::new(MediaKind::Image, "https://x/y.png", "p", "m");
    let mut store = GalleryStore::new();
    store.dispatch(GalleryAction::AddImage(url_item.clone()));
    let mut router = ViewerRouter::new("/gallery");
    assert!(router.open_item(&mut store, &url_item));
    assert_eq!(router.path(), "/job/https%3A%2F%2Fx%2Fy.png");

    let mut reloaded = ViewerRouter::new(router.path().to_string());
    assert!(reloaded.resolve_current(&mut store));
    assert_eq!(store.viewer().item.as_ref(), Some(&url_item));

    // Closing returns to where the viewer was opened from.
    router.close(&mut store);
    assert_eq!(router.path(), "/gallery");
    assert!(!store.viewer().open);
}
