use std::sync::{Arc, Mutex};
use std::time::Duration;

use gallery::{GalleryStore, MediaKind};
use orchestrator::{JobEvent, JobTimeouts, Orchestrator};
use providers::testing::StaticProvider;
use providers::{GenerationRequest, ModelCatalog, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};

#[tokio::main]
async fn main() {
    let mut catalog = ModelCatalog::new();
    catalog.register(
        DEFAULT_IMAGE_MODEL,
        Arc::new(StaticProvider::image().with_backend_progress(vec![40, 80])),
    );
    catalog.register(DEFAULT_VIDEO_MODEL, Arc::new(StaticProvider::video()));

    let store = Arc::new(Mutex::new(GalleryStore::new()));
    let (orchestrator, mut events) = Orchestrator::new(
        Arc::new(catalog),
        Arc::clone(&store),
        JobTimeouts::default(),
    );

    let job_id = orchestrator
        .submit(
            DEFAULT_IMAGE_MODEL,
            GenerationRequest::prompt("a scenic lake"),
        )
        .expect("submit");

    let mut saw_progress = false;
    let item = loop {
        match tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event timeout")
            .expect("event channel closed")
        {
            JobEvent::Started { job_id: id, model } => {
                assert_eq!(id, job_id);
                assert_eq!(model, DEFAULT_IMAGE_MODEL);
            }
            JobEvent::BackendProgress { percent, .. } => {
                assert!(percent <= 100);
                saw_progress = true;
            }
            JobEvent::Completed { job_id: id, item } => {
                assert_eq!(id, job_id);
                break item;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    };
    assert!(saw_progress);
    assert_eq!(item.kind, MediaKind::Image);
    assert_eq!(item.prompt, "a scenic lake");
    assert_eq!(item.model, DEFAULT_IMAGE_MODEL);

    let store = store.lock().expect("store");
    assert_eq!(store.images().len(), 1);
    assert!(item
        .job_id
        .as_deref()
        .is_some_and(|id| store.find_by_key(id).is_some()));
    assert!(orchestrator.active_jobs().is_empty());
}
