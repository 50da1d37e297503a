//! Main application entry point for GenStudio.

use std::sync::{Arc, Mutex};

use gallery::{GalleryAction, MediaKind};
use orchestrator::{JobEvent, JobTimeouts, Orchestrator};
use tokio::time::Duration;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod config;
mod runtime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::AppConfig::load_from(None);
    std::fs::create_dir_all(&cfg.data_dir)?;
    let file_appender = rolling::daily(&cfg.data_dir, "genstudio.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    println!("Starting GenStudio");

    let snapshot = runtime::snapshot_path(&cfg);
    let store = Arc::new(Mutex::new(runtime::load_store(&snapshot)?));
    let backing = runtime::build_backend(&cfg, &store.lock().expect("gallery store poisoned"));

    println!("Hydrating gallery from backend...");
    match backing.fetch_gallery().await {
        Ok(items) => {
            let (images, videos): (Vec<_>, Vec<_>) =
                items.into_iter().partition(|i| i.kind == MediaKind::Image);
            let mut store = store.lock().expect("gallery store poisoned");
            store.dispatch(GalleryAction::SetImages(images));
            store.dispatch(GalleryAction::SetVideos(videos));
            println!(
                "Gallery ready: {} images, {} videos",
                store.images().len(),
                store.videos().len()
            );
        }
        Err(e) => {
            eprintln!("Hydration failed: {}", e);
            eprintln!("Continuing with the local snapshot; generation is still available.");
        }
    }

    let catalog = Arc::new(runtime::build_catalog(&cfg));
    let timeouts = JobTimeouts {
        image: Duration::from_secs(cfg.image_timeout_secs),
        video: Duration::from_secs(cfg.video_timeout_secs),
    };
    let (_orchestrator, mut events) = Orchestrator::new(catalog, Arc::clone(&store), timeouts);

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                JobEvent::Started { job_id, model } => {
                    tracing::info!(%job_id, %model, "job started")
                }
                JobEvent::Progress { job_id, percent } => {
                    tracing::trace!(%job_id, percent, "display progress")
                }
                JobEvent::BackendProgress { job_id, percent } => {
                    tracing::debug!(%job_id, percent, "job progress")
                }
                JobEvent::Completed { job_id, .. } => tracing::info!(%job_id, "job completed"),
                JobEvent::Failed { job_id, error } => {
                    tracing::warn!(%job_id, %error, "job failed")
                }
                JobEvent::TimedOut { job_id } => tracing::warn!(%job_id, "job timed out"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    println!("Shutting down");
    runtime::save_store(&snapshot, &store.lock().expect("gallery store poisoned"))?;
    event_log.abort();

    Ok(())
}
