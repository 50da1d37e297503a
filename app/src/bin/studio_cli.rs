use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use gallery::{GalleryAction, GalleryItem, ItemPatch, MediaKind};
use orchestrator::{JobEvent, JobTimeouts, Orchestrator};
use providers::{GenerationRequest, DEFAULT_IMAGE_MODEL};
use session::{commit_item_patch, delete_item_everywhere, toggle_like};
use tokio::time::Duration;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[path = "../config.rs"]
mod config;
#[path = "../runtime.rs"]
mod runtime;

#[derive(Parser)]
#[command(
    name = "studio_cli",
    author,
    version,
    about = "GenStudio generation and gallery CLI"
)]
struct Cli {
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override the gallery backend base URL
    #[arg(long)]
    backend_base_url: Option<String>,
    /// Override the generation provider base URL
    #[arg(long)]
    provider_base_url: Option<String>,
    /// Override the image job timeout in seconds
    #[arg(long)]
    image_timeout_secs: Option<u64>,
    /// Override the video job timeout in seconds
    #[arg(long)]
    video_timeout_secs: Option<u64>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable tracing spans instrumentation
    #[arg(long)]
    trace_spans: bool,
    /// Use in-process mock providers and backend
    #[arg(long)]
    mock: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a generation job and wait for it to resolve
    Generate {
        /// The prompt text
        prompt: String,
        /// Model to generate with
        #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
        model: String,
        /// Aspect ratio, e.g. 16:9
        #[arg(long)]
        aspect_ratio: Option<String>,
        /// Reference image identifier
        #[arg(long)]
        reference: Option<String>,
    },
    /// List the supported models
    Models,
    /// List gallery items
    ListItems {
        /// Maximum number of items to display
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show metadata for a gallery item
    ShowItem {
        /// Any identifier of the item (job id, file id or URL)
        id: String,
    },
    /// Toggle the like flag on an item
    Like {
        /// Any identifier of the item
        id: String,
    },
    /// Make an item public
    Publish {
        /// Any identifier of the item
        id: String,
    },
    /// Make an item private
    Unpublish {
        /// Any identifier of the item
        id: String,
    },
    /// Delete an item locally and remotely
    Delete {
        /// Any identifier of the item
        id: String,
    },
    /// Export all gallery items to a JSON file
    ExportItems {
        /// Path to the export file
        #[arg(long)]
        file: PathBuf,
    },
    /// Import gallery items from a JSON file
    ImportItems {
        /// Path to the JSON file
        #[arg(long)]
        file: PathBuf,
    },
    /// Show gallery counts and the snapshot location
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.mock {
        std::env::set_var("MOCK_SERVICES", "1");
    }

    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level.clone(),
        backend_base_url: cli.backend_base_url.clone(),
        provider_base_url: cli.provider_base_url.clone(),
        image_timeout_secs: cli.image_timeout_secs,
        video_timeout_secs: cli.video_timeout_secs,
        trace_spans: cli.trace_spans,
        mock_services: cli.mock,
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);
    std::fs::create_dir_all(&cfg.data_dir)?;
    let file_appender = rolling::daily(&cfg.data_dir, "genstudio.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    let snapshot = runtime::snapshot_path(&cfg);

    match cli.command {
        Commands::Generate {
            prompt,
            model,
            aspect_ratio,
            reference,
        } => {
            let store = Arc::new(Mutex::new(runtime::load_store(&snapshot)?));
            let catalog = Arc::new(runtime::build_catalog(&cfg));
            let timeouts = JobTimeouts {
                image: Duration::from_secs(cfg.image_timeout_secs),
                video: Duration::from_secs(cfg.video_timeout_secs),
            };
            let (orchestrator, mut events) =
                Orchestrator::new(catalog, Arc::clone(&store), timeouts);

            let mut request = GenerationRequest::prompt(prompt);
            request.aspect_ratio = aspect_ratio;
            request.reference_image_id = reference;
            let job_id = orchestrator.submit(&model, request)?;
            println!("Job dispatched: {} ({})", job_id, model);

            while let Some(event) = events.recv().await {
                match event {
                    JobEvent::Started { .. } | JobEvent::Progress { .. } => {}
                    JobEvent::BackendProgress { percent, .. } => {
                        println!("Progress: {}%", percent);
                    }
                    JobEvent::Completed { item, .. } => {
                        println!("Completed: {}", item.url);
                        break;
                    }
                    JobEvent::Failed { error, .. } => {
                        runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
                        return Err(format!("Generation failed: {}", error).into());
                    }
                    JobEvent::TimedOut { job_id } => {
                        runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
                        return Err(format!("Job timed out: {}", job_id).into());
                    }
                }
            }
            runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
        }
        Commands::Models => {
            let catalog = runtime::build_catalog(&cfg);
            for (model, kind) in catalog.models() {
                println!("{} ({})", model, kind);
            }
        }
        Commands::ListItems { limit } => {
            let store = runtime::load_store(&snapshot)?;
            let max = limit.unwrap_or(10);
            for item in store
                .images()
                .iter()
                .chain(store.videos().iter())
                .take(max)
            {
                let key = gallery::identify(item).unwrap_or_else(|| "?".to_string());
                println!("{} [{}] {}", key, item.kind, item.prompt);
            }
        }
        Commands::ShowItem { id } => {
            let store = runtime::load_store(&snapshot)?;
            if let Some(item) = store.find_by_any_key(&id) {
                println!("{}", serde_json::to_string_pretty(item)?);
            } else {
                println!("Item not found: {}", id);
            }
        }
        Commands::Like { id } => {
            let store = Mutex::new(runtime::load_store(&snapshot)?);
            let backing = runtime::build_backend(&cfg, &store.lock().expect("store poisoned"));
            let liked = toggle_like(&store, backing.as_ref(), &id).await?;
            if liked {
                println!("Liked: {}", id);
            } else {
                println!("Unliked: {}", id);
            }
            runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
        }
        Commands::Publish { id } => {
            let store = Mutex::new(runtime::load_store(&snapshot)?);
            let backing = runtime::build_backend(&cfg, &store.lock().expect("store poisoned"));
            commit_item_patch(&store, backing.as_ref(), &id, ItemPatch::public(true)).await?;
            println!("Published: {}", id);
            runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
        }
        Commands::Unpublish { id } => {
            let store = Mutex::new(runtime::load_store(&snapshot)?);
            let backing = runtime::build_backend(&cfg, &store.lock().expect("store poisoned"));
            commit_item_patch(&store, backing.as_ref(), &id, ItemPatch::public(false)).await?;
            println!("Unpublished: {}", id);
            runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
        }
        Commands::Delete { id } => {
            let store = Mutex::new(runtime::load_store(&snapshot)?);
            let backing = runtime::build_backend(&cfg, &store.lock().expect("store poisoned"));
            if delete_item_everywhere(&store, backing.as_ref(), &id).await? {
                println!("Deleted: {}", id);
            } else {
                println!("Delete refused: {}", id);
            }
            runtime::save_store(&snapshot, &store.lock().expect("store poisoned"))?;
        }
        Commands::ExportItems { file } => {
            let store = runtime::load_store(&snapshot)?;
            let items: Vec<&GalleryItem> =
                store.images().iter().chain(store.videos().iter()).collect();
            std::fs::write(&file, serde_json::to_string_pretty(&items)?)?;
            println!("Exported to {:?}", file);
        }
        Commands::ImportItems { file } => {
            let mut store = runtime::load_store(&snapshot)?;
            let data = std::fs::read_to_string(&file)?;
            let items: Vec<GalleryItem> = serde_json::from_str(&data)?;
            for item in items {
                let action = match item.kind {
                    MediaKind::Image => GalleryAction::AddImage(item),
                    MediaKind::Video => GalleryAction::AddVideo(item),
                };
                store.dispatch(action);
            }
            runtime::save_store(&snapshot, &store)?;
            println!("Imported from {:?}", file);
        }
        Commands::Status => {
            let store = runtime::load_store(&snapshot)?;
            println!("Snapshot: {:?}", snapshot);
            println!("Images: {}", store.images().len());
            println!("Videos: {}", store.videos().len());
            println!("Folders: {}", store.folders().len());
        }
    }

    Ok(())
}
