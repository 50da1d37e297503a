//! Shared wiring between the desktop entry point and the CLI: service
//! construction and the local gallery snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use backend::testing::MemoryBackend;
use backend::{BackingStore, HttpBackend};
use gallery::{GalleryState, GalleryStore};
use providers::testing::StaticProvider;
use providers::{ModelCatalog, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};

use crate::config::AppConfig;

pub const SNAPSHOT_FILE: &str = "gallery.json";

pub fn mock_services(cfg: &AppConfig) -> bool {
    cfg.mock_services || std::env::var("MOCK_SERVICES").map(|v| v == "1").unwrap_or(false)
}

pub fn snapshot_path(cfg: &AppConfig) -> PathBuf {
    cfg.data_dir.join(SNAPSHOT_FILE)
}

/// Load the persisted gallery snapshot, or start empty when none exists.
pub fn load_store(path: &Path) -> Result<GalleryStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(GalleryStore::new());
    }
    let data = std::fs::read_to_string(path)?;
    let state: GalleryState = serde_json::from_str(&data)?;
    Ok(GalleryStore::from_state(state))
}

pub fn save_store(path: &Path, store: &GalleryStore) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(store.state())?;
    std::fs::write(path, data)?;
    Ok(())
}

/// The supported model set. Mock services swap every adapter for an
/// in-process stand-in with the same catalog shape.
pub fn build_catalog(cfg: &AppConfig) -> ModelCatalog {
    if mock_services(cfg) {
        let mut catalog = ModelCatalog::new();
        for model in [DEFAULT_IMAGE_MODEL, "flux-dev", "sdxl"] {
            catalog.register(model, Arc::new(StaticProvider::image()));
        }
        for model in [DEFAULT_VIDEO_MODEL, "kling-2.1", "seedance-1"] {
            catalog.register(model, Arc::new(StaticProvider::video()));
        }
        catalog
    } else {
        ModelCatalog::http_defaults(&cfg.provider_base_url, &api_token())
    }
}

pub fn build_backend(cfg: &AppConfig, store: &GalleryStore) -> Box<dyn BackingStore> {
    if mock_services(cfg) {
        let mut items = store.images().to_vec();
        items.extend_from_slice(store.videos());
        Box::new(MemoryBackend::new(items))
    } else {
        Box::new(HttpBackend::new(api_token(), cfg.backend_base_url.clone()))
    }
}

fn api_token() -> String {
    std::env::var("GENSTUDIO_API_TOKEN").unwrap_or_default()
}
