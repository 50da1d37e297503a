//! Provider adapter contract and model catalog for GenStudio.
//!
//! Every external generation backend is reached through one capability
//! interface, [`Provider`]; the [`ModelCatalog`] is a closed lookup table
//! from model identifier to adapter. Dispatch is a map lookup, never
//! runtime type inspection.

mod adapters;
pub mod testing;

pub use adapters::{ImageGenClient, VideoGenClient};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gallery::MediaKind;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// Default selected when the video authoring surface is entered with an
/// incompatible model.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3";
/// Default selected when the image authoring surface is entered with an
/// incompatible model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Provider API Error: {0}")]
    ApiError(String),
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    #[error("Other Error: {0}")]
    Other(String),
}

/// Parameters common to every generation call. Model-specific parameters
/// ride along in `extra` and are flattened into the request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GenerationRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        GenerationRequest { prompt: prompt.into(), ..Default::default() }
    }
}

/// What every adapter resolves to on success.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub url: String,
    pub job_id: String,
    pub kind: MediaKind,
}

/// Channel on which job-polling adapters report incremental backend
/// progress (0–100) before resolving.
pub type ProgressSender = mpsc::UnboundedSender<u8>;

/// Contract every external generation backend must satisfy.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> MediaKind;

    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: Option<ProgressSender>,
    ) -> Result<GenerationOutput, ProviderError>;
}

/// Closed mapping from model identifier to provider adapter.
#[derive(Default)]
pub struct ModelCatalog {
    entries: HashMap<String, Arc<dyn Provider>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        ModelCatalog::default()
    }

    /// Catalog of HTTP adapters for the supported model set.
    pub fn http_defaults(base_url: &str, api_key: &str) -> Self {
        let mut catalog = ModelCatalog::new();
        for model in [DEFAULT_IMAGE_MODEL, "flux-dev", "sdxl"] {
            catalog.register(
                model,
                Arc::new(ImageGenClient::with_base_url(model, api_key, base_url)),
            );
        }
        for model in [DEFAULT_VIDEO_MODEL, "kling-2.1", "seedance-1"] {
            catalog.register(
                model,
                Arc::new(VideoGenClient::with_base_url(model, api_key, base_url)),
            );
        }
        catalog
    }

    pub fn register(&mut self, model: impl Into<String>, provider: Arc<dyn Provider>) {
        self.entries.insert(model.into(), provider);
    }

    pub fn provider(&self, model: &str) -> Option<Arc<dyn Provider>> {
        self.entries.get(model).cloned()
    }

    pub fn capability(&self, model: &str) -> Option<MediaKind> {
        self.entries.get(model).map(|p| p.kind())
    }

    /// Sorted `(model, capability)` listing.
    pub fn models(&self) -> Vec<(String, MediaKind)> {
        let mut models: Vec<_> = self
            .entries
            .iter()
            .map(|(id, p)| (id.clone(), p.kind()))
            .collect();
        models.sort_by(|a, b| a.0.cmp(&b.0));
        models
    }

    /// Auto-correct an incompatible selected model when switching authoring
    /// surfaces: the video surface forces `veo-3` for non-video models and
    /// the image surface forces `gemini-2.5-flash-image` for video models.
    pub fn coerce_for_surface(&self, surface: MediaKind, current: &str) -> String {
        match self.capability(current) {
            Some(kind) if kind == surface => current.to_string(),
            _ => match surface {
                MediaKind::Image => DEFAULT_IMAGE_MODEL.to_string(),
                MediaKind::Video => DEFAULT_VIDEO_MODEL.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticProvider;

    fn catalog() -> ModelCatalog {
        let mut catalog = ModelCatalog::new();
        catalog.register(DEFAULT_IMAGE_MODEL, Arc::new(StaticProvider::image()));
        catalog.register("sdxl", Arc::new(StaticProvider::image()));
        catalog.register(DEFAULT_VIDEO_MODEL, Arc::new(StaticProvider::video()));
        catalog
    }

    #[test]
    fn lookup_is_by_exact_model_id() {
        let catalog = catalog();
        assert!(catalog.provider("sdxl").is_some());
        assert!(catalog.provider("sdxl-turbo").is_none());
        assert_eq!(catalog.capability(DEFAULT_VIDEO_MODEL), Some(MediaKind::Video));
    }

    #[test]
    fn video_surface_forces_default_video_model() {
        let catalog = catalog();
        assert_eq!(catalog.coerce_for_surface(MediaKind::Video, "sdxl"), DEFAULT_VIDEO_MODEL);
        assert_eq!(
            catalog.coerce_for_surface(MediaKind::Video, DEFAULT_VIDEO_MODEL),
            DEFAULT_VIDEO_MODEL
        );
    }

    #[test]
    fn image_surface_forces_default_image_model() {
        let catalog = catalog();
        assert_eq!(
            catalog.coerce_for_surface(MediaKind::Image, DEFAULT_VIDEO_MODEL),
            DEFAULT_IMAGE_MODEL
        );
        assert_eq!(catalog.coerce_for_surface(MediaKind::Image, "sdxl"), "sdxl");
    }

    #[test]
    fn unknown_model_coerces_to_surface_default() {
        let catalog = catalog();
        assert_eq!(catalog.coerce_for_surface(MediaKind::Image, "no-such"), DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn request_serializes_camel_case_with_flattened_extra() {
        let mut request = GenerationRequest::prompt("a cat");
        request.aspect_ratio = Some("16:9".into());
        request
            .extra
            .insert("negativePrompt".into(), serde_json::json!("blurry"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "a cat");
        assert_eq!(json["aspectRatio"], "16:9");
        assert_eq!(json["negativePrompt"], "blurry");
        assert!(json.get("avatarId").is_none());
    }
}
