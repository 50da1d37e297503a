//! Prompt-composition surface state: selected model + authoring surface.

use std::sync::Arc;

use gallery::MediaKind;
use providers::ModelCatalog;

use crate::SessionError;

/// Tracks which authoring surface is active and which model is selected,
/// auto-correcting incompatible combinations on surface switches.
pub struct Composer {
    catalog: Arc<ModelCatalog>,
    surface: MediaKind,
    model: String,
}

impl Composer {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Composer {
            catalog,
            surface: MediaKind::Image,
            model: providers::DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    pub fn surface(&self) -> MediaKind {
        self.surface
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), SessionError> {
        if self.catalog.provider(model).is_none() {
            return Err(SessionError::UnknownModel(model.to_string()));
        }
        self.model = model.to_string();
        Ok(())
    }

    /// Switch authoring surface; an incompatible selected model is
    /// replaced with the surface default.
    pub fn set_surface(&mut self, surface: MediaKind) {
        let coerced = self.catalog.coerce_for_surface(surface, &self.model);
        if coerced != self.model {
            tracing::debug!(from = %self.model, to = %coerced, "model coerced on surface switch");
            self.model = coerced;
        }
        self.surface = surface;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::testing::StaticProvider;
    use providers::{DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};

    fn composer() -> Composer {
        let mut catalog = ModelCatalog::new();
        catalog.register(DEFAULT_IMAGE_MODEL, Arc::new(StaticProvider::image()));
        catalog.register("sdxl", Arc::new(StaticProvider::image()));
        catalog.register(DEFAULT_VIDEO_MODEL, Arc::new(StaticProvider::video()));
        Composer::new(Arc::new(catalog))
    }

    #[test]
    fn video_surface_with_image_model_selects_veo_3() {
        let mut composer = composer();
        composer.set_model("sdxl").unwrap();
        composer.set_surface(MediaKind::Video);
        assert_eq!(composer.model(), DEFAULT_VIDEO_MODEL);

        composer.set_surface(MediaKind::Image);
        assert_eq!(composer.model(), DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn compatible_model_survives_surface_switch() {
        let mut composer = composer();
        composer.set_model("sdxl").unwrap();
        composer.set_surface(MediaKind::Image);
        assert_eq!(composer.model(), "sdxl");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut composer = composer();
        assert!(matches!(
            composer.set_model("nope"),
            Err(SessionError::UnknownModel(m)) if m == "nope"
        ));
        assert_eq!(composer.model(), DEFAULT_IMAGE_MODEL);
    }
}
