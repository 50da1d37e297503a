//! In-process providers for tests and offline runs.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use gallery::MediaKind;
use tokio::time::{sleep, Duration};

use crate::{GenerationOutput, GenerationRequest, ProgressSender, Provider, ProviderError};

/// Provider resolving to a canned asset after an optional delay, with
/// unique job ids per call. Configurable to fail or to emit backend
/// progress first, so job lifecycles can be driven deterministically.
pub struct StaticProvider {
    kind: MediaKind,
    delay: Duration,
    fail: Option<String>,
    backend_progress: Vec<u8>,
}

/// Process-global so distinct provider instances never emit colliding
/// job ids; gallery identity dedup keys on the job id.
static NEXT_JOB: AtomicU64 = AtomicU64::new(0);

impl StaticProvider {
    pub fn image() -> Self {
        StaticProvider {
            kind: MediaKind::Image,
            delay: Duration::ZERO,
            fail: None,
            backend_progress: Vec::new(),
        }
    }

    pub fn video() -> Self {
        StaticProvider { kind: MediaKind::Video, ..Self::image() }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail = Some(message.into());
        self
    }

    pub fn with_backend_progress(mut self, steps: Vec<u8>) -> Self {
        self.backend_progress = steps;
        self
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: Option<ProgressSender>,
    ) -> Result<GenerationOutput, ProviderError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if let Some(tx) = &progress {
            for step in &self.backend_progress {
                let _ = tx.send(*step);
            }
        }
        if let Some(message) = &self.fail {
            return Err(ProviderError::ApiError(message.clone()));
        }
        let n = NEXT_JOB.fetch_add(1, Ordering::SeqCst);
        let extension = match self.kind {
            MediaKind::Image => "png",
            MediaKind::Video => "mp4",
        };
        let slug = request
            .prompt
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect::<String>();
        Ok(GenerationOutput {
            url: format!("https://cdn.test/{slug}-{n}.{extension}"),
            job_id: format!("{}-job-{n}", self.kind),
            kind: self.kind,
        })
    }
}
