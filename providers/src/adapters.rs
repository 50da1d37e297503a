//! HTTP adapters for the hosted generation backends.

use async_trait::async_trait;
use gallery::MediaKind;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tokio::time::{sleep, Duration};

use crate::{GenerationOutput, GenerationRequest, ProgressSender, Provider, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.genstudio.app";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    url: String,
    job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartJobResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    state: String,
    progress: Option<u8>,
    url: Option<String>,
    error: Option<String>,
}

/// Synchronous still-content provider: one POST resolves to the finished
/// asset.
pub struct ImageGenClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ImageGenClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom API base URL. Mainly used for testing.
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        ImageGenClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Provider for ImageGenClient {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, request, _progress)))]
    async fn generate(
        &self,
        request: &GenerationRequest,
        _progress: Option<ProgressSender>,
    ) -> Result<GenerationOutput, ProviderError> {
        let url = format!("{}/v1/models/{}:generate", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(error_text));
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;

        Ok(GenerationOutput {
            url: generated.url,
            job_id: generated.job_id,
            kind: MediaKind::Image,
        })
    }
}

/// Job-polling video provider: one POST starts a backend job, then status
/// polls report incremental progress until the job resolves.
pub struct VideoGenClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    poll_interval: Duration,
}

impl VideoGenClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        VideoGenClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn start_job(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/models/{}:generate", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(error_text));
        }

        let started = response
            .json::<StartJobResponse>()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;
        Ok(started.job_id)
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobStatusResponse, ProviderError> {
        let url = format!("{}/v1/jobs/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(error_text));
        }

        response
            .json::<JobStatusResponse>()
            .await
            .map_err(|e| ProviderError::RequestError(e.to_string()))
    }
}

#[async_trait]
impl Provider for VideoGenClient {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, request, progress)))]
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: Option<ProgressSender>,
    ) -> Result<GenerationOutput, ProviderError> {
        let job_id = self.start_job(request).await?;
        tracing::debug!(model = %self.model, %job_id, "video job started");

        loop {
            let status = self.poll_job(&job_id).await?;
            if let (Some(tx), Some(percent)) = (&progress, status.progress) {
                // Receiver may be gone if the caller stopped listening.
                let _ = tx.send(percent.min(100));
            }
            match status.state.as_str() {
                "succeeded" => {
                    let url = status.url.ok_or_else(|| {
                        ProviderError::ApiError("job succeeded without a result url".into())
                    })?;
                    return Ok(GenerationOutput { url, job_id, kind: MediaKind::Video });
                }
                "failed" => {
                    let reason = status.error.unwrap_or_else(|| "unspecified failure".into());
                    return Err(ProviderError::ApiError(reason));
                }
                _ => sleep(self.poll_interval).await,
            }
        }
    }
}
