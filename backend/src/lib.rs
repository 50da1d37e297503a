//! Backing gallery-store client.
//!
//! The remote store hydrates the gallery on load and persists mutations.
//! Every call is fallible; callers reconcile optimistic local state against
//! the result rather than trusting it blindly.

pub mod testing;

use async_trait::async_trait;
use gallery::{GalleryItem, ItemPatch};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Gallery API Error: {0}")]
    ApiError(String),
    #[error("Other Error: {0}")]
    Other(String),
}

/// Contract for the persistent gallery collaborator.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Full listing used to hydrate the local store.
    async fn fetch_gallery(&self) -> Result<Vec<GalleryItem>, BackendError>;

    /// `Ok(false)` means the backend refused the delete (e.g. unknown or
    /// not owned); transport failures are `Err`.
    async fn delete_item(&self, id: &str) -> Result<bool, BackendError>;

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchGalleryResponse {
    items: Option<Vec<GalleryItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteItemResponse {
    deleted: bool,
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        HttpBackend {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl BackingStore for HttpBackend {
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    async fn fetch_gallery(&self) -> Result<Vec<GalleryItem>, BackendError> {
        let url = format!("{}/v1/gallery", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| BackendError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::ApiError(error_text));
        }

        let listing = response
            .json::<FetchGalleryResponse>()
            .await
            .map_err(|e| BackendError::RequestError(e.to_string()))?;
        Ok(listing.items.unwrap_or_default())
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    async fn delete_item(&self, id: &str) -> Result<bool, BackendError> {
        let url = format!("{}/v1/gallery/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| BackendError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::ApiError(error_text));
        }

        let result = response
            .json::<DeleteItemResponse>()
            .await
            .map_err(|e| BackendError::RequestError(e.to_string()))?;
        Ok(result.deleted)
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, patch)))]
    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), BackendError> {
        let url = format!("{}/v1/gallery/{}", self.base_url, id);
        let response = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .json(patch)
            .send()
            .await
            .map_err(|e| BackendError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::ApiError(error_text));
        }
        Ok(())
    }
}
