//! Pexels stock photo client.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use vignette_error::{StockError, StockErrorKind, VignetteResult};
use vignette_interface::{Orientation, StockPhoto, StockPhotoProvider};

const DEFAULT_BASE_URL: &str = "https://api.pexels.com/v1";

/// The provider's hard page-size cap.
const PAGE_MAX: usize = 80;

/// Client for the Pexels search API.
///
/// # Examples
///
/// ```no_run
/// use vignette_models::PexelsClient;
///
/// let client = PexelsClient::new("563492ad...");
/// ```
pub struct PexelsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PexelsClient {
    /// Create a client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (local proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl StockPhotoProvider for PexelsClient {
    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        per_page: usize,
        orientation: Orientation,
    ) -> VignetteResult<Vec<StockPhoto>> {
        let per_page = per_page.min(PAGE_MAX);
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", &per_page.to_string()),
                ("orientation", orientation.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StockError::new(StockErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::new(StockErrorKind::HttpError {
                status_code: status.as_u16(),
                message: body,
            }))?;
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| StockError::new(StockErrorKind::ApiRequest(e.to_string())))?;

        tracing::debug!(results = parsed.photos.len(), "Search complete");
        Ok(parsed.photos.into_iter().map(PexelsPhoto::into_stock).collect())
    }

    #[tracing::instrument(skip(self, photo), fields(id = photo.id))]
    async fn download(&self, photo: &StockPhoto, size: &str) -> VignetteResult<Vec<u8>> {
        let url = photo.sources.get(size).ok_or_else(|| {
            StockError::new(StockErrorKind::MissingSize {
                id: photo.id,
                size: size.to_string(),
            })
        })?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StockError::new(StockErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockError::new(StockErrorKind::HttpError {
                status_code: status.as_u16(),
                message: format!("downloading photo {}", photo.id),
            }))?;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StockError::new(StockErrorKind::ApiRequest(e.to_string())))?;
        Ok(bytes.to_vec())
    }

    fn max_page_size(&self) -> usize {
        PAGE_MAX
    }
}

// --- Wire types ---

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Deserialize)]
struct PexelsPhoto {
    id: u64,
    #[serde(default)]
    photographer: String,
    #[serde(default)]
    src: HashMap<String, String>,
}

impl PexelsPhoto {
    fn into_stock(self) -> StockPhoto {
        StockPhoto {
            id: self.id,
            photographer: self.photographer,
            sources: self.src,
        }
    }
}
