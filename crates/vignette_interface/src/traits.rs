//! Trait definitions for the consumed service contracts.

use crate::{Orientation, StockPhoto};
use async_trait::async_trait;
use vignette_core::ChatRequest;
use vignette_error::VignetteResult;

/// Chat completion service.
///
/// Errors carry no structured retry metadata; retry policy lives solely in
/// the orchestrator's hook-quality loop.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a plain-text completion.
    async fn complete(&self, request: &ChatRequest) -> VignetteResult<String>;

    /// Model identifier, for logs and artifact metadata.
    fn model_name(&self) -> &str;
}

/// Embedding service.
///
/// Must be deterministic for identical input; the scorer caches on exact
/// text match.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> VignetteResult<Vec<f32>>;
}

/// Image-synthesis service.
///
/// `Ok(None)` signals a soft failure (service declined / safety filter);
/// the acquisition layer treats it as a hard failure for that slide.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Generate image bytes from a prompt, optionally conditioned on a
    /// reference image for lighting/palette/style continuity.
    async fn generate(
        &self,
        prompt: &str,
        reference_image: Option<&[u8]>,
    ) -> VignetteResult<Option<Vec<u8>>>;
}

/// Stock photo search-and-download service.
#[async_trait]
pub trait StockPhotoProvider: Send + Sync {
    /// Search for photos. `per_page` is clamped to the provider's page
    /// maximum by the implementation.
    async fn search(
        &self,
        query: &str,
        per_page: usize,
        orientation: Orientation,
    ) -> VignetteResult<Vec<StockPhoto>>;

    /// Download one photo at the given size key.
    async fn download(&self, photo: &StockPhoto, size: &str) -> VignetteResult<Vec<u8>>;

    /// The provider's maximum page size for `search`.
    fn max_page_size(&self) -> usize {
        80
    }
}
