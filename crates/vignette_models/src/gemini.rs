//! Google Gemini image-synthesis client.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use vignette_error::{ImageError, ImageErrorKind, VignetteResult};
use vignette_interface::ImageSynthesizer;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Which image model to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiImageModel {
    /// Higher quality, slower
    Pro,
    /// Faster, lower quality
    Flash,
}

impl GeminiImageModel {
    fn model_id(&self) -> &'static str {
        match self {
            GeminiImageModel::Pro => "gemini-3-pro-image-preview",
            GeminiImageModel::Flash => "gemini-2.5-flash-image",
        }
    }
}

/// Client for Gemini `generateContent` image synthesis.
///
/// Supports an optional reference image sent as an inline part, which the
/// acquisition layer uses for visual continuity across a carousel. A 200
/// response that carries no inline image part is a *soft* failure and maps
/// to `Ok(None)`; transport and HTTP errors are hard errors.
pub struct GeminiImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: GeminiImageModel,
}

impl GeminiImageClient {
    /// Create a client.
    pub fn new(api_key: impl Into<String>, model: GeminiImageModel) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    /// Override the base URL (local proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn reference_part(reference_image: &[u8]) -> Part {
        // JPEG magic bytes; everything else the synthesizer returns is PNG
        let mime_type = if reference_image.starts_with(&[0xff, 0xd8, 0xff]) {
            "image/jpeg"
        } else {
            "image/png"
        };
        Part::Inline {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(reference_image),
            },
        }
    }
}

#[async_trait]
impl ImageSynthesizer for GeminiImageClient {
    #[tracing::instrument(skip(self, prompt, reference_image), fields(model = self.model.model_id(), has_reference = reference_image.is_some()))]
    async fn generate(
        &self,
        prompt: &str,
        reference_image: Option<&[u8]>,
    ) -> VignetteResult<Option<Vec<u8>>> {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(reference) = reference_image {
            parts.push(Self::reference_part(reference));
            tracing::debug!("Attaching reference image for visual continuity");
        }

        let body = GenerateBody {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.model_id()
        );
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageError::new(ImageErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::new(ImageErrorKind::HttpError {
                status_code: status.as_u16(),
                message: body,
            }))?;
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ImageError::new(ImageErrorKind::ApiRequest(e.to_string())))?;

        // A well-formed response without an image part means the service
        // declined (safety filter or refusal); the caller decides severity.
        let Some(encoded) = parsed.first_image() else {
            tracing::warn!("No inline image data in synthesis response");
            return Ok(None);
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ImageError::new(ImageErrorKind::Base64Decode(e.to_string())))?;
        tracing::debug!(bytes = bytes.len(), "Image synthesized");
        Ok(Some(bytes))
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct GenerateBody {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_image(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| match part {
                Part::Inline { inline_data } => Some(inline_data.data.as_str()),
                Part::Text { .. } => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_inline_image() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                    ]
                }
            }]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.first_image(), Some("aGVsbG8="));
    }

    #[test]
    fn text_only_response_has_no_image() {
        let raw = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "cannot comply"}]}}]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.first_image(), None);
    }
}
