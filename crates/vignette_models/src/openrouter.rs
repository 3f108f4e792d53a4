//! OpenRouter API client (chat completions + embeddings).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vignette_core::{ChatMessage, ChatRequest};
use vignette_error::{HttpError, ModelError, VignetteResult};
use vignette_interface::{EmbeddingModel, TextModel};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_EMBED_MODEL: &str = "openai/text-embedding-3-small";

/// Client for the OpenRouter API.
///
/// One client serves both the chat completion contract (`TextModel`) and
/// the embedding contract (`EmbeddingModel`); OpenRouter routes both behind
/// the same key.
///
/// # Examples
///
/// ```no_run
/// use vignette_models::OpenRouterClient;
///
/// let client = OpenRouterClient::new("sk-or-...", "anthropic/claude-sonnet-4.5");
/// ```
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    embed_model: String,
}

impl OpenRouterClient {
    /// Create a client for the given chat model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }

    /// Override the base URL (local proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the embedding model identifier.
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> VignetteResult<R> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::new(format!(
                "OpenRouter {path} returned {status}: {body}"
            )))?;
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ModelError::new(format!("malformed OpenRouter response: {e}")).into())
    }
}

#[async_trait]
impl TextModel for OpenRouterClient {
    #[tracing::instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> VignetteResult<String> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let parsed: CompletionResponse = self.post_json("/chat/completions", &body).await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::new("no choices in completion response"))?;

        tracing::debug!(chars = choice.message.content.len(), "Completion received");
        Ok(choice.message.content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingModel for OpenRouterClient {
    #[tracing::instrument(skip(self, text), fields(model = %self.embed_model, chars = text.len()))]
    async fn embed(&self, text: &str) -> VignetteResult<Vec<f32>> {
        let body = EmbeddingBody {
            model: &self.embed_model,
            input: text,
        };

        let parsed: EmbeddingResponse = self.post_json("/embeddings", &body).await?;
        let entry = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::new("no data in embedding response"))?;

        Ok(entry.embedding)
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
}
