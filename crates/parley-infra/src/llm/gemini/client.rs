//! GeminiProvider -- concrete [`LlmProvider`] for the Gemini REST API.
//!
//! Each [`GeminiConversation`] keeps its own `contents` history and sends it
//! in full with every `generateContent` call. An exchange joins the history
//! only after the model answered.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when setting the `x-goog-api-key` header.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::{Conversation, LlmProvider};
use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage, ProviderCapabilities};

use super::types::{
    Content, GeminiModel, GenerateContentRequest, GenerateContentResponse, ListModelsResponse,
    Part, ROLE_MODEL, ROLE_USER,
};
use crate::llm::http::{build_client, error_from_response, transport_error};

/// Generation method a model must support to be usable for chat.
const GENERATE_CONTENT: &str = "generateContent";

/// Page size requested when listing models.
const MODELS_PAGE_SIZE: u32 = 1000;

/// Connection details shared by the provider and all its conversations.
struct Endpoint {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    /// Resource path of the model, e.g. "models/gemini-1.5-flash".
    model_path: String,
}

impl Endpoint {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Google Gemini provider.
///
/// Does NOT derive Debug: the endpoint holds the API key.
pub struct GeminiProvider {
    endpoint: Arc<Endpoint>,
    model: String,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    /// Public Generative Language API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Create a new Gemini provider.
    ///
    /// `model` may be given with or without the `models/` prefix.
    pub fn new(api_key: SecretString, model: String, timeout_secs: u64) -> Result<Self, LlmError> {
        let model = model.trim_start_matches("models/").to_string();
        let endpoint = Endpoint {
            client: build_client(timeout_secs)?,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model_path: format!("models/{model}"),
        };

        Ok(Self {
            endpoint: Arc::new(endpoint),
            capabilities: Self::capabilities_for_model(&model),
            model,
        })
    }

    /// Override the base URL (proxies, regional endpoints).
    ///
    /// Call before starting any conversation.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        if let Some(endpoint) = Arc::get_mut(&mut self.endpoint) {
            endpoint.base_url = base_url;
        }
        self
    }

    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        if model.contains("1.5-pro") || model.contains("2.5") {
            ProviderCapabilities {
                vision: true,
                max_context_tokens: 2_097_152,
                max_output_tokens: 65_536,
            }
        } else {
            ProviderCapabilities {
                vision: true,
                max_context_tokens: 1_048_576,
                max_output_tokens: 8_192,
            }
        }
    }

    async fn fetch_models_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListModelsResponse, LlmError> {
        let mut request = self
            .endpoint
            .client
            .get(self.endpoint.url("models"))
            .header("x-goog-api-key", self.endpoint.api_key.expose_secret())
            .query(&[("pageSize", MODELS_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse model list: {e}")))
    }
}

impl LlmProvider for GeminiProvider {
    type Conversation = GeminiConversation;

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn start_conversation(&self) -> GeminiConversation {
        GeminiConversation {
            endpoint: Arc::clone(&self.endpoint),
            history: Vec::new(),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.fetch_models_page(page_token.as_deref()).await?;
            models.extend(page.models.into_iter().map(model_info));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        tracing::debug!(count = models.len(), "listed gemini models");
        Ok(models)
    }
}

/// One chat's history with Gemini.
pub struct GeminiConversation {
    endpoint: Arc<Endpoint>,
    history: Vec<Content>,
}

impl GeminiConversation {
    /// Number of committed history entries (two per successful exchange).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Conversation for GeminiConversation {
    async fn send(&mut self, message: &OutgoingMessage) -> Result<String, LlmError> {
        let user = user_content(message);
        let mut contents = self.history.clone();
        contents.push(user.clone());
        let body = GenerateContentRequest { contents };

        let url = self
            .endpoint
            .url(&format!("{}:generateContent", self.endpoint.model_path));
        let response = self
            .endpoint
            .client
            .post(&url)
            .header("x-goog-api-key", self.endpoint.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;
        let reply = reply_text(parsed)?;

        self.history.push(user);
        self.history.push(Content {
            role: ROLE_MODEL.to_string(),
            parts: vec![Part::text(reply.clone())],
        });
        Ok(reply)
    }

    fn release(&mut self) {
        // Gemini keeps no server-side session; dropping the history is all there is.
        self.history.clear();
    }
}

/// Build the user content for a message: text first, then the image.
fn user_content(message: &OutgoingMessage) -> Content {
    let mut parts = Vec::with_capacity(2);
    if !message.text.is_empty() || message.image.is_none() {
        parts.push(Part::text(message.text.clone()));
    }
    if let Some(image) = &message.image {
        parts.push(Part::inline(image.media_type.clone(), STANDARD.encode(&image.data)));
    }
    Content {
        role: ROLE_USER.to_string(),
        parts,
    }
}

/// Concatenated text of the first candidate.
///
/// No candidates, or a candidate without text, means the reply was blocked
/// or cut off; the block or finish reason becomes the error.
fn reply_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(LlmError::Blocked(reason));
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty response".to_string());
        return Err(LlmError::Blocked(reason));
    }
    Ok(text)
}

fn model_info(model: GeminiModel) -> ModelInfo {
    let supports_chat = model
        .supported_generation_methods
        .iter()
        .any(|m| m == GENERATE_CONTENT);
    ModelInfo {
        name: model.name,
        display_name: model.display_name,
        supports_chat,
    }
}
