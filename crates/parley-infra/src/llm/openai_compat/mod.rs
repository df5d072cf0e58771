//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and any endpoint that
//! speaks the Chat Completions protocol (local servers, gateways) via a
//! configurable base URL. Images travel as `image_url` parts holding a
//! base64 data URL.

pub mod config;
pub mod types;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::{Conversation, LlmProvider};
use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage, ProviderCapabilities};

use self::config::OpenAiCompatConfig;
use self::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
    MessageContent, ModelEntry, ModelList,
};
use crate::llm::http::{build_client, error_from_response, transport_error};

/// Model id fragments of non-chat models on OpenAI-style listings.
const NON_CHAT_MARKERS: &[&str] = &["embedding", "whisper", "tts", "dall-e", "moderation"];

struct Endpoint {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl Endpoint {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Unified provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key.
/// Same pattern as [`crate::llm::gemini::GeminiProvider`].
pub struct OpenAiCompatibleProvider {
    endpoint: Arc<Endpoint>,
    provider_name: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let endpoint = Endpoint {
            client: build_client(config.timeout_secs)?,
            api_key: config.api_key,
            base_url: config.base_url,
            model: config.model,
        };
        Ok(Self {
            endpoint: Arc::new(endpoint),
            provider_name: config.provider_name,
            capabilities: config.capabilities,
        })
    }

    /// Create an OpenAI provider.
    ///
    /// Uses `https://api.openai.com/v1` as the base URL.
    pub fn openai(api_key: SecretString, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::new(config::openai_defaults(api_key, model, timeout_secs))
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    type Conversation = OpenAiConversation;

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.endpoint.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn start_conversation(&self) -> OpenAiConversation {
        OpenAiConversation {
            endpoint: Arc::clone(&self.endpoint),
            history: Vec::new(),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .endpoint
            .client
            .get(self.endpoint.url("models"))
            .bearer_auth(self.endpoint.api_key.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse model list: {e}")))?;
        Ok(list.data.into_iter().map(model_info).collect())
    }
}

/// One chat's message history against a Chat Completions endpoint.
pub struct OpenAiConversation {
    endpoint: Arc<Endpoint>,
    history: Vec<ChatMessage>,
}

impl OpenAiConversation {
    /// Number of committed history entries (two per successful exchange).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Conversation for OpenAiConversation {
    async fn send(&mut self, message: &OutgoingMessage) -> Result<String, LlmError> {
        let user = user_message(message);
        let mut messages = self.history.clone();
        messages.push(user.clone());
        let body = ChatCompletionRequest {
            model: self.endpoint.model.clone(),
            messages,
        };

        let response = self
            .endpoint
            .client
            .post(self.endpoint.url("chat/completions"))
            .bearer_auth(self.endpoint.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;
        let reply = reply_text(parsed)?;

        self.history.push(user);
        self.history.push(ChatMessage {
            role: "assistant".to_string(),
            content: MessageContent::Text(reply.clone()),
        });
        Ok(reply)
    }

    fn release(&mut self) {
        self.history.clear();
    }
}

/// Text-only messages use plain string content; with an image, a part array.
fn user_message(message: &OutgoingMessage) -> ChatMessage {
    let content = match &message.image {
        None => MessageContent::Text(message.text.clone()),
        Some(image) => {
            let url = format!(
                "data:{};base64,{}",
                image.media_type,
                STANDARD.encode(&image.data)
            );
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: message.text.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url },
                },
            ])
        }
    };
    ChatMessage {
        role: "user".to_string(),
        content,
    }
}

fn reply_text(response: ChatCompletionResponse) -> Result<String, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Provider {
            message: "response contained no choices".to_string(),
        })?;

    let message = choice.message;
    if let Some(refusal) = message.as_ref().and_then(|m| m.refusal.clone()) {
        return Err(LlmError::Blocked(refusal));
    }
    match message.and_then(|m| m.content).filter(|c| !c.is_empty()) {
        Some(content) => Ok(content),
        None => Err(LlmError::Blocked(
            choice
                .finish_reason
                .unwrap_or_else(|| "empty response".to_string()),
        )),
    }
}

fn model_info(entry: ModelEntry) -> ModelInfo {
    let supports_chat = !NON_CHAT_MARKERS.iter().any(|m| entry.id.contains(m));
    ModelInfo {
        display_name: entry.owned_by.map(|owner| format!("{} ({owner})", entry.id)),
        name: entry.id,
        supports_chat,
    }
}
