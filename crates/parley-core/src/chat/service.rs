//! Chat service: session lifecycle plus the turn processor.
//!
//! ChatService owns the chat store and the provider. Creating a chat starts
//! a provider-side conversation; deleting it releases that conversation.
//! Sending a message records the user turn, calls the model through the
//! chat's conversation, and records the reply.

use tracing::{Instrument, info, info_span, warn};

use parley_observe::genai_attrs::{OP_CHAT, OP_LIST_MODELS, system_for_provider};
use parley_types::chat::{ChatId, ChatSummary, Turn};
use parley_types::config::ChatConfig;
use parley_types::error::ChatError;
use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage};

use crate::llm::box_provider::BoxLlmProvider;

use super::attachment::{self, AttachmentError, Upload};
use super::session::{ChatRecord, TitlePolicy};
use super::store::ChatStore;

/// Why a turn produced no reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Provider(#[from] LlmError),
}

/// Result of a turn on an existing chat.
///
/// A failed model call is not an error of `send_message`: the chat exists and
/// the caller still gets the current title. How to render `reply` is up to
/// the caller.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Chat title after the turn.
    pub title: String,
    pub reply: Result<String, TurnError>,
}

impl TurnOutcome {
    /// Reply text with failures rendered as `"{error_prefix}{error}"`.
    pub fn reply_text(&self, error_prefix: &str) -> String {
        match &self.reply {
            Ok(text) => text.clone(),
            Err(err) => format!("{error_prefix}{err}"),
        }
    }
}

/// Orchestrates chat lifecycle and turns against one provider.
pub struct ChatService {
    store: ChatStore,
    provider: BoxLlmProvider,
    default_title: String,
    title_policy: TitlePolicy,
}

impl ChatService {
    /// Create a chat service with an empty store.
    pub fn new(provider: BoxLlmProvider, config: &ChatConfig) -> Self {
        Self {
            store: ChatStore::new(),
            provider,
            default_title: config.default_title.clone(),
            title_policy: TitlePolicy::from(config),
        }
    }

    /// Access the chat store.
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Access the provider.
    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    // --- Session lifecycle ---

    /// Create a chat with the default title and a fresh conversation.
    pub fn create_chat(&self) -> ChatSummary {
        let conversation = self.provider.start_conversation();
        let id = self
            .store
            .insert(ChatRecord::new(self.default_title.clone()), conversation);
        info!(chat_id = %id, provider = self.provider.name(), "Chat created");
        ChatSummary {
            id,
            title: self.default_title.clone(),
        }
    }

    /// List all chats.
    pub async fn list_chats(&self) -> Vec<ChatSummary> {
        self.store.list().await
    }

    /// Get a chat's transcript.
    pub async fn transcript(&self, id: &ChatId) -> Result<Vec<Turn>, ChatError> {
        self.store.transcript(id).await
    }

    /// Delete a chat and release its conversation.
    pub async fn delete_chat(&self, id: &ChatId) -> Result<(), ChatError> {
        self.store.remove(id).await?;
        info!(chat_id = %id, "Chat deleted");
        Ok(())
    }

    // --- Turns ---

    /// Send a user message (and optional upload) on a chat.
    ///
    /// Fails only with `NotFound`. An upload that is not an image yields a
    /// failed outcome before anything is recorded. Otherwise the user turn is
    /// recorded before the model is called, and the assistant turn only when
    /// the call succeeds.
    pub async fn send_message(
        &self,
        id: &ChatId,
        text: String,
        upload: Option<Upload>,
    ) -> Result<TurnOutcome, ChatError> {
        let slot = self.store.get(id).ok_or(ChatError::NotFound(*id))?;

        let mut turn_guard = slot.conversation().lock().await;
        let Some(conversation) = turn_guard.as_mut() else {
            // Deleted while this turn was waiting for the lock.
            return Err(ChatError::NotFound(*id));
        };

        let prepared = match upload.map(attachment::prepare).transpose() {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(chat_id = %id, error = %err, "Rejected attachment");
                let title = slot.record().read().await.title().to_string();
                return Ok(TurnOutcome {
                    title,
                    reply: Err(err.into()),
                });
            }
        };
        let (image, stored) = match prepared {
            Some(prepared) => (Some(prepared.image), Some(prepared.stored)),
            None => (None, None),
        };

        let title = {
            let mut record = slot.record().write().await;
            record.push_user_turn(text.clone(), stored);
            record.refresh_title(&text, &self.title_policy);
            record.title().to_string()
        };

        let message = OutgoingMessage { text, image };
        let span = info_span!(
            "gen_ai.chat",
            gen_ai.operation.name = OP_CHAT,
            gen_ai.system = system_for_provider(self.provider.name()),
            gen_ai.request.model = self.provider.model(),
            chat_id = %id,
            has_image = message.image.is_some(),
        );

        match conversation.send(&message).instrument(span).await {
            Ok(reply) => {
                slot.record().write().await.push_assistant_turn(reply.clone());
                info!(chat_id = %id, reply_chars = reply.chars().count(), "Turn completed");
                Ok(TurnOutcome {
                    title,
                    reply: Ok(reply),
                })
            }
            Err(err) => {
                warn!(chat_id = %id, error = %err, "Model call failed; reporting as reply");
                Ok(TurnOutcome {
                    title,
                    reply: Err(err.into()),
                })
            }
        }
    }

    // --- Models ---

    /// List models visible to the provider credentials.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let span = info_span!(
            "gen_ai.list_models",
            gen_ai.operation.name = OP_LIST_MODELS,
            gen_ai.system = system_for_provider(self.provider.name()),
        );
        self.provider.list_models().instrument(span).await
    }
}
