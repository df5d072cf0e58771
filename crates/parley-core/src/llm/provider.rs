//! LlmProvider and Conversation trait definitions.
//!
//! A provider hands out conversations; a conversation is the provider-side
//! context of one chat. The chat layer never replays its own transcript to
//! the model -- the conversation remembers prior turns itself.

use std::future::Future;

use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage, ProviderCapabilities};

/// Provider-side context for a single chat.
///
/// Owned by the chat that created it and released exactly once when that
/// chat is deleted. Implementations commit an exchange to their history only
/// when `send` succeeds, so a failed call leaves the context unchanged.
pub trait Conversation: Send + 'static {
    /// Send one user message and return the model's reply text.
    fn send(
        &mut self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Tear down provider-side state held for this conversation.
    fn release(&mut self);
}

/// Trait for LLM provider backends (Gemini, OpenAI-compatible, etc.).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Conversation type handed out by `start_conversation`.
    type Conversation: Conversation;

    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier every conversation talks to.
    fn model(&self) -> &str;

    /// What this provider supports.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Start a fresh conversation with empty history.
    fn start_conversation(&self) -> Self::Conversation;

    /// List the models visible to the configured credentials.
    fn list_models(&self) -> impl Future<Output = Result<Vec<ModelInfo>, LlmError>> + Send;
}
