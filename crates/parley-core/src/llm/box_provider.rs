//! BoxLlmProvider and BoxConversation -- object-safe dynamic dispatch wrappers.
//!
//! Same blanket-impl pattern for both traits:
//! 1. Define an object-safe `*Dyn` trait with boxed futures
//! 2. Blanket-impl it for every implementor of the RPITIT trait
//! 3. A `Box*` struct wraps `Box<dyn *Dyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage, ProviderCapabilities};

use super::provider::{Conversation, LlmProvider};

/// Object-safe version of [`Conversation`] with boxed futures.
pub trait ConversationDyn: Send {
    fn send_boxed<'a>(
        &'a mut self,
        message: &'a OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

    fn release_dyn(&mut self);
}

impl<T: Conversation> ConversationDyn for T {
    fn send_boxed<'a>(
        &'a mut self,
        message: &'a OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.send(message))
    }

    fn release_dyn(&mut self) {
        Conversation::release(self)
    }
}

/// Type-erased provider-side conversation.
///
/// An owned resource: `release` consumes the handle, so a released
/// conversation can never be sent to again.
pub struct BoxConversation {
    inner: Box<dyn ConversationDyn>,
}

impl BoxConversation {
    /// Wrap a concrete `Conversation`.
    pub fn new<T: Conversation>(conversation: T) -> Self {
        Self {
            inner: Box::new(conversation),
        }
    }

    /// Send one user message and return the reply text.
    pub async fn send(&mut self, message: &OutgoingMessage) -> Result<String, LlmError> {
        self.inner.send_boxed(message).await
    }

    /// Release provider-side state and drop the handle.
    pub fn release(mut self) {
        self.inner.release_dyn();
    }
}

/// Object-safe version of [`LlmProvider`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn LlmProviderDyn`).
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn start_conversation_boxed(&self) -> BoxConversation;

    fn list_models_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ModelInfo>, LlmError>> + Send + 'a>>;
}

/// Blanket implementation: any `LlmProvider` automatically implements `LlmProviderDyn`.
impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn model(&self) -> &str {
        LlmProvider::model(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        LlmProvider::capabilities(self)
    }

    fn start_conversation_boxed(&self) -> BoxConversation {
        BoxConversation::new(self.start_conversation())
    }

    fn list_models_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ModelInfo>, LlmError>> + Send + 'a>> {
        Box::pin(self.list_models())
    }
}

/// Type-erased LLM provider for runtime provider selection.
///
/// Since `LlmProvider` has an associated conversation type and RPITIT
/// methods, it cannot be used as a trait object directly.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Configured model identifier.
    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// What this provider supports.
    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    /// Start a fresh provider-side conversation.
    pub fn start_conversation(&self) -> BoxConversation {
        self.inner.start_conversation_boxed()
    }

    /// List the models visible to the configured credentials.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.inner.list_models_boxed().await
    }
}
