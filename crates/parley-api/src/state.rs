//! Application state wiring the chat service to a configured provider.
//!
//! AppState is shared by the HTTP handlers and the CLI. The chat store lives
//! inside the chat service, so each AppState owns an isolated set of chats.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;

use parley_core::chat::service::ChatService;
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_infra::llm::create_provider;
use parley_infra::secret::resolve_api_key;
use parley_types::config::ParleyConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub config: Arc<ParleyConfig>,
}

impl AppState {
    /// Wire state around an already-built provider.
    pub fn new(provider: BoxLlmProvider, config: ParleyConfig) -> Self {
        let chat_service = ChatService::new(provider, &config.chat);
        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        }
    }

    /// Resolve the API key, build the configured provider, and wire services.
    pub fn init(config: ParleyConfig) -> anyhow::Result<Self> {
        let provider = build_provider(&config)?;
        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            "Provider configured"
        );
        Ok(Self::new(provider, config))
    }
}

/// Build the provider named in `config.provider`, reading its key from the environment.
pub fn build_provider(config: &ParleyConfig) -> anyhow::Result<BoxLlmProvider> {
    let key_var = &config.provider.api_key_env;
    let api_key = resolve_api_key(&config.provider)
        .with_context(|| format!("API key not found: set the {key_var} environment variable"))?;

    create_provider(&config.provider, Some(api_key.expose_secret()))
        .with_context(|| format!("failed to create {} provider", config.provider.provider_type))
}
