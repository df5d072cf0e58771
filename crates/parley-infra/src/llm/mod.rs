//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `parley-core`: native Gemini and OpenAI-compatible Chat Completions.
//!
//! Also provides a provider factory ([`create_provider`]) that constructs
//! the right provider from a [`ProviderConfig`].
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod gemini;
pub(crate) mod http;
pub mod openai_compat;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_types::llm::{LlmError, ProviderConfig, ProviderType};

use self::gemini::GeminiProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// # Arguments
///
/// * `config` - Provider configuration specifying type, model, base URL, etc.
/// * `api_key` - The resolved API key (see [`crate::secret::resolve_api_key`])
///
/// # Errors
///
/// Returns `AuthenticationFailed` when no API key is provided, or `Provider`
/// when the HTTP client cannot be built.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<&str>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(LlmError::AuthenticationFailed)?;
    let secret = SecretString::from(key.to_string());
    let base_url = config
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    match config.provider_type {
        ProviderType::Gemini => {
            let mut provider =
                GeminiProvider::new(secret, config.model.clone(), config.timeout_secs)?;
            if let Some(base_url) = base_url {
                provider = provider.with_base_url(base_url.to_string());
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            // Use base_url if specified, otherwise OpenAI itself
            let provider = match base_url {
                Some(base_url) => OpenAiCompatibleProvider::new(openai_compat::config::custom_endpoint(
                    secret,
                    &config.model,
                    base_url,
                    config.timeout_secs,
                ))?,
                None => OpenAiCompatibleProvider::openai(secret, &config.model, config.timeout_secs)?,
            };
            Ok(BoxLlmProvider::new(provider))
        }
    }
}
