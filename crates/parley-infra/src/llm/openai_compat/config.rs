//! Configuration and defaults for OpenAI-compatible providers.

use secrecy::SecretString;

use parley_types::llm::ProviderCapabilities;

/// OpenAI's public API base URL, used when no override is configured.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "ollama").
    pub provider_name: String,
    /// Base URL for the API, up to but excluding `/chat/completions`.
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub capabilities: ProviderCapabilities,
    pub timeout_secs: u64,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`; vision; 128K context, 16K output.
pub fn openai_defaults(api_key: SecretString, model: &str, timeout_secs: u64) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            vision: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
        timeout_secs,
    }
}

/// Configuration for a self-hosted or third-party compatible endpoint.
///
/// Capabilities are unknown, so conservative defaults are assumed.
pub fn custom_endpoint(
    api_key: SecretString,
    model: &str,
    base_url: &str,
    timeout_secs: u64,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai_compatible".into(),
        base_url: base_url.trim_end_matches('/').into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            vision: true,
            max_context_tokens: 32_768,
            max_output_tokens: 4_096,
        },
        timeout_secs,
    }
}
