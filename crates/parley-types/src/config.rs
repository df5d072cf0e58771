//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `parley.toml`. Every field has a
//! default, so an empty or missing file yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_CHAT_TITLE;
use crate::llm::ProviderConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

/// HTTP listener settings (`[server]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Chat behavior settings (`[chat]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Title given to a chat before its first message.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Number of characters of the first message kept in the title.
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Appended to the truncated message to form the title.
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,

    /// Prefix of the reply text returned when a model call fails.
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,

    /// Largest accepted multipart request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_title() -> String {
    DEFAULT_CHAT_TITLE.to_string()
}

fn default_title_max_chars() -> usize {
    30
}

fn default_title_suffix() -> String {
    "...".to_string()
}

fn default_error_prefix() -> String {
    "Błąd: ".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            title_max_chars: default_title_max_chars(),
            title_suffix: default_title_suffix(),
            error_prefix: default_error_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderType;

    #[test]
    fn test_config_default_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.chat.default_title, "Nowy czat");
        assert_eq!(config.chat.title_max_chars, 30);
        assert_eq!(config.chat.title_suffix, "...");
        assert_eq!(config.provider.provider_type, ProviderType::Gemini);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: ParleyConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.chat.error_prefix, "Błąd: ");
        assert_eq!(config.chat.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9090
cors_origins = ["http://localhost:5173"]

[provider]
provider_type = "openai_compatible"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[chat]
default_title = "New chat"
title_max_chars = 20
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.provider.provider_type, ProviderType::OpenAiCompatible);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.base_url.as_deref(), Some("https://api.openai.com/v1"));
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.chat.default_title, "New chat");
        assert_eq!(config.chat.title_max_chars, 20);
        assert_eq!(config.chat.title_suffix, "...");
    }
}
