//! API key lookup from the environment.
//!
//! The provider section names the variable holding the key
//! (`api_key_env`, `GEMINI_API_KEY` by default). The value is wrapped in a
//! [`SecretString`] as soon as it is read.

use secrecy::SecretString;

use parley_types::llm::ProviderConfig;

/// Read the API key named by `config.api_key_env`.
///
/// Returns `None` when the variable is unset, empty, or not valid Unicode.
pub fn resolve_api_key(config: &ProviderConfig) -> Option<SecretString> {
    read_env_secret(&config.api_key_env)
}

fn read_env_secret(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        Ok(_) => None,
        Err(std::env::VarError::NotPresent) => None,
        // Env var exists but has invalid Unicode -- treat as not found
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::warn!(var = name, "API key variable is not valid Unicode, ignoring");
            None
        }
    }
}
