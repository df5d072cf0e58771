//! OpenTelemetry GenAI Semantic Convention attribute values.
//!
//! Span fields are literal identifiers (`gen_ai.operation.name`,
//! `gen_ai.system`, `gen_ai.request.model`); this module supplies the values.
//!
//! Span naming convention: `"gen_ai.{operation}"` (e.g., `"gen_ai.chat"`).

// --- Operation name values ---

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

/// Model listing.
pub const OP_LIST_MODELS: &str = "list_models";

// --- System values ---

/// Google Gemini (native API).
pub const SYSTEM_GEMINI: &str = "gemini";

/// OpenAI and compatible endpoints.
pub const SYSTEM_OPENAI: &str = "openai";

/// Map a provider name onto its `gen_ai.system` value.
pub fn system_for_provider(provider_name: &str) -> &str {
    match provider_name {
        "gemini" => SYSTEM_GEMINI,
        "openai" | "openai_compatible" => SYSTEM_OPENAI,
        other => other,
    }
}
