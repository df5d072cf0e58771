//! Infrastructure layer for Parley.
//!
//! Concrete implementations of the provider traits defined in `parley-core`
//! (Gemini and OpenAI-compatible HTTP clients), plus configuration and
//! API key loading.

pub mod config;
pub mod llm;
pub mod secret;
