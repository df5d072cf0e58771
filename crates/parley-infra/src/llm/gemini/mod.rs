//! Google Gemini provider implementation.
//!
//! [`GeminiProvider`] implements the
//! [`LlmProvider`](parley_core::llm::provider::LlmProvider) trait against the
//! native `generateContent` REST API, with inline image parts.

pub mod client;
pub mod types;

pub use client::{GeminiConversation, GeminiProvider};
