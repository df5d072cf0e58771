//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider` / `Conversation`: RPITIT traits for concrete providers
//! - `BoxLlmProvider` / `BoxConversation`: object-safe wrappers for dynamic dispatch

pub mod box_provider;
pub mod provider;
