//! Shared domain types for Parley.
//!
//! Chat sessions and transcripts, provider-facing message shapes, and
//! configuration, plus their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, base64, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
