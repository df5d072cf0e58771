//! HTTP API layer for Parley.
//!
//! Axum router exposing the chat endpoints, model discovery, and a health
//! check, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
