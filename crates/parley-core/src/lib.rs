//! Business logic and provider trait definitions for Parley.
//!
//! This crate defines the "ports" (provider and conversation traits) that the
//! infrastructure layer implements, plus the chat store and turn processor.
//! It depends on `parley-types` and `parley-observe` -- never on
//! `parley-infra` or any HTTP client crate.

pub mod chat;
pub mod llm;
