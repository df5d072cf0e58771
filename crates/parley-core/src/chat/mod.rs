//! Chat sessions: attachment handling, per-session records, the in-memory
//! store, and the turn processor that drives provider conversations.

pub mod attachment;
pub mod service;
pub mod session;
pub mod store;
