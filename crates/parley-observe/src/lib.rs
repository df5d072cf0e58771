//! Observability for Parley: subscriber setup and OTel GenAI attribute names.

pub mod genai_attrs;
pub mod tracing_setup;
