//! Gemini REST client for search-query generation.
//!
//! The model output is treated as opaque text and run through a deterministic
//! sanitizer before use; a decorated or off-format completion degrades to a
//! best-effort keyword extraction rather than an error.

mod client;
mod error;
mod sanitize;

pub use client::GeminiClient;
pub use error::LlmError;
pub use sanitize::sanitize_query;
