//! Minimal client for OpenAI-compatible chat-completion endpoints.

pub mod client;
pub mod error;
pub mod types;

pub use client::{strip_code_fences, LlmClient};
pub use error::LlmError;
pub use types::{ChatMessage, Role};
