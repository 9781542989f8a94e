//! LLM provider layer for Aide.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — text generation capability every provider implements
//! - [`traits::VisionProvider`] — image description capability
//! - [`registry`] — static specs for the supported providers + the client map
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client (OpenAI, Groq)
//! - [`gemini::GeminiProvider`] — Gemini `generateContent` client
//! - [`dispatcher::QueryDispatcher`] — routes a query to the session's provider

pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod http_provider;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use dispatcher::{QueryDispatcher, NOT_IMPLEMENTED};
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use http_provider::HttpProvider;
pub use registry::{ProviderConfig, ProviderKind, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use traits::{GenerationParams, LlmProvider, VisionProvider};
