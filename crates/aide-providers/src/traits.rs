//! Provider traits — one capability per trait, implemented once per vendor.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use aide_core::session::GenerationParams;

/// Single-turn text generation.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` as the only user message and return the first choice's text.
    ///
    /// # Arguments
    /// * `prompt` — The user's text, sent verbatim.
    /// * `model`  — Model identifier (e.g. `"gpt-3.5-turbo"`, `"gemini-pro"`).
    /// * `params` — Max tokens, temperature, top-p and request timeout.
    async fn generate(&self, prompt: &str, model: &str, params: &GenerationParams)
        -> Result<String>;

    /// The model used when the session does not pick one.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

/// Describe the contents of an image file.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    async fn describe_image(&self, image: &Path, prompt: &str, model: &str) -> Result<String>;
}
