//! Session settings — which provider to talk to and how.
//!
//! A `SessionConfig` is built once at startup (defaults ← `[CHAT]` table ←
//! CLI flags) and stays fixed for the lifetime of the chat loop.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::schema::ChatConfig;
use crate::error::{CoreError, Result};

/// Provider selected when nothing else is configured.
pub const DEFAULT_PROVIDER: &str = "openai";

// ─────────────────────────────────────────────
// Generation parameters
// ─────────────────────────────────────────────

/// Numeric knobs sent with every generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Nucleus sampling probability (0.0 exclusive – 1.0).
    pub top_p: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.2,
            top_p: 0.999,
            timeout_secs: 30,
        }
    }
}

impl GenerationParams {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(CoreError::InvalidParams(
                "max_tokens must be positive".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::InvalidParams(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(CoreError::InvalidParams(format!(
                "top_p {} outside (0, 1]",
                self.top_p
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::InvalidParams(
                "timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// SessionConfig
// ─────────────────────────────────────────────

/// In-memory configuration for one run of the chat loop.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Selected provider name (`openai`, `groq`, `gemini`, or anything else).
    pub provider: String,
    /// Model override; `None` means the provider's default model.
    pub model: Option<String>,
    pub params: GenerationParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: None,
            params: GenerationParams::default(),
        }
    }
}

impl SessionConfig {
    /// Build a session from the `[CHAT]` table, falling back to defaults.
    ///
    /// Out-of-range parameters are logged and replaced by the defaults as a
    /// whole, so a half-valid set never reaches a provider.
    pub fn from_chat_config(chat: &ChatConfig) -> Self {
        let defaults = GenerationParams::default();
        let params = GenerationParams {
            max_tokens: chat.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: chat.temperature.unwrap_or(defaults.temperature),
            top_p: chat.top_p.unwrap_or(defaults.top_p),
            timeout_secs: chat.timeout.unwrap_or(defaults.timeout_secs),
        };

        let params = match params.validate() {
            Ok(()) => params,
            Err(e) => {
                warn!("Ignoring [CHAT] generation parameters: {}", e);
                defaults
            }
        };

        Self {
            provider: chat
                .provider
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            model: chat.model.clone().filter(|m| !m.trim().is_empty()),
            params,
        }
    }

    /// Override the provider (e.g. from a CLI flag).
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Override the model (e.g. from a CLI flag).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
