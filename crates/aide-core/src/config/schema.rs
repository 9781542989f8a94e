//! Configuration schema — typed view over `~/.aide/config.toml`.
//!
//! Section names are upper-case on disk (`[API_KEYS]`, `[CHAT]`, …) to stay
//! compatible with existing config files; unknown sections are ignored.
//!
//! ```toml
//! [API_KEYS]
//! OPENAI = "sk-..."
//! GROQ = "gsk_..."
//! GEMINI = "AIza..."
//!
//! [CHAT]
//! provider = "groq"
//! max_tokens = 600
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration. Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider key name (`OPENAI`, `GROQ`, `GEMINI`) → API key.
    #[serde(rename = "API_KEYS")]
    pub api_keys: BTreeMap<String, String>,
    /// Provider key name → API base URL override.
    #[serde(rename = "API_BASES", skip_serializing_if = "BTreeMap::is_empty")]
    pub api_bases: BTreeMap<String, String>,
    #[serde(rename = "CHAT")]
    pub chat: ChatConfig,
    #[serde(rename = "DISPLAY")]
    pub display: DisplayConfig,
}

impl Config {
    /// The API key for a provider, if present and non-empty.
    pub fn api_key(&self, name: &str) -> Option<&str> {
        self.api_keys
            .get(name)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    /// The API base override for a provider, if any.
    pub fn api_base(&self, name: &str) -> Option<&str> {
        self.api_bases
            .get(name)
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }

    /// Whether any API key is configured at all.
    pub fn has_any_key(&self) -> bool {
        self.api_keys.values().any(|k| !k.trim().is_empty())
    }
}

// ─────────────────────────────────────────────
// Chat session overrides
// ─────────────────────────────────────────────

/// Optional `[CHAT]` table — every field falls back to the session defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ─────────────────────────────────────────────
// Display names
// ─────────────────────────────────────────────

/// Optional `[DISPLAY]` table used by the transcript renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}
