//! Provider registry — static specs for the supported vendors and the
//! map of constructed clients.
//!
//! Each `ProviderSpec` describes how to reach one vendor: the config key that
//! holds its API key, its API base, the wire format it speaks and the model
//! used when the session does not choose one.
//!
//! `ProviderRegistry` is built once from the loaded config. A provider
//! without a key simply has no entry; asking for it yields
//! [`ProviderError::Unavailable`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use aide_core::config::Config;

use crate::error::{ProviderError, Result};
use crate::gemini::GeminiProvider;
use crate::http_provider::HttpProvider;
use crate::traits::LlmProvider;

// ─────────────────────────────────────────────
// ProviderKind / ProviderSpec
// ─────────────────────────────────────────────

/// The fixed set of supported providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Gemini,
}

impl ProviderKind {
    /// Look up a provider by its session name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        find_by_name(name).map(|spec| spec.kind)
    }

    /// Session name (e.g. `"openai"`).
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderKind::OpenAi => &PROVIDERS[0],
            ProviderKind::Groq => &PROVIDERS[1],
            ProviderKind::Gemini => &PROVIDERS[2],
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which request/response format a provider speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `POST {base}/chat/completions` with bearer auth.
    OpenAiCompatible,
    /// `POST {base}/models/{model}:generateContent`.
    Gemini,
}

/// Static specification describing one provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Session name (e.g. `"groq"`).
    pub name: &'static str,
    /// Key under `[API_KEYS]` / `[API_BASES]` (e.g. `"GROQ"`).
    pub config_key: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    pub flavor: ApiFlavor,
    pub default_api_base: &'static str,
    /// Model used when the session does not select one.
    pub default_model: &'static str,
}

/// Supported providers, in display order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        config_key: "OPENAI",
        display_name: "OpenAI",
        flavor: ApiFlavor::OpenAiCompatible,
        default_api_base: "https://api.openai.com/v1",
        default_model: "gpt-3.5-turbo",
    },
    ProviderSpec {
        kind: ProviderKind::Groq,
        name: "groq",
        config_key: "GROQ",
        display_name: "Groq",
        flavor: ApiFlavor::OpenAiCompatible,
        default_api_base: "https://api.groq.com/openai/v1",
        default_model: "mixtral-8x7b-32768",
    },
    ProviderSpec {
        kind: ProviderKind::Gemini,
        name: "gemini",
        config_key: "GEMINI",
        display_name: "Gemini",
        flavor: ApiFlavor::Gemini,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        default_model: "gemini-pro",
    },
];

/// Find a provider spec by session name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let name = name.trim();
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

// ─────────────────────────────────────────────
// ProviderConfig
// ─────────────────────────────────────────────

/// Connection settings for one provider, extracted from [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Overrides the spec's default API base.
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Settings for `spec`, or `None` when its key is absent.
    pub fn from_config(config: &Config, spec: &ProviderSpec) -> Option<Self> {
        config.api_key(spec.config_key).map(|key| ProviderConfig {
            api_key: key.to_string(),
            api_base: config.api_base(spec.config_key).map(String::from),
        })
    }

    /// Configured base, or the spec default.
    pub fn resolve_api_base(&self, spec: &ProviderSpec) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string())
    }
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Map of available provider clients, built once and handed to the dispatcher.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("available", &self.available())
            .finish()
    }
}

impl ProviderRegistry {
    /// An empty registry (no providers available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client for every provider whose key is present.
    ///
    /// Never fails: missing keys and construction errors leave the provider
    /// out of the map, the latter with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for spec in PROVIDERS {
            let Some(provider_config) = ProviderConfig::from_config(config, spec) else {
                debug!(provider = spec.name, "no API key, provider unavailable");
                continue;
            };

            match build_client(&provider_config, spec) {
                Ok(client) => {
                    registry.insert(spec.kind, client);
                }
                Err(e) => {
                    warn!(provider = spec.name, error = %e, "Error initializing API client");
                }
            }
        }

        info!(
            providers = ?registry.available().iter().map(|k| k.name()).collect::<Vec<_>>(),
            "provider registry ready"
        );
        registry
    }

    /// Register (or replace) the client for `kind`.
    pub fn insert(&mut self, kind: ProviderKind, client: Arc<dyn LlmProvider>) {
        self.clients.insert(kind, client);
    }

    /// The client for `kind`, or [`ProviderError::Unavailable`].
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn LlmProvider>> {
        self.clients
            .get(&kind)
            .cloned()
            .ok_or_else(|| ProviderError::Unavailable(kind.name().to_string()))
    }

    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.clients.contains_key(&kind)
    }

    /// Available providers, in [`PROVIDERS`] order.
    pub fn available(&self) -> Vec<ProviderKind> {
        PROVIDERS
            .iter()
            .map(|spec| spec.kind)
            .filter(|kind| self.clients.contains_key(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Construct the client matching `spec.flavor`.
fn build_client(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Arc<dyn LlmProvider>> {
    match spec.flavor {
        ApiFlavor::OpenAiCompatible => Ok(Arc::new(HttpProvider::new(config, spec)?)),
        ApiFlavor::Gemini => Ok(Arc::new(GeminiProvider::new(config, spec)?)),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(keys: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        for (name, key) in keys {
            config.api_keys.insert(name.to_string(), key.to_string());
        }
        config
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("openai").unwrap().kind, ProviderKind::OpenAi);
        assert_eq!(find_by_name("GROQ").unwrap().kind, ProviderKind::Groq);
        assert_eq!(find_by_name(" gemini ").unwrap().kind, ProviderKind::Gemini);
        assert!(find_by_name("unknown").is_none());
        assert!(find_by_name("").is_none());
    }

    #[test]
    fn test_kind_name_round_trip() {
        for spec in PROVIDERS {
            assert_eq!(ProviderKind::from_name(spec.kind.name()), Some(spec.kind));
            assert_eq!(spec.kind.spec().name, spec.name);
        }
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let mut names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PROVIDERS.len());
    }

    #[test]
    fn test_empty_config_yields_no_clients() {
        let registry = ProviderRegistry::from_config(&Config::default());
        assert!(registry.is_empty());
        assert!(registry.available().is_empty());
    }

    #[test]
    fn test_config_without_api_keys_section_yields_no_clients() {
        let config: Config = toml::from_str(
            "[GENERAL]\nPORT = 3001\n\n[CHAT]\nprovider = \"groq\"\n",
        )
        .unwrap();
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_only_keyed_providers_are_built() {
        let config = config_with_keys(&[("GROQ", "gsk-1"), ("GEMINI", "")]);
        let registry = ProviderRegistry::from_config(&config);

        assert_eq!(registry.available(), vec![ProviderKind::Groq]);
        assert!(registry.is_available(ProviderKind::Groq));
        assert!(!registry.is_available(ProviderKind::Gemini));
    }

    #[test]
    fn test_all_providers_built() {
        let config = config_with_keys(&[("OPENAI", "sk-1"), ("GROQ", "gsk-1"), ("GEMINI", "g-1")]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(
            registry.available(),
            vec![ProviderKind::OpenAi, ProviderKind::Groq, ProviderKind::Gemini]
        );
        assert_eq!(registry.get(ProviderKind::Gemini).unwrap().display_name(), "Gemini");
    }

    #[test]
    fn test_malformed_key_is_skipped() {
        let config = config_with_keys(&[("OPENAI", "sk-bad\nkey"), ("GROQ", "gsk-ok")]);
        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.available(), vec![ProviderKind::Groq]);
    }

    #[test]
    fn test_get_missing_is_unavailable() {
        let registry = ProviderRegistry::new();
        match registry.get(ProviderKind::OpenAi) {
            Err(ProviderError::Unavailable(name)) => assert_eq!(name, "openai"),
            other => panic!("expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_provider_config_resolves_base() {
        let spec = find_by_name("groq").unwrap();
        let mut config = config_with_keys(&[("GROQ", "gsk-1")]);
        let pc = ProviderConfig::from_config(&config, spec).unwrap();
        assert_eq!(pc.resolve_api_base(spec), "https://api.groq.com/openai/v1");

        config
            .api_bases
            .insert("GROQ".into(), "http://localhost:1234/v1".into());
        let pc = ProviderConfig::from_config(&config, spec).unwrap();
        assert_eq!(pc.resolve_api_base(spec), "http://localhost:1234/v1");
    }
}
