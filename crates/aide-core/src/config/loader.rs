//! Config loader — reads `~/.aide/config.toml` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (empty `Config`)
//! 2. TOML file at `~/.aide/config.toml`
//! 3. Environment variables `AIDE_<SECTION>__<FIELD>` (override TOML)
//!
//! Loading never fails: a missing or broken file degrades to an empty
//! config, which in turn means "no providers available".

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::error::Result;

const API_KEY_ENV_PREFIX: &str = "AIDE_API_KEYS__";
const API_BASE_ENV_PREFIX: &str = "AIDE_API_BASES__";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.toml")
}

/// Load configuration from `path` (or the default path) + env vars.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Error loading config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply the process environment on top of a loaded config.
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, std::env::vars_os())
}

/// Apply environment-style overrides from `vars` on top of `config`.
///
/// Supported overrides:
/// - `AIDE_API_KEYS__<NAME>` → `API_KEYS.<NAME>`
/// - `AIDE_API_BASES__<NAME>` → `API_BASES.<NAME>`
/// - `AIDE_CHAT__PROVIDER` / `AIDE_CHAT__MODEL`
/// - `AIDE_CHAT__MAX_TOKENS` / `AIDE_CHAT__TEMPERATURE` / `AIDE_CHAT__TOP_P` / `AIDE_CHAT__TIMEOUT`
///
/// Entries that are not valid UTF-8 are skipped, as are numeric overrides
/// that do not parse.
pub fn apply_overrides_from<I>(mut config: Config, vars: I) -> Config
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    for (key, value) in vars {
        let (key, value) = match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => (key, value),
            (Ok(key), Err(_)) => {
                debug!(key = %key, "skipping env var with non UTF-8 value");
                continue;
            }
            (Err(key), _) => {
                debug!(key = ?key, "skipping env var with non UTF-8 name");
                continue;
            }
        };
        apply_override(&mut config, &key, value);
    }
    config
}

fn apply_override(config: &mut Config, key: &str, value: String) {
    if let Some(name) = key.strip_prefix(API_KEY_ENV_PREFIX) {
        if !name.is_empty() {
            config.api_keys.insert(name.to_uppercase(), value);
        }
        return;
    }
    if let Some(name) = key.strip_prefix(API_BASE_ENV_PREFIX) {
        if !name.is_empty() {
            config.api_bases.insert(name.to_uppercase(), value);
        }
        return;
    }

    let chat = &mut config.chat;
    match key {
        "AIDE_CHAT__PROVIDER" => chat.provider = Some(value),
        "AIDE_CHAT__MODEL" => chat.model = Some(value),
        "AIDE_CHAT__MAX_TOKENS" => set_parsed(&mut chat.max_tokens, key, &value),
        "AIDE_CHAT__TEMPERATURE" => set_parsed(&mut chat.temperature, key, &value),
        "AIDE_CHAT__TOP_P" => set_parsed(&mut chat.top_p, key, &value),
        "AIDE_CHAT__TIMEOUT" => set_parsed(&mut chat.timeout, key, &value),
        _ => {}
    }
}

fn set_parsed<T: FromStr>(slot: &mut Option<T>, key: &str, value: &str) {
    match value.trim().parse() {
        Ok(parsed) => *slot = Some(parsed),
        Err(_) => warn!(key, value, "ignoring unparseable override"),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
