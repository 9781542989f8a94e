//! Utility helpers — data paths and home expansion.

use std::path::PathBuf;

/// Get the Aide data directory (e.g. `~/.aide/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".aide")
}

/// Default chat log location (e.g. `~/.aide/ChatLog.json`).
pub fn get_chat_log_path() -> PathBuf {
    get_data_path().join("ChatLog.json")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
