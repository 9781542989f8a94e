//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use aide_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("OpenAI configured: {}", cfg.api_key("OPENAI").is_some());
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{apply_overrides_from, get_config_path, load_config};
pub use schema::{ChatConfig, Config, DisplayConfig};
