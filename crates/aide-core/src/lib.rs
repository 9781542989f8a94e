//! Core building blocks for Aide.
//!
//! - [`config`] — TOML config loading (`[API_KEYS]`, `[CHAT]`, …) with env overrides
//! - [`session`] — session settings and generation parameters
//! - [`types`] — OpenAI-format chat messages and completion payloads
//! - [`transcript`] — chat log persistence and GUI formatting
//! - [`utils`] — data-directory helpers

pub mod config;
pub mod error;
pub mod session;
pub mod transcript;
pub mod types;
pub mod utils;

pub use error::CoreError;
