use thiserror::Error;

/// Errors raised inside `aide-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid generation parameter: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
