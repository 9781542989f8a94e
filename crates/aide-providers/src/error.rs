//! Provider error type.

use thiserror::Error;

/// Errors surfaced by provider construction and generation calls.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider is known but has no client (missing API key).
    #[error("provider '{0}' is unavailable: no API key configured")]
    Unavailable(String),

    /// Building the client failed (e.g. the key is not a valid header value).
    #[error("failed to create {provider} client: {reason}")]
    Construction { provider: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
