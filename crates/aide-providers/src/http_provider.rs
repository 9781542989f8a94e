//! HTTP provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint: OpenAI itself and
//! Groq's OpenAI-compatible surface. Also serves vision requests by sending
//! the image inline as a base64 data URL.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;
use tracing::{debug, error};

use aide_core::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart};

use crate::error::{ProviderError, Result};
use crate::registry::{ProviderConfig, ProviderSpec};
use crate::traits::{GenerationParams, LlmProvider, VisionProvider};

/// Timeout for vision requests, which carry no generation parameters.
const VISION_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    client: reqwest::Client,
    /// Base URL without the `/chat/completions` suffix.
    api_base: String,
    api_key: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Fails when the key cannot be sent as an `Authorization` header or the
    /// HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self> {
        HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
            ProviderError::Construction {
                provider: spec.display_name.to_string(),
                reason: format!("API key is not a valid header value: {e}"),
            }
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Construction {
                provider: spec.display_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(HttpProvider {
            client,
            api_base: config.resolve_api_base(spec),
            api_key: config.api_key.clone(),
            spec,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// POST a completion request and return the first choice's text.
    async fn complete(&self, body: &ChatCompletionRequest, timeout: Duration) -> Result<String> {
        let url = self.completions_url();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, url = %url, error = %e, "request failed");
                ProviderError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %error_text,
                "API error"
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let raw = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw).map_err(|e| {
            error!(
                provider = self.spec.display_name,
                error = %e,
                "unparseable completion body"
            );
            ProviderError::MalformedResponse(e.to_string())
        })?;

        debug!(
            provider = self.spec.display_name,
            choices = parsed.choices.len(),
            total_tokens = parsed.usage.as_ref().map_or(0, |u| u.total_tokens),
            "completion received"
        );

        parsed.first_text().ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        debug!(
            provider = self.spec.display_name,
            model = %model,
            max_tokens = params.max_tokens,
            "sending completion request"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(params.max_tokens),
            temperature: Some(params.temperature),
            top_p: Some(params.top_p),
        };

        self.complete(&request_body, Duration::from_secs(params.timeout_secs))
            .await
    }

    fn default_model(&self) -> &str {
        self.spec.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

#[async_trait]
impl VisionProvider for HttpProvider {
    async fn describe_image(&self, image: &Path, prompt: &str, model: &str) -> Result<String> {
        let bytes = tokio::fs::read(image).await?;
        let data_url = format!(
            "data:{};base64,{}",
            image_mime_type(image),
            BASE64_STANDARD.encode(&bytes)
        );

        debug!(
            provider = self.spec.display_name,
            model = %model,
            path = %image.display(),
            bytes = bytes.len(),
            "Requesting image description"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::text(prompt),
                ContentPart::image_url(data_url),
            ])],
            max_tokens: None,
            temperature: None,
            top_p: None,
        };

        self.complete(&request_body, Duration::from_secs(VISION_TIMEOUT_SECS))
            .await
    }
}

/// MIME type for an image path, by extension.
fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
