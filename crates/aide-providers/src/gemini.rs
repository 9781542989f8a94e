//! Google Gemini provider using the native `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ProviderError, Result};
use crate::registry::{ProviderConfig, ProviderSpec};
use crate::traits::{GenerationParams, LlmProvider};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for `POST {base}/models/{model}:generateContent`.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self> {
        HeaderValue::from_str(&config.api_key).map_err(|e| ProviderError::Construction {
            provider: spec.display_name.to_string(),
            reason: format!("API key is not a valid header value: {e}"),
        })?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Construction {
                provider: spec.display_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(GeminiProvider {
            client,
            api_base: config.resolve_api_base(spec),
            api_key: config.api_key.clone(),
            spec,
        })
    }

    /// Endpoint for `model`. Accepts both `gemini-pro` and `models/gemini-pro`.
    fn generate_url(&self, model: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{base}/models/{model}:generateContent")
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let url = self.generate_url(model);
        debug!(model = %model, max_tokens = params.max_tokens, "Calling Gemini");

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
            },
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(Duration::from_secs(params.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                ProviderError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            error!(status = %status, body = %body_text, "Gemini API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::MalformedResponse(format!("Gemini: {e}")))?;

        extract_text(parsed)
    }

    fn default_model(&self) -> &str {
        self.spec.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base: &str) -> GeminiProvider {
        let config = ProviderConfig {
            api_key: "g-key".into(),
            api_base: Some(base.to_string()),
        };
        GeminiProvider::new(&config, find_by_name("gemini").unwrap()).unwrap()
    }

    #[test]
    fn test_generate_url_strips_models_prefix() {
        let p = provider("https://generativelanguage.googleapis.com/v1beta/");
        let expected = "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
        assert_eq!(p.generate_url("gemini-pro"), expected);
        assert_eq!(p.generate_url("models/gemini-pro"), expected);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(extract_text(resp), Err(ProviderError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "tell me a joke"}]}],
                "generationConfig": {"maxOutputTokens": 600, "temperature": 0.2, "topP": 0.999}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "A joke."}]}}]
            })))
            .mount(&server)
            .await;

        let p = provider(&server.uri());
        let text = p
            .generate("tell me a joke", "gemini-pro", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(text, "A joke.");
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let p = provider(&server.uri());
        let err = p
            .generate("hi", "gemini-pro", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let p = provider(&server.uri());
        let err = p
            .generate("hi", "gemini-pro", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }
}
