//! Query dispatcher — routes one line of user text to the selected provider.

use tracing::{debug, error, info};

use aide_core::session::SessionConfig;

use crate::error::{ProviderError, Result};
use crate::registry::{ProviderKind, ProviderRegistry};

/// Reply returned when the session names a provider outside the supported set.
pub const NOT_IMPLEMENTED: &str = "Selected provider not implemented";

/// Sends single-turn queries using a fixed session and provider registry.
#[derive(Debug)]
pub struct QueryDispatcher {
    registry: ProviderRegistry,
    session: SessionConfig,
}

impl QueryDispatcher {
    pub fn new(registry: ProviderRegistry, session: SessionConfig) -> Self {
        info!(
            provider = %session.provider,
            model = session.model.as_deref().unwrap_or("<provider default>"),
            "dispatcher ready"
        );
        Self { registry, session }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Send `query` to the session's provider and return the generated text.
    ///
    /// An unrecognized provider name is not an error: the reply is
    /// [`NOT_IMPLEMENTED`].
    pub async fn dispatch(&self, query: &str) -> Result<String> {
        self.session
            .params
            .validate()
            .map_err(|e| ProviderError::InvalidParams(e.to_string()))?;

        let Some(kind) = ProviderKind::from_name(&self.session.provider) else {
            debug!(provider = %self.session.provider, "unrecognized provider");
            return Ok(NOT_IMPLEMENTED.to_string());
        };

        let client = self.registry.get(kind)?;
        let model = self
            .session
            .model
            .as_deref()
            .unwrap_or_else(|| client.default_model());

        debug!(
            provider = client.display_name(),
            model = %model,
            query_len = query.len(),
            "dispatching query"
        );

        client.generate(query, model, &self.session.params).await
    }

    /// Like [`dispatch`](Self::dispatch), but renders any failure as
    /// `Error: …` so the chat loop can keep going.
    pub async fn respond(&self, query: &str) -> String {
        match self.dispatch(query).await {
            Ok(text) => text,
            Err(e) => {
                error!(provider = %self.session.provider, error = %e, "query failed");
                format!("Error: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{GenerationParams, LlmProvider};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records the last call and echoes the prompt back.
    #[derive(Default)]
    struct EchoProvider {
        calls: Mutex<Vec<(String, String, GenerationParams)>>,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn generate(
            &self,
            prompt: &str,
            model: &str,
            params: &GenerationParams,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.to_string(), params.clone()));
            Ok(format!("echo: {prompt}"))
        }

        fn default_model(&self) -> &str {
            "echo-default"
        }

        fn display_name(&self) -> &str {
            "Echo"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn generate(&self, _: &str, _: &str, _: &GenerationParams) -> Result<String> {
            Err(ProviderError::Api {
                status: 500,
                body: "boom".into(),
            })
        }

        fn default_model(&self) -> &str {
            "failing"
        }

        fn display_name(&self) -> &str {
            "Failing"
        }
    }

    fn registry_with(kind: ProviderKind, client: Arc<dyn LlmProvider>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.insert(kind, client);
        registry
    }

    #[tokio::test]
    async fn test_unknown_provider_soft_fails() {
        let session = SessionConfig::default().with_provider("unknown");
        let dispatcher = QueryDispatcher::new(ProviderRegistry::new(), session);
        let reply = dispatcher.dispatch("hello").await.unwrap();
        assert_eq!(reply, "Selected provider not implemented");
        assert_eq!(dispatcher.respond("hello").await, NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let session = SessionConfig::default().with_provider("groq");
        let dispatcher = QueryDispatcher::new(ProviderRegistry::new(), session);
        let err = dispatcher.dispatch("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(ref name) if name == "groq"));
    }

    #[tokio::test]
    async fn test_uses_provider_default_model() {
        let echo = Arc::new(EchoProvider::default());
        let dispatcher = QueryDispatcher::new(
            registry_with(ProviderKind::OpenAi, echo.clone()),
            SessionConfig::default(),
        );

        let reply = dispatcher.dispatch("what is rust").await.unwrap();
        assert_eq!(reply, "echo: what is rust");

        let calls = echo.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "what is rust");
        assert_eq!(calls[0].1, "echo-default");
        assert_eq!(calls[0].2, GenerationParams::default());
    }

    #[tokio::test]
    async fn test_session_model_wins() {
        let echo = Arc::new(EchoProvider::default());
        let session = SessionConfig::default()
            .with_provider("GEMINI")
            .with_model("gemini-1.5-flash");
        let dispatcher = QueryDispatcher::new(registry_with(ProviderKind::Gemini, echo.clone()), session);

        dispatcher.dispatch("hi").await.unwrap();
        assert_eq!(echo.calls.lock().unwrap()[0].1, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_call() {
        let echo = Arc::new(EchoProvider::default());
        let mut session = SessionConfig::default();
        session.params.top_p = 0.0;
        let dispatcher = QueryDispatcher::new(registry_with(ProviderKind::OpenAi, echo.clone()), session);

        let err = dispatcher.dispatch("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidParams(_)));
        assert!(echo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_respond_formats_errors() {
        let dispatcher = QueryDispatcher::new(
            registry_with(ProviderKind::OpenAi, Arc::new(FailingProvider)),
            SessionConfig::default(),
        );
        let reply = dispatcher.respond("hi").await;
        assert!(reply.starts_with("Error: "));
        assert!(reply.contains("500"));
    }

    #[tokio::test]
    async fn test_end_to_end_through_config() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{"message": {"content": "**Rust** is a language."}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let config: aide_core::config::Config = toml::from_str(&format!(
            "[API_KEYS]\nGROQ = \"gsk-test\"\n\n[API_BASES]\nGROQ = \"{}\"\n",
            server.uri()
        ))
        .unwrap();

        let registry = ProviderRegistry::from_config(&config);
        let session = SessionConfig::default().with_provider("groq");
        let dispatcher = QueryDispatcher::new(registry, session);

        assert_eq!(dispatcher.respond("what is rust").await, "**Rust** is a language.");
    }
}
