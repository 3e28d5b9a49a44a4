//! Answering backend registry
//!
//! Maps each [`LlmBackend`] to the client that serves it. Backends are
//! resolved from the caller's selector string; a known backend without a
//! registered client is reported as not configured rather than silently
//! replaced by another one.

use crate::llm::{build_http_client, GeminiClient, OllamaClient};
use docqa_core::{DocQaError, LlmBackend, LlmClient, LlmConfig, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered text-generation clients keyed by backend
#[derive(Clone)]
pub struct AnswerBackends {
    clients: HashMap<LlmBackend, Arc<dyn LlmClient>>,
    default: LlmBackend,
}

impl AnswerBackends {
    /// Empty registry resolving unspecified selectors to `default`
    pub fn new(default: LlmBackend) -> Self {
        Self {
            clients: HashMap::new(),
            default,
        }
    }

    /// Build the clients described by `config`
    ///
    /// Ollama needs nothing but a URL and is always registered. Gemini is
    /// registered only when an API key is present.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;
        let mut backends = Self::new(config.default_backend);

        backends.register(
            LlmBackend::Ollama,
            Arc::new(OllamaClient::from_config(config, http.clone())),
        );

        if config.google_api_key.is_some() {
            backends.register(
                LlmBackend::Gemini,
                Arc::new(GeminiClient::from_config(config, http)?),
            );
        } else {
            tracing::warn!("GOOGLE_API_KEY not set; the gemini backend is unavailable");
        }

        Ok(backends)
    }

    /// Register (or replace) the client for `backend`
    pub fn register(&mut self, backend: LlmBackend, client: Arc<dyn LlmClient>) {
        self.clients.insert(backend, client);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_client(mut self, backend: LlmBackend, client: Arc<dyn LlmClient>) -> Self {
        self.register(backend, client);
        self
    }

    /// Backend used when a request does not name one
    pub fn default_backend(&self) -> LlmBackend {
        self.default
    }

    /// Resolve an optional selector string; `None` or blank means the default
    pub fn resolve(&self, selector: Option<&str>) -> Result<LlmBackend> {
        match selector.map(str::trim) {
            None | Some("") => Ok(self.default),
            Some(name) => name.parse(),
        }
    }

    /// Client registered for `backend`
    pub fn client(&self, backend: LlmBackend) -> Result<Arc<dyn LlmClient>> {
        self.clients
            .get(&backend)
            .cloned()
            .ok_or_else(|| DocQaError::BackendNotConfigured(backend.to_string()))
    }

    /// Backends with a registered client, in declaration order
    pub fn configured(&self) -> Vec<LlmBackend> {
        LlmBackend::ALL
            .into_iter()
            .filter(|b| self.clients.contains_key(b))
            .collect()
    }

    /// Send `prompt` to `backend` and return its plain-text answer
    pub async fn generate(&self, backend: LlmBackend, prompt: &str) -> Result<String> {
        let client = self.client(backend)?;
        tracing::debug!(
            "Dispatching prompt ({} chars) to {}",
            prompt.len(),
            client.name()
        );

        let answer = client.generate(prompt).await?;
        Ok(answer.trim().to_string())
    }
}

impl std::fmt::Debug for AnswerBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerBackends")
            .field("configured", &self.configured())
            .field("default", &self.default)
            .finish()
    }
}
