//! LLM Client implementations
//!
//! Provides the Gemini (hosted) and Ollama (local) text-generation backends.
//! Connection failures and timeouts surface as `BackendUnavailable`; error
//! statuses and unparseable replies surface as `BackendError`.

use async_trait::async_trait;
use docqa_core::{DocQaError, LlmClient, LlmConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Build the shared HTTP client used by LLM backends
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocQaError::ConfigError(format!("Failed to build HTTP client: {e}")))
}

fn send_error(backend: &str, hint: String, e: reqwest::Error) -> DocQaError {
    if e.is_connect() || e.is_timeout() {
        DocQaError::BackendUnavailable {
            backend: backend.to_string(),
            hint,
        }
    } else {
        DocQaError::BackendError(format!("{backend} request failed: {e}"))
    }
}

async fn error_status(backend: &str, response: reqwest::Response) -> DocQaError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    DocQaError::BackendError(format!("{backend} error ({status}): {error_text}"))
}

// ============================================================================
// Gemini Client
// ============================================================================

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String> {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if !text.is_empty() {
            return Ok(text);
        }

        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(DocQaError::BackendError(format!(
                "Gemini blocked the prompt: {reason}"
            ))),
            None => Err(DocQaError::BackendError(
                "Gemini returned no text".to_string(),
            )),
        }
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.1,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig, client: Client) -> Result<Self> {
        let api_key = config
            .google_api_key
            .as_ref()
            .ok_or_else(|| DocQaError::ConfigError("GOOGLE_API_KEY required".to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        // Key goes in a header so it never shows up in error messages
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                send_error(
                    "Gemini",
                    "Check network access to the Gemini API.".to_string(),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(error_status("Gemini", response).await);
        }

        let result: GeminiResponse = response.json().await.map_err(|e| {
            DocQaError::BackendError(format!("Failed to parse Gemini response: {e}"))
        })?;

        result.into_text()
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(client: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig, client: Client) -> Self {
        Self::new(client, config.ollama_url.clone(), config.ollama_model.clone())
    }

    fn unavailable_hint(&self) -> String {
        format!(
            "Make sure the Ollama server is running at {} (`ollama serve`) and model '{}' is pulled.",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("Ollama", self.unavailable_hint(), e))?;

        if !response.status().is_success() {
            return Err(error_status("Ollama", response).await);
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            DocQaError::BackendError(format!("Failed to parse Ollama response: {e}"))
        })?;

        Ok(result.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Tests
// ============================================================================
