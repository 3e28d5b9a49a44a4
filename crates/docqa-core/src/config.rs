//! DocQA Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for local development.

use crate::LlmBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Embedding model configuration
    pub embedding: EmbeddingConfig,

    /// Vector store configuration
    pub vector: VectorConfig,

    /// LLM backend configuration
    pub llm: LlmConfig,

    /// Retrieval pipeline configuration
    pub rag: RagConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RAG_TOP_K".to_string(),
                value: "0".to_string(),
            });
        }
        if self.rag.chunk_delimiter.is_empty() {
            return Err(ConfigError::MissingRequired("CHUNK_DELIMITER".to_string()));
        }
        if self.vector.store == VectorStoreKind::Qdrant && self.vector.qdrant_url.is_empty() {
            return Err(ConfigError::MissingRequired("QDRANT_URL".to_string()));
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = parse_env("API_PORT", port)?;
        }
        if let Ok(size) = std::env::var("MAX_BODY_SIZE") {
            self.server.max_body_size = parse_env("MAX_BODY_SIZE", size)?;
        }
        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Embeddings
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.embedding.openai_api_key = Some(key);
        }

        // Vector store
        if let Ok(kind) = std::env::var("VECTOR_STORE") {
            self.vector.store = kind.parse()?;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.vector.qdrant_url = url;
        }
        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            self.vector.qdrant_collection = collection;
        }

        // LLM
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.llm.google_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.llm.gemini_model = model;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.llm.ollama_url = url.clone();
            self.embedding.ollama_url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.llm.ollama_model = model;
        }
        if let Ok(secs) = std::env::var("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_env("LLM_TIMEOUT_SECS", secs)?;
        }
        if let Ok(backend) = std::env::var("DEFAULT_LLM") {
            self.llm.default_backend =
                backend.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "DEFAULT_LLM".to_string(),
                    value: backend,
                })?;
        }

        // Retrieval
        if let Ok(top_k) = std::env::var("RAG_TOP_K") {
            self.rag.top_k = parse_env("RAG_TOP_K", top_k)?;
        }
        if let Ok(delimiter) = std::env::var("CHUNK_DELIMITER") {
            // Allow "\n" escapes so the delimiter can be set from a shell
            self.rag.chunk_delimiter = delimiter.replace("\\n", "\n");
        }
        if let Ok(flag) = std::env::var("PAGE_BREAKS_AS_PARAGRAPHS") {
            self.rag.page_breaks_as_paragraphs = parse_env("PAGE_BREAKS_AS_PARAGRAPHS", flag)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes (bounds PDF uploads)
    pub max_body_size: usize,

    /// Allowed origins for CORS; empty disables the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 20 * 1024 * 1024, // 20MB
            cors_origins: vec![],
        }
    }
}

impl ServerConfig {
    /// `host:port` listen address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider
    pub provider: EmbeddingProvider,

    /// Embedding model name
    pub model: String,

    /// Ollama server URL (used when provider is Ollama)
    pub ollama_url: String,

    /// OpenAI API key (used when provider is OpenAI)
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL
    pub openai_base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "all-minilm".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ollama,
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidValue {
                key: "EMBEDDING_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// Which store backs the index
    pub store: VectorStoreKind,

    /// Distance metric for nearest-neighbor ranking
    pub distance: DistanceMetric,

    /// Qdrant gRPC URL
    pub qdrant_url: String,

    /// Qdrant collection name
    pub qdrant_collection: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            store: VectorStoreKind::Memory,
            distance: DistanceMetric::Cosine,
            qdrant_url: "http://localhost:6334".to_string(),
            qdrant_collection: "documents".to_string(),
        }
    }
}

/// Supported vector stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    /// Process-lifetime, in-memory index
    Memory,
    /// External Qdrant server
    Qdrant,
}

impl std::str::FromStr for VectorStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "qdrant" => Ok(Self::Qdrant),
            _ => Err(ConfigError::InvalidValue {
                key: "VECTOR_STORE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Distance metrics; smaller distance means more similar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`
    Cosine,
    /// Squared Euclidean distance
    L2,
}

/// LLM backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend used when a query does not name one
    pub default_backend: LlmBackend,

    /// Google API key for Gemini
    pub google_api_key: Option<String>,

    /// Gemini API base URL
    pub gemini_base_url: String,

    /// Gemini model name
    pub gemini_model: String,

    /// Ollama server URL
    pub ollama_url: String,

    /// Ollama model name
    pub ollama_model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_backend: LlmBackend::Gemini,
            google_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            max_tokens: 2048,
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

/// Retrieval pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Literal that separates chunks in extracted text
    pub chunk_delimiter: String,

    /// Treat PDF page breaks as paragraph boundaries
    pub page_breaks_as_paragraphs: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_delimiter: "\n\n".to_string(),
            page_breaks_as_paragraphs: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigError> for crate::DocQaError {
    fn from(err: ConfigError) -> Self {
        crate::DocQaError::ConfigError(err.to_string())
    }
}
