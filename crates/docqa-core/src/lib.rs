//! DocQA Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout DocQA:
//! - Common error types
//! - Chunk and query models
//! - Answering backend selection
//! - The `LlmClient` trait implemented by every text-generation backend
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, DistanceMetric, EmbeddingConfig, EmbeddingProvider, LlmConfig,
    LoggingConfig, RagConfig, ServerConfig, VectorConfig, VectorStoreKind,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Answer returned when retrieval finds nothing, and the phrase the model is
/// told to use when the context does not contain the answer.
pub const NO_RELEVANT_INFORMATION: &str =
    "No relevant information found in the documents to answer your question.";

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for DocQA operations
#[derive(Error, Debug)]
pub enum DocQaError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported file format: {0}. Please upload a PDF.")]
    UnsupportedFormat(String),

    #[error("PDF is empty or has no text.")]
    EmptyDocument,

    #[error("could not extract processable content from PDF.")]
    NoProcessableContent,

    #[error("Invalid LLM backend: '{0}'. Expected one of: gemini, ollama")]
    InvalidBackend(String),

    #[error("Could not connect to {backend}. {hint}")]
    BackendUnavailable { backend: String, hint: String },

    #[error("LLM backend '{0}' is not configured")]
    BackendNotConfigured(String),

    #[error("LLM backend error: {0}")]
    BackendError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocQaError {
    /// Whether the error was caused by the caller's input rather than a
    /// service fault
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnsupportedFormat(_)
                | Self::EmptyDocument
                | Self::NoProcessableContent
                | Self::InvalidBackend(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DocQaError>;

// ============================================================================
// Chunk Models
// ============================================================================

/// A segment of a document's extracted text, as stored in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `"<filename>_<index>"`
    pub id: String,

    /// Trimmed, non-empty text
    pub text: String,

    /// Original filename of the document this chunk came from
    pub source_file: String,
}

impl Chunk {
    /// Create the chunk at `index` within `source_file`'s split
    pub fn new(source_file: impl Into<String>, index: usize, text: impl Into<String>) -> Self {
        let source_file = source_file.into();
        Self {
            id: chunk_id(&source_file, index),
            text: text.into(),
            source_file,
        }
    }
}

/// Deterministic chunk id for position `index` of `source_file`
pub fn chunk_id(source_file: &str, index: usize) -> String {
    format!("{source_file}_{index}")
}

/// Outcome of ingesting one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Filename the chunks were stored under
    pub source_file: String,

    /// Number of chunks inserted
    pub chunk_count: usize,

    /// Number of chunks removed from a previous ingestion of the same file
    pub replaced: u64,
}

// ============================================================================
// Query Models
// ============================================================================

/// Text-generation backends a query can be answered with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Hosted Google Gemini API
    #[default]
    Gemini,
    /// Locally running Ollama server
    Ollama,
}

impl LlmBackend {
    pub const ALL: [LlmBackend; 2] = [LlmBackend::Gemini, LlmBackend::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(DocQaError::InvalidBackend(s.to_string())),
        }
    }
}

/// A question to answer from the indexed documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// User's question
    pub text: String,

    /// Backend that generates the answer
    pub backend: LlmBackend,
}

impl Query {
    /// Create a query answered by the default backend
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend: LlmBackend::default(),
        }
    }

    /// Set the answering backend
    pub fn with_backend(mut self, backend: LlmBackend) -> Self {
        self.backend = backend;
        self
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a plain-text response for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_format() {
        let chunk = Chunk::new("report.pdf", 2, "Some text");
        assert_eq!(chunk.id, "report.pdf_2");
        assert_eq!(chunk.source_file, "report.pdf");
        assert_eq!(chunk_id("a.pdf", 0), "a.pdf_0");
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("gemini".parse::<LlmBackend>().unwrap(), LlmBackend::Gemini);
        assert_eq!("Ollama".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert_eq!(" OLLAMA ".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);

        let err = "gpt".parse::<LlmBackend>().unwrap_err();
        assert!(matches!(err, DocQaError::InvalidBackend(ref s) if s == "gpt"));
    }

    #[test]
    fn test_backend_default_and_display() {
        assert_eq!(LlmBackend::default(), LlmBackend::Gemini);
        assert_eq!(LlmBackend::Ollama.to_string(), "ollama");
        assert_eq!(
            serde_json::to_string(&LlmBackend::Gemini).unwrap(),
            "\"gemini\""
        );
    }

    #[test]
    fn test_user_error_classification() {
        assert!(DocQaError::EmptyDocument.is_user_error());
        assert!(DocQaError::InvalidBackend("x".into()).is_user_error());
        assert!(DocQaError::NoProcessableContent.is_user_error());
        assert!(!DocQaError::BackendError("boom".into()).is_user_error());
        assert!(!DocQaError::BackendUnavailable {
            backend: "Ollama".into(),
            hint: "start it".into()
        }
        .is_user_error());
    }

    #[test]
    fn test_ingest_error_messages() {
        assert_eq!(
            DocQaError::NoProcessableContent.to_string(),
            "could not extract processable content from PDF."
        );
        assert_eq!(
            DocQaError::EmptyDocument.to_string(),
            "PDF is empty or has no text."
        );
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("What is X?").with_backend(LlmBackend::Ollama);
        assert_eq!(query.text, "What is X?");
        assert_eq!(query.backend, LlmBackend::Ollama);
    }
}
