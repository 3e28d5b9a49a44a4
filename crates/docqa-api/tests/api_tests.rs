//! API Integration Tests
//!
//! The router is driven in-process with fake text extraction, embeddings and
//! LLM clients, so no PDF library, Ollama or Gemini access is needed.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docqa_api::{create_router, AppState};
use docqa_core::{AppConfig, DocQaError, LlmBackend, LlmClient, RagConfig, Result};
use docqa_parser::{ParserError, TextExtractor};
use docqa_rag::{AnswerBackends, OllamaClient, RagPipeline};
use docqa_vector::{EmbeddingClient, InMemoryStore};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "docqa-test-boundary";

// =============================================================================
// Fakes
// =============================================================================

/// Treats uploaded bytes as UTF-8 text
struct PlainText;

impl TextExtractor for PlainText {
    fn extract_text(&self, bytes: &[u8]) -> docqa_parser::Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ParserError::PdfError(e.to_string()))
    }
}

/// Letter-frequency embedding
struct LetterEmbedding;

#[async_trait]
impl EmbeddingClient for LetterEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0; 26];
                for c in t.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                    v[(c - b'a') as usize] += 1.0;
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        26
    }

    fn model(&self) -> &str {
        "letters"
    }
}

/// Records prompts and replies with a canned answer
struct RecordingLlm {
    reply: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl RecordingLlm {
    fn new(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.to_string())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Always fails as if the provider returned an error status
struct BrokenLlm;

#[async_trait]
impl LlmClient for BrokenLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(DocQaError::BackendError("Gemini error (500): boom".to_string()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct TestApp {
    router: Router,
    gemini: Arc<RecordingLlm>,
    ollama: Arc<RecordingLlm>,
}

fn app_with_backends(backends: AnswerBackends) -> Router {
    let config = AppConfig::default();
    let pipeline = RagPipeline::new(
        Arc::new(PlainText),
        Arc::new(LetterEmbedding),
        Arc::new(InMemoryStore::default()),
        backends,
        &RagConfig::default(),
    );
    create_router(Arc::new(AppState::new(config, Arc::new(pipeline))))
}

fn test_app() -> TestApp {
    let gemini = RecordingLlm::new("answer from gemini");
    let ollama = RecordingLlm::new("answer from ollama");
    let backends = AnswerBackends::new(LlmBackend::Gemini)
        .with_client(LlmBackend::Gemini, gemini.clone())
        .with_client(LlmBackend::Ollama, ollama.clone());

    TestApp {
        router: app_with_backends(backends),
        gemini,
        ollama,
    }
}

// =============================================================================
// Request helpers
// =============================================================================

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn query_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_index_page() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/api/upload"));
    assert!(html.contains("/api/query"));
}

#[tokio::test]
async fn test_metrics_report_index_size() {
    let app = test_app();
    send(
        &app.router,
        multipart_request("file", "notes.pdf", b"One.\n\nTwo."),
    )
    .await;

    let (status, json) = send(
        &app.router,
        Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["indexed_chunks"], 2);
    assert_eq!(json["indexed_documents"], json!(["notes.pdf"]));
    assert_eq!(json["vector_store"], "memory");
    assert!(json["total_requests"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/query"].is_object());
}

// =============================================================================
// Upload Tests
// =============================================================================

#[tokio::test]
async fn test_upload_pdf() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        multipart_request("file", "notes.pdf", b"Paragraph one.\n\nParagraph two."),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["message"],
        "notes.pdf processed and added to the database."
    );
    assert_eq!(json["chunk_count"], 2);
    assert_eq!(json["replaced"], 0);
}

#[tokio::test]
async fn test_reupload_replaces_chunks() {
    let app = test_app();
    send(
        &app.router,
        multipart_request("file", "notes.pdf", b"a\n\nb\n\nc"),
    )
    .await;

    let (status, json) = send(&app.router, multipart_request("file", "notes.pdf", b"only")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chunk_count"], 1);
    assert_eq!(json["replaced"], 3);
}

#[tokio::test]
async fn test_upload_non_pdf_rejected() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        multipart_request("file", "notes.txt", b"Some text"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNSUPPORTED_FORMAT");
    assert!(json["error"].as_str().unwrap().contains("PDF"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        multipart_request("document", "notes.pdf", b"text"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NO_FILE");
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let app = test_app();
    let (status, json) = send(&app.router, multipart_request("file", "", b"text")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NO_FILE_SELECTED");
}

#[tokio::test]
async fn test_upload_empty_document() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        multipart_request("file", "blank.pdf", b"   \n  "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "PDF is empty or has no text.");
    assert!(json.get("error").is_none());
}

// =============================================================================
// Query Tests
// =============================================================================

#[tokio::test]
async fn test_query_empty_index_returns_sentinel() {
    let app = test_app();
    let (status, json) = send(&app.router, query_request(json!({"query": "What is X?"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["answer"],
        "No relevant information found in the documents to answer your question."
    );
    assert!(app.gemini.prompts().is_empty());
    assert!(app.ollama.prompts().is_empty());
}

#[tokio::test]
async fn test_query_uses_default_backend_with_grounded_prompt() {
    let app = test_app();
    send(&app.router, multipart_request("file", "x.pdf", b"X is Y.")).await;

    let (status, json) = send(&app.router, query_request(json!({"query": "What is X?"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "answer from gemini");
    assert_eq!(json["llm"], "gemini");

    let prompts = app.gemini.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("X is Y."));
    assert!(prompts[0].contains("Question: What is X?"));
}

#[tokio::test]
async fn test_query_selects_ollama() {
    let app = test_app();
    send(&app.router, multipart_request("file", "x.pdf", b"X is Y.")).await;

    let (status, json) = send(
        &app.router,
        query_request(json!({"query": "What is X?", "llm": "ollama"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "answer from ollama");
    assert_eq!(app.ollama.prompts().len(), 1);
    assert!(app.gemini.prompts().is_empty());
}

#[tokio::test]
async fn test_query_unknown_backend() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        query_request(json!({"query": "What is X?", "llm": "gpt"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_BACKEND");
}

#[tokio::test]
async fn test_query_missing_or_blank() {
    let app = test_app();

    let (status, json) = send(&app.router, query_request(json!({"llm": "gemini"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app.router, query_request(json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_invalid_json() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_query_backend_error_is_bad_gateway() {
    let router = app_with_backends(
        AnswerBackends::new(LlmBackend::Gemini).with_client(LlmBackend::Gemini, Arc::new(BrokenLlm)),
    );
    send(&router, multipart_request("file", "x.pdf", b"X is Y.")).await;

    let (status, json) = send(&router, query_request(json!({"query": "What is X?"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "BACKEND_ERROR");
}

#[tokio::test]
async fn test_query_gemini_not_configured() {
    let ollama = RecordingLlm::new("answer from ollama");
    let router = app_with_backends(
        AnswerBackends::new(LlmBackend::Gemini).with_client(LlmBackend::Ollama, ollama),
    );
    send(&router, multipart_request("file", "x.pdf", b"X is Y.")).await;

    let (status, json) = send(&router, query_request(json!({"query": "What is X?"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "BACKEND_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_query_ollama_generation_down_is_service_unavailable() {
    // Nothing listens on port 1
    let ollama = OllamaClient::new(reqwest_client(), "http://127.0.0.1:1", "llama3");
    let router = app_with_backends(
        AnswerBackends::new(LlmBackend::Gemini).with_client(LlmBackend::Ollama, Arc::new(ollama)),
    );
    send(&router, multipart_request("file", "x.pdf", b"X is Y.")).await;

    let (status, json) = send(
        &router,
        query_request(json!({"query": "What is X?", "llm": "ollama"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "BACKEND_UNAVAILABLE");
    assert!(json["error"].as_str().unwrap().contains("ollama serve"));
}

#[tokio::test]
async fn test_query_with_default_clients_and_ollama_down() {
    let mut config = AppConfig::default();
    config.embedding.ollama_url = "http://127.0.0.1:1".to_string();
    config.llm.ollama_url = "http://127.0.0.1:1".to_string();
    let pipeline = RagPipeline::from_config(&config).await.unwrap();
    let router = create_router(Arc::new(AppState::new(config, Arc::new(pipeline))));

    let (status, json) = send(
        &router,
        query_request(json!({"query": "What is X?", "llm": "ollama"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "BACKEND_UNAVAILABLE");
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("Ollama embeddings"));
    assert!(error.contains("ollama serve"));
}

fn reqwest_client() -> reqwest::Client {
    docqa_rag::build_http_client(5).unwrap()
}
