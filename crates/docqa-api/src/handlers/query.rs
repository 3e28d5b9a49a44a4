//! Question answering handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use docqa_core::LlmBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Query request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// User's question
    #[schema(example = "What is X?")]
    pub query: Option<String>,

    /// Answering backend: `gemini` (default) or `ollama`
    #[schema(example = "ollama")]
    pub llm: Option<String>,
}

/// Query response body
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Generated answer
    #[schema(example = "X is Y.")]
    pub answer: String,

    /// Backend that produced the answer; absent when nothing relevant was found
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "gemini")]
    pub llm: Option<LlmBackend>,

    /// Ids of the chunks used as context
    pub sources: Vec<String>,

    /// Processing time in milliseconds
    #[schema(example = 1250)]
    pub processing_time_ms: u64,
}

/// Answer a question from the indexed documents
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query answered", body = QueryResponse),
        (status = 400, description = "Missing query, invalid JSON, or unknown backend", body = crate::error::ApiError),
        (status = 502, description = "Backend returned an error", body = crate::error::ApiError),
        (status = 503, description = "Backend unreachable or not configured", body = crate::error::ApiError)
    )
)]
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let Json(req) = payload?;

    let question = req.query.as_deref().map(str::trim).unwrap_or_default();
    if question.is_empty() {
        return Err(AppError::bad_request("VALIDATION_ERROR", "No query provided"));
    }

    let answer = state.pipeline.ask(question, req.llm.as_deref()).await?;

    Ok(Json(QueryResponse {
        answer: answer.text,
        llm: answer.backend,
        sources: answer.sources,
        processing_time_ms: answer.processing_time_ms,
    }))
}
