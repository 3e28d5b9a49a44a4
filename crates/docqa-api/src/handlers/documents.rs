//! Document upload handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart form field carrying the document
const FILE_FIELD: &str = "file";

/// Upload response body
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Confirmation message
    #[schema(example = "report.pdf processed and added to the database.")]
    pub message: String,

    /// Number of chunks indexed
    #[schema(example = 12)]
    pub chunk_count: usize,

    /// Chunks removed from an earlier upload of the same filename
    #[schema(example = 0)]
    pub replaced: u64,
}

/// Multipart upload schema for the OpenAPI document
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// PDF document
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Upload a PDF and index its paragraphs
///
/// Any chunks from an earlier upload with the same filename are replaced.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "documents",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document indexed", body = UploadResponse),
        (status = 400, description = "Missing file, non-PDF, or no extractable text", body = crate::error::ApiError),
        (status = 413, description = "Upload too large", body = crate::error::ApiError),
        (status = 500, description = "Internal error", body = crate::error::ApiError)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::bad_request("NO_FILE", "No file part in the request"));
    };

    if filename.trim().is_empty() {
        return Err(AppError::bad_request("NO_FILE_SELECTED", "No file selected"));
    }

    tracing::info!("Received upload {} ({} bytes)", filename, bytes.len());
    let report = state.pipeline.ingest(&filename, bytes.to_vec()).await?;

    Ok(Json(UploadResponse {
        message: format!("{} processed and added to the database.", report.source_file),
        chunk_count: report.chunk_count,
        replaced: report.replaced,
    }))
}
