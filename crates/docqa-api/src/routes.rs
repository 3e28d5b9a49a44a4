//! API route definitions

use crate::error::ApiError;
use crate::handlers::{documents, health, query, ui};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::metrics,
        documents::upload_document,
        query::query_handler,
    ),
    components(schemas(
        ApiError,
        health::HealthResponse,
        health::MetricsResponse,
        documents::UploadResponse,
        documents::UploadForm,
        query::QueryRequest,
        query::QueryResponse,
    )),
    tags(
        (name = "health", description = "Liveness and metrics"),
        (name = "documents", description = "PDF ingestion"),
        (name = "query", description = "Question answering")
    ),
    info(title = "DocQA API", description = "Ask questions about uploaded PDF documents")
)]
pub struct ApiDoc;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(documents::upload_document))
        .route("/query", post(query::query_handler))
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_size;
    let cors = cors_layer(&state.config.server.cors_origins);

    let mut router = Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// CORS for the configured origins; `*` allows any origin, none disables CORS
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(allowed))
}
