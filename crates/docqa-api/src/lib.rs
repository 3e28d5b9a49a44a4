//! DocQA API - HTTP server
//!
//! Serves the upload/query UI and the JSON endpoints backed by a shared
//! [`docqa_rag::RagPipeline`].

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, ApiDoc};
pub use state::AppState;
