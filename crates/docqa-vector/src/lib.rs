//! DocQA Vector - Embeddings and vector store abstraction
//!
//! Provides embedding clients (Ollama, OpenAI) and vector stores
//! (in-memory, Qdrant) for storing and searching chunk embeddings.

use async_trait::async_trait;
use docqa_core::{Chunk, Result, VectorConfig, VectorStoreKind};
use std::sync::Arc;

pub mod embedding;
pub mod memory;
pub mod qdrant_store;

pub use embedding::{create_embedding_client, EmbeddingClient, OllamaEmbedding, OpenAiEmbedding};
pub use memory::InMemoryStore;
pub use qdrant_store::QdrantStore;

/// A chunk together with its embedding, as inserted into a store
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl ChunkRecord {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

/// A chunk returned by a nearest-neighbor query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Distance to the query vector (smaller is closer)
    pub distance: f32,
}

/// Trait for vector database operations
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunk records
    async fn insert(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Delete every chunk whose `source_file` matches, returning how many were removed
    async fn delete_by_source(&self, source_file: &str) -> Result<u64>;

    /// The `limit` nearest chunks, ordered by ascending distance
    async fn query(&self, query_vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Total number of stored chunks
    async fn count(&self) -> Result<usize>;

    /// Distinct source files currently indexed
    async fn list_sources(&self) -> Result<Vec<String>>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// Create the configured vector store
///
/// `dimension` must match the embedding client; it is used to create the
/// Qdrant collection when it does not exist yet.
pub async fn create_vector_store(
    config: &VectorConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorStore>> {
    match config.store {
        VectorStoreKind::Memory => Ok(Arc::new(InMemoryStore::new(config.distance))),
        VectorStoreKind::Qdrant => {
            let store = QdrantStore::new(config, dimension)?;
            store.init_collection().await?;
            Ok(Arc::new(store))
        }
    }
}
