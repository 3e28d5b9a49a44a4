//! Nearest-chunk retrieval for a question

use docqa_core::Result;
use docqa_vector::{EmbeddingClient, ScoredChunk, VectorStore};
use std::sync::Arc;

/// Separator placed between chunk texts in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Chunks retrieved for one question, nearest first
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub chunks: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk texts joined in ranked order
    pub fn context(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Ids of the retrieved chunks, nearest first
    pub fn chunk_ids(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.chunk.id.clone()).collect()
    }
}

/// Embeds questions and looks up their nearest chunks
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The `top_k` chunks nearest to `question`
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        let query_vector = self.embedder.embed(question).await?;
        let chunks = self.store.query(&query_vector, self.top_k).await?;

        tracing::debug!(
            "Retrieved {} chunk(s) from {} for query",
            chunks.len(),
            self.store.name()
        );

        Ok(RetrievalResult { chunks })
    }
}
