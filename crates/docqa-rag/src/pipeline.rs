//! Ingestion and question answering over the shared index

use crate::backends::AnswerBackends;
use crate::prompt::build_prompt;
use crate::retriever::Retriever;
use docqa_core::{
    AppConfig, DocQaError, IngestReport, LlmBackend, Query, RagConfig, Result,
    NO_RELEVANT_INFORMATION,
};
use docqa_parser::{ensure_pdf, ParagraphChunker, PdfExtractor, TextExtractor};
use docqa_vector::{
    create_embedding_client, create_vector_store, ChunkRecord, EmbeddingClient, VectorStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const PREVIEW_CHARS: usize = 80;

/// Answer to one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Plain-text answer
    pub text: String,

    /// Backend that produced the answer; `None` when retrieval found nothing
    pub backend: Option<LlmBackend>,

    /// Ids of the chunks used as context, nearest first
    pub sources: Vec<String>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Document ingestion and retrieval-augmented answering
///
/// One instance is shared by every request. The embedding client, store and
/// LLM clients are injected so tests can substitute in-process fakes.
pub struct RagPipeline {
    extractor: Arc<dyn TextExtractor>,
    chunker: ParagraphChunker,
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    retriever: Retriever,
    backends: AnswerBackends,
}

impl RagPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        backends: AnswerBackends,
        config: &RagConfig,
    ) -> Self {
        Self {
            extractor,
            chunker: ParagraphChunker::new(config.chunk_delimiter.clone()),
            retriever: Retriever::new(embedder.clone(), store.clone(), config.top_k),
            embedder,
            store,
            backends,
        }
    }

    /// Build every component described by `config`
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingClient> =
            Arc::from(create_embedding_client(&config.embedding)?);
        let store = create_vector_store(&config.vector, embedder.dimension()).await?;
        let backends = AnswerBackends::from_config(&config.llm)?;

        tracing::info!(
            "Pipeline ready: embeddings={} ({} dims), store={}, backends={:?}, default={}",
            embedder.model(),
            embedder.dimension(),
            store.name(),
            backends.configured(),
            backends.default_backend()
        );

        let extractor =
            PdfExtractor::new().with_page_breaks_as_paragraphs(config.rag.page_breaks_as_paragraphs);

        Ok(Self::new(
            Arc::new(extractor),
            embedder,
            store,
            backends,
            &config.rag,
        ))
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn backends(&self) -> &AnswerBackends {
        &self.backends
    }

    /// Index an uploaded document, replacing any earlier upload with the same
    /// filename
    pub async fn ingest(&self, filename: &str, bytes: Vec<u8>) -> Result<IngestReport> {
        ensure_pdf(filename)?;

        let replaced = self.store.delete_by_source(filename).await?;
        if replaced > 0 {
            tracing::info!("Removed {} existing chunk(s) for {}", replaced, filename);
        }

        let extractor = self.extractor.clone();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
            .await
            .map_err(|e| DocQaError::Other(anyhow::anyhow!("Extraction task failed: {e}")))?;

        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Text extraction failed for {}: {}", filename, e);
                return Err(DocQaError::EmptyDocument);
            }
        };

        if text.trim().is_empty() {
            return Err(DocQaError::EmptyDocument);
        }
        tracing::info!("Extracted {} characters from {}", text.len(), filename);

        let chunk_count = self.index_text(filename, &text).await?;

        Ok(IngestReport {
            source_file: filename.to_string(),
            chunk_count,
            replaced,
        })
    }

    /// Chunk, embed and insert already-extracted text
    async fn index_text(&self, filename: &str, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(filename, text);
        if chunks.is_empty() {
            return Err(DocQaError::NoProcessableContent);
        }

        tracing::info!("Split {} into {} chunk(s)", filename, chunks.len());
        if let Some(first) = chunks.first() {
            let preview: String = first.text.chars().take(PREVIEW_CHARS).collect();
            tracing::debug!("First chunk preview: {:?}", preview);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(DocQaError::EmbeddingError(format!(
                "Expected {} embeddings from {}, got {}",
                chunks.len(),
                self.embedder.model(),
                vectors.len()
            )));
        }

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| ChunkRecord::new(chunk, vector))
            .collect();
        let inserted = records.len();

        self.store.insert(&records).await?;

        let total = self.store.count().await?;
        tracing::info!(
            "Indexed {} chunk(s) from {}; {} store now holds {} chunk(s)",
            inserted,
            filename,
            self.store.name(),
            total
        );

        Ok(inserted)
    }

    /// Answer a question, selecting the backend by name
    ///
    /// `None` or a blank selector uses the default backend; an unknown name
    /// is rejected before any retrieval happens.
    pub async fn ask(&self, question: &str, llm: Option<&str>) -> Result<Answer> {
        let backend = self.backends.resolve(llm)?;
        self.answer(&Query::new(question).with_backend(backend)).await
    }

    /// Answer a query with its chosen backend
    pub async fn answer(&self, query: &Query) -> Result<Answer> {
        let start_time = Instant::now();

        if query.text.trim().is_empty() {
            return Err(DocQaError::ValidationError(
                "No query provided".to_string(),
            ));
        }

        let retrieval = self.retriever.retrieve(&query.text).await?;
        tracing::info!(
            "Retrieved {} of up to {} chunk(s) for query",
            retrieval.len(),
            self.retriever.top_k()
        );

        if retrieval.is_empty() {
            return Ok(Answer {
                text: NO_RELEVANT_INFORMATION.to_string(),
                backend: None,
                sources: Vec::new(),
                processing_time_ms: start_time.elapsed().as_millis() as u64,
            });
        }

        let prompt = build_prompt(&retrieval.context(), &query.text);
        tracing::info!(
            "Calling {} with prompt length: {} chars",
            query.backend,
            prompt.len()
        );

        let text = self.backends.generate(query.backend, &prompt).await?;
        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!("Query answered in {}ms", processing_time_ms);

        Ok(Answer {
            text,
            backend: Some(query.backend),
            sources: retrieval.chunk_ids(),
            processing_time_ms,
        })
    }
}
