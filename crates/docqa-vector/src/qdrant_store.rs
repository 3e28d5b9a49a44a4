//! Qdrant implementation for vector storage
//!
//! Chunk ids (`"<filename>_<index>"`) are not valid Qdrant point ids, so each
//! point gets a UUIDv5 derived from the chunk id and the original id travels
//! in the payload.

use crate::{ChunkRecord, ScoredChunk, VectorStore};
use async_trait::async_trait;
use docqa_core::{Chunk, DistanceMetric, DocQaError, Result, VectorConfig};
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    Filter, PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

const SCROLL_PAGE_SIZE: u32 = 256;

/// Qdrant vector store implementation
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
    metric: DistanceMetric,
}

impl QdrantStore {
    /// Create a new Qdrant connection
    pub fn new(config: &VectorConfig, dimension: usize) -> Result<Self> {
        let client = Qdrant::from_url(&config.qdrant_url)
            .build()
            .map_err(|e| DocQaError::VectorStoreError(format!("Qdrant connection failed: {e}")))?;

        Ok(Self {
            client,
            collection: config.qdrant_collection.clone(),
            dimension,
            metric: config.distance,
        })
    }

    /// Initialize collection (run once on setup)
    pub async fn init_collection(&self) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(|e| {
            DocQaError::VectorStoreError(format!("Failed to list collections: {e}"))
        })?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            let distance = match self.metric {
                DistanceMetric::Cosine => Distance::Cosine,
                DistanceMetric::L2 => Distance::Euclid,
            };

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(self.dimension as u64, distance)),
                )
                .await
                .map_err(|e| {
                    DocQaError::VectorStoreError(format!("Failed to create collection: {e}"))
                })?;

            tracing::info!(
                "Created Qdrant collection '{}' (dimension {})",
                self.collection,
                self.dimension
            );
        }

        Ok(())
    }

    fn source_filter(source_file: &str) -> Filter {
        Filter::must([Condition::matches("source_file", source_file.to_string())])
    }

    /// Qdrant reports cosine similarity; convert to a distance
    fn to_distance(&self, score: f32) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => 1.0 - score,
            DistanceMetric::L2 => score,
        }
    }
}

/// Deterministic point id for a chunk id
pub fn point_id(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

/// Payload stored with each vector
#[derive(Debug, Clone, Serialize)]
struct VectorPayload<'a> {
    chunk_id: &'a str,
    text: &'a str,
    source_file: &'a str,
}

fn payload_string(
    payload: &HashMap<String, qdrant_client::qdrant::Value>,
    key: &str,
) -> Option<String> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn insert(&self, records: &[ChunkRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(records.len());
        for record in records {
            let payload = VectorPayload {
                chunk_id: &record.chunk.id,
                text: &record.chunk.text,
                source_file: &record.chunk.source_file,
            };

            let payload_map: HashMap<String, qdrant_client::qdrant::Value> =
                serde_json::to_value(&payload)
                    .map_err(|e| {
                        DocQaError::VectorStoreError(format!("Failed to encode payload: {e}"))
                    })?
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect();

            points.push(PointStruct::new(
                point_id(&record.chunk.id),
                record.vector.clone(),
                payload_map,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| DocQaError::VectorStoreError(format!("Failed to upsert vectors: {e}")))?;

        Ok(())
    }

    async fn delete_by_source(&self, source_file: &str) -> Result<u64> {
        let filter = Self::source_filter(source_file);

        let existing = self
            .client
            .count(
                CountPointsBuilder::new(&self.collection)
                    .filter(filter.clone())
                    .exact(true),
            )
            .await
            .map_err(|e| DocQaError::VectorStoreError(format!("Failed to count vectors: {e}")))?
            .result
            .map(|r| r.count)
            .unwrap_or(0);

        if existing == 0 {
            return Ok(0);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| DocQaError::VectorStoreError(format!("Failed to delete vectors: {e}")))?;

        Ok(existing)
    }

    async fn query(&self, query_vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DocQaError::VectorStoreError(format!("Vector search failed: {e}")))?;

        let chunks = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = &point.payload;
                let Some(text) = payload_string(payload, "text") else {
                    tracing::warn!("Skipping Qdrant point without text payload");
                    return None;
                };

                Some(ScoredChunk {
                    chunk: Chunk {
                        id: payload_string(payload, "chunk_id").unwrap_or_default(),
                        text,
                        source_file: payload_string(payload, "source_file").unwrap_or_default(),
                    },
                    distance: self.to_distance(point.score),
                })
            })
            .collect();

        Ok(chunks)
    }

    async fn count(&self) -> Result<usize> {
        let count = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DocQaError::VectorStoreError(format!("Failed to count vectors: {e}")))?
            .result
            .map(|r| r.count)
            .unwrap_or(0);

        Ok(count as usize)
    }

    async fn list_sources(&self) -> Result<Vec<String>> {
        let mut sources = BTreeSet::new();
        let mut offset = None;

        loop {
            let mut request = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true)
                .with_vectors(false);
            if let Some(next) = offset.take() {
                request = request.offset(next);
            }

            let page = self
                .client
                .scroll(request)
                .await
                .map_err(|e| DocQaError::VectorStoreError(format!("Failed to scroll: {e}")))?;

            sources.extend(
                page.result
                    .iter()
                    .filter_map(|point| payload_string(&point.payload, "source_file")),
            );

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(sources.into_iter().collect())
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
