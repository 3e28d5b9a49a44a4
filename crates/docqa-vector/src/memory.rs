//! In-memory vector store
//!
//! Process-lifetime index with brute-force nearest-neighbor search. Each
//! operation takes the lock on its own, so a delete followed by an insert is
//! not atomic with respect to concurrent queries.

use crate::{ChunkRecord, ScoredChunk, VectorStore};
use async_trait::async_trait;
use docqa_core::{DistanceMetric, DocQaError, Result};
use std::collections::{BTreeSet, HashSet};
use tokio::sync::RwLock;

/// In-memory vector store
pub struct InMemoryStore {
    records: RwLock<Vec<ChunkRecord>>,
    metric: DistanceMetric,
}

impl InMemoryStore {
    /// Create an empty store ranking by `metric`
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            metric,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DistanceMetric::Cosine)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn insert(&self, records: &[ChunkRecord]) -> Result<()> {
        let mut stored = self.records.write().await;

        if let Some(expected) = stored.first().map(|r| r.vector.len()) {
            if let Some(bad) = records.iter().find(|r| r.vector.len() != expected) {
                return Err(DocQaError::VectorStoreError(format!(
                    "Dimension mismatch for {}: expected {expected}, got {}",
                    bad.chunk.id,
                    bad.vector.len()
                )));
            }
        }

        // Ids are unique; a repeated id replaces the earlier record
        let incoming: HashSet<&str> = records.iter().map(|r| r.chunk.id.as_str()).collect();
        stored.retain(|r| !incoming.contains(r.chunk.id.as_str()));

        // Within one batch the last record for an id wins
        let mut seen = HashSet::with_capacity(incoming.len());
        let mut batch: Vec<ChunkRecord> = records
            .iter()
            .rev()
            .filter(|r| seen.insert(r.chunk.id.as_str()))
            .cloned()
            .collect();
        batch.reverse();
        stored.extend(batch);

        Ok(())
    }

    async fn delete_by_source(&self, source_file: &str) -> Result<u64> {
        let mut stored = self.records.write().await;
        let before = stored.len();
        stored.retain(|r| r.chunk.source_file != source_file);
        Ok((before - stored.len()) as u64)
    }

    async fn query(&self, query_vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let stored = self.records.read().await;

        let mut scored: Vec<ScoredChunk> = stored
            .iter()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                distance: distance(self.metric, query_vector, &record.vector),
            })
            .collect();

        // Stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(limit);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn list_sources(&self) -> Result<Vec<String>> {
        let stored = self.records.read().await;
        let sources: BTreeSet<&str> = stored.iter().map(|r| r.chunk.source_file.as_str()).collect();
        Ok(sources.into_iter().map(str::to_string).collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Distance between two vectors; mismatched lengths are maximally distant
pub fn distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    match metric {
        DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        DistanceMetric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
