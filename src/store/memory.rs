//! In-memory [`VectorStore`] implementation.
//!
//! Entries live in a `Vec` behind `std::sync::RwLock`, preserving
//! insertion order, the stable ordering the duplicate-removal pass
//! relies on when picking which copy to keep. Vector search is
//! brute-force cosine over all stored embeddings, reported as squared
//! normalized distance (`2·(1 − cos)`) to match a cosine-configured
//! store.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::StoredEntry;

use super::{StoreError, StoreHit, VectorStore};

/// In-memory store for tests and offline corpus snapshots.
pub struct InMemoryStore {
    dims: usize,
    entries: RwLock<Vec<StoredEntry>>,
}

impl InMemoryStore {
    /// Create an empty store with a fixed embedding dimensionality.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The configured embedding dimensionality.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Append an entry, rejecting duplicate ids and mismatched vectors.
    pub fn insert(&self, entry: StoredEntry) -> Result<(), StoreError> {
        if entry.embedding.len() != self.dims {
            return Err(StoreError::MalformedQuery(format!(
                "entry {} has {} dims, store expects {}",
                entry.id,
                entry.embedding.len(),
                self.dims
            )));
        }
        let mut entries = self.entries.write().unwrap();
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate entry id: {}",
                entry.id
            )));
        }
        entries.push(entry);
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<StoreHit>, StoreError> {
        if embedding.len() != self.dims {
            return Err(StoreError::MalformedQuery(format!(
                "query has {} dims, store expects {}",
                embedding.len(),
                self.dims
            )));
        }

        let entries = self.entries.read().unwrap();
        let mut hits: Vec<StoreHit> = entries
            .iter()
            .map(|entry| {
                let cos = cosine_similarity(embedding, &entry.embedding) as f64;
                StoreHit {
                    entry: entry.clone(),
                    distance: 2.0 * (1.0 - cos),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn case_records(&self, case_id: &str) -> Result<Vec<StoredEntry>, StoreError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .iter()
            .filter(|e| !e.is_attachment() && e.case_id() == Some(case_id))
            .cloned()
            .collect())
    }

    async fn case_attachments(&self, case_id: &str) -> Result<Vec<StoredEntry>, StoreError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.is_attachment() && e.case_id() == Some(case_id))
            .cloned()
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let entries = self.entries.read().unwrap();
        Ok(entries.iter().filter(|e| !e.is_attachment()).cloned().collect())
    }

    async fn all_attachments(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let entries = self.entries.read().unwrap();
        Ok(entries.iter().filter(|e| e.is_attachment()).cloned().collect())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|e| !ids.contains(&e.id));
        Ok(before - entries.len())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().unwrap().len())
    }
}
