//! Vector store abstraction.
//!
//! The [`VectorStore`] trait defines the operations the retrieval and
//! validation pipelines need from the external store: nearest-neighbor
//! query, scoped metadata fetch by case identifier, bulk scans, and
//! delete-by-id. The store is consumed as an opaque service; index
//! internals and persisted layout are entirely its own.
//!
//! Implementations must be `Send + Sync` to run concurrent queries
//! across unrelated cases without coordination.

pub mod memory;

use async_trait::async_trait;

use crate::models::StoredEntry;

/// Failures at the store boundary.
///
/// Callers map these into the library taxonomy: `Unavailable` and
/// `MalformedQuery` both abort the current operation, since partial
/// results would be misleading.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The query itself is invalid (e.g. wrong vector dimensionality).
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}

/// A raw nearest-neighbor hit: an entry plus its store-native distance.
///
/// Distance semantics depend on the store's configured metric; for a
/// cosine-configured store this is the squared normalized distance.
#[derive(Debug, Clone)]
pub struct StoreHit {
    pub entry: StoredEntry,
    pub distance: f64,
}

/// Abstract vector store backend.
///
/// All read operations are side-effect free and may run concurrently.
/// [`delete_many`](VectorStore::delete_many) is the only mutating
/// operation and must be atomic per call.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest-neighbor query, ascending distance, no re-ranking.
    ///
    /// Fails with [`StoreError::MalformedQuery`] when the embedding does
    /// not match the store's configured dimensionality.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<StoreHit>, StoreError>;

    /// All non-attachment records for a case, in insertion order.
    async fn case_records(&self, case_id: &str) -> Result<Vec<StoredEntry>, StoreError>;

    /// All attachments for a case, in insertion order.
    async fn case_attachments(&self, case_id: &str) -> Result<Vec<StoredEntry>, StoreError>;

    /// Every non-attachment record in the store.
    async fn all_records(&self) -> Result<Vec<StoredEntry>, StoreError>;

    /// Every attachment in the store, in insertion order.
    async fn all_attachments(&self) -> Result<Vec<StoredEntry>, StoreError>;

    /// Delete entries by id, atomically for the whole call.
    ///
    /// Ids that no longer exist are a benign no-op; the return value is
    /// the number of entries actually removed.
    async fn delete_many(&self, ids: &[String]) -> Result<usize, StoreError>;

    /// Total number of entries (records and attachments).
    async fn count(&self) -> Result<usize, StoreError>;
}
