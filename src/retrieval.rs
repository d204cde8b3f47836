//! The retrieval pipeline: query embedding, nearest-neighbor query,
//! scoring, threshold filtering, ranking.
//!
//! The store returns hits ordered by ascending distance and this module
//! performs no re-ranking; scoring is monotonic, so converting distances
//! to similarity percentages preserves the store's order. Filtering
//! drops sub-threshold results without disturbing the order of the
//! survivors.

use std::sync::Arc;

use tracing::debug;

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::models::SearchResult;
use crate::scoring::{filter_by_threshold, score_distance};
use crate::store::VectorStore;

/// Embedding-based similarity retrieval over the external store.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Retrieve records relevant to a query string.
    ///
    /// Embeds the query, runs the nearest-neighbor search, converts
    /// distances to similarity percentages with match tiers, optionally
    /// applies the configured relevance threshold, and assigns 1-based
    /// ranks. A blank query yields an empty result set.
    ///
    /// Store or provider failures surface as
    /// [`Error::RetrievalUnavailable`], reported once: the result is
    /// either complete or an explicit failure, never truncated.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        apply_threshold: bool,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let k = top_k.unwrap_or(self.config.search_top_k);
        let query_vec = self.provider.embed(query).await?;

        let hits = self
            .store
            .query(&query_vec, k)
            .await
            .map_err(Error::retrieval)?;

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .map(|hit| {
                let (similarity, tier) = score_distance(hit.distance);
                SearchResult {
                    id: hit.entry.id,
                    similarity,
                    tier,
                    rank: 0,
                    metadata: hit.entry.metadata,
                    document: hit.entry.document,
                }
            })
            .collect();

        if apply_threshold {
            let before = results.len();
            results = filter_by_threshold(results, self.config.similarity_threshold);
            debug!(
                threshold = self.config.similarity_threshold,
                kept = results.len(),
                dropped = before - results.len(),
                "relevance filter applied"
            );
        }

        for (i, result) in results.iter_mut().enumerate() {
            result.rank = i + 1;
        }

        Ok(results)
    }

    /// Retrieve the context set for answer generation: a thresholded
    /// search capped at the configured context result count.
    pub async fn context_results(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search(query, Some(self.config.context_top_k), true)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{MatchTier, StoredEntry};
    use crate::store::memory::InMemoryStore;

    /// Deterministic provider: hands back a fixed vector for any text.
    struct FixedProvider(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn entry(id: &str, embedding: Vec<f32>) -> StoredEntry {
        StoredEntry {
            id: id.to_string(),
            document: format!("doc {id}"),
            embedding,
            metadata: BTreeMap::new(),
        }
    }

    fn retriever(store: Arc<InMemoryStore>, threshold: f64) -> Retriever {
        Retriever::new(
            store,
            Arc::new(FixedProvider(vec![1.0, 0.0])),
            RetrievalConfig {
                search_top_k: 10,
                context_top_k: 2,
                similarity_threshold: threshold,
            },
        )
    }

    #[tokio::test]
    async fn test_search_ranks_and_tiers() {
        let store = Arc::new(InMemoryStore::new(2));
        store.insert(entry("exact", vec![1.0, 0.0])).unwrap();
        store.insert(entry("close", vec![0.9, 0.3])).unwrap();
        store.insert(entry("orthogonal", vec![0.0, 1.0])).unwrap();

        let results = retriever(store, 0.0).search("q", None, false).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "exact");
        assert_eq!(results[0].rank, 1);
        assert!((results[0].similarity - 100.0).abs() < 1e-6);
        assert_eq!(results[0].tier, MatchTier::Strong);

        assert_eq!(results[2].id, "orthogonal");
        assert_eq!(results[2].rank, 3);
        assert_eq!(results[2].tier, MatchTier::Weak);

        // Similarity never increases down the ranking.
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[tokio::test]
    async fn test_threshold_drops_weak_results() {
        let store = Arc::new(InMemoryStore::new(2));
        store.insert(entry("exact", vec![1.0, 0.0])).unwrap();
        store.insert(entry("orthogonal", vec![0.0, 1.0])).unwrap();

        let results = retriever(store, 50.0).search("q", None, true).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "exact");
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn test_blank_query_empty_result() {
        let store = Arc::new(InMemoryStore::new(2));
        store.insert(entry("a", vec![1.0, 0.0])).unwrap();
        let results = retriever(store, 0.0).search("   ", None, true).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_dims_surfaces_retrieval_unavailable() {
        // Store is 3-dimensional but the provider emits 2-dim vectors.
        let store = Arc::new(InMemoryStore::new(3));
        store.insert(entry("a", vec![1.0, 0.0, 0.0])).unwrap();

        let err = retriever(store, 0.0)
            .search("q", None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RetrievalUnavailable(_)));
    }

    #[tokio::test]
    async fn test_context_results_capped() {
        let store = Arc::new(InMemoryStore::new(2));
        for i in 0..5 {
            store
                .insert(entry(&format!("r{i}"), vec![1.0, i as f32 * 0.01]))
                .unwrap();
        }

        let results = retriever(store, 0.0).context_results("q").await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
