//! Distance-to-similarity conversion, match tiers, and threshold filtering.
//!
//! The store reports squared normalized distance for its cosine metric,
//! so `cos = 1 − d/2`. Similarity is the clamped cosine scaled to a
//! percentage, which keeps scores bounded even for degenerate vectors.

use crate::models::{MatchTier, SearchResult, TierCounts};

/// Convert a store-native distance into a bounded similarity percentage
/// and its match-quality tier.
///
/// Monotonic: a smaller distance never yields a lower similarity.
pub fn score_distance(distance: f64) -> (f64, MatchTier) {
    let cosine = (1.0 - distance / 2.0).clamp(0.0, 1.0);
    let similarity = cosine * 100.0;
    (similarity, tier_for(similarity))
}

/// Tier boundaries, inclusive at the lower edge of each tier.
pub fn tier_for(similarity: f64) -> MatchTier {
    if similarity >= 80.0 {
        MatchTier::Strong
    } else if similarity >= 60.0 {
        MatchTier::Moderate
    } else {
        MatchTier::Weak
    }
}

/// Drop results below the similarity threshold (a percentage in
/// `[0, 100]`), preserving the original rank order of survivors.
pub fn filter_by_threshold(results: Vec<SearchResult>, threshold: f64) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| r.similarity >= threshold)
        .collect()
}

/// Distribution of results across match tiers.
pub fn tier_histogram(results: &[SearchResult]) -> TierCounts {
    let mut counts = TierCounts::default();
    for result in results {
        match result.tier {
            MatchTier::Strong => counts.strong += 1,
            MatchTier::Moderate => counts.moderate += 1,
            MatchTier::Weak => counts.weak += 1,
        }
    }
    counts
}
