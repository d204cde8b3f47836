//! Offline corpus snapshots.
//!
//! The store this crate runs against is normally an external service.
//! For CLI runs and tests, a JSON snapshot of store entries can be
//! loaded into an [`InMemoryStore`] instead: an array of objects with
//! `document`, `embedding`, `metadata`, and an optional `id` (a v4 UUID
//! is assigned when absent). Loading happens once at startup; the crate
//! still persists nothing of its own.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::StoredEntry;
use crate::store::memory::InMemoryStore;

#[derive(Debug, Deserialize)]
struct CorpusEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    document: String,
    embedding: Vec<f32>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

/// Load a JSON corpus snapshot into the store.
///
/// Returns the number of entries loaded. An entry whose embedding does
/// not match the store's dimensionality, or whose id collides, aborts
/// the load; a half-loaded corpus is worse than none.
pub fn load_corpus(path: &Path, store: &InMemoryStore) -> Result<usize> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("failed to read corpus file {}: {e}", path.display()))
    })?;

    let entries: Vec<CorpusEntry> = serde_json::from_str(&content)
        .map_err(|e| Error::Configuration(format!("failed to parse corpus file: {e}")))?;

    let mut loaded = 0usize;
    for entry in entries {
        let stored = StoredEntry {
            id: entry
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            document: entry.document,
            embedding: entry.embedding,
            metadata: entry.metadata,
        };
        store
            .insert(stored)
            .map_err(|e| Error::Configuration(format!("corpus entry rejected: {e}")))?;
        loaded += 1;
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_corpus_assigns_ids() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"[
              {"id": "q1", "document": "Q: a\nA: b", "embedding": [1.0, 0.0],
               "metadata": {"laq_num": "42"}},
              {"document": "unnamed", "embedding": [0.0, 1.0]}
            ]"#,
        )
        .unwrap();

        let store = InMemoryStore::new(2);
        let loaded = load_corpus(tmp.path(), &store).unwrap();
        assert_eq!(loaded, 2);
    }

    #[test]
    fn test_load_corpus_rejects_wrong_dims() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"[{"id": "q1", "document": "x", "embedding": [1.0]}]"#,
        )
        .unwrap();

        let store = InMemoryStore::new(2);
        assert!(matches!(
            load_corpus(tmp.path(), &store),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_load_corpus_rejects_bad_json() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not json").unwrap();
        let store = InMemoryStore::new(2);
        assert!(load_corpus(tmp.path(), &store).is_err());
    }
}
