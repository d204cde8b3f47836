//! Core data models shared across retrieval and validation.
//!
//! These types represent the stored question/answer entries, the ephemeral
//! search results, and the validation reports that flow through the
//! pipeline. Stored entries are created and mutated by the (external)
//! ingestion pipeline; this crate is read-only over them except for
//! duplicate-attachment removal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known metadata keys, matching the layout the ingestion pipeline
/// writes into the store.
pub mod meta {
    /// External case identifier: the Legislative Assembly Question number.
    pub const LAQ_NUM: &str = "laq_num";
    /// Source document identifier (originating PDF name).
    pub const PDF: &str = "pdf";
    /// Record type. Attachments carry [`TYPE_ANNEXURE`]; everything else
    /// is a question/answer record.
    pub const TYPE: &str = "type";
    /// Marker value distinguishing attachment entries.
    pub const TYPE_ANNEXURE: &str = "annexure";
    /// Raw attachment label on an attachment entry ("Annexure-I", ...).
    pub const ANNEXURE_LABEL: &str = "annexure_label";
    /// JSON-serialized list of raw attachment references parsed from the
    /// answer text.
    pub const ATTACHMENTS: &str = "attachments";
    pub const QUESTION: &str = "question";
    pub const ANSWER: &str = "answer";
    pub const MINISTER: &str = "minister";
    pub const DATE: &str = "date";
    pub const TABLED_BY: &str = "tabled_by";
    /// Originating file name on an attachment entry.
    pub const ANNEXURE_FILE: &str = "annexure_file";
    /// Number of sheets/parts in the attachment source file.
    pub const SHEET_COUNT: &str = "sheet_count";
}

/// One stored unit in the vector store: a question/answer record or an
/// attachment, distinguished by the `type` metadata key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Unique id within the store.
    pub id: String,
    /// Full text content (the embedded document).
    pub document: String,
    /// Embedding vector; length must equal the store's configured
    /// dimensionality.
    pub embedding: Vec<f32>,
    /// Free-form metadata mapping.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl StoredEntry {
    /// Whether this entry is an attachment rather than a Q&A record.
    pub fn is_attachment(&self) -> bool {
        self.metadata.get(meta::TYPE).map(String::as_str) == Some(meta::TYPE_ANNEXURE)
    }

    /// The case identifier grouping this entry with its attachments.
    pub fn case_id(&self) -> Option<&str> {
        self.metadata.get(meta::LAQ_NUM).map(String::as_str)
    }
}

/// Discrete bucket summarizing a similarity percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchTier {
    Strong,
    Moderate,
    Weak,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Strong => write!(f, "STRONG MATCH"),
            MatchTier::Moderate => write!(f, "MODERATE MATCH"),
            MatchTier::Weak => write!(f, "WEAK MATCH"),
        }
    }
}

/// A ranked retrieval result. Computed per call, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Id of the matched entry.
    pub id: String,
    /// Similarity percentage in `[0.0, 100.0]`.
    pub similarity: f64,
    /// Match-quality tier derived from the similarity.
    pub tier: MatchTier,
    /// 1-based position after filtering.
    pub rank: usize,
    /// Metadata of the matched entry.
    pub metadata: BTreeMap<String, String>,
    /// Document text of the matched entry.
    pub document: String,
}

/// Overall verdict of a cross-reference check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// Per-case reconciliation of referenced vs. available attachment labels.
///
/// All label sets hold normalized labels and are reported in sorted order.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub case_id: String,
    /// Source document the case was grouped under ("unknown" when the
    /// record carries no source metadata).
    pub source: String,
    /// Number of Q&A records inspected for this case.
    pub record_count: usize,
    /// Number of attachments stored for this case.
    pub attachment_count: usize,
    /// Labels the answers claim to cite.
    pub referenced: Vec<String>,
    /// Labels actually present in storage.
    pub available: Vec<String>,
    /// referenced − available.
    pub missing: Vec<String>,
    /// available − referenced.
    pub unreferenced: Vec<String>,
    pub status: ValidationStatus,
    /// Human-readable issue lines; present only for non-empty sets.
    pub issues: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

/// Aggregate outcome of a bulk validation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    /// Number of case groups validated.
    pub total_validated: usize,
    /// Number of case groups carrying at least one issue message. A
    /// group with an unreadable reference list and no set differences
    /// counts here while still counting as `valid`, so this can exceed
    /// `invalid`.
    pub total_with_issues: usize,
    pub valid: usize,
    pub invalid: usize,
    pub overall_status: ValidationStatus,
    pub reports: Vec<ValidationReport>,
}

/// Corpus-wide attachment usage statistics.
#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    /// Total attachment entries in the store.
    pub total_attachments: usize,
    /// Distinct normalized attachment labels.
    pub unique_attachment_labels: usize,
    /// Total reference occurrences across all records, repeats included.
    pub total_references: usize,
    /// Distinct normalized labels referenced at least once.
    pub unique_referenced: usize,
    /// Normalized label → occurrence count, sorted by label.
    pub usage_breakdown: BTreeMap<String, usize>,
    /// Available but never referenced, sorted.
    pub unreferenced_attachments: Vec<String>,
    /// Referenced but absent from storage, sorted.
    pub referenced_but_missing: Vec<String>,
}

/// Counts of results per match tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub strong: usize,
    pub moderate: usize,
    pub weak: usize,
}

/// Attachments sharing one `(case id, normalized label)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub case_id: String,
    pub label: String,
    /// Id of the copy retained (earliest by insertion order).
    pub kept: String,
    /// Ids of the redundant copies.
    pub redundant: Vec<String>,
}

/// Outcome of a duplicate-removal pass.
#[derive(Debug, Clone, Serialize)]
pub struct DedupOutcome {
    /// Duplicate groups that still held redundant copies at deletion time.
    pub groups_affected: usize,
    /// Ids actually removed from the store.
    pub removed: Vec<String>,
}
