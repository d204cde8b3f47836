//! Cross-reference validation: reconciling the attachment labels answers
//! claim to cite against the labels actually present in storage.
//!
//! Every comparison happens in normalized label space. A per-record
//! parsing anomaly (malformed reference list) is isolated to that case's
//! issue list so one corrupt record cannot abort a bulk sweep; a store
//! failure aborts the whole operation instead, because a partial report
//! would be misleading; an inability to check is never reported as
//! `valid`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::labels::{normalize, referenced_labels};
use crate::models::{
    meta, DedupOutcome, DuplicateGroup, StoredEntry, UsageStats, ValidationReport,
    ValidationStatus, ValidationSummary,
};
use crate::store::VectorStore;

/// Sentinel for records carrying no source-document metadata. Such
/// records still participate in grouping instead of being dropped.
const UNKNOWN_SOURCE: &str = "unknown";

/// Reconciles referenced vs. available attachment labels, per case and
/// in bulk, and detects duplicate attachment uploads.
pub struct Validator {
    store: Arc<dyn VectorStore>,
}

impl Validator {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Validate a single case: union the reference sets of its records,
    /// normalize its attachment labels, and compute the two difference
    /// sets. `missing` and `unreferenced` issues are emitted only when
    /// the corresponding set is non-empty.
    pub async fn validate_case(&self, case_id: &str) -> Result<ValidationReport> {
        let records = self
            .store
            .case_records(case_id)
            .await
            .map_err(Error::validation)?;
        self.report_for(case_id, None, &records).await
    }

    async fn report_for(
        &self,
        case_id: &str,
        source: Option<&str>,
        records: &[StoredEntry],
    ) -> Result<ValidationReport> {
        let attachments = self
            .store
            .case_attachments(case_id)
            .await
            .map_err(Error::validation)?;

        let mut referenced: BTreeSet<String> = BTreeSet::new();
        let mut issues: Vec<String> = Vec::new();

        for record in records {
            let refs = referenced_labels(&record.metadata);
            if refs.malformed {
                issues.push(format!(
                    "Record {}: unreadable reference list; treated as no references",
                    record.id
                ));
            }
            referenced.extend(
                refs.labels
                    .iter()
                    .map(|raw| normalize(raw))
                    .filter(|label| !label.is_empty()),
            );
        }

        let available: BTreeSet<String> = attachments
            .iter()
            .filter_map(|a| a.metadata.get(meta::ANNEXURE_LABEL))
            .map(|raw| normalize(raw))
            .filter(|label| !label.is_empty())
            .collect();

        let missing: Vec<String> = referenced.difference(&available).cloned().collect();
        let unreferenced: Vec<String> = available.difference(&referenced).cloned().collect();

        if !missing.is_empty() {
            issues.push(format!("Missing annexure(s): {}", missing.join(", ")));
        }
        if !unreferenced.is_empty() {
            issues.push(format!(
                "Unreferenced annexure(s): {}",
                unreferenced.join(", ")
            ));
        }

        let status = if missing.is_empty() && unreferenced.is_empty() {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        };

        let source_label = source
            .map(str::to_string)
            .or_else(|| {
                records
                    .iter()
                    .find_map(|r| r.metadata.get(meta::PDF).cloned())
            })
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Ok(ValidationReport {
            case_id: case_id.to_string(),
            source: source_label,
            record_count: records.len(),
            attachment_count: attachments.len(),
            referenced: referenced.into_iter().collect(),
            available: available.into_iter().collect(),
            missing,
            unreferenced,
            status,
            issues,
        })
    }

    /// Validate every case group in the store.
    ///
    /// Records are grouped by `(case id, source)`; a missing source is
    /// substituted with `"unknown"` so no record is dropped from the
    /// sweep. Groups are processed in deterministic (sorted) order.
    pub async fn validate_all(&self) -> Result<ValidationSummary> {
        let all_records = self.store.all_records().await.map_err(Error::validation)?;

        let mut groups: BTreeMap<(String, String), Vec<StoredEntry>> = BTreeMap::new();
        for record in all_records {
            let case_id = record
                .case_id()
                .unwrap_or(UNKNOWN_SOURCE)
                .to_string();
            let source = record
                .metadata
                .get(meta::PDF)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
            groups.entry((case_id, source)).or_default().push(record);
        }

        let mut reports = Vec::with_capacity(groups.len());
        for ((case_id, source), records) in &groups {
            let report = self.report_for(case_id, Some(source), records).await?;
            reports.push(report);
        }

        let total_validated = reports.len();
        let total_with_issues = reports.iter().filter(|r| !r.issues.is_empty()).count();
        let invalid = reports.iter().filter(|r| !r.is_valid()).count();
        let valid = total_validated - invalid;

        debug!(total_validated, invalid, "bulk validation sweep finished");

        Ok(ValidationSummary {
            total_validated,
            total_with_issues,
            valid,
            invalid,
            overall_status: if invalid == 0 {
                ValidationStatus::Valid
            } else {
                ValidationStatus::Invalid
            },
            reports,
        })
    }

    /// Corpus-wide attachment usage statistics.
    ///
    /// Reference occurrences count repeats; the breakdown map is keyed
    /// and sorted by normalized label.
    pub async fn usage_stats(&self) -> Result<UsageStats> {
        let records = self.store.all_records().await.map_err(Error::validation)?;
        let attachments = self
            .store
            .all_attachments()
            .await
            .map_err(Error::validation)?;

        let mut usage_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_references = 0usize;

        for record in &records {
            let refs = referenced_labels(&record.metadata);
            if refs.malformed {
                warn!(record = %record.id, "skipping malformed reference list in usage stats");
            }
            for raw in &refs.labels {
                let label = normalize(raw);
                if label.is_empty() {
                    continue;
                }
                *usage_breakdown.entry(label).or_insert(0) += 1;
                total_references += 1;
            }
        }

        let available: BTreeSet<String> = attachments
            .iter()
            .filter_map(|a| a.metadata.get(meta::ANNEXURE_LABEL))
            .map(|raw| normalize(raw))
            .filter(|label| !label.is_empty())
            .collect();

        let referenced: BTreeSet<String> = usage_breakdown.keys().cloned().collect();

        Ok(UsageStats {
            total_attachments: attachments.len(),
            unique_attachment_labels: available.len(),
            total_references,
            unique_referenced: usage_breakdown.len(),
            unreferenced_attachments: available.difference(&referenced).cloned().collect(),
            referenced_but_missing: referenced.difference(&available).cloned().collect(),
            usage_breakdown,
        })
    }

    /// Find attachment uploads sharing a `(case id, normalized label)`
    /// pair. The earliest copy (insertion order) is kept; the rest are
    /// redundant. Attachments without a case id or a usable label cannot
    /// be reconciled and are left alone.
    pub async fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>> {
        let attachments = self
            .store
            .all_attachments()
            .await
            .map_err(Error::validation)?;
        Ok(duplicate_groups(&attachments))
    }

    /// Remove redundant duplicate attachments.
    ///
    /// The duplicate set is re-confirmed per group immediately before
    /// deletion, so a concurrent upload between scan and delete is not
    /// removed incorrectly. Deletion is atomic per group; ids that
    /// vanished in the meantime are a benign outcome, not an error.
    pub async fn remove_duplicates(&self) -> Result<DedupOutcome> {
        let candidates = self.find_duplicates().await?;

        let mut removed = Vec::new();
        let mut groups_affected = 0usize;

        for group in &candidates {
            // Optimistic re-check against the current store state.
            let current = self
                .store
                .case_attachments(&group.case_id)
                .await
                .map_err(Error::validation)?;
            let still_redundant: Vec<String> = duplicate_groups(&current)
                .into_iter()
                .find(|g| g.label == group.label)
                .map(|g| g.redundant)
                .unwrap_or_default();

            if still_redundant.is_empty() {
                continue;
            }

            let deleted = self
                .store
                .delete_many(&still_redundant)
                .await
                .map_err(Error::validation)?;
            if deleted > 0 {
                groups_affected += 1;
                removed.extend(still_redundant);
            }
        }

        Ok(DedupOutcome {
            groups_affected,
            removed,
        })
    }
}

/// Group attachments by `(case id, normalized label)` and report every
/// group holding more than one copy. Input order decides which copy is
/// kept.
fn duplicate_groups(attachments: &[StoredEntry]) -> Vec<DuplicateGroup> {
    let mut grouped: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();

    for attachment in attachments {
        let Some(case_id) = attachment.case_id() else {
            continue;
        };
        let label = attachment
            .metadata
            .get(meta::ANNEXURE_LABEL)
            .map(|raw| normalize(raw))
            .unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        grouped
            .entry((case_id.to_string(), label))
            .or_default()
            .push(attachment.id.clone());
    }

    grouped
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((case_id, label), mut ids)| {
            let kept = ids.remove(0);
            DuplicateGroup {
                case_id,
                label,
                kept,
                redundant: ids,
            }
        })
        .collect()
}
