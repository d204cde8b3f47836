//! Attachment label normalization and reference extraction.
//!
//! Raw attachment labels arrive in every spelling the source documents
//! use ("Annexure-I", "annexure ii", "ANEXURES I"). Two raw labels refer
//! to the same attachment iff their normalized forms are equal, so every
//! comparison in the validator goes through [`normalize`].
//!
//! Normalization is an ordered rule table: each rule is a tagged regex
//! evaluated in sequence, and the first match wins. New label conventions
//! are added as rules, not as control flow.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::meta;

/// A single normalization rule: a pattern whose first capture group is
/// the canonical token.
struct LabelRule {
    /// Short tag naming the convention the rule recognizes.
    tag: &'static str,
    pattern: Regex,
}

/// Ordered rule table. Applied to the trimmed, upper-cased input.
fn rules() -> &'static [LabelRule] {
    static RULES: OnceLock<Vec<LabelRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            // "ANNEXURE - I", "ANNEXURES II", "ANNEX A", and the common
            // misspelling "ANEXURE(S) I": keyword + separator + token.
            LabelRule {
                tag: "annexure-keyword",
                pattern: Regex::new(r"\bANN?EX(?:URE)?S?[\s\-–:.]+([A-Z0-9]+)\b").unwrap(),
            },
            // Bare Roman numeral anywhere in the label.
            LabelRule {
                tag: "roman-numeral",
                pattern: Regex::new(r"\b([IVXLCDM]+)\b").unwrap(),
            },
        ]
    })
}

/// Canonicalize a raw attachment label into its comparable key.
///
/// Idempotent and case-insensitive. Unparseable labels fall through
/// upper-cased and trimmed, so they remain comparable to themselves.
/// Empty input normalizes to the empty string, which never matches any
/// non-empty label.
pub fn normalize(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return String::new();
    }

    for rule in rules() {
        if let Some(caps) = rule.pattern.captures(&upper) {
            let token = caps[1].to_string();
            tracing::trace!(rule = rule.tag, %raw, %token, "label normalized");
            return token;
        }
    }

    upper
}

/// Result of extracting a record's claimed attachment references.
#[derive(Debug, Clone, Default)]
pub struct ExtractedRefs {
    /// Raw labels in order of first occurrence, duplicates preserved.
    /// De-duplication happens downstream via [`normalize`].
    pub labels: Vec<String>,
    /// A serialized reference list was present but failed to parse.
    pub malformed: bool,
}

/// Parse a serialized (JSON array) reference list.
///
/// Returns [`Error::MalformedReferenceData`] on a decode failure; bulk
/// callers recover by substituting an empty set instead of propagating.
pub fn parse_reference_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw)
        .map_err(|e| Error::MalformedReferenceData(e.to_string()))
}

/// Word "Annexure" (not the bare plural) + optional separator + token.
fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bAnnexure\b\s*[-–:]?\s*([A-Za-z0-9]+)").unwrap())
}

/// Scan free text for attachment references.
///
/// Matches the literal word "Annexure" followed by an optional separator
/// and an alphanumeric token. The bare plural "Annexures" with no label
/// does not match. Matches are returned in order of first occurrence with
/// duplicates preserved.
pub fn extract_references(text: &str) -> Vec<String> {
    reference_pattern()
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Produce the raw reference labels a record claims to cite.
///
/// Prefers the pre-parsed list serialized under the `attachments`
/// metadata key; a malformed list contributes an empty set and is
/// flagged, never fatal. Scanning the answer text happens only when no
/// serialized list is present at all: a corrupt list must not invent
/// references out of prose. Records with neither yield an empty set.
pub fn referenced_labels(metadata: &BTreeMap<String, String>) -> ExtractedRefs {
    if let Some(serialized) = metadata.get(meta::ATTACHMENTS) {
        return match parse_reference_list(serialized) {
            Ok(labels) => ExtractedRefs {
                labels,
                malformed: false,
            },
            Err(e) => {
                warn!(error = %e, "malformed reference list; treating as no references");
                ExtractedRefs {
                    labels: Vec::new(),
                    malformed: true,
                }
            }
        };
    }

    let labels = metadata
        .get(meta::ANSWER)
        .map(|answer| extract_references(answer))
        .unwrap_or_default();
    ExtractedRefs {
        labels,
        malformed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_annexure_variants() {
        assert_eq!(normalize("Annexure-I"), "I");
        assert_eq!(normalize("annexure i"), "I");
        assert_eq!(normalize("ANNEXURES II"), "II");
        assert_eq!(normalize("Annexure - III"), "III");
        assert_eq!(normalize("Annex A"), "A");
    }

    #[test]
    fn test_normalize_misspelling() {
        assert_eq!(normalize("ANEXURES I"), "I");
        assert_eq!(normalize("Anexure-II"), "II");
    }

    #[test]
    fn test_normalize_roman_substring() {
        assert_eq!(normalize("Statement IV (revised)"), "IV");
        assert_eq!(normalize("ii"), "II");
    }

    #[test]
    fn test_normalize_fallback_unchanged() {
        assert_eq!(normalize("  Schedule 7  "), "SCHEDULE 7");
        assert_eq!(normalize("A"), "A");
        assert_eq!(normalize("42"), "42");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in [
            "Annexure-I",
            "annexure ii",
            "ANEXURES I",
            "Statement IV",
            "Schedule 7",
            "MIX",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_ambiguous_roman_accepted() {
        // "MIX" happens to be all Roman characters; no semantic
        // correction is attempted.
        assert_eq!(normalize("MIX"), "MIX");
    }

    #[test]
    fn test_extract_basic() {
        assert_eq!(extract_references("See Annexure - I for details"), ["I"]);
        assert_eq!(
            extract_references("Refer to Annexure-I and Annexure-II"),
            ["I", "II"]
        );
        assert_eq!(extract_references("As shown in Annexure III"), ["III"]);
    }

    #[test]
    fn test_extract_letter_labels() {
        assert_eq!(
            extract_references("Annexure-A, Annexure-B, and Annexure-C"),
            ["A", "B", "C"]
        );
    }

    #[test]
    fn test_extract_plural_without_label_ignored() {
        assert!(extract_references("No annexures here").is_empty());
        assert!(extract_references("").is_empty());
    }

    #[test]
    fn test_extract_preserves_duplicates_and_order() {
        assert_eq!(
            extract_references("Annexure-II, then Annexure-I, then Annexure-II again"),
            ["II", "I", "II"]
        );
    }

    #[test]
    fn test_parse_reference_list() {
        assert_eq!(
            parse_reference_list(r#"["Annexure-I", "Annexure-II"]"#).unwrap(),
            ["Annexure-I", "Annexure-II"]
        );
        assert!(parse_reference_list("not json").is_err());
        assert!(parse_reference_list("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_referenced_labels_prefers_serialized_list() {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            meta::ATTACHMENTS.to_string(),
            r#"["Annexure-I"]"#.to_string(),
        );
        metadata.insert(
            meta::ANSWER.to_string(),
            "See Annexure-II".to_string(),
        );
        let refs = referenced_labels(&metadata);
        assert_eq!(refs.labels, ["Annexure-I"]);
        assert!(!refs.malformed);
    }

    #[test]
    fn test_referenced_labels_malformed_yields_empty_set() {
        // A corrupt list must not invent references from the answer
        // prose, even when the answer plainly mentions one.
        let mut metadata = BTreeMap::new();
        metadata.insert(meta::ATTACHMENTS.to_string(), "{broken".to_string());
        metadata.insert(
            meta::ANSWER.to_string(),
            "See Annexure-II for figures".to_string(),
        );
        let refs = referenced_labels(&metadata);
        assert!(
            refs.labels.is_empty(),
            "malformed list produced references: {:?}",
            refs.labels
        );
        assert!(refs.malformed);
    }

    #[test]
    fn test_referenced_labels_scans_answer_only_without_list() {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            meta::ANSWER.to_string(),
            "Figures in Annexure-II".to_string(),
        );
        let refs = referenced_labels(&metadata);
        assert_eq!(refs.labels, ["II"]);
        assert!(!refs.malformed);
    }

    #[test]
    fn test_referenced_labels_absent() {
        let refs = referenced_labels(&BTreeMap::new());
        assert!(refs.labels.is_empty());
        assert!(!refs.malformed);
    }
}
