//! Context block assembly for the external answer-generation collaborator.
//!
//! Builds the formatted text handed to the (out-of-scope) generation
//! layer from ranked retrieval results. This is a pure transform over
//! the results; nothing here mutates metadata.

use crate::labels::parse_reference_list;
use crate::models::{meta, SearchResult};

fn field<'a>(result: &'a SearchResult, key: &str) -> &'a str {
    result.metadata.get(key).map(String::as_str).unwrap_or("N/A")
}

/// Render retrieval results into the context block for answer generation.
///
/// One block per result, separated by `---`. The attachments line is
/// included only when the record carries a readable, non-empty reference
/// list.
pub fn build_context(results: &[SearchResult]) -> String {
    let mut blocks = Vec::with_capacity(results.len());

    for result in results {
        let attachments_line = result
            .metadata
            .get(meta::ATTACHMENTS)
            .and_then(|raw| parse_reference_list(raw).ok())
            .filter(|labels| !labels.is_empty())
            .map(|labels| format!("\nAttachments: {}", labels.join(", ")))
            .unwrap_or_default();

        blocks.push(format!(
            "LAQ #{} ({}) - {}\nMinister: {}\nTabled by: {}\nQuestion: {}\nAnswer: {}{}",
            field(result, meta::LAQ_NUM),
            field(result, meta::TYPE),
            field(result, meta::DATE),
            field(result, meta::MINISTER),
            field(result, meta::TABLED_BY),
            field(result, meta::QUESTION),
            field(result, meta::ANSWER),
            attachments_line,
        ));
    }

    blocks.join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::MatchTier;

    fn result(pairs: &[(&str, &str)]) -> SearchResult {
        let metadata: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SearchResult {
            id: "r1".to_string(),
            similarity: 90.0,
            tier: MatchTier::Strong,
            rank: 1,
            metadata,
            document: String::new(),
        }
    }

    #[test]
    fn test_block_includes_fields_and_attachments() {
        let r = result(&[
            (meta::LAQ_NUM, "324"),
            (meta::TYPE, "Starred"),
            (meta::DATE, "2023-01-15"),
            (meta::MINISTER, "Minister of Education"),
            (meta::QUESTION, "What is the budget?"),
            (meta::ANSWER, "See Annexure-I."),
            (meta::ATTACHMENTS, r#"["Annexure-I"]"#),
        ]);
        let context = build_context(&[r]);
        assert!(context.contains("LAQ #324 (Starred) - 2023-01-15"));
        assert!(context.contains("Attachments: Annexure-I"));
        assert!(context.contains("Tabled by: N/A"));
    }

    #[test]
    fn test_malformed_or_empty_attachments_line_omitted() {
        let malformed = result(&[(meta::LAQ_NUM, "1"), (meta::ATTACHMENTS, "{oops")]);
        assert!(!build_context(&[malformed]).contains("Attachments:"));

        let empty = result(&[(meta::LAQ_NUM, "1"), (meta::ATTACHMENTS, "[]")]);
        assert!(!build_context(&[empty]).contains("Attachments:"));
    }

    #[test]
    fn test_blocks_joined_with_separator() {
        let a = result(&[(meta::LAQ_NUM, "1")]);
        let b = result(&[(meta::LAQ_NUM, "2")]);
        let context = build_context(&[a, b]);
        assert!(context.contains("\n\n---\n\n"));
        assert!(build_context(&[]).is_empty());
    }
}
