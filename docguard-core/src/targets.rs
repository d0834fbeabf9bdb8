// docguard-core/src/targets.rs
//! Redaction target resolution.
//!
//! Converts accepted entity results plus caller-supplied literals and regex
//! patterns into a de-duplicated, longest-match-first list of redaction
//! targets. Longest-first ordering guarantees that a shorter string which is
//! a substring of a longer approved target is covered by the longer target's
//! redaction and never independently searched for first.

use std::collections::HashMap;

use regex::Regex;

use crate::entity::EntityResult;
use crate::errors::DocGuardError;

/// Entity type recorded for caller-supplied keywords and page-regex matches.
pub const CUSTOM_ENTITY_TYPE: &str = "CUSTOM";

/// Detected literals shorter than this (after trimming) are ignored; tiny
/// fragments over-redact wildly when searched as page substrings.
pub const MIN_TARGET_LEN: usize = 3;

/// A literal string slated for removal or labeling on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionTarget {
    pub text: String,
    /// Entity type used by the labeled redaction style; `CUSTOM` for
    /// caller-supplied material.
    pub entity_type: String,
}

/// Resolves document-level targets from ranked entity results plus caller
/// keywords.
///
/// Deduplication is by exact literal text. Results arrive ranked by score, so
/// the first occurrence of a literal wins the `entity_type` field; detected
/// types take precedence over caller-supplied `CUSTOM` keywords for the same
/// literal.
pub fn resolve_targets(
    entities: &[EntityResult],
    extra_keywords: &[String],
) -> Vec<RedactionTarget> {
    let mut by_literal: HashMap<String, String> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for entity in entities {
        let literal = entity.text.clone();
        if literal.trim().len() < MIN_TARGET_LEN {
            continue;
        }
        if !by_literal.contains_key(&literal) {
            by_literal.insert(literal.clone(), entity.entity_type.clone());
            order.push(literal);
        }
    }

    for keyword in extra_keywords {
        if keyword.trim().len() < MIN_TARGET_LEN {
            continue;
        }
        if !by_literal.contains_key(keyword) {
            by_literal.insert(keyword.clone(), CUSTOM_ENTITY_TYPE.to_string());
            order.push(keyword.clone());
        }
    }

    let mut targets: Vec<RedactionTarget> = order
        .into_iter()
        .map(|text| {
            let entity_type = by_literal[&text].clone();
            RedactionTarget { text, entity_type }
        })
        .collect();

    sort_longest_first(&mut targets);
    targets
}

/// Extends document-level targets with per-page regex contributions: each
/// pattern adds its first match on the page (and only the first), as
/// `CUSTOM`. Returns the combined list in longest-first order.
pub fn page_targets(
    base: &[RedactionTarget],
    page_text: &str,
    patterns: &[Regex],
) -> Vec<RedactionTarget> {
    let mut targets: Vec<RedactionTarget> = base.to_vec();

    for pattern in patterns {
        if let Some(m) = pattern.find(page_text) {
            let text = m.as_str().to_string();
            if text.trim().len() >= MIN_TARGET_LEN
                && !targets.iter().any(|t| t.text == text)
            {
                targets.push(RedactionTarget {
                    text,
                    entity_type: CUSTOM_ENTITY_TYPE.to_string(),
                });
            }
        }
    }

    sort_longest_first(&mut targets);
    targets
}

/// Compiles caller-supplied regex patterns up front so an invalid pattern
/// fails the request before any page is touched.
pub fn compile_request_patterns(patterns: &[String]) -> Result<Vec<Regex>, DocGuardError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| DocGuardError::InvalidRequestPattern(p.clone(), e))
        })
        .collect()
}

/// Length descending; lexicographic tiebreak keeps the order deterministic.
fn sort_longest_first(targets: &mut [RedactionTarget]) {
    targets.sort_by(|a, b| {
        b.text
            .len()
            .cmp(&a.text.len())
            .then_with(|| a.text.cmp(&b.text))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str, entity_type: &str, score: f64) -> EntityResult {
        EntityResult {
            entity_type: entity_type.to_string(),
            start: 0,
            end: text.len(),
            text: text.to_string(),
            score,
            pattern_name: "test".to_string(),
        }
    }

    #[test]
    fn test_longest_first_ordering() {
        let entities = vec![
            entity("12345", "CREDIT_CARD", 0.9),
            entity("ABC12345XYZ", "IN_DRIVING_LICENSE", 0.5),
        ];
        let targets = resolve_targets(&entities, &[]);
        assert_eq!(targets[0].text, "ABC12345XYZ");
        assert_eq!(targets[1].text, "12345");
    }

    #[test]
    fn test_first_in_score_order_wins_entity_type() {
        let entities = vec![
            entity("234567890123", "IN_AADHAAR", 0.95),
            entity("234567890123", "CREDIT_CARD", 0.4),
        ];
        let targets = resolve_targets(&entities, &[]);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].entity_type, "IN_AADHAAR");
    }

    #[test]
    fn test_detected_type_beats_custom_keyword() {
        let entities = vec![entity("234567890123", "IN_AADHAAR", 0.95)];
        let keywords = vec!["234567890123".to_string(), "project-x".to_string()];
        let targets = resolve_targets(&entities, &keywords);
        let aadhaar = targets.iter().find(|t| t.text == "234567890123").unwrap();
        assert_eq!(aadhaar.entity_type, "IN_AADHAAR");
        let custom = targets.iter().find(|t| t.text == "project-x").unwrap();
        assert_eq!(custom.entity_type, CUSTOM_ENTITY_TYPE);
    }

    #[test]
    fn test_short_fragments_are_dropped() {
        let entities = vec![entity("ab", "X", 0.9)];
        let keywords = vec!["x".to_string()];
        assert!(resolve_targets(&entities, &keywords).is_empty());
    }

    #[test]
    fn test_page_regex_contributes_first_match_only() {
        let base = resolve_targets(&[], &[]);
        let patterns = compile_request_patterns(&[r"\b\d{3}-\d{2}-\d{4}\b".to_string()]).unwrap();
        let page = "ssn 123-45-6789 and ssn 987-65-4321";
        let targets = page_targets(&base, page, &patterns);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].text, "123-45-6789");
        assert_eq!(targets[0].entity_type, CUSTOM_ENTITY_TYPE);
    }

    #[test]
    fn test_invalid_request_pattern_is_reported() {
        let err = compile_request_patterns(&["[broken".to_string()]).unwrap_err();
        assert!(matches!(err, DocGuardError::InvalidRequestPattern(..)));
    }
}
