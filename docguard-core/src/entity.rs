// docguard-core/src/entity.rs
//! Data structures for candidate matches and final entity results, plus
//! PII-safe logging helpers used throughout the analysis pipeline.
//!
//! A [`CandidateMatch`] is produced during COLLECT and is never mutated in
//! place; re-scoring during ENHANCE produces a new value via
//! [`CandidateMatch::with_score`]. An [`EntityResult`] is a candidate that
//! survived enhancement, validation, and overlap resolution.

use serde::{Deserialize, Serialize};

use lazy_static::lazy_static;

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("DOCGUARD_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A single span found by one pattern of one recognizer, before validation
/// and overlap resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// The entity type this candidate would be reported as (e.g. "IN_AADHAAR").
    pub entity_type: String,
    /// Byte offset of the first matched byte (always a char boundary).
    pub start: usize,
    /// Byte offset one past the last matched byte (always a char boundary).
    pub end: usize,
    /// The matched text, owned so the candidate outlives the borrow.
    pub text: String,
    /// Current confidence score in `[0, 1]`.
    pub score: f64,
    /// Name of the pattern that produced the match.
    pub pattern_name: String,
    /// Registration order of the producing recognizer; tie-break key.
    pub recognizer_order: usize,
    /// Position of the producing pattern within its recognizer; tie-break key.
    pub pattern_order: usize,
}

impl CandidateMatch {
    /// Functional update: same span, new score. Candidates are never
    /// re-scored in place.
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }

    /// Length of the matched span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when the two half-open spans share at least one byte.
    pub fn overlaps(&self, other: &CandidateMatch) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when this span intersects the half-open range `[start, end)`.
    pub fn overlaps_range(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// A validated, final-scored, non-overlapping detection returned by
/// `AnalyzerEngine::analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// Final score in `[0, 1]` after context enhancement.
    pub score: f64,
    /// Name of the winning pattern, or the NLP source marker.
    pub pattern_name: String,
}

impl EntityResult {
    pub(crate) fn from_candidate(c: CandidateMatch) -> Self {
        Self {
            entity_type: c.entity_type,
            start: c.start,
            end: c.end,
            text: c.text,
            score: c.score,
            pattern_name: c.pattern_name,
        }
    }
}

/// Produces a preview of sensitive content that is safe to log or display.
pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

/// Returns content suitable for debug logs: the raw text only when the
/// operator has explicitly opted in via `DOCGUARD_ALLOW_DEBUG_PII=true`.
pub fn loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}
