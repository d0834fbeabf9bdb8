// docguard-core/src/engine.rs
//! The analysis engine: COLLECT → ENHANCE → VALIDATE → MERGE → RANK.
//!
//! One explicitly constructed, immutable [`AnalyzerEngine`] value is passed
//! by reference into every request handler; there is no ambient global. The
//! engine owns the recognizer registry and an optional external NLP span
//! source (a black-box candidate producer merged alongside the pattern
//! recognizers).

use log::{debug, warn};
use regex::RegexBuilder;

use crate::entity::{loggable_content, CandidateMatch, EntityResult};
use crate::errors::DocGuardError;
use crate::registry::RecognizerRegistry;

/// A span produced by the external NLP model. Treated as one more candidate
/// feeding MERGE; NLP spans skip pattern validation and context enhancement.
#[derive(Debug, Clone, PartialEq)]
pub struct NlpSpan {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Black-box generic entity extractor. Out of scope for this crate beyond
/// this interface; a failing source is isolated and logged, never fatal.
pub trait NlpSpanSource: Send + Sync {
    fn detect(&self, text: &str, language: &str) -> anyhow::Result<Vec<NlpSpan>>;
}

/// Marker used in `pattern_name` for NLP-sourced results.
pub const NLP_SOURCE: &str = "nlp";

/// Caller-supplied filters for one analysis request.
#[derive(Debug, Clone, Default)]
pub struct AnalysisFilters {
    /// Restrict detection to these entity types; `None` means all.
    pub entity_types: Option<Vec<String>>,
    /// Drop results scoring below this threshold.
    pub score_threshold: Option<f64>,
    /// Literals that must never be reported. Matched case-insensitively
    /// against candidate text and against their occurrences in the input;
    /// overlapping candidates are removed before MERGE.
    pub allow_list: Vec<String>,
}

/// The process-wide analysis engine. Construct once, share by reference.
pub struct AnalyzerEngine {
    registry: RecognizerRegistry,
    nlp_source: Option<Box<dyn NlpSpanSource>>,
}

impl AnalyzerEngine {
    pub fn new(registry: RecognizerRegistry) -> Self {
        Self {
            registry,
            nlp_source: None,
        }
    }

    /// Engine over the embedded default recognizer set.
    pub fn with_defaults() -> Result<Self, DocGuardError> {
        Ok(Self::new(RecognizerRegistry::with_defaults()?))
    }

    /// Attaches the external NLP span source.
    pub fn with_nlp_source(mut self, source: Box<dyn NlpSpanSource>) -> Self {
        self.nlp_source = Some(source);
        self
    }

    pub fn registry(&self) -> &RecognizerRegistry {
        &self.registry
    }

    /// Analyzes text for sensitive entities.
    ///
    /// Returns results ranked by final score (descending; position breaks
    /// ties). Empty text and a missing language are caller errors; a language
    /// without recognizers is not, it simply yields no pattern candidates.
    pub fn analyze(
        &self,
        text: &str,
        language: &str,
        filters: &AnalysisFilters,
    ) -> Result<Vec<EntityResult>, DocGuardError> {
        if text.trim().is_empty() {
            return Err(DocGuardError::EmptyText);
        }
        if language.trim().is_empty() {
            return Err(DocGuardError::MissingLanguage);
        }

        let allowed_spans = allow_list_spans(text, &filters.allow_list);

        // COLLECT / ENHANCE / VALIDATE, one recognizer at a time. A failing
        // validator rejects its candidate and nothing else.
        let mut pool: Vec<CandidateMatch> = Vec::new();
        for (order, recognizer) in self
            .registry
            .applicable(language, filters.entity_types.as_deref())
        {
            for found in recognizer.find(text) {
                let candidate = CandidateMatch {
                    recognizer_order: order,
                    ..found
                };

                if is_allow_listed(&candidate, &filters.allow_list, &allowed_spans) {
                    debug!(
                        "candidate '{}' removed by allow list",
                        loggable_content(&candidate.text)
                    );
                    continue;
                }

                let enhanced = candidate.with_score(recognizer.enhance(text, &candidate));

                match recognizer.validate(&enhanced.text) {
                    Ok(true) => pool.push(enhanced),
                    Ok(false) => {
                        debug!(
                            "candidate '{}' rejected by validator for {}",
                            loggable_content(&enhanced.text),
                            recognizer.entity_type()
                        );
                    }
                    Err(e) => {
                        warn!(
                            "validator failure treated as rejection for {}: {}",
                            recognizer.entity_type(),
                            e
                        );
                    }
                }
            }
        }

        // MERGE: pool the external NLP spans alongside pattern candidates.
        if let Some(source) = &self.nlp_source {
            match source.detect(text, language) {
                Ok(spans) => {
                    let nlp_order = self.registry.len();
                    for span in spans {
                        match nlp_span_to_candidate(text, span, nlp_order, filters) {
                            Some(candidate)
                                if !is_allow_listed(
                                    &candidate,
                                    &filters.allow_list,
                                    &allowed_spans,
                                ) =>
                            {
                                pool.push(candidate)
                            }
                            _ => {}
                        }
                    }
                }
                Err(e) => warn!("NLP span source failed; continuing without it: {e}"),
            }
        }

        // RANK: resolve overlaps deterministically. Higher score wins; ties
        // go to the longer span, then to earlier registration order.
        pool.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.recognizer_order.cmp(&b.recognizer_order))
                .then_with(|| a.pattern_order.cmp(&b.pattern_order))
                .then_with(|| a.start.cmp(&b.start))
        });

        let mut selected: Vec<CandidateMatch> = Vec::new();
        for candidate in pool {
            if selected.iter().all(|kept| !kept.overlaps(&candidate)) {
                selected.push(candidate);
            }
        }

        if let Some(threshold) = filters.score_threshold {
            selected.retain(|c| c.score >= threshold);
        }

        selected.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.start.cmp(&b.start))
        });

        Ok(selected
            .into_iter()
            .map(EntityResult::from_candidate)
            .collect())
    }
}

/// Byte spans of every case-insensitive occurrence of an allow-list entry.
fn allow_list_spans(text: &str, allow_list: &[String]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for entry in allow_list {
        if entry.is_empty() {
            continue;
        }
        let Ok(regex) = RegexBuilder::new(&regex::escape(entry))
            .case_insensitive(true)
            .build()
        else {
            // An escaped literal always compiles; this is unreachable in
            // practice but must not abort the request if it ever happens.
            warn!("allow-list entry could not be compiled; skipping");
            continue;
        };
        for m in regex.find_iter(text) {
            spans.push((m.start(), m.end()));
        }
    }
    spans
}

fn is_allow_listed(
    candidate: &CandidateMatch,
    allow_list: &[String],
    allowed_spans: &[(usize, usize)],
) -> bool {
    allow_list
        .iter()
        .any(|entry| entry.to_lowercase() == candidate.text.to_lowercase())
        || allowed_spans
            .iter()
            .any(|(s, e)| candidate.overlaps_range(*s, *e))
}

/// Converts an NLP span into a candidate, rejecting spans that do not denote
/// a valid sub-range of the analyzed text. A misbehaving source is isolated
/// span by span.
fn nlp_span_to_candidate(
    text: &str,
    span: NlpSpan,
    nlp_order: usize,
    filters: &AnalysisFilters,
) -> Option<CandidateMatch> {
    if span.start >= span.end {
        warn!("NLP span with empty or inverted range dropped");
        return None;
    }
    let Some(raw) = text.get(span.start..span.end) else {
        warn!(
            "NLP span [{}, {}) is not a valid sub-range; dropped",
            span.start, span.end
        );
        return None;
    };
    if let Some(types) = &filters.entity_types {
        if !types.iter().any(|t| *t == span.entity_type) {
            return None;
        }
    }

    Some(CandidateMatch {
        entity_type: span.entity_type,
        start: span.start,
        end: span.end,
        text: raw.to_string(),
        score: span.score.clamp(0.0, 1.0),
        pattern_name: NLP_SOURCE.to_string(),
        recognizer_order: nlp_order,
        pattern_order: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticNlp(Vec<NlpSpan>);

    impl NlpSpanSource for StaticNlp {
        fn detect(&self, _text: &str, _language: &str) -> anyhow::Result<Vec<NlpSpan>> {
            Ok(self.0.clone())
        }
    }

    struct FailingNlp;

    impl NlpSpanSource for FailingNlp {
        fn detect(&self, _text: &str, _language: &str) -> anyhow::Result<Vec<NlpSpan>> {
            anyhow::bail!("model unavailable")
        }
    }

    fn engine() -> AnalyzerEngine {
        AnalyzerEngine::with_defaults().unwrap()
    }

    fn valid_aadhaar() -> String {
        let base = "23456789012";
        let check = crate::validators::verhoeff_check_digit(base).unwrap();
        format!("{base}{check}")
    }

    #[test]
    fn test_empty_text_is_input_error() {
        let err = engine()
            .analyze("   ", "en", &AnalysisFilters::default())
            .unwrap_err();
        assert!(matches!(err, DocGuardError::EmptyText));
    }

    #[test]
    fn test_missing_language_is_input_error() {
        let err = engine()
            .analyze("some text", "", &AnalysisFilters::default())
            .unwrap_err();
        assert!(matches!(err, DocGuardError::MissingLanguage));
    }

    #[test]
    fn test_unknown_language_yields_no_results() {
        let results = engine()
            .analyze("text 234567890123", "xx", &AnalysisFilters::default())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_nlp_source_feeds_merge() {
        let text = "Patient John Doe admitted yesterday";
        let nlp = StaticNlp(vec![NlpSpan {
            entity_type: "PERSON".to_string(),
            start: 8,
            end: 16,
            score: 0.85,
        }]);
        let engine = AnalyzerEngine::with_defaults()
            .unwrap()
            .with_nlp_source(Box::new(nlp));
        let results = engine
            .analyze(text, "en", &AnalysisFilters::default())
            .unwrap();
        let person = results.iter().find(|r| r.entity_type == "PERSON").unwrap();
        assert_eq!(person.text, "John Doe");
        assert_eq!(person.pattern_name, NLP_SOURCE);
    }

    #[test]
    fn test_failing_nlp_source_is_isolated() {
        let id = valid_aadhaar();
        let text = format!("Aadhaar {id}");
        let engine = AnalyzerEngine::with_defaults()
            .unwrap()
            .with_nlp_source(Box::new(FailingNlp));
        let results = engine
            .analyze(&text, "en", &AnalysisFilters::default())
            .unwrap();
        assert!(results.iter().any(|r| r.entity_type == "IN_AADHAAR"));
    }

    #[test]
    fn test_invalid_nlp_spans_are_dropped() {
        let nlp = StaticNlp(vec![
            NlpSpan {
                entity_type: "PERSON".to_string(),
                start: 10,
                end: 5,
                score: 0.9,
            },
            NlpSpan {
                entity_type: "PERSON".to_string(),
                start: 0,
                end: 10_000,
                score: 0.9,
            },
        ]);
        let engine = AnalyzerEngine::with_defaults()
            .unwrap()
            .with_nlp_source(Box::new(nlp));
        let results = engine
            .analyze("short harmless text", "en", &AnalysisFilters::default())
            .unwrap();
        assert!(results.iter().all(|r| r.entity_type != "PERSON"));
    }
}
