// docguard-core/src/recognizer.rs
//! Defines the core `Recognizer` trait and its pattern-driven implementation.
//!
//! A recognizer binds a pattern subset, a validator, a context enhancer, and
//! a supported language into one entity detector. Recognizers are constructed
//! once at registry build time, are immutable afterwards, and are shared
//! (read-only) across concurrent analyses — hence the `Send + Sync` bound.
//!
//! The trait keeps the engine decoupled from how candidates are produced:
//! pattern recognizers are the built-in implementation, but anything that can
//! find, enhance, and validate candidate spans can participate.

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::RecognizerDefinition;
use crate::context::ContextEnhancer;
use crate::entity::{loggable_content, CandidateMatch};
use crate::errors::DocGuardError;
use crate::validators::{sanitize_value, ValidatorError, ValidatorKind};

/// A capability object for one entity detector.
pub trait Recognizer: Send + Sync {
    /// Entity type this recognizer reports.
    fn entity_type(&self) -> &str;

    /// Language this recognizer supports.
    fn language(&self) -> &str;

    /// COLLECT: run the pattern set over the text, producing candidates at
    /// their patterns' base scores. `recognizer_order` is filled in by the
    /// registry-aware caller.
    fn find(&self, text: &str) -> Vec<CandidateMatch>;

    /// ENHANCE: return the context-adjusted score for a candidate span.
    /// Must not mutate the candidate; the caller builds a re-scored copy.
    fn enhance(&self, text: &str, candidate: &CandidateMatch) -> f64;

    /// VALIDATE: accept or reject the raw matched text. `Err` means the
    /// validator itself failed and the caller must treat the candidate as
    /// rejected without aborting the analysis.
    fn validate(&self, raw_text: &str) -> Result<bool, ValidatorError>;
}

/// A single compiled pattern, ready for matching.
#[derive(Debug)]
pub struct CompiledPattern {
    pub name: String,
    pub regex: Regex,
    pub score: f64,
}

/// The registry-driven recognizer implementation: compiled patterns plus a
/// validator function and a context enhancer, per entity type and language.
#[derive(Debug)]
pub struct PatternRecognizer {
    entity_type: String,
    language: String,
    patterns: Vec<CompiledPattern>,
    enhancer: ContextEnhancer,
    replacement_pairs: Vec<(String, String)>,
    validator: Option<ValidatorKind>,
}

impl PatternRecognizer {
    /// Compiles a recognizer from its declarative definition.
    ///
    /// Every pattern must compile and every named validator must resolve;
    /// failures here are configuration errors and abort the registry build.
    pub fn from_definition(
        def: &RecognizerDefinition,
        window_chars: usize,
        word_weight: f64,
    ) -> Result<Self, DocGuardError> {
        let patterns = compile_patterns(&def.entity_type, &def.patterns)?;

        let structural: Vec<(String, f64)> = def
            .indicators
            .iter()
            .map(|i| (i.pattern.clone(), i.weight))
            .collect();
        let enhancer =
            ContextEnhancer::new(&def.context, word_weight, &structural, window_chars)?;

        let validator = match &def.validator {
            Some(name) => Some(ValidatorKind::from_name(name).ok_or_else(|| {
                DocGuardError::UnknownValidator(def.entity_type.clone(), name.clone())
            })?),
            None => None,
        };

        Ok(Self {
            entity_type: def.entity_type.clone(),
            language: def.language.clone(),
            patterns,
            enhancer,
            replacement_pairs: def.replacement_pairs.clone(),
            validator,
        })
    }
}

impl Recognizer for PatternRecognizer {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn find(&self, text: &str) -> Vec<CandidateMatch> {
        let mut candidates = Vec::new();

        for (pattern_order, pattern) in self.patterns.iter().enumerate() {
            for m in pattern.regex.find_iter(text) {
                debug!(
                    "pattern '{}' matched '{}' at [{}, {})",
                    pattern.name,
                    loggable_content(m.as_str()),
                    m.start(),
                    m.end()
                );
                candidates.push(CandidateMatch {
                    entity_type: self.entity_type.clone(),
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                    score: pattern.score,
                    pattern_name: pattern.name.clone(),
                    recognizer_order: 0,
                    pattern_order,
                });
            }
        }

        candidates
    }

    fn enhance(&self, text: &str, candidate: &CandidateMatch) -> f64 {
        self.enhancer
            .enhance(text, candidate.start, candidate.end, candidate.score)
    }

    fn validate(&self, raw_text: &str) -> Result<bool, ValidatorError> {
        let Some(validator) = &self.validator else {
            return Ok(true);
        };
        let sanitized = sanitize_value(raw_text, &self.replacement_pairs);
        validator.validate(&sanitized)
    }
}

/// Compiles a pattern set, collecting every failure into a single fatal
/// report rather than stopping at the first.
pub fn compile_patterns(
    entity_type: &str,
    definitions: &[crate::config::PatternDefinition],
) -> Result<Vec<CompiledPattern>, DocGuardError> {
    let mut compiled = Vec::with_capacity(definitions.len());
    let mut errors: Vec<String> = Vec::new();

    for def in definitions {
        if def.regex.len() > crate::config::MAX_PATTERN_LENGTH {
            errors.push(
                DocGuardError::PatternLengthExceeded(
                    def.name.clone(),
                    def.regex.len(),
                    crate::config::MAX_PATTERN_LENGTH,
                )
                .to_string(),
            );
            continue;
        }

        match RegexBuilder::new(&def.regex)
            .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
            .build()
        {
            Ok(regex) => compiled.push(CompiledPattern {
                name: def.name.clone(),
                regex,
                score: def.score,
            }),
            Err(e) => {
                errors.push(DocGuardError::PatternCompilationError(def.name.clone(), e).to_string())
            }
        }
    }

    if !errors.is_empty() {
        return Err(DocGuardError::Configuration(format!(
            "Failed to compile {} pattern(s) for '{}':\n{}",
            errors.len(),
            entity_type,
            errors.join("\n")
        )));
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PatternDefinition, RecognizerDefinition};

    fn aadhaar_definition() -> RecognizerDefinition {
        RecognizerDefinition {
            entity_type: "IN_AADHAAR".to_string(),
            language: "en".to_string(),
            patterns: vec![
                PatternDefinition {
                    name: "AADHAAR (Strong)".to_string(),
                    regex: r"\b[2-9][0-9]{3}\s?[0-9]{4}\s?[0-9]{4}\b".to_string(),
                    score: 0.75,
                },
                PatternDefinition {
                    name: "AADHAAR (Medium)".to_string(),
                    regex: r"\b[2-9][0-9]{11}\b".to_string(),
                    score: 0.6,
                },
            ],
            context: vec!["aadhaar".to_string()],
            replacement_pairs: vec![
                ("-".to_string(), String::new()),
                (" ".to_string(), String::new()),
            ],
            validator: Some("in_aadhaar".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_produces_candidates_at_base_score() {
        let rec = PatternRecognizer::from_definition(&aadhaar_definition(), 50, 0.35).unwrap();
        let candidates = rec.find("id 2345 6789 0123 end");
        assert!(!candidates.is_empty());
        let strong = candidates
            .iter()
            .find(|c| c.pattern_name == "AADHAAR (Strong)")
            .unwrap();
        assert_eq!(strong.text, "2345 6789 0123");
        assert_eq!(strong.score, 0.75);
    }

    #[test]
    fn test_validate_uses_replacement_pairs() {
        let rec = PatternRecognizer::from_definition(&aadhaar_definition(), 50, 0.35).unwrap();
        let base = "23456789012";
        let check = crate::validators::verhoeff_check_digit(base).unwrap();
        let spaced = format!("2345 6789 012{check}");
        assert!(rec.validate(&spaced).unwrap());
        assert!(!rec.validate("2345 6789 0123x").unwrap());
    }

    #[test]
    fn test_unknown_validator_is_configuration_error() {
        let mut def = aadhaar_definition();
        def.validator = Some("not_a_validator".to_string());
        let err = PatternRecognizer::from_definition(&def, 50, 0.35).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_bad_pattern_fails_fast_with_collected_errors() {
        let defs = vec![
            PatternDefinition {
                name: "ok".to_string(),
                regex: r"\d+".to_string(),
                score: 0.5,
            },
            PatternDefinition {
                name: "broken".to_string(),
                regex: "[unclosed".to_string(),
                score: 0.5,
            },
        ];
        let err = compile_patterns("TEST", &defs).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
