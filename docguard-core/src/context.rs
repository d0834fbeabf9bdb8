// docguard-core/src/context.rs
//! Contextual confidence adjustment for candidate matches.
//!
//! A [`ContextEnhancer`] scans a fixed-size window around a matched span for
//! indicator phrases. Each indicator that occurs in the window contributes
//! its weight once; the adjustments are additive and capped. Indicators come
//! in two flavors: free-form context words (e.g. "aadhaar", "uidai") that
//! share a default weight, and structural regex indicators with explicit
//! weights (e.g. a properly spaced digit grouping co-occurring with a bare
//! digit run).
//!
//! Enhancement is a pure function of `(text, span, score)`; the original
//! candidate is never mutated.

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::errors::DocGuardError;

/// Window scanned on each side of a match, in characters (not bytes) so
/// Devanagari and other multi-byte context words count the same as ASCII.
pub const DEFAULT_WINDOW_CHARS: usize = 50;

/// Weight contributed by a plain context word unless overridden in config.
pub const DEFAULT_WORD_WEIGHT: f64 = 0.35;

/// Upper bound on an enhanced score.
pub const SCORE_CAP: f64 = 0.99;

/// One compiled indicator: a case-insensitive pattern plus its additive weight.
#[derive(Debug)]
struct CompiledIndicator {
    name: String,
    regex: Regex,
    weight: f64,
}

/// Adjusts candidate confidence using keyword proximity around the match.
#[derive(Debug)]
pub struct ContextEnhancer {
    indicators: Vec<CompiledIndicator>,
    window_chars: usize,
    score_cap: f64,
}

impl ContextEnhancer {
    /// Builds an enhancer from free context words and structural indicators.
    ///
    /// A syntactically invalid indicator regex is a configuration error and
    /// fails the registry build.
    pub fn new(
        context_words: &[String],
        word_weight: f64,
        structural: &[(String, f64)],
        window_chars: usize,
    ) -> Result<Self, DocGuardError> {
        let mut indicators = Vec::with_capacity(context_words.len() + structural.len());

        for word in context_words {
            let pattern = regex::escape(word);
            let regex = build_ci_regex(&pattern)
                .map_err(|e| DocGuardError::PatternCompilationError(word.clone(), e))?;
            indicators.push(CompiledIndicator {
                name: word.clone(),
                regex,
                weight: word_weight,
            });
        }

        for (pattern, weight) in structural {
            let regex = build_ci_regex(pattern)
                .map_err(|e| DocGuardError::PatternCompilationError(pattern.clone(), e))?;
            indicators.push(CompiledIndicator {
                name: pattern.clone(),
                regex,
                weight: *weight,
            });
        }

        Ok(Self {
            indicators,
            window_chars,
            score_cap: SCORE_CAP,
        })
    }

    /// Returns the enhanced score for a span; the input score is unchanged if
    /// no indicator occurs in the window.
    pub fn enhance(&self, text: &str, start: usize, end: usize, score: f64) -> f64 {
        if self.indicators.is_empty() {
            return score;
        }

        let (lo, hi) = window_bounds(text, start, end, self.window_chars);
        let window = &text[lo..hi];
        let mut enhanced = score;

        for indicator in &self.indicators {
            if indicator.regex.is_match(window) {
                enhanced = (enhanced + indicator.weight).min(self.score_cap);
                debug!(
                    "context indicator '{}' matched near span [{}, {}), score -> {:.2}",
                    indicator.name, start, end, enhanced
                );
            }
        }

        enhanced
    }
}

fn build_ci_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(10 * (1 << 20))
        .build()
}

/// Widens `[start, end)` by up to `window` characters on each side, staying
/// on char boundaries. `start`/`end` must already lie on char boundaries
/// (regex match offsets always do).
fn window_bounds(text: &str, start: usize, end: usize, window: usize) -> (usize, usize) {
    let mut lo = start.min(text.len());
    for _ in 0..window {
        match text[..lo].char_indices().next_back() {
            Some((i, _)) => lo = i,
            None => break,
        }
    }

    let mut hi = end.min(text.len());
    for _ in 0..window {
        match text[hi..].chars().next() {
            Some(c) => hi += c.len_utf8(),
            None => break,
        }
    }

    (lo, hi)
}
