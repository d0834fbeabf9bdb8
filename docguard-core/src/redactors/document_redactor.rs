// docguard-core/src/redactors/document_redactor.rs
//! Document redaction: analyze page text, resolve targets, and obscure every
//! occurrence with the requested style.
//!
//! Per-page state machine: MARK(all targets) → COMMIT_BLACKOUT |
//! COMMIT_LABEL → PERSIST (persisting is the caller's save). Blackout marks
//! each region for permanent removal, draws an opaque fill, and applies the
//! removals after the whole page's targets are placed — the underlying text
//! is destroyed, not merely covered. Label whites the region out and centers
//! a short `[ENTITY_TYPE]` tag in it.
//!
//! Failure policy: one target failing to locate or draw is logged and
//! skipped; the rest of the page and the remaining pages continue.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, error};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::document::{Color, Rect, RedactableDocument};
use crate::engine::{AnalysisFilters, AnalyzerEngine};
use crate::entity::EntityResult;
use crate::errors::DocGuardError;
use crate::targets::{
    compile_request_patterns, page_targets, resolve_targets, RedactionTarget,
    CUSTOM_ENTITY_TYPE,
};

/// Label font size before shrinking to the region width.
const LABEL_FONT_SIZE: f32 = 8.0;

/// Placeholder label used by analysis-free literal redaction.
const REDACTED_LABEL: &str = "[REDACTED]";

/// Patterns the redactor always sweeps each page for, independent of the
/// recognizer registry: ID-like codes, delimited SSNs, bare 16-digit runs,
/// and email addresses.
const DEFAULT_PAGE_PATTERNS: [&str; 4] = [
    r"\b[A-Z]{2}\d{6}\b",
    r"\b\d{3}-\d{2}-\d{4}\b",
    r"\b\d{16}\b",
    r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b",
];

/// The two mutually exclusive redaction styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionStyle {
    /// Permanent content removal under an opaque black fill.
    Blackout,
    /// Background-colored fill with a centered entity-type label.
    Label,
}

/// Options for one document redaction request.
#[derive(Debug, Clone)]
pub struct RedactionOptions {
    pub language: String,
    pub style: RedactionStyle,
    /// Extra literals to redact as `CUSTOM`.
    pub extra_keywords: Vec<String>,
    /// Extra regexes; each contributes its first match per page.
    pub custom_regex: Vec<String>,
    /// Restrict detection to these entity types.
    pub entity_types: Option<Vec<String>>,
    pub score_threshold: Option<f64>,
    pub allow_list: Vec<String>,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            style: RedactionStyle::Blackout,
            extra_keywords: Vec::new(),
            custom_regex: Vec::new(),
            entity_types: None,
            score_threshold: None,
            allow_list: Vec::new(),
        }
    }
}

/// Outcome of one redaction request.
#[derive(Debug, Clone, Serialize)]
pub struct RedactionReport {
    /// Detected literal → entity type (analysis-derived targets only).
    pub entities_detected: BTreeMap<String, String>,
    pub regions_redacted: usize,
    pub pages_processed: usize,
    pub style: RedactionStyle,
    /// SHA-256 of the input text layer, for audit trails without raw PII.
    pub input_hash: String,
    pub completed_at: DateTime<Utc>,
}

/// Applies detection results onto pages. Holds a shared reference to the
/// immutable engine; one redactor serves one request at a time, many may
/// run concurrently over one engine.
pub struct DocumentRedactor<'e> {
    engine: &'e AnalyzerEngine,
    default_patterns: Vec<Regex>,
}

impl<'e> DocumentRedactor<'e> {
    pub fn new(engine: &'e AnalyzerEngine) -> Result<Self, DocGuardError> {
        let defaults: Vec<String> = DEFAULT_PAGE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        Ok(Self {
            engine,
            default_patterns: compile_request_patterns(&defaults)?,
        })
    }

    /// Analyzes and redacts a whole document.
    ///
    /// First pass detects entities on every page; the second pass locates and
    /// obscures each resolved target, longest literal first.
    pub fn redact_document(
        &self,
        doc: &mut dyn RedactableDocument,
        opts: &RedactionOptions,
    ) -> Result<RedactionReport, DocGuardError> {
        let mut patterns = compile_request_patterns(&opts.custom_regex)?;
        patterns.extend(self.default_patterns.iter().cloned());

        let filters = AnalysisFilters {
            entity_types: opts.entity_types.clone(),
            score_threshold: opts.score_threshold,
            allow_list: opts.allow_list.clone(),
        };

        // First pass: entity detection over every page's text layer.
        let mut input_hasher = Sha256::new();
        let mut detected: Vec<EntityResult> = Vec::new();
        for page in 0..doc.page_count() {
            let text = doc.page_text(page)?;
            input_hasher.update(text.as_bytes());
            if text.trim().is_empty() {
                continue;
            }
            detected.extend(self.engine.analyze(&text, &opts.language, &filters)?);
        }

        // Resolver consumes score order across the whole document.
        detected.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.start.cmp(&b.start)));
        let document_targets = resolve_targets(&detected, &opts.extra_keywords);

        let entities_detected: BTreeMap<String, String> = document_targets
            .iter()
            .filter(|t| t.entity_type != CUSTOM_ENTITY_TYPE)
            .map(|t| (t.text.clone(), t.entity_type.clone()))
            .collect();

        let mut regions_redacted = 0;
        for page in 0..doc.page_count() {
            let page_text = doc.page_text(page)?;
            let targets = page_targets(&document_targets, &page_text, &patterns);
            regions_redacted += self.redact_page(doc, page, &targets, opts.style, None)?;
        }

        Ok(RedactionReport {
            entities_detected,
            regions_redacted,
            pages_processed: doc.page_count(),
            style: opts.style,
            input_hash: hex::encode(input_hasher.finalize()),
            completed_at: Utc::now(),
        })
    }

    /// Redacts specific literal strings without any analysis.
    pub fn redact_literals(
        &self,
        doc: &mut dyn RedactableDocument,
        literals: &[String],
        style: RedactionStyle,
    ) -> Result<RedactionReport, DocGuardError> {
        let targets = resolve_targets(&[], literals);

        let mut input_hasher = Sha256::new();
        for page in 0..doc.page_count() {
            input_hasher.update(doc.page_text(page)?.as_bytes());
        }

        let mut regions_redacted = 0;
        for page in 0..doc.page_count() {
            regions_redacted +=
                self.redact_page(doc, page, &targets, style, Some(REDACTED_LABEL))?;
        }

        Ok(RedactionReport {
            entities_detected: BTreeMap::new(),
            regions_redacted,
            pages_processed: doc.page_count(),
            style,
            input_hash: hex::encode(input_hasher.finalize()),
            completed_at: Utc::now(),
        })
    }

    /// Locates and obscures every target on one page. Returns the number of
    /// regions redacted. `fixed_label` overrides the per-entity label text.
    fn redact_page(
        &self,
        doc: &mut dyn RedactableDocument,
        page: usize,
        targets: &[RedactionTarget],
        style: RedactionStyle,
        fixed_label: Option<&str>,
    ) -> Result<usize, DocGuardError> {
        let mut claimed: Vec<Rect> = Vec::new();
        let mut regions_redacted = 0;

        for target in targets {
            let rects = match doc.search(page, &target.text) {
                Ok(rects) => rects,
                Err(e) => {
                    // One unlocatable target must not abort the page.
                    error!("region lookup failed on page {page}: {e}");
                    continue;
                }
            };

            for rect in rects {
                if claimed.iter().any(|c| c.contains(&rect)) {
                    // Substring of a longer target already applied this pass.
                    debug!("skipping region inside an already-redacted target");
                    continue;
                }

                let outcome = match style {
                    RedactionStyle::Blackout => doc
                        .mark_for_removal(page, rect)
                        .and_then(|_| doc.draw_fill(page, rect, Color::BLACK)),
                    RedactionStyle::Label => {
                        let label = match fixed_label {
                            Some(text) => text.to_string(),
                            None => format!("[{}]", target.entity_type),
                        };
                        apply_label(doc, page, rect, &label)
                    }
                };

                match outcome {
                    Ok(()) => {
                        claimed.push(rect);
                        regions_redacted += 1;
                    }
                    Err(e) => error!("failed to redact a region on page {page}: {e}"),
                }
            }
        }

        if style == RedactionStyle::Blackout {
            doc.apply_removals(page)?;
        }

        Ok(regions_redacted)
    }
}

/// Whites the region out, then centers the label horizontally and vertically,
/// shrinking the font so the label approximates the region's width.
fn apply_label(
    doc: &mut dyn RedactableDocument,
    page: usize,
    rect: Rect,
    label: &str,
) -> Result<(), DocGuardError> {
    let glyphs = label.chars().count().max(1) as f32;
    let mut font_size = LABEL_FONT_SIZE;
    if glyphs * font_size * 0.5 > rect.width() {
        font_size = rect.width() / (glyphs * 0.5);
    }
    let text_width = glyphs * font_size * 0.5;
    let text_height = font_size;

    let x = rect.x0 + (rect.width() - text_width) / 2.0;
    let y = rect.y0 + (rect.height() - text_height) / 2.0 + text_height * 0.5;

    doc.draw_fill(page, rect, Color::WHITE)?;
    doc.insert_label(page, (x, y), label, font_size)
}
