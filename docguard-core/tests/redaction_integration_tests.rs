// docguard-core/tests/redaction_integration_tests.rs
//
// End-to-end redaction properties: blackout destroys the glyphs and is
// idempotent, label style replaces them with entity-type tags, longer
// targets claim their substrings, and per-target failures stay local.

use docguard_core::validators::verhoeff_check_digit;
use docguard_core::{
    AnalyzerEngine, Color, DocGuardError, DocumentRedactor, Rect, RedactableDocument,
    RedactionOptions, RedactionStyle, TextDocument,
};

fn engine() -> AnalyzerEngine {
    AnalyzerEngine::with_defaults().unwrap()
}

fn valid_aadhaar() -> String {
    let base = "23456789012";
    let check = verhoeff_check_digit(base).unwrap();
    format!("{base}{check}")
}

#[test]
fn test_blackout_removes_digits_and_keeps_surroundings() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let id = valid_aadhaar();
    let mut doc = TextDocument::from_text(&format!("Contact Aadhaar {id}, ref AADHAAR"));

    let report = redactor
        .redact_document(&mut doc, &RedactionOptions::default())
        .unwrap();

    assert_eq!(report.entities_detected.get(&id).map(String::as_str), Some("IN_AADHAAR"));
    assert!(report.regions_redacted >= 1);

    let output = doc.to_text();
    assert!(!output.contains(&id));
    assert!(!output.chars().any(|c| c.is_ascii_digit()));
    assert!(output.contains("Contact"));
}

#[test]
fn test_blackout_is_idempotent() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let id = valid_aadhaar();
    let mut doc = TextDocument::from_text(&format!("Contact Aadhaar {id}, ref AADHAAR"));

    redactor
        .redact_document(&mut doc, &RedactionOptions::default())
        .unwrap();
    let first_pass = doc.to_text();

    // Re-running the pipeline on its own output must find nothing to redact.
    let mut doc2 = TextDocument::from_text(&first_pass);
    let report = redactor
        .redact_document(&mut doc2, &RedactionOptions::default())
        .unwrap();
    assert!(report.entities_detected.is_empty());
    assert_eq!(report.regions_redacted, 0);
    assert_eq!(doc2.to_text(), first_pass);
}

#[test]
fn test_label_style_embeds_entity_type() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let id = valid_aadhaar();
    let mut doc = TextDocument::from_text(&format!("Contact Aadhaar {id}, ref AADHAAR"));

    let opts = RedactionOptions {
        style: RedactionStyle::Label,
        ..Default::default()
    };
    redactor.redact_document(&mut doc, &opts).unwrap();

    let output = doc.to_text();
    assert!(!output.contains(&id));
    assert!(output.contains("IN_AADHAAR"));
    assert!(output.contains("Contact"));
}

#[test]
fn test_label_style_is_idempotent() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let id = valid_aadhaar();
    let mut doc = TextDocument::from_text(&format!("Contact Aadhaar {id}, ref AADHAAR"));

    let opts = RedactionOptions {
        style: RedactionStyle::Label,
        ..Default::default()
    };
    redactor.redact_document(&mut doc, &opts).unwrap();
    let first_pass = doc.to_text();

    let mut doc2 = TextDocument::from_text(&first_pass);
    let report = redactor.redact_document(&mut doc2, &opts).unwrap();
    assert!(report.entities_detected.is_empty());
    assert_eq!(report.regions_redacted, 0);
}

#[test]
fn test_multi_page_documents_redact_every_page() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let id = valid_aadhaar();
    let mut doc = TextDocument::from_text(&format!(
        "page one Aadhaar {id}\u{0c}page two repeats Aadhaar {id}"
    ));

    let report = redactor
        .redact_document(&mut doc, &RedactionOptions::default())
        .unwrap();
    assert_eq!(report.pages_processed, 2);
    assert_eq!(report.regions_redacted, 2);
    assert!(!doc.to_text().contains(&id));
}

#[test]
fn test_extra_keywords_and_custom_regex() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let mut doc =
        TextDocument::from_text("project codename falconridge, ticket REF-2024-001 open");

    let opts = RedactionOptions {
        extra_keywords: vec!["falconridge".to_string()],
        custom_regex: vec![r"REF-\d{4}-\d{3}".to_string()],
        ..Default::default()
    };
    let report = redactor.redact_document(&mut doc, &opts).unwrap();

    let output = doc.to_text();
    assert!(!output.contains("falconridge"));
    assert!(!output.contains("REF-2024-001"));
    assert!(output.contains("project"));
    // Caller-supplied material is CUSTOM, not a detected entity.
    assert!(report.entities_detected.is_empty());
}

#[test]
fn test_longest_match_first_across_detection_and_keywords() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let mut doc = TextDocument::from_text("ids ABC12345XYZ then bare 12345 tail");

    let opts = RedactionOptions {
        extra_keywords: vec!["12345".to_string(), "ABC12345XYZ".to_string()],
        ..Default::default()
    };
    let report = redactor.redact_document(&mut doc, &opts).unwrap();

    // The long literal is one region; the bare occurrence is its own.
    assert_eq!(report.regions_redacted, 2);
    let output = doc.to_text();
    assert!(!output.contains("12345"));
    assert!(output.contains("ids"));
    assert!(output.contains("tail"));
}

/// A document whose `search` fails for one specific literal, to prove the
/// failure stays scoped to that target.
struct FaultySearchDocument {
    inner: TextDocument,
    poison: String,
}

impl RedactableDocument for FaultySearchDocument {
    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn page_text(&self, page: usize) -> Result<String, DocGuardError> {
        self.inner.page_text(page)
    }

    fn search(&self, page: usize, literal: &str) -> Result<Vec<Rect>, DocGuardError> {
        if literal == self.poison {
            return Err(DocGuardError::RegionLookup {
                page,
                reason: "backend search crashed".to_string(),
            });
        }
        self.inner.search(page, literal)
    }

    fn draw_fill(&mut self, page: usize, rect: Rect, color: Color) -> Result<(), DocGuardError> {
        self.inner.draw_fill(page, rect, color)
    }

    fn mark_for_removal(&mut self, page: usize, rect: Rect) -> Result<(), DocGuardError> {
        self.inner.mark_for_removal(page, rect)
    }

    fn apply_removals(&mut self, page: usize) -> Result<(), DocGuardError> {
        self.inner.apply_removals(page)
    }

    fn insert_label(
        &mut self,
        page: usize,
        origin: (f32, f32),
        text: &str,
        font_size: f32,
    ) -> Result<(), DocGuardError> {
        self.inner.insert_label(page, origin, text, font_size)
    }
}

#[test]
fn test_region_lookup_failure_is_isolated_per_target() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let mut doc = FaultySearchDocument {
        inner: TextDocument::from_text("alpha poisoned beta"),
        poison: "poisoned".to_string(),
    };

    let report = redactor
        .redact_literals(
            &mut doc,
            &["poisoned".to_string(), "alpha".to_string(), "beta".to_string()],
            RedactionStyle::Blackout,
        )
        .unwrap();

    // The poisoned target is skipped; the other two still go through.
    assert_eq!(report.regions_redacted, 2);
    let output = doc.inner.to_text();
    assert!(output.contains("poisoned"));
    assert!(!output.contains("alpha"));
    assert!(!output.contains("beta"));
}

#[test]
fn test_redact_literals_label_uses_fixed_placeholder() {
    let engine = engine();
    let redactor = DocumentRedactor::new(&engine).unwrap();
    let mut doc = TextDocument::from_text("value 0123456789 closing");

    redactor
        .redact_literals(&mut doc, &["0123456789".to_string()], RedactionStyle::Label)
        .unwrap();

    let output = doc.to_text();
    assert!(output.contains("[REDACTED]"));
    assert!(!output.contains("0123456789"));
}
