// docguard-core/src/lib.rs
//! # DocGuard Core Library
//!
//! `docguard-core` provides the fundamental, platform-independent logic for
//! detecting personally-identifiable information in text and projecting the
//! accepted detections onto removable regions of page-structured documents
//! and OCR'd images. It defines the recognizer framework (patterns, context
//! enhancement, programmatic validation), the analysis engine that merges and
//! ranks candidates, and the redaction applicators that obscure the results.
//!
//! The library is designed to be pure and stateless beyond its immutable
//! engine: recognizers are constructed once at startup, shared read-only
//! across concurrent requests, and every analysis or redaction request owns
//! its candidate/target/region state exclusively.
//!
//! ## Modules
//!
//! * `config`: Declarative recognizer definitions and YAML registry loading.
//! * `validators`: Programmatic validation (Verhoeff, Luhn, structural checks).
//! * `context`: Confidence adjustment from keyword proximity.
//! * `recognizer`: The `Recognizer` trait and its pattern-driven implementation.
//! * `registry`: The ordered, immutable recognizer registry.
//! * `engine`: The analysis engine (COLLECT → ENHANCE → VALIDATE → MERGE → RANK).
//! * `entity`: Candidate/result data model and PII-safe logging helpers.
//! * `targets`: Redaction target resolution (dedup, longest-match-first).
//! * `document`: Page text/geometry provider trait and the text backend.
//! * `redactors`: Document and image redaction applicators.
//! * `protection`: Interface to the external DRM collaborator.
//! * `batch`: Bounded parallel redaction of independent documents.
//! * `errors`: The library's error taxonomy.
//!
//! ## Usage Example
//!
//! ```rust
//! use docguard_core::{AnalyzerEngine, AnalysisFilters};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     // 1. Build the engine once; it is immutable and shareable afterwards.
//!     let engine = AnalyzerEngine::with_defaults()?;
//!
//!     // 2. Analyze some text.
//!     let text = "Reach me at person@example.com about the invoice.";
//!     let results = engine.analyze(text, "en", &AnalysisFilters::default())?;
//!
//!     for entity in &results {
//!         println!("{} [{}, {}) score {:.2}", entity.entity_type, entity.start, entity.end, entity.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`DocGuardError`]. Configuration problems fail
//! registry construction; input problems fail one request; failures scoped to
//! one candidate or one redaction target are absorbed and logged where they
//! occur, per the pipeline's isolation policy.
//!
//! ## Design Principles
//!
//! * **Registry-driven:** Recognizers are data plus a closed validator set,
//!   not subclasses; extending detection means registering definitions.
//! * **Immutable engine:** One constructed `AnalyzerEngine` value is passed
//!   by reference into every request handler; no ambient global state.
//! * **Isolation:** A misbehaving validator, NLP source, or unlocatable
//!   target never poisons the surrounding request.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod batch;
pub mod config;
pub mod context;
pub mod document;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod protection;
pub mod recognizer;
pub mod redactors;
pub mod registry;
pub mod targets;
pub mod validators;

/// Re-exports the public configuration types and functions for managing the
/// recognizer registry.
pub use config::{
    merge_registries, ContextConfig, IndicatorDefinition, PatternDefinition,
    RecognizerDefinition, RegistryConfig, MAX_PATTERN_LENGTH,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::DocGuardError;

/// Re-exports the analysis engine and its request surface.
pub use engine::{AnalysisFilters, AnalyzerEngine, NlpSpan, NlpSpanSource};

/// Re-exports the candidate/result data model and PII-safe helpers.
pub use entity::{redact_sensitive, CandidateMatch, EntityResult};

/// Re-exports the recognizer seam and registry.
pub use recognizer::{PatternRecognizer, Recognizer};
pub use registry::RecognizerRegistry;

/// Re-exports redaction target resolution.
pub use targets::{RedactionTarget, CUSTOM_ENTITY_TYPE};

/// Re-exports the document seam and the built-in text backend.
pub use document::{Color, Rect, RedactableDocument, TextDocument};

/// Re-exports the redaction applicators.
pub use redactors::document_redactor::{
    DocumentRedactor, RedactionOptions, RedactionReport, RedactionStyle,
};
pub use redactors::image_redactor::{
    ImageRedactionOptions, ImageRedactionReport, ImageRedactor, OcrEngine, OcrOutput, OcrToken,
    RasterImage,
};

/// Re-exports the external protection collaborator interface.
pub use protection::{
    DocumentMetadata, HttpProtectionClient, InMemoryProtectionStore, ProtectionService,
    ProtectionStatus,
};

/// Re-exports the batch worker pool.
pub use batch::{redact_files, BatchJob, BatchOptions, BatchOutcome};
