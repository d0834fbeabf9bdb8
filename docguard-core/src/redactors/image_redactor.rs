// docguard-core/src/redactors/image_redactor.rs
//! Raster-image redaction over OCR word boxes.
//!
//! OCR is a black box behind [`OcrEngine`]: it yields the full extracted
//! text plus word tokens with bounding boxes. Detection runs on the full
//! text; redaction fills every token box whose token text contains a
//! detected literal.
//!
//! Matching is performed at the word-token granularity the OCR engine
//! returns: a target is considered present in a token when the token's text
//! contains it as a substring. This is coarser than a document text layer
//! and can over- or under-match single tokens (shared prefixes, targets
//! spanning token boundaries). That is a known precision boundary of this
//! approach, not a defect — no character-level OCR geometry is invented.

use log::{debug, warn};
use serde::Serialize;

use crate::document::Rect;
use crate::engine::{AnalysisFilters, AnalyzerEngine};
use crate::errors::DocGuardError;

/// One OCR word: its recognized text and bounding box in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub rect: Rect,
}

/// Output of one OCR extraction pass.
#[derive(Debug, Clone, Default)]
pub struct OcrOutput {
    pub full_text: String,
    pub tokens: Vec<OcrToken>,
}

/// Black-box OCR text extractor.
pub trait OcrEngine: Send + Sync {
    fn extract(&self, image: &RasterImage) -> anyhow::Result<OcrOutput>;
}

/// A minimal owned RGB raster: enough surface for the applicator to fill
/// regions and for tests to observe the result.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl RasterImage {
    /// Creates an image filled with one color.
    pub fn new(width: u32, height: u32, fill: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Fills a rectangle, clamped to the image bounds.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 3]) {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let y0 = rect.y0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.y1.ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[(y as usize) * (self.width as usize) + (x as usize)] = color;
            }
        }
    }
}

/// Options for one image redaction request.
#[derive(Debug, Clone)]
pub struct ImageRedactionOptions {
    pub language: String,
    pub entity_types: Option<Vec<String>>,
    pub score_threshold: Option<f64>,
    pub allow_list: Vec<String>,
    /// Fill color for redacted boxes.
    pub fill_color: [u8; 3],
}

impl Default for ImageRedactionOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            entity_types: None,
            score_threshold: None,
            allow_list: Vec::new(),
            fill_color: [0, 0, 0],
        }
    }
}

/// Outcome of one image redaction request.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRedactionReport {
    /// Detected literals, in rank order.
    pub entities_detected: Vec<String>,
    /// Unique entity types among the detections.
    pub entity_types: Vec<String>,
    pub regions_redacted: usize,
}

/// Applies detection results onto raster images via OCR word boxes.
pub struct ImageRedactor<'e> {
    engine: &'e AnalyzerEngine,
}

impl<'e> ImageRedactor<'e> {
    pub fn new(engine: &'e AnalyzerEngine) -> Self {
        Self { engine }
    }

    /// Extracts text from the image, analyzes it, and fills every token box
    /// containing a detected literal.
    pub fn redact_image(
        &self,
        image: &mut RasterImage,
        ocr: &dyn OcrEngine,
        opts: &ImageRedactionOptions,
    ) -> Result<ImageRedactionReport, DocGuardError> {
        let extracted = ocr
            .extract(image)
            .map_err(DocGuardError::AnyhowWrapper)?;

        let filters = AnalysisFilters {
            entity_types: opts.entity_types.clone(),
            score_threshold: opts.score_threshold,
            allow_list: opts.allow_list.clone(),
        };
        let results = self
            .engine
            .analyze(&extracted.full_text, &opts.language, &filters)?;

        let literals: Vec<(String, String)> = results
            .iter()
            .filter(|r| r.text.trim().len() > 2)
            .map(|r| (r.text.clone(), r.entity_type.clone()))
            .collect();

        if literals.is_empty() {
            debug!("no redactable entities found in OCR text");
        }

        let mut regions_redacted = 0;
        for token in &extracted.tokens {
            if token.text.is_empty() {
                continue;
            }
            // Whole-token containment; first matching literal claims the box.
            if literals.iter().any(|(text, _)| token.text.contains(text)) {
                image.fill_rect(token.rect, opts.fill_color);
                regions_redacted += 1;
            }
        }

        if regions_redacted == 0 && !literals.is_empty() {
            warn!("entities detected in OCR text but no token box matched them");
        }

        let mut entity_types: Vec<String> =
            literals.iter().map(|(_, t)| t.clone()).collect();
        entity_types.sort();
        entity_types.dedup();

        Ok(ImageRedactionReport {
            entities_detected: literals.into_iter().map(|(text, _)| text).collect(),
            entity_types,
            regions_redacted,
        })
    }
}
