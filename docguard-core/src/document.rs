// docguard-core/src/document.rs
//! The page text/geometry provider interface and a text-layer implementation.
//!
//! [`RedactableDocument`] is the seam between the redaction pipeline and a
//! concrete document backend. The trait mirrors what page-structured document
//! libraries offer: extract a page's text, search a literal for bounding
//! boxes, draw fills, mark regions for destructive removal, apply the
//! removals, and insert label text.
//!
//! [`TextDocument`] is the built-in backend used by the CLI and the test
//! suite. Its geometry is the character cell: one line per row, one char per
//! column, so a bounding box is a half-open span of columns on a run of rows.
//! The text layer and the visual layer coincide, which makes destructive
//! removal observable: removed glyphs become `█` and are unrecoverable from
//! the output.

use serde::{Deserialize, Serialize};

use crate::errors::DocGuardError;

/// Axis-aligned bounding box. Coordinates are backend units: points for PDF
/// backends, pixels for images, character cells for [`TextDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

/// RGB fill color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Simple luminance split used by text backends to pick a fill glyph.
    pub fn is_light(&self) -> bool {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b > 0.5
    }
}

/// A page-structured document that the redaction applicator can mutate.
pub trait RedactableDocument {
    fn page_count(&self) -> usize;

    /// Extracted text layer of one page.
    fn page_text(&self, page: usize) -> Result<String, DocGuardError>;

    /// Every disjoint visual occurrence of `literal` on the page.
    fn search(&self, page: usize, literal: &str) -> Result<Vec<Rect>, DocGuardError>;

    /// Draws an opaque fill over a region.
    fn draw_fill(&mut self, page: usize, rect: Rect, color: Color) -> Result<(), DocGuardError>;

    /// Marks a region for permanent content removal; the removal happens in
    /// [`RedactableDocument::apply_removals`].
    fn mark_for_removal(&mut self, page: usize, rect: Rect) -> Result<(), DocGuardError>;

    /// Applies all pending removals on the page. Irreversible.
    fn apply_removals(&mut self, page: usize) -> Result<(), DocGuardError>;

    /// Inserts label text with its baseline origin at `origin`.
    fn insert_label(
        &mut self,
        page: usize,
        origin: (f32, f32),
        text: &str,
        font_size: f32,
    ) -> Result<(), DocGuardError>;
}

/// One page of a [`TextDocument`]: a grid of character cells plus regions
/// marked for removal but not yet applied.
#[derive(Debug, Clone, Default)]
struct TextPage {
    lines: Vec<Vec<char>>,
    pending_removals: Vec<Rect>,
}

/// Character glyph left behind by destructive removal.
const REMOVED_GLYPH: char = '█';

/// A plain-text document with character-cell geometry. Pages are separated
/// by form feeds (`\x0c`) in the serialized form.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    pages: Vec<TextPage>,
}

impl TextDocument {
    /// Parses text into pages (form-feed separated) and lines.
    pub fn from_text(text: &str) -> Self {
        let pages = text
            .split('\u{0c}')
            .map(|page| TextPage {
                lines: page.split('\n').map(|l| l.chars().collect()).collect(),
                pending_removals: Vec::new(),
            })
            .collect();
        Self { pages }
    }

    /// Reads a document from a file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, DocGuardError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Writes the document to a file.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), DocGuardError> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Serializes all pages back to text.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| {
                p.lines
                    .iter()
                    .map(|l| l.iter().collect::<String>())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\u{0c}")
    }

    fn page(&self, page: usize) -> Result<&TextPage, DocGuardError> {
        self.pages
            .get(page)
            .ok_or(DocGuardError::PageOutOfBounds(page, self.pages.len()))
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut TextPage, DocGuardError> {
        let count = self.pages.len();
        self.pages
            .get_mut(page)
            .ok_or(DocGuardError::PageOutOfBounds(page, count))
    }

    fn fill_cells(page: &mut TextPage, rect: Rect, glyph: char) {
        let row_start = rect.y0.floor().max(0.0) as usize;
        let row_end = (rect.y1.ceil().max(0.0) as usize).min(page.lines.len());
        for row in row_start..row_end {
            let line = &mut page.lines[row];
            let col_start = rect.x0.floor().max(0.0) as usize;
            let col_end = (rect.x1.ceil().max(0.0) as usize).min(line.len());
            for cell in line.iter_mut().take(col_end).skip(col_start) {
                *cell = glyph;
            }
        }
    }
}

impl RedactableDocument for TextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, DocGuardError> {
        let page = self.page(page)?;
        Ok(page
            .lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn search(&self, page: usize, literal: &str) -> Result<Vec<Rect>, DocGuardError> {
        let page = self.page(page)?;
        let needle: Vec<char> = literal.chars().collect();
        if needle.is_empty() || literal.contains('\n') {
            // Occurrences are located within a single line; multi-line
            // literals have no cell geometry here.
            return Ok(Vec::new());
        }

        let mut rects = Vec::new();
        for (row, line) in page.lines.iter().enumerate() {
            let mut col = 0;
            while col + needle.len() <= line.len() {
                if line[col..col + needle.len()] == needle[..] {
                    rects.push(Rect::new(
                        col as f32,
                        row as f32,
                        (col + needle.len()) as f32,
                        (row + 1) as f32,
                    ));
                    col += needle.len();
                } else {
                    col += 1;
                }
            }
        }
        Ok(rects)
    }

    fn draw_fill(&mut self, page: usize, rect: Rect, color: Color) -> Result<(), DocGuardError> {
        let page = self.page_mut(page)?;
        let glyph = if color.is_light() { ' ' } else { REMOVED_GLYPH };
        Self::fill_cells(page, rect, glyph);
        Ok(())
    }

    fn mark_for_removal(&mut self, page: usize, rect: Rect) -> Result<(), DocGuardError> {
        self.page_mut(page)?.pending_removals.push(rect);
        Ok(())
    }

    fn apply_removals(&mut self, page: usize) -> Result<(), DocGuardError> {
        let page = self.page_mut(page)?;
        let pending = std::mem::take(&mut page.pending_removals);
        for rect in pending {
            Self::fill_cells(page, rect, REMOVED_GLYPH);
        }
        Ok(())
    }

    fn insert_label(
        &mut self,
        page: usize,
        origin: (f32, f32),
        text: &str,
        _font_size: f32,
    ) -> Result<(), DocGuardError> {
        let page = self.page_mut(page)?;
        if page.lines.is_empty() {
            return Ok(());
        }
        let row = (origin.1.floor().max(0.0) as usize).min(page.lines.len() - 1);
        let col = origin.0.round().max(0.0) as usize;

        let line = &mut page.lines[row];
        let label: Vec<char> = text.chars().collect();
        if line.len() < col + label.len() {
            line.resize(col + label.len(), ' ');
        }
        line[col..col + label.len()].copy_from_slice(&label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_pages_and_lines() {
        let doc = TextDocument::from_text("page one\nline two\u{0c}page two");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(0).unwrap(), "page one\nline two");
        assert_eq!(doc.to_text(), "page one\nline two\u{0c}page two");
    }

    #[test]
    fn test_search_finds_all_disjoint_occurrences() {
        let doc = TextDocument::from_text("abc abc\nxabcx");
        let rects = doc.search(0, "abc").unwrap();
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 3.0, 1.0));
        assert_eq!(rects[1], Rect::new(4.0, 0.0, 7.0, 1.0));
        assert_eq!(rects[2], Rect::new(1.0, 1.0, 4.0, 2.0));
    }

    #[test]
    fn test_search_out_of_bounds_page() {
        let doc = TextDocument::from_text("text");
        assert!(matches!(
            doc.search(3, "text"),
            Err(DocGuardError::PageOutOfBounds(3, 1))
        ));
    }

    #[test]
    fn test_mark_and_apply_destroys_text() {
        let mut doc = TextDocument::from_text("secret data");
        let rect = doc.search(0, "secret").unwrap()[0];
        doc.mark_for_removal(0, rect).unwrap();
        // Text unchanged until removals are applied.
        assert_eq!(doc.page_text(0).unwrap(), "secret data");
        doc.apply_removals(0).unwrap();
        assert_eq!(doc.page_text(0).unwrap(), "██████ data");
    }

    #[test]
    fn test_white_fill_blanks_cells() {
        let mut doc = TextDocument::from_text("secret data");
        let rect = doc.search(0, "secret").unwrap()[0];
        doc.draw_fill(0, rect, Color::WHITE).unwrap();
        assert_eq!(doc.page_text(0).unwrap(), "       data");
    }

    #[test]
    fn test_insert_label_overwrites_cells() {
        let mut doc = TextDocument::from_text("            tail");
        doc.insert_label(0, (2.0, 0.5), "[REDACTED]", 2.0).unwrap();
        assert_eq!(doc.page_text(0).unwrap(), "  [REDACTED]tail");
    }

    #[test]
    fn test_rect_containment() {
        let outer = Rect::new(0.0, 0.0, 10.0, 1.0);
        let inner = Rect::new(2.0, 0.0, 8.0, 1.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }
}
