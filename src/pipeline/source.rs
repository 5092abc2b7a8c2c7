//! Glyph source: positioned text runs from a PDF document.
//!
//! The pipeline never talks to pdfium directly — it consumes the
//! [`GlyphSource`] trait, which hands out merged text runs with top-down
//! page coordinates. Tests substitute an in-memory source; production uses
//! [`PdfiumSource`], which merges pdfium's per-character output into runs.
//!
//! ## Coordinate convention
//!
//! pdfium reports character bounds in bottom-up page coordinates. All the
//! region and header heuristics in this crate are tuned for top-down
//! coordinates (origin at the top-left, Y growing downward), so the
//! conversion happens here, once, at the boundary: `y = page_height - top`.
//!
//! ## Run merging
//!
//! A run is a maximal sequence of characters sharing a baseline whose
//! horizontal gaps stay below a fraction of the font size. Larger gaps —
//! typically column whitespace — start a new run, which is exactly the
//! granularity the line assembler wants: one run per table cell fragment.

use crate::error::ExtractError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;

/// Baseline drift tolerated within a single run, in points.
const CHAR_BASELINE_TOLERANCE: f32 = 1.5;

/// Horizontal gaps wider than this fraction of the font size split runs.
const GAP_FONT_SIZE_FACTOR: f32 = 0.3;

/// A merged text span with its position in top-down page points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left edge of the run.
    pub x: f32,
    /// Baseline Y, top-down.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Merged character content.
    pub text: String,
}

/// Read-only access to the positioned text of a document.
///
/// Implementations must report Y top-down and visit runs of a page in
/// reading order as stored in the document.
pub trait GlyphSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page media box size as `(width, height)` in points.
    fn page_size(&self, page_index: usize) -> Result<(f32, f32), ExtractError>;

    /// Invoke `visit` for every text run on the page.
    fn for_each_run(
        &self,
        page_index: usize,
        visit: &mut dyn FnMut(&TextRun),
    ) -> Result<(), ExtractError>;
}

/// [`GlyphSource`] backed by a loaded pdfium document.
pub struct PdfiumSource<'a, 'b> {
    document: &'a PdfDocument<'b>,
}

impl<'a, 'b> PdfiumSource<'a, 'b> {
    pub fn new(document: &'a PdfDocument<'b>) -> Self {
        Self { document }
    }

    fn page(&self, page_index: usize) -> Result<PdfPage<'b>, ExtractError> {
        self.document
            .pages()
            .get(page_index as u16)
            .map_err(|e| ExtractError::PageReadFailed {
                page: page_index + 1,
                detail: format!("{e:?}"),
            })
    }
}

impl GlyphSource for PdfiumSource<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32), ExtractError> {
        let page = self.page(page_index)?;
        Ok((page.width().value, page.height().value))
    }

    fn for_each_run(
        &self,
        page_index: usize,
        visit: &mut dyn FnMut(&TextRun),
    ) -> Result<(), ExtractError> {
        let page = self.page(page_index)?;
        let page_height = page.height().value;
        let text_page = page.text().map_err(|e| ExtractError::PageReadFailed {
            page: page_index + 1,
            detail: format!("{e:?}"),
        })?;

        let mut run_text = String::new();
        let mut run_start_x = 0.0f32;
        let mut run_y = 0.0f32;
        let mut last_right = 0.0f32;
        let mut last_top = 0.0f32;
        let mut flush = |text: &mut String, start_x: f32, y: f32, end_x: f32| {
            if !text.is_empty() {
                let run = TextRun {
                    x: start_x,
                    y,
                    width: (end_x - start_x).max(0.0),
                    text: std::mem::take(text),
                };
                visit(&run);
            }
        };

        for char in text_page.chars().iter() {
            let Some(unicode) = char.unicode_char() else {
                continue;
            };
            let bounds = match char.loose_bounds() {
                Ok(b) => b,
                Err(_) => continue,
            };
            let left = bounds.left.value;
            let right = bounds.right.value;
            let top = bounds.top.value;
            let font_size = char.unscaled_font_size().value.max(1.0);

            let splits = !run_text.is_empty()
                && ((top - last_top).abs() > CHAR_BASELINE_TOLERANCE
                    || left - last_right > font_size * GAP_FONT_SIZE_FACTOR);
            if splits {
                flush(&mut run_text, run_start_x, run_y, last_right);
            }
            if run_text.is_empty() {
                run_start_x = left;
                run_y = page_height - top;
            }
            run_text.push(unicode);
            last_right = right;
            last_top = top;
        }
        flush(&mut run_text, run_start_x, run_y, last_right);

        Ok(())
    }
}

/// Read the document information dictionary. Empty tag values map to `None`.
pub fn read_document_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}
