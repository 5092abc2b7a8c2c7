//! Pipeline stages for statement-table extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the glyph backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ header ──▶ region ──▶ lines ──▶ layout ──▶ rows
//! (pdfium)  (header Y) (table    (Y-clustered (column    (typed
//!                       rect)     tokens)     bounds)    rows)
//!
//! source ──▶ lines (unrestricted) ──▶ metadata
//! ```
//!
//! 1. [`source`]   — positioned text runs from the document, via the
//!    [`source::GlyphSource`] trait (pdfium-backed in production)
//! 2. [`header`]   — locate the Y of the table header line on a page
//! 3. [`region`]   — compute the table bounding rectangle for a page
//! 4. [`lines`]    — cluster runs inside the rectangle into ordered lines
//! 5. [`layout`]   — classify the statement variant and derive per-column
//!    X boundaries from header anchors (or an even-spacing fallback)
//! 6. [`rows`]     — turn column-bucketed lines into typed rows with
//!    currency normalisation and correction heuristics
//! 7. [`metadata`] — scan full-document lines for the heading block
//!
//! Every stage is a pure function over immutable line/token values; all
//! accumulators are local to one call, so concurrent extractions never
//! share state.

pub mod header;
pub mod layout;
pub mod lines;
pub mod metadata;
pub mod region;
pub mod rows;
pub mod source;
