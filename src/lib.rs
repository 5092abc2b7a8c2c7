//! # suica-statement
//!
//! Parse Mobile Suica balance-history PDF statements into structured
//! transaction rows.
//!
//! ## Why this crate?
//!
//! The statement export is a visually formatted table with no embedded
//! table structure — just positioned text. Generic PDF-to-text tools
//! flatten it into word soup where station names, balances, and amounts
//! lose their columns. This crate rebuilds the table geometrically: it
//! finds the header row, derives per-column X boundaries from the header
//! labels, clusters text runs into lines, and buckets every token back
//! into its column before normalising the values.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Source    positioned text runs via pdfium
//!  ├─ 2. Header    locate the table header line per page
//!  ├─ 3. Region    bounding rectangle of the table (with fallbacks)
//!  ├─ 4. Lines     cluster runs into baseline-ordered lines
//!  ├─ 5. Layout    statement variant + column boundaries from anchors
//!  ├─ 6. Rows      typed rows, currency cleanup, correction heuristics
//!  └─ 7. Metadata  heading block scanned from full-document text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use suica_statement::{extract, ExtractionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = extract("statement.pdf", &ExtractionConfig::default())?;
//!     for row in &output.rows {
//!         println!("{} {}/{} {} -> {} ({})",
//!             row.year_month, row.month, row.day,
//!             row.station_in, row.station_out, row.amount);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `suica-statement` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! suica-statement = { version = "0.3", default-features = false }
//! ```
//!
//! ## Robustness model
//!
//! Only unreadable input and unopenable documents are errors. Every layout
//! problem — missing header, unanchorable columns, malformed lines — is
//! handled with a logged fallback or a dropped line, and extraction
//! continues. A statement that yields zero rows is a successful result.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, FeatureSet};
pub use error::ExtractError;
pub use extract::{extract, extract_from_bytes, extract_with_source, inspect};
pub use output::{
    DocumentMetadata, ExtractionOutput, StatementMetadata, StatementRow, StatementType,
    TableParseResult,
};
pub use pipeline::source::{GlyphSource, TextRun};
