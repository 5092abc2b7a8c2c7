//! Configuration types for statement extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! The region-geometry fields deserve a note: the fallback start offsets are
//! empirically tuned against real statement exports, not derived from any
//! documented page format. They live here as overridable fields precisely so
//! a layout change upstream can be absorbed without touching the engine.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Configuration for one statement extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use suica_statement::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .margin(32.0)
///     .line_tolerance(1.5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Which extraction passes to run. Default: all.
    pub features: FeatureSet,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Horizontal page margin in points, applied on both sides of the table
    /// region and as the minimum table start offset. Default: 32.
    pub margin: f32,

    /// Points reserved above the page bottom for the footer boilerplate
    /// (thank-you line, operator name, page marker). Default: 40.
    pub footer_padding: f32,

    /// How far above the detected header line the table region starts, in
    /// points. A small lookback keeps the header row itself inside the region
    /// so the layout builder can anchor columns on it. Default: 5.
    pub header_lookback: f32,

    /// Table start offset from the top of the *first* page when no header
    /// line was detected. The first page carries the taller cover block
    /// (heading, card number, summary), hence the larger value. Default: 160.
    pub first_page_fallback_y: f32,

    /// Table start offset from the top of subsequent pages when no header
    /// line was detected. Default: 130.
    pub later_page_fallback_y: f32,

    /// Baseline-Y tolerance when clustering text runs into lines, in points.
    /// Default: 1.5.
    pub line_tolerance: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            features: FeatureSet::all(),
            password: None,
            margin: 32.0,
            footer_padding: 40.0,
            header_lookback: 5.0,
            first_page_fallback_y: 160.0,
            later_page_fallback_y: 130.0,
            line_tolerance: 1.5,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn features(mut self, features: FeatureSet) -> Self {
        self.config.features = features;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn margin(mut self, pts: f32) -> Self {
        self.config.margin = pts.max(0.0);
        self
    }

    pub fn footer_padding(mut self, pts: f32) -> Self {
        self.config.footer_padding = pts.max(0.0);
        self
    }

    pub fn header_lookback(mut self, pts: f32) -> Self {
        self.config.header_lookback = pts.max(0.0);
        self
    }

    pub fn first_page_fallback_y(mut self, pts: f32) -> Self {
        self.config.first_page_fallback_y = pts.max(0.0);
        self
    }

    pub fn later_page_fallback_y(mut self, pts: f32) -> Self {
        self.config.later_page_fallback_y = pts.max(0.0);
        self
    }

    pub fn line_tolerance(mut self, pts: f32) -> Self {
        self.config.line_tolerance = pts.max(0.1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !c.line_tolerance.is_finite() || c.line_tolerance <= 0.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "line_tolerance must be a positive number of points, got {}",
                c.line_tolerance
            )));
        }
        if !c.margin.is_finite() || c.margin < 0.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "margin must be ≥ 0, got {}",
                c.margin
            )));
        }
        Ok(self.config)
    }
}

// ── Feature selection ────────────────────────────────────────────────────

/// Which extraction passes to run.
///
/// Each flag gates one independent pass, so callers pay only for what they
/// consume: a CSV exporter needs `table_rows` alone, while an archive
/// indexer might want only `raw_text` and `document_metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Scan the full-document text for the statement heading block.
    pub statement_metadata: bool,
    /// Locate, lay out, and parse the transaction table.
    pub table_rows: bool,
    /// Return the full-document text, one line per visual line.
    pub raw_text: bool,
    /// Read the PDF info-dictionary summary.
    pub document_metadata: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FeatureSet {
    /// Every pass enabled.
    pub fn all() -> Self {
        Self {
            statement_metadata: true,
            table_rows: true,
            raw_text: true,
            document_metadata: true,
        }
    }

    /// No pass enabled. Useful as a starting point for builder-style setup.
    pub fn none() -> Self {
        Self {
            statement_metadata: false,
            table_rows: false,
            raw_text: false,
            document_metadata: false,
        }
    }

    /// Only the transaction-table pass.
    pub fn rows_only() -> Self {
        Self {
            table_rows: true,
            ..Self::none()
        }
    }

    /// Parse caller-supplied feature names, case-insensitively, accepting
    /// both `snake_case` and `kebab-case`. Unknown values are ignored; an
    /// empty or entirely-unknown list falls back to [`FeatureSet::all()`].
    pub fn from_strings<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut set = Self::none();
        for value in raw {
            match value.as_ref().trim().to_ascii_lowercase().replace('-', "_").as_str() {
                "statement_metadata" => set.statement_metadata = true,
                "table_rows" => set.table_rows = true,
                "raw_text" => set.raw_text = true,
                "document_metadata" => set.document_metadata = true,
                _ => {}
            }
        }
        if set == Self::none() {
            return Self::all();
        }
        set
    }

    /// Whether the full-document text pass is needed at all.
    pub fn needs_document_text(self) -> bool {
        self.raw_text || self.statement_metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_negative_margin() {
        let c = ExtractionConfig::builder().margin(-5.0).build().unwrap();
        assert_eq!(c.margin, 0.0);
    }

    #[test]
    fn builder_clamps_tiny_line_tolerance() {
        let c = ExtractionConfig::builder()
            .line_tolerance(0.0)
            .build()
            .unwrap();
        assert!(c.line_tolerance >= 0.1);
    }

    #[test]
    fn default_region_constants() {
        let c = ExtractionConfig::default();
        assert_eq!(c.margin, 32.0);
        assert_eq!(c.footer_padding, 40.0);
        assert_eq!(c.first_page_fallback_y, 160.0);
        assert_eq!(c.later_page_fallback_y, 130.0);
    }

    #[test]
    fn features_from_strings_mixed_case_and_kebab() {
        let set = FeatureSet::from_strings(&["Table-Rows", "RAW_TEXT"]);
        assert!(set.table_rows);
        assert!(set.raw_text);
        assert!(!set.statement_metadata);
        assert!(!set.document_metadata);
    }

    #[test]
    fn features_from_strings_falls_back_to_all() {
        assert_eq!(FeatureSet::from_strings::<&str>(&[]), FeatureSet::all());
        assert_eq!(FeatureSet::from_strings(&["bogus"]), FeatureSet::all());
    }

    #[test]
    fn needs_document_text_covers_metadata_and_raw() {
        assert!(FeatureSet::from_strings(&["raw_text"]).needs_document_text());
        assert!(FeatureSet::from_strings(&["statement_metadata"]).needs_document_text());
        assert!(!FeatureSet::rows_only().needs_document_text());
    }
}
