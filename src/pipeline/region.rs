//! Region resolution: compute the bounding rectangle of the transaction
//! table on a page.
//!
//! When the header line was located, the region starts a few points above it
//! so the header row itself stays inside (the layout builder anchors on it).
//! When it was not, the resolver falls back to page-index-dependent start
//! offsets: the first page carries the taller cover block, so its table
//! starts lower. The fallback is logged but never an error — extraction
//! continues with reduced fidelity.
//!
//! Coordinates are top-down points, matching the glyph-source contract.

use crate::config::ExtractionConfig;
use tracing::warn;

/// Axis-aligned rectangle in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TableRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle (closed lower bound,
    /// open upper bound).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Compute the table rectangle for one page, or `None` when the page has no
/// usable vertical space (the caller skips such pages).
pub fn resolve_table_region(
    page_index: usize,
    page_width: f32,
    page_height: f32,
    header_y: Option<f32>,
    config: &ExtractionConfig,
) -> Option<TableRegion> {
    let start_y = match header_y {
        Some(y) => config.margin.max(y - config.header_lookback),
        None => {
            warn!(
                page = page_index + 1,
                "table header not found; falling back to default region offsets"
            );
            if page_index == 0 {
                config.first_page_fallback_y
            } else {
                config.later_page_fallback_y
            }
        }
    };

    let available_height = (page_height - start_y - config.footer_padding).max(0.0);
    let height = if available_height <= 0.0 {
        page_height - 2.0 * config.margin
    } else {
        available_height
    };
    if height <= 0.0 {
        return None;
    }

    let width = (page_width - 2.0 * config.margin).max(0.0);
    Some(TableRegion::new(config.margin, start_y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;

    const A4: (f32, f32) = (595.0, 842.0);

    #[test]
    fn header_y_anchors_region_with_lookback() {
        let config = ExtractionConfig::default();
        let region = resolve_table_region(0, A4.0, A4.1, Some(150.0), &config).unwrap();
        assert_eq!(region.y, 145.0);
        assert_eq!(region.x, 32.0);
        assert_eq!(region.width, 595.0 - 64.0);
        assert_eq!(region.height, 842.0 - 145.0 - 40.0);
    }

    #[test]
    fn header_near_top_clamps_to_margin() {
        let config = ExtractionConfig::default();
        let region = resolve_table_region(0, A4.0, A4.1, Some(10.0), &config).unwrap();
        assert_eq!(region.y, config.margin);
    }

    #[test]
    fn first_page_fallback_is_taller_than_later_pages() {
        let config = ExtractionConfig::default();
        let first = resolve_table_region(0, A4.0, A4.1, None, &config).unwrap();
        let later = resolve_table_region(1, A4.0, A4.1, None, &config).unwrap();
        assert_eq!(first.y, 160.0);
        assert_eq!(later.y, 130.0);
        assert!(later.height > first.height);
    }

    #[test]
    fn degenerate_height_falls_back_to_margins() {
        let config = ExtractionConfig::default();
        // Page shorter than startY + footer: available height collapses to
        // zero, but the page itself still has room between the margins.
        let region = resolve_table_region(1, 300.0, 150.0, None, &config).unwrap();
        assert_eq!(region.height, 150.0 - 64.0);
    }

    #[test]
    fn unusable_page_yields_none() {
        let config = ExtractionConfig::default();
        // Tiny page: even margin-to-margin height is non-positive.
        assert!(resolve_table_region(1, 300.0, 60.0, None, &config).is_none());
    }

    #[test]
    fn contains_is_half_open() {
        let r = TableRegion::new(10.0, 10.0, 100.0, 100.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(50.0, 50.0));
        assert!(!r.contains(110.0, 50.0));
        assert!(!r.contains(50.0, 110.0));
    }
}
