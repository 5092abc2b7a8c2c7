//! Header location: find the Y coordinate of the table header line.
//!
//! The header row arrives as several independent runs on the same baseline,
//! often with uneven spacing, so no single run matches the full signature.
//! The scan keeps a local map from rounded baseline Y to an accumulating
//! text buffer; each run appends to its line's buffer, and the first buffer
//! whose flattened content satisfies the signature wins. The accumulator is
//! created fresh per scan — nothing is stored on any long-lived object, so
//! concurrent scans cannot interfere.
//!
//! Not finding a header is a normal outcome (some exports omit the header
//! text entirely); the caller falls back to default region offsets.

use crate::error::ExtractError;
use crate::pipeline::source::GlyphSource;
use std::collections::HashMap;

/// Whether flattened text contains the table header signature: the month and
/// day markers, both type and station labels twice (entry and exit legs),
/// and an amount label.
pub fn is_header_text(text: &str) -> bool {
    let flattened: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let type_count = flattened.matches("種別").count();
    let station_count = flattened.matches("利用駅").count();
    let has_amount = flattened.contains("入金")
        || flattened.contains("利用額")
        || flattened.contains("利用金額");
    flattened.contains('月')
        && flattened.contains('日')
        && type_count >= 2
        && station_count >= 2
        && has_amount
}

/// Scan one page for the header line, returning its baseline Y or `None`.
pub fn locate_header_y(
    source: &dyn GlyphSource,
    page_index: usize,
) -> Result<Option<f32>, ExtractError> {
    let mut buffers: HashMap<i64, String> = HashMap::new();
    let mut header_y: Option<f32> = None;

    source.for_each_run(page_index, &mut |run| {
        if header_y.is_some() {
            return;
        }
        let buffer = buffers.entry(run.y.round() as i64).or_default();
        buffer.push_str(&run.text);
        if is_header_text(buffer) {
            header_y = Some(run.y);
        }
    })?;

    Ok(header_y)
}
