//! Column layout: classify the statement variant and derive per-column X
//! boundaries for the table.
//!
//! ## Anchor-based boundaries
//!
//! The header row names every column, so each column definition carries the
//! keyword substrings of its label. Anchoring walks the definitions in order
//! and scans the header tokens left to right, consuming each match: the
//! `種別` (type) label appears twice — entry and exit leg — and forward-only
//! consumption is what maps the first occurrence to the entry column and the
//! second to the exit column. A column boundary then spans the midpoints
//! between neighbouring anchors, padded outward at the extremes.
//!
//! ## Fallback
//!
//! When no header line exists, or any definition fails to anchor, the whole
//! anchor list is discarded and the span between the observed min/max X is
//! divided into equal bins. That is visibly less faithful — merged cells can
//! land in the wrong bucket — so it is logged as a warning, but extraction
//! continues. Layout trouble is never an error.

use crate::output::StatementType;
use crate::pipeline::lines::TableLine;
use tracing::warn;

/// Widening applied to the outermost boundaries, in points.
const PADDING: f32 = 2.0;

/// Slack when testing a token centre against a boundary, in points.
const BOUNDARY_TOLERANCE: f32 = 0.5;

/// Column count of the full-history layout (with running balance).
pub const FULL_COLUMN_COUNT: usize = 8;

/// Column count of the partial-selection layout (no balance).
pub const PARTIAL_COLUMN_COUNT: usize = 7;

/// A column name plus the keyword substrings its header label may contain.
/// Keywords are matched against normalised header tokens; the first unused
/// token that matches wins, scanned left to right with no reuse.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDefinition {
    pub name: &'static str,
    keywords: &'static [&'static str],
}

impl ColumnDefinition {
    const fn new(name: &'static str, keywords: &'static [&'static str]) -> Self {
        Self { name, keywords }
    }

    fn matches(&self, normalized_token: &str) -> bool {
        self.keywords.iter().any(|k| normalized_token.contains(k))
    }
}

/// The eight logical columns of a full-history statement, in table order.
pub const FULL_COLUMNS: [ColumnDefinition; FULL_COLUMN_COUNT] = [
    ColumnDefinition::new("month", &["月"]),
    ColumnDefinition::new("day", &["日"]),
    ColumnDefinition::new("type_in", &["種別"]),
    ColumnDefinition::new("station_in", &["利用駅"]),
    ColumnDefinition::new("type_out", &["種別"]),
    ColumnDefinition::new("station_out", &["利用駅"]),
    ColumnDefinition::new("balance", &["残高"]),
    ColumnDefinition::new("amount", &["入金", "利用金額"]),
];

/// The seven columns of a partial-selection statement (no balance).
pub const PARTIAL_COLUMNS: [ColumnDefinition; PARTIAL_COLUMN_COUNT] = [
    ColumnDefinition::new("month", &["月"]),
    ColumnDefinition::new("day", &["日"]),
    ColumnDefinition::new("type_in", &["種別"]),
    ColumnDefinition::new("station_in", &["利用駅"]),
    ColumnDefinition::new("type_out", &["種別"]),
    ColumnDefinition::new("station_out", &["利用駅"]),
    ColumnDefinition::new("amount", &["入金", "利用金額"]),
];

/// The column set for a detected statement variant.
pub fn column_definitions_for(statement_type: StatementType) -> &'static [ColumnDefinition] {
    match statement_type {
        StatementType::FullHistory => &FULL_COLUMNS,
        StatementType::PartialSelection => &PARTIAL_COLUMNS,
    }
}

/// Strip whitespace, brackets, separators and dashes from a header token so
/// keyword containment is robust against label decorations like `種別(入)`
/// or `入金・利用金額`.
pub fn normalize_header_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| {
            !c.is_whitespace()
                && !matches!(c, '(' | ')' | '（' | '）' | '・' | '･' | '／' | '/' | '-')
        })
        .collect()
}

/// Classify the statement variant.
///
/// With a header line, normalised tokens decide: an amount label without a
/// balance label means partial selection; any balance label means full
/// history regardless of the amount label. Without a header, the maximum
/// token count across all lines is the tell — partial tables never exceed
/// seven tokens per line. Full history is the default.
pub fn detect_statement_type(
    header_line: Option<&TableLine>,
    lines: &[TableLine],
) -> StatementType {
    let mut header_has_balance = false;
    let mut header_has_amount = false;
    if let Some(header) = header_line {
        for token in header.tokens() {
            let normalized = normalize_header_token(token.text());
            if normalized.contains("残高") {
                header_has_balance = true;
            }
            if normalized.contains("入金利用金額")
                || normalized.contains("入金利用額")
                || normalized.contains("入金利用金")
            {
                header_has_amount = true;
            }
        }
    }
    if header_has_amount && !header_has_balance {
        return StatementType::PartialSelection;
    }
    if header_has_balance {
        return StatementType::FullHistory;
    }

    let max_token_count = lines.iter().map(|l| l.tokens().len()).max().unwrap_or(0);
    if max_token_count > 0 && max_token_count <= PARTIAL_COLUMN_COUNT {
        return StatementType::PartialSelection;
    }

    StatementType::FullHistory
}

/// Closed interval for one column, with tolerance at the edges. The last
/// boundary of a layout also accepts values beyond its nominal end, because
/// right-aligned amounts occasionally overhang the header label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBoundary {
    start: f32,
    end: f32,
}

impl ColumnBoundary {
    fn new(start: f32, end: f32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    fn contains(&self, value: f32, last: bool) -> bool {
        if last {
            value >= self.start - BOUNDARY_TOLERANCE && value <= self.end + BOUNDARY_TOLERANCE
        } else {
            value >= self.start - BOUNDARY_TOLERANCE && value < self.end - BOUNDARY_TOLERANCE
        }
    }
}

/// An ordered list of column boundaries, valid for exactly one table.
/// Rebuilt per document — never cached across calls.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    boundaries: Vec<ColumnBoundary>,
}

impl ColumnLayout {
    /// Derive boundaries from the header line's anchors, falling back to
    /// evenly spaced bins when the header is missing or any column fails to
    /// anchor. A partial anchor list is never used.
    pub fn build(
        header_line: Option<&TableLine>,
        lines: &[TableLine],
        definitions: &[ColumnDefinition],
    ) -> Self {
        let column_count = definitions.len();
        let min_x = compute_min_x(lines, header_line) - PADDING;
        let mut max_x = compute_max_x(lines, header_line, column_count) + PADDING;
        if max_x <= min_x {
            max_x = min_x + column_count as f32;
        }

        if let Some(header) = header_line {
            let anchors = detect_anchors(header, definitions);
            if anchors.len() == column_count {
                return Self {
                    boundaries: to_boundaries(&anchors, min_x, max_x),
                };
            }
            warn!(
                anchors = anchors.len(),
                columns = column_count,
                "incomplete header anchors; falling back to evenly spaced columns"
            );
        } else {
            warn!("table header text not detected; falling back to evenly spaced columns");
        }

        Self {
            boundaries: even_boundaries(min_x, max_x, column_count),
        }
    }

    pub fn column_count(&self) -> usize {
        self.boundaries.len()
    }

    pub fn boundaries(&self) -> &[ColumnBoundary] {
        &self.boundaries
    }

    /// Bucket a line's tokens into columns by centre X. Tokens sharing a
    /// column are joined with a single space in encounter order; an empty
    /// bucket yields an empty string. `cleaner` runs once per joined bucket.
    pub fn extract_columns(
        &self,
        line: &TableLine,
        cleaner: impl Fn(&str) -> String,
    ) -> Vec<String> {
        let mut buckets: Vec<String> = vec![String::new(); self.boundaries.len()];
        for token in line.tokens() {
            let Some(index) = self.locate_column(token.center()) else {
                continue;
            };
            let raw = token.text().trim();
            if raw.is_empty() {
                continue;
            }
            let bucket = &mut buckets[index];
            if !bucket.is_empty() {
                bucket.push(' ');
            }
            bucket.push_str(raw);
        }
        buckets.iter().map(|b| cleaner(b)).collect()
    }

    fn locate_column(&self, center: f32) -> Option<usize> {
        let last = self.boundaries.len() - 1;
        self.boundaries
            .iter()
            .enumerate()
            .find(|(i, b)| b.contains(center, *i == last))
            .map(|(i, _)| i)
    }
}

fn detect_anchors(header_line: &TableLine, definitions: &[ColumnDefinition]) -> Vec<f32> {
    let tokens = header_line.tokens();
    let mut anchors = Vec::with_capacity(definitions.len());
    let mut token_index = 0;
    for definition in definitions {
        let mut anchor = None;
        for (i, token) in tokens.iter().enumerate().skip(token_index) {
            let normalized = normalize_header_token(token.text());
            if normalized.is_empty() {
                continue;
            }
            if definition.matches(&normalized) {
                anchor = Some(token.center());
                token_index = i + 1;
                break;
            }
        }
        match anchor {
            Some(center) => anchors.push(center),
            None => break,
        }
    }
    anchors
}

fn to_boundaries(anchors: &[f32], min_x: f32, max_x: f32) -> Vec<ColumnBoundary> {
    let count = anchors.len();
    (0..count)
        .map(|i| {
            let start = if i == 0 {
                min_x
            } else {
                midpoint(anchors[i - 1], anchors[i])
            };
            let end = if i == count - 1 {
                max_x
            } else {
                midpoint(anchors[i], anchors[i + 1])
            };
            ColumnBoundary::new(start, end)
        })
        .collect()
}

fn even_boundaries(min_x: f32, max_x: f32, column_count: usize) -> Vec<ColumnBoundary> {
    // Width floor avoids degenerate spacing when no tokens were observed.
    let width = (max_x - min_x).max(column_count as f32);
    let column_width = width / column_count as f32;
    let mut boundaries = Vec::with_capacity(column_count);
    let mut start = min_x;
    for i in 0..column_count {
        let end = if i == column_count - 1 {
            max_x
        } else {
            start + column_width
        };
        boundaries.push(ColumnBoundary::new(start, end));
        start = end;
    }
    boundaries
}

fn compute_min_x(lines: &[TableLine], header_line: Option<&TableLine>) -> f32 {
    let mut min = header_line.and_then(TableLine::min_x).unwrap_or(f32::MAX);
    for line in lines {
        if let Some(x) = line.min_x() {
            min = min.min(x);
        }
    }
    if min == f32::MAX {
        0.0
    } else {
        min
    }
}

fn compute_max_x(lines: &[TableLine], header_line: Option<&TableLine>, column_count: usize) -> f32 {
    let mut max = header_line.and_then(TableLine::max_x).unwrap_or(f32::MIN);
    for line in lines {
        if let Some(x) = line.max_x() {
            max = max.max(x);
        }
    }
    if max == f32::MIN {
        column_count as f32
    } else {
        max
    }
}

fn midpoint(left: f32, right: f32) -> f32 {
    left + (right - left) / 2.0
}
