//! Line assembly: cluster positioned text runs into ordered table lines.
//!
//! The statement has no native table structure, only text runs with page
//! coordinates. This stage rebuilds the visual lines: a run joins the first
//! known line whose baseline Y is within tolerance, otherwise it opens a new
//! line. Tokens keep their horizontal extent so the layout stage can bucket
//! them into columns by centre X.
//!
//! Two callers use this module: the table pass (runs restricted to the
//! resolved table rectangle) and the full-document pass (no restriction,
//! feeding metadata extraction and raw text). Both are plain functions over
//! the same glyph source — there is no shared extraction object to override.

use crate::error::ExtractError;
use crate::pipeline::region::TableRegion;
use crate::pipeline::source::GlyphSource;

/// Degenerate zero-width runs still need a positive extent so their centre
/// lands inside exactly one column boundary.
const MIN_TOKEN_WIDTH: f32 = 0.5;

/// A merged text span with its horizontal extent, owned by its [`TableLine`].
/// Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    x: f32,
    end_x: f32,
    text: String,
}

impl PositionedToken {
    pub fn new(x: f32, end_x: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            end_x: end_x.max(x),
            text: text.into(),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn end_x(&self) -> f32 {
        self.end_x
    }

    /// Horizontal centre, used for column bucketing.
    pub fn center(&self) -> f32 {
        self.x + (self.end_x - self.x) / 2.0
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A baseline Y plus its tokens, ordered by X.
///
/// Built incrementally during assembly and frozen on construction: the
/// constructor sorts tokens by X once, so every consumer sees them in visual
/// order without re-sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLine {
    y: f32,
    tokens: Vec<PositionedToken>,
}

impl TableLine {
    pub fn new(y: f32, mut tokens: Vec<PositionedToken>) -> Self {
        tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { y, tokens }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn tokens(&self) -> &[PositionedToken] {
        &self.tokens
    }

    /// Leftmost token origin, or `None` for an empty line.
    pub fn min_x(&self) -> Option<f32> {
        self.tokens.first().map(|t| t.x)
    }

    /// Rightmost token end. Tokens are sorted by origin, not end, so scan all.
    pub fn max_x(&self) -> Option<f32> {
        self.tokens
            .iter()
            .map(|t| t.end_x)
            .reduce(f32::max)
    }

    /// Flattened text: trimmed tokens joined by single spaces, empties
    /// dropped.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Accumulator used while clustering; becomes a frozen [`TableLine`].
struct LineAccumulator {
    y: f32,
    tokens: Vec<PositionedToken>,
}

/// Cluster the runs of one page that fall inside `region` into lines,
/// returned sorted by Y ascending.
///
/// A run joins the first line whose baseline differs by less than
/// `tolerance` points; otherwise it opens a new line. Blank runs are
/// ignored entirely.
pub fn assemble_lines(
    source: &dyn GlyphSource,
    page_index: usize,
    region: &TableRegion,
    tolerance: f32,
) -> Result<Vec<TableLine>, ExtractError> {
    let mut accumulators: Vec<LineAccumulator> = Vec::new();

    source.for_each_run(page_index, &mut |run| {
        if !region.contains(run.x, run.y) || run.text.trim().is_empty() {
            return;
        }
        let width = run.width.max(MIN_TOKEN_WIDTH);
        let token = PositionedToken::new(run.x, run.x + width, run.text.as_str());
        match accumulators
            .iter_mut()
            .find(|line| (line.y - run.y).abs() < tolerance)
        {
            Some(line) => line.tokens.push(token),
            None => accumulators.push(LineAccumulator {
                y: run.y,
                tokens: vec![token],
            }),
        }
    })?;

    let mut lines: Vec<TableLine> = accumulators
        .into_iter()
        .map(|acc| TableLine::new(acc.y, acc.tokens))
        .collect();
    lines.sort_by(|a, b| a.y.total_cmp(&b.y));
    Ok(lines)
}

/// Flattened text lines for the whole document, page order preserved and
/// lines sorted by Y within each page. Feeds metadata extraction and the
/// raw-text output; blank lines are dropped.
pub fn document_lines(
    source: &dyn GlyphSource,
    tolerance: f32,
) -> Result<Vec<String>, ExtractError> {
    let mut out = Vec::new();
    for page_index in 0..source.page_count() {
        let (width, height) = source.page_size(page_index)?;
        let whole_page = TableRegion::new(0.0, 0.0, width, height);
        for line in assemble_lines(source, page_index, &whole_page, tolerance)? {
            let text = line.text();
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source::TextRun;

    struct RunSource {
        pages: Vec<Vec<TextRun>>,
        size: (f32, f32),
    }

    impl GlyphSource for RunSource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_size(&self, _page_index: usize) -> Result<(f32, f32), ExtractError> {
            Ok(self.size)
        }

        fn for_each_run(
            &self,
            page_index: usize,
            visit: &mut dyn FnMut(&TextRun),
        ) -> Result<(), ExtractError> {
            for run in &self.pages[page_index] {
                visit(run);
            }
            Ok(())
        }
    }

    fn run(x: f32, y: f32, width: f32, text: &str) -> TextRun {
        TextRun {
            x,
            y,
            width,
            text: text.to_string(),
        }
    }

    #[test]
    fn runs_cluster_by_baseline_proximity() {
        let source = RunSource {
            pages: vec![vec![
                run(10.0, 100.0, 15.0, "10"),
                run(40.0, 100.8, 15.0, "21"), // within 1.5pt of the first
                run(10.0, 112.0, 15.0, "11"), // new line
            ]],
            size: (595.0, 842.0),
        };
        let region = TableRegion::new(0.0, 0.0, 595.0, 842.0);
        let lines = assemble_lines(&source, 0, &region, 1.5).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].tokens().len(), 2);
        assert_eq!(lines[1].tokens().len(), 1);
    }

    #[test]
    fn tokens_sorted_by_x_regardless_of_arrival_order() {
        let source = RunSource {
            pages: vec![vec![
                run(200.0, 50.0, 10.0, "later"),
                run(10.0, 50.0, 10.0, "first"),
            ]],
            size: (595.0, 842.0),
        };
        let region = TableRegion::new(0.0, 0.0, 595.0, 842.0);
        let lines = assemble_lines(&source, 0, &region, 1.5).unwrap();
        assert_eq!(lines[0].text(), "first later");
    }

    #[test]
    fn runs_outside_region_are_dropped() {
        let source = RunSource {
            pages: vec![vec![
                run(10.0, 20.0, 10.0, "above"),
                run(10.0, 200.0, 10.0, "inside"),
            ]],
            size: (595.0, 842.0),
        };
        let region = TableRegion::new(0.0, 150.0, 595.0, 600.0);
        let lines = assemble_lines(&source, 0, &region, 1.5).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "inside");
    }

    #[test]
    fn zero_width_run_gets_floor_width() {
        let source = RunSource {
            pages: vec![vec![run(10.0, 20.0, 0.0, "x")]],
            size: (595.0, 842.0),
        };
        let region = TableRegion::new(0.0, 0.0, 595.0, 842.0);
        let lines = assemble_lines(&source, 0, &region, 1.5).unwrap();
        let token = &lines[0].tokens()[0];
        assert!(token.end_x() > token.x());
    }

    #[test]
    fn lines_sorted_by_y() {
        let source = RunSource {
            pages: vec![vec![
                run(10.0, 300.0, 10.0, "bottom"),
                run(10.0, 100.0, 10.0, "top"),
            ]],
            size: (595.0, 842.0),
        };
        let region = TableRegion::new(0.0, 0.0, 595.0, 842.0);
        let lines = assemble_lines(&source, 0, &region, 1.5).unwrap();
        assert_eq!(lines[0].text(), "top");
        assert_eq!(lines[1].text(), "bottom");
    }

    #[test]
    fn document_lines_skip_blanks_and_keep_page_order() {
        let source = RunSource {
            pages: vec![
                vec![run(10.0, 50.0, 10.0, "page one")],
                vec![run(10.0, 50.0, 10.0, "  "), run(10.0, 80.0, 10.0, "page two")],
            ],
            size: (595.0, 842.0),
        };
        let lines = document_lines(&source, 1.5).unwrap();
        assert_eq!(lines, vec!["page one".to_string(), "page two".to_string()]);
    }

    #[test]
    fn token_center_is_midpoint() {
        let t = PositionedToken::new(10.0, 20.0, "a");
        assert_eq!(t.center(), 15.0);
    }

    #[test]
    fn line_extents() {
        let line = TableLine::new(
            0.0,
            vec![
                PositionedToken::new(40.0, 55.0, "b"),
                PositionedToken::new(10.0, 25.0, "a"),
            ],
        );
        assert_eq!(line.min_x(), Some(10.0));
        assert_eq!(line.max_x(), Some(55.0));
    }
}
