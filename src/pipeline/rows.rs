//! Row parsing: turn assembled table lines into typed transaction rows.
//!
//! Lines before the first header (or first data-looking line) are the page
//! banner and are skipped. Header repeats and footer boilerplate are dropped
//! wherever they occur. Every surviving line is bucketed into columns by the
//! layout, and rows whose month *and* day are both blank are discarded —
//! that is the drop gate for decoration rows that happen to carry text in
//! other columns. A dropped row never claims a row number: numbering is
//! dense, starting at 1.
//!
//! Two correction heuristics mirror how the statement actually renders:
//! entry-only transaction types (card charges, mobile top-ups, shop
//! purchases) never have an exit leg, so any text bucketed there is noise;
//! and when the inbound station cell holds an exit marker while the exit
//! type is empty, the value was a misaligned exit type. The second is
//! best-effort — an actual station name containing 出 or 降 will be moved
//! wrongly, which is accepted.

use crate::output::{StatementMetadata, StatementRow, StatementType, TableParseResult};
use crate::pipeline::header::is_header_text;
use crate::pipeline::layout::{column_definitions_for, detect_statement_type, ColumnLayout};
use crate::pipeline::lines::TableLine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Transaction types that never have an exit leg.
static ENTRY_ONLY_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from(["ｶｰﾄﾞ", "カード", "ﾓﾊﾞｲﾙ", "モバイル", "物販"])
});

/// `yyyy/MM/dd` date anywhere in a line. Such lines belong to the heading
/// block, not the table.
pub(crate) static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}/\d{2}/\d{2})").unwrap());

/// Page marker like `(1/3)` printed in the footer.
static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d+/\d+\)").unwrap());

/// Two short digit groups separated by (possibly full-width) whitespace:
/// the month/day opening of a transaction line.
static DATA_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}[\s　]+\d{1,2}").unwrap());

/// Parse the concatenated table lines of all pages into typed rows.
///
/// Classification, layout inference and row conversion all happen here so
/// the caller only ever sees the finished [`TableParseResult`].
pub fn parse_table_lines(
    lines: &[TableLine],
    metadata: Option<&StatementMetadata>,
) -> TableParseResult {
    if lines.is_empty() {
        return TableParseResult::empty(StatementType::FullHistory);
    }

    let header_line = find_header_line(lines);
    let statement_type = detect_statement_type(header_line, lines);
    let definitions = column_definitions_for(statement_type);
    let layout = ColumnLayout::build(header_line, lines, definitions);

    let mut rows = Vec::new();
    let mut row_number = 1;
    let mut header_seen = false;
    for table_line in lines {
        let line = table_line.text();
        if line.is_empty() {
            continue;
        }
        if !header_seen {
            if is_header_text(&line) || looks_like_data_line(&line) {
                header_seen = true;
            } else {
                continue;
            }
        }
        if is_header_text(&line) || is_footer_line(&line) {
            continue;
        }
        let columns = layout.extract_columns(table_line, clean_token);
        if columns.len() != definitions.len() {
            continue;
        }
        if let Some(row) = to_row(&columns, row_number, metadata, statement_type) {
            rows.push(row);
            row_number += 1;
        }
    }

    TableParseResult {
        rows,
        statement_type,
    }
}

fn find_header_line(lines: &[TableLine]) -> Option<&TableLine> {
    lines.iter().find(|line| is_header_text(&line.text()))
}

/// Footer boilerplate: closing courtesy line, system notice, company name,
/// page markers, and any line carrying a full date.
fn is_footer_line(line: &str) -> bool {
    line.contains("ご利用ありがとうございます")
        || line.contains("システムの都合上")
        || line.contains("東日本旅客鉄道株式会社")
        || PAGE_MARKER.is_match(line)
        || DATE_PATTERN.is_match(line)
}

fn looks_like_data_line(line: &str) -> bool {
    DATA_LINE.is_match(line)
}

/// Trim and replace stray backslashes with yen signs. PDF text extraction
/// frequently renders U+00A5 as a backslash.
fn clean_token(token: &str) -> String {
    token.replace('\\', "¥").trim().to_string()
}

/// Standardise a currency token. `prefix_yen` enforces a single leading yen
/// sign (the balance column always shows one); amounts keep whatever sign
/// convention the statement printed.
fn normalize_currency(token: &str, prefix_yen: bool) -> String {
    let cleaned = token.replace('\\', "¥");
    let cleaned = cleaned.trim();
    if prefix_yen && !cleaned.starts_with('¥') {
        let stripped: String = cleaned.chars().filter(|c| *c != '¥').collect();
        return format!("¥{stripped}");
    }
    cleaned.to_string()
}

fn looks_like_exit_type(token: &str) -> bool {
    token.contains('出') || token.contains('降')
}

fn column<'a>(columns: &'a [String], index: usize) -> &'a str {
    columns.get(index).map(|v| v.trim()).unwrap_or("")
}

/// Derive the year-month value from the month token and the statement's
/// creation date. Without a creation date only the zero-padded month is
/// emitted; a token with no digits at all is passed through unchanged.
fn build_year_month(month_value: &str, metadata: Option<&StatementMetadata>) -> String {
    if month_value.trim().is_empty() {
        return String::new();
    }
    let digits: String = month_value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return month_value.to_string();
    }
    match digits.parse::<u32>() {
        Ok(month) => {
            use chrono::Datelike;
            match metadata.and_then(|m| m.created_date) {
                Some(date) => format!("{:04}-{:02}", date.year(), month),
                None => format!("{month:02}"),
            }
        }
        Err(_) => month_value.to_string(),
    }
}

fn to_row(
    columns: &[String],
    row_number: usize,
    metadata: Option<&StatementMetadata>,
    statement_type: StatementType,
) -> Option<StatementRow> {
    if columns.is_empty() {
        return None;
    }

    let month = column(columns, 0).to_string();
    let day = column(columns, 1).to_string();
    if month.is_empty() && day.is_empty() {
        return None;
    }

    let type_in = column(columns, 2).to_string();
    let mut station_in = column(columns, 3).to_string();
    let mut type_out = column(columns, 4).to_string();
    let mut station_out = column(columns, 5).to_string();
    let balance = statement_type
        .has_balance_column()
        .then(|| normalize_currency(column(columns, 6), true));
    let amount_index = if statement_type.has_balance_column() { 7 } else { 6 };
    let amount = normalize_currency(column(columns, amount_index), false);

    if ENTRY_ONLY_TYPES.contains(type_in.as_str()) {
        type_out.clear();
        station_out.clear();
    }

    if looks_like_exit_type(&station_in) && type_out.is_empty() {
        // The inbound station cell actually holds a misaligned exit type.
        type_out = std::mem::take(&mut station_in);
    }

    let year_month = build_year_month(&month, metadata);

    Some(StatementRow {
        row_number,
        year_month,
        month,
        day,
        type_in,
        station_in,
        type_out,
        station_out,
        balance,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lines::PositionedToken;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const POSITIONS: [f32; 8] = [10.0, 40.0, 90.0, 150.0, 210.0, 270.0, 330.0, 400.0];

    fn line(y: f32, values: &[&str]) -> TableLine {
        let tokens = values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_empty())
            .map(|(i, v)| PositionedToken::new(POSITIONS[i], POSITIONS[i] + 15.0, *v))
            .collect();
        TableLine::new(y, tokens)
    }

    fn full_header(y: f32) -> TableLine {
        line(
            y,
            &[
                "月",
                "日",
                "種別(入)",
                "利用駅(入)",
                "種別(出)",
                "利用駅(出)",
                "残高",
                "入金・利用金額",
            ],
        )
    }

    fn metadata_with_year(year: i32) -> StatementMetadata {
        StatementMetadata {
            heading: Some("モバイルSuica 残高ご利用明細".to_string()),
            card_number_line: None,
            history_summary: None,
            created_line: None,
            created_date: NaiveDate::from_ymd_opt(year, 11, 1),
        }
    }

    #[test]
    fn full_history_rows_parse_with_year_month() {
        let lines = vec![
            full_header(0.0),
            line(
                20.0,
                &["10", "21", "入", "小田原", "出", "登戸", "\\1,098", "-261"],
            ),
        ];
        let metadata = metadata_with_year(2023);
        let result = parse_table_lines(&lines, Some(&metadata));
        assert_eq!(result.statement_type, StatementType::FullHistory);
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.row_number, 1);
        assert_eq!(row.year_month, "2023-10");
        assert_eq!(row.month, "10");
        assert_eq!(row.day, "21");
        assert_eq!(row.station_in, "小田原");
        assert_eq!(row.station_out, "登戸");
        assert_eq!(row.balance.as_deref(), Some("¥1,098"));
        assert_eq!(row.amount, "-261");
    }

    #[test]
    fn partial_selection_has_no_balance() {
        let lines = vec![
            line(
                0.0,
                &[
                    "月",
                    "日",
                    "種別(入)",
                    "利用駅(入)",
                    "種別(出)",
                    "利用駅(出)",
                    "入金・利用金額",
                ],
            ),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.statement_type, StatementType::PartialSelection);
        let row = &result.rows[0];
        assert_eq!(row.balance, None);
        assert_eq!(row.amount, "-261");
    }

    #[test]
    fn banner_lines_before_header_are_skipped() {
        let lines = vec![
            line(0.0, &["モバイルSuica"]),
            line(5.0, &["残高履歴"]),
            full_header(10.0),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn data_line_admits_table_without_header() {
        // No header at all: a month/day opener starts the table.
        let lines = vec![
            line(0.0, &["モバイルSuica"]),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn repeated_headers_and_footers_are_dropped() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
            full_header(40.0), // page 2 repeats the header
            line(50.0, &["(1/2)"]),
            line(55.0, &["ご利用ありがとうございます。"]),
            line(58.0, &["東日本旅客鉄道株式会社"]),
            line(60.0, &["10", "22", "入", "新宿", "出", "渋谷", "¥900", "-198"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].row_number, 2);
    }

    #[test]
    fn lines_with_dates_are_footer_material() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["2023/11/05", "", "", "", "", "", "", ""]),
            line(30.0, &["10", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].day, "21");
    }

    #[test]
    fn blank_month_and_day_drops_row_without_consuming_number() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
            line(30.0, &["", "", "入", "小田原", "出", "登戸", "¥837", "-261"]),
            line(40.0, &["10", "23", "ｶｰﾄﾞ", "", "", "", "¥2,000", "1,000"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].row_number, 2);
        assert_eq!(result.rows[1].day, "23");
    }

    #[test]
    fn entry_only_types_clear_exit_columns() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "23", "物販", "", "ノイズ", "ノイズ", "¥500", "-500"]),
        ];
        let result = parse_table_lines(&lines, None);
        let row = &result.rows[0];
        assert_eq!(row.type_in, "物販");
        assert_eq!(row.type_out, "");
        assert_eq!(row.station_out, "");
    }

    #[test]
    fn misaligned_exit_marker_moves_to_exit_type() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "21", "入", "出", "", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        let row = &result.rows[0];
        assert_eq!(row.station_in, "");
        assert_eq!(row.type_out, "出");
    }

    #[test]
    fn exit_marker_stays_put_when_exit_type_present() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "21", "入", "出口前", "出", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows[0].station_in, "出口前");
    }

    #[test]
    fn balance_gains_yen_prefix_amount_does_not() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["10", "21", "入", "小田原", "出", "登戸", "1,098", "261"]),
        ];
        let result = parse_table_lines(&lines, None);
        let row = &result.rows[0];
        assert_eq!(row.balance.as_deref(), Some("¥1,098"));
        assert_eq!(row.amount, "261");
    }

    #[test]
    fn year_month_without_created_date_is_padded_month() {
        let lines = vec![
            full_header(0.0),
            line(20.0, &["3", "21", "入", "小田原", "出", "登戸", "¥1,098", "-261"]),
        ];
        let result = parse_table_lines(&lines, None);
        assert_eq!(result.rows[0].year_month, "03");
    }

    #[test]
    fn non_numeric_month_passes_through() {
        assert_eq!(build_year_month("継続", None), "継続");
        assert_eq!(build_year_month("", None), "");
    }

    #[test]
    fn empty_input_yields_empty_full_history_result() {
        let result = parse_table_lines(&[], None);
        assert!(result.rows.is_empty());
        assert_eq!(result.statement_type, StatementType::FullHistory);
    }

    #[test]
    fn currency_backslash_becomes_yen() {
        assert_eq!(normalize_currency("\\1,098", true), "¥1,098");
        assert_eq!(normalize_currency("\\261", false), "¥261");
        assert_eq!(normalize_currency("1,098", true), "¥1,098");
        assert_eq!(clean_token(" \\500 "), "¥500");
    }
}
