//! Statement metadata: scan full-document lines for the heading block.
//!
//! The heading sits above the table and is not positioned reliably enough
//! for coordinate-based extraction, so this stage works on flattened text
//! lines instead. Every field is independently optional: a cropped or
//! unusual export yields whatever subset was found, never an error.

use crate::output::StatementMetadata;
use crate::pipeline::rows::DATE_PATTERN;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Masked card number as printed: `JE` followed by digits, asterisks and
/// spaces, ending in four digits.
static CARD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"JE[\d*\s]+\d{4}").unwrap());

/// Extract the heading metadata from trimmed, non-blank document lines.
/// Each field takes the first matching line; later repeats are ignored.
pub fn extract_statement_metadata(lines: &[String]) -> StatementMetadata {
    let heading = find_first(lines, |l| {
        l.contains("モバイル") && l.contains("残高ご利用明細")
    });
    let card_number_line = find_first(lines, |l| CARD_PATTERN.is_match(l));
    let history_summary = find_first(lines, |l| l.contains("残高履歴"));
    let created_line = find_first(lines, |l| {
        l.contains("ご利用ありがとうございます") || DATE_PATTERN.is_match(l)
    });
    let created_date = extract_created_date(lines);

    StatementMetadata {
        heading,
        card_number_line,
        history_summary,
        created_line,
        created_date,
    }
}

/// First parseable `yyyy/MM/dd` date in the document. A matching substring
/// that fails calendar validation (e.g. `2023/13/45`) is skipped and the
/// scan continues.
fn extract_created_date(lines: &[String]) -> Option<NaiveDate> {
    lines.iter().find_map(|line| {
        let captures = DATE_PATTERN.captures(line)?;
        NaiveDate::parse_from_str(&captures[1], "%Y/%m/%d").ok()
    })
}

fn find_first(lines: &[String], predicate: impl Fn(&str) -> bool) -> Option<String> {
    lines.iter().find(|l| predicate(l)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn full_heading_block_is_extracted() {
        let doc = lines(&[
            "モバイルSuica 残高ご利用明細",
            "JE80 **** **** 1234",
            "残高履歴（直近のご利用分）",
            "ご利用ありがとうございます。 2023/11/05",
            "月 日 種別(入) 利用駅(入)",
        ]);
        let metadata = extract_statement_metadata(&doc);
        assert_eq!(
            metadata.heading.as_deref(),
            Some("モバイルSuica 残高ご利用明細")
        );
        assert_eq!(
            metadata.card_number_line.as_deref(),
            Some("JE80 **** **** 1234")
        );
        assert_eq!(
            metadata.history_summary.as_deref(),
            Some("残高履歴（直近のご利用分）")
        );
        assert_eq!(
            metadata.created_line.as_deref(),
            Some("ご利用ありがとうございます。 2023/11/05")
        );
        assert_eq!(metadata.created_date, NaiveDate::from_ymd_opt(2023, 11, 5));
    }

    #[test]
    fn date_alone_serves_as_created_line() {
        let doc = lines(&["発行日 2024/01/31"]);
        let metadata = extract_statement_metadata(&doc);
        assert_eq!(metadata.created_line.as_deref(), Some("発行日 2024/01/31"));
        assert_eq!(metadata.created_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn invalid_calendar_date_is_skipped() {
        let doc = lines(&["2023/13/45", "2023/11/05"]);
        let metadata = extract_statement_metadata(&doc);
        assert_eq!(metadata.created_date, NaiveDate::from_ymd_opt(2023, 11, 5));
        // The created line still points at the first textual match.
        assert_eq!(metadata.created_line.as_deref(), Some("2023/13/45"));
    }

    #[test]
    fn missing_fields_stay_none() {
        let metadata = extract_statement_metadata(&lines(&["何も一致しない行"]));
        assert_eq!(metadata.heading, None);
        assert_eq!(metadata.card_number_line, None);
        assert_eq!(metadata.history_summary, None);
        assert_eq!(metadata.created_line, None);
        assert_eq!(metadata.created_date, None);
    }

    #[test]
    fn first_match_wins_for_each_field() {
        let doc = lines(&["JE11 **** **** 1111", "JE22 **** **** 2222"]);
        let metadata = extract_statement_metadata(&doc);
        assert_eq!(
            metadata.card_number_line.as_deref(),
            Some("JE11 **** **** 1111")
        );
    }
}
