//! Output types returned by the extraction entry points.
//!
//! Everything here is a plain, serialisable DTO. The pipeline produces these
//! values and never reads them back, so callers are free to move, clone, or
//! serialise them without affecting a running extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two statement export variants.
///
/// Full-history exports carry a running-balance column next to the amount
/// column; partial-selection exports (where the user picked individual
/// transactions before downloading) omit the balance column entirely, leaving
/// seven logical columns instead of eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    /// Eight-column layout including the running balance.
    FullHistory,
    /// Seven-column layout without a balance column.
    PartialSelection,
}

impl StatementType {
    /// Whether this variant carries the running-balance column.
    pub fn has_balance_column(self) -> bool {
        matches!(self, StatementType::FullHistory)
    }
}

/// A single parsed transaction row.
///
/// All fields are normalised strings taken from the statement table; the
/// parser does not interpret station names or amounts beyond currency-symbol
/// cleanup. `balance` is `Some` exactly when the statement is
/// [`StatementType::FullHistory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// 1-based sequence number over emitted rows (no gaps, regardless of how
    /// many source lines were skipped).
    pub row_number: usize,
    /// `YYYY-MM` when the statement creation date is known, zero-padded month
    /// otherwise; the raw token when the month is not numeric.
    pub year_month: String,
    pub month: String,
    pub day: String,
    pub type_in: String,
    pub station_in: String,
    pub type_out: String,
    pub station_out: String,
    /// Running balance with a forced `¥` prefix; present iff the statement
    /// type has a balance column.
    pub balance: Option<String>,
    /// Charge or usage amount, sign and separators preserved.
    pub amount: String,
}

/// Metadata scraped from the statement heading region.
///
/// Every field is optional: partial-selection exports routinely omit the
/// heading or the thank-you footer, and an absent field is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// First line naming the mobile service and the balance-history statement.
    pub heading: Option<String>,
    /// First line matching the masked card-number pattern (`JE** **** 1234`).
    pub card_number_line: Option<String>,
    /// First line mentioning the balance history summary.
    pub history_summary: Option<String>,
    /// First thank-you/date footer line.
    pub created_line: Option<String>,
    /// Statement creation date, parsed from the first `YYYY/MM/DD` found.
    pub created_date: Option<NaiveDate>,
}

/// Rows plus the detected statement type for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableParseResult {
    pub rows: Vec<StatementRow>,
    pub statement_type: StatementType,
}

impl TableParseResult {
    /// An empty result with the given type. Zero rows is a valid outcome —
    /// an empty table is not an error.
    pub fn empty(statement_type: StatementType) -> Self {
        Self {
            rows: Vec::new(),
            statement_type,
        }
    }
}

/// Document-level PDF metadata (info dictionary summary).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Complete result of one extraction call.
///
/// Fields not requested via [`crate::config::FeatureSet`] are `None` (or empty
/// for `rows`), so callers can tell "not requested" apart from "requested but
/// absent" for the optional payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Display name of the source document.
    pub file_name: String,
    /// Total pages in the document.
    pub page_count: usize,
    /// Statement heading metadata, when requested.
    pub metadata: Option<StatementMetadata>,
    /// Parsed transaction rows, when requested (possibly empty).
    pub rows: Vec<StatementRow>,
    /// Detected statement variant. Defaults to full history when the table
    /// pass did not run.
    pub statement_type: StatementType,
    /// Full-document text, when requested. One line per visual line.
    pub raw_text: Option<String>,
    /// PDF info-dictionary summary, when requested.
    pub document_metadata: Option<DocumentMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_history_has_balance_column() {
        assert!(StatementType::FullHistory.has_balance_column());
        assert!(!StatementType::PartialSelection.has_balance_column());
    }

    #[test]
    fn statement_type_serialises_snake_case() {
        let json = serde_json::to_string(&StatementType::PartialSelection).unwrap();
        assert_eq!(json, "\"partial_selection\"");
    }

    #[test]
    fn empty_result_keeps_type() {
        let r = TableParseResult::empty(StatementType::PartialSelection);
        assert!(r.rows.is_empty());
        assert_eq!(r.statement_type, StatementType::PartialSelection);
    }

    #[test]
    fn row_round_trips_through_json() {
        let row = StatementRow {
            row_number: 1,
            year_month: "2024-10".into(),
            month: "10".into(),
            day: "21".into(),
            type_in: "入".into(),
            station_in: "小".into(),
            type_out: "出".into(),
            station_out: "登戸".into(),
            balance: Some("¥1,098".into()),
            amount: "-261".into(),
        };
        let json = serde_json::to_string(&row).unwrap();
        let back: StatementRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
