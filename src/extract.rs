//! Extraction entry points and pass orchestration.
//!
//! [`extract`] and [`extract_from_bytes`] own input validation and the
//! pdfium session; [`extract_with_source`] is the pure orchestrator over a
//! [`GlyphSource`] and runs only the passes the configured [`FeatureSet`]
//! asks for. Keeping the orchestrator free of pdfium means the whole
//! pipeline is exercisable from tests with an in-memory source.
//!
//! Pass order matters in one place: statement metadata must be extracted
//! before the table pass, because row conversion derives the year-month
//! value from the statement's creation date. When the metadata pass is
//! disabled, rows fall back to the bare zero-padded month.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{DocumentMetadata, ExtractionOutput, StatementType, TableParseResult};
use crate::pipeline::header::locate_header_y;
use crate::pipeline::lines::{assemble_lines, document_lines, TableLine};
use crate::pipeline::metadata::extract_statement_metadata;
use crate::pipeline::region::resolve_table_region;
use crate::pipeline::rows::parse_table_lines;
use crate::pipeline::source::{read_document_metadata, GlyphSource, PdfiumSource};
use pdfium_render::prelude::*;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Extract a statement from a PDF file on disk.
pub fn extract(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::Internal(format!("failed to read '{}': {e}", path.display())),
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    extract_from_bytes(&bytes, &file_name, config)
}

/// Extract a statement from in-memory PDF bytes.
///
/// `file_name` is carried through to the output and error messages only;
/// it is never used to locate anything.
pub fn extract_from_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    if !looks_like_pdf(bytes) {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(ExtractError::NotAPdf {
            name: file_name.to_string(),
            magic,
        });
    }

    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, bytes, file_name, config.password.as_deref())?;
    info!(
        file = file_name,
        pages = document.pages().len(),
        "PDF loaded"
    );

    let document_metadata = config
        .features
        .document_metadata
        .then(|| read_document_metadata(&document));

    let source = PdfiumSource::new(&document);
    extract_with_source(&source, file_name, config, document_metadata)
}

/// Run the configured extraction passes over an already-open glyph source.
///
/// This is the seam for tests and alternative PDF backends; the pdfium
/// entry points above delegate here after loading the document.
pub fn extract_with_source(
    source: &dyn GlyphSource,
    file_name: &str,
    config: &ExtractionConfig,
    document_metadata: Option<DocumentMetadata>,
) -> Result<ExtractionOutput, ExtractError> {
    let features = config.features;

    let text_lines = if features.needs_document_text() {
        Some(document_lines(source, config.line_tolerance)?)
    } else {
        None
    };

    let statement_metadata = if features.statement_metadata {
        text_lines.as_deref().map(extract_statement_metadata)
    } else {
        None
    };

    let table = if features.table_rows {
        let table_lines = collect_table_lines(source, config)?;
        debug!(lines = table_lines.len(), "table lines assembled");
        parse_table_lines(&table_lines, statement_metadata.as_ref())
    } else {
        TableParseResult::empty(StatementType::FullHistory)
    };
    if features.table_rows {
        info!(
            rows = table.rows.len(),
            statement_type = ?table.statement_type,
            "table parsed"
        );
    }

    let raw_text = if features.raw_text {
        text_lines.map(|lines| lines.join("\n"))
    } else {
        None
    };

    Ok(ExtractionOutput {
        file_name: file_name.to_string(),
        page_count: source.page_count(),
        metadata: statement_metadata,
        rows: table.rows,
        statement_type: table.statement_type,
        raw_text,
        document_metadata,
    })
}

/// Read only the PDF info dictionary of a file, without running any
/// extraction pass.
pub fn inspect(path: impl AsRef<Path>) -> Result<DocumentMetadata, ExtractError> {
    let path = path.as_ref();
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| map_load_error(e, &path.display().to_string(), None))?;
    Ok(read_document_metadata(&document))
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
    file_name: &str,
    password: Option<&str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| map_load_error(e, file_name, password))
}

fn map_load_error(e: PdfiumError, file_name: &str, password: Option<&str>) -> ExtractError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ExtractError::WrongPassword {
                name: file_name.to_string(),
            }
        } else {
            ExtractError::PasswordRequired {
                name: file_name.to_string(),
            }
        }
    } else {
        ExtractError::CorruptPdf {
            name: file_name.to_string(),
            detail: err_str,
        }
    }
}

/// Assemble the table lines of every page, in page order. Pages without a
/// usable region are skipped.
fn collect_table_lines(
    source: &dyn GlyphSource,
    config: &ExtractionConfig,
) -> Result<Vec<TableLine>, ExtractError> {
    let mut all_lines = Vec::new();
    for page_index in 0..source.page_count() {
        let (page_width, page_height) = source.page_size(page_index)?;
        let header_y = locate_header_y(source, page_index)?;
        let Some(region) =
            resolve_table_region(page_index, page_width, page_height, header_y, config)
        else {
            continue;
        };
        all_lines.extend(assemble_lines(
            source,
            page_index,
            &region,
            config.line_tolerance,
        )?);
    }
    Ok(all_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureSet;

    #[test]
    fn empty_bytes_rejected() {
        let config = ExtractionConfig::default();
        assert!(matches!(
            extract_from_bytes(&[], "empty.pdf", &config),
            Err(ExtractError::EmptyInput)
        ));
    }

    #[test]
    fn non_pdf_bytes_rejected_with_magic() {
        let config = ExtractionConfig::default();
        let err = extract_from_bytes(b"plain text", "note.txt", &config).unwrap_err();
        match err {
            ExtractError::NotAPdf { name, magic } => {
                assert_eq!(name, "note.txt");
                assert_eq!(&magic, b"plai");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_reported_as_not_found() {
        let config = ExtractionConfig::default();
        let err = extract("/no/such/statement.pdf", &config).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn pdf_magic_check() {
        assert!(looks_like_pdf(b"%PDF-1.7\n"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn rows_only_feature_set_skips_document_text() {
        assert!(!FeatureSet::rows_only().needs_document_text());
    }
}
