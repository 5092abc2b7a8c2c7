//! Error types for the suica-statement library.
//!
//! Only failures that make the whole extraction impossible surface as
//! [`ExtractError`]: unreadable input, a document pdfium cannot open, or an
//! invalid configuration. Everything the layout engine can work around — a
//! missing header row, undetectable column anchors, a malformed table line —
//! is handled internally with a logged warning or a silently dropped line,
//! and extraction continues with reduced fidelity. A document that yields
//! zero rows is a *successful* result.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the suica-statement library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No readable content was supplied (empty byte slice or zero-length file).
    #[error("No PDF content supplied: the input is empty.")]
    EmptyInput,

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{name}'\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document cannot be opened at all (corrupt header/xref, truncated
    /// content). Never swallowed — propagated as a processing failure.
    #[error("PDF '{name}' could not be opened: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// pdfium failed while reading a page's text content.
    #[error("Text extraction failed on page {page}: {detail}")]
    PageReadFailed { page: usize, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium as a system library."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
