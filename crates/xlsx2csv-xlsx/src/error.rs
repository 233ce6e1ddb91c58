//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while reading an XLSX workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A single row could not be decoded; the rest of the sheet is still readable
    #[error("{message}")]
    Row { row: u32, message: String },

    /// Core error
    #[error("{0}")]
    Core(#[from] xlsx2csv_core::Error),
}

impl XlsxError {
    /// Returns true if the error only affects one row
    pub fn is_row_error(&self) -> bool {
        matches!(self, XlsxError::Row { .. })
    }
}
