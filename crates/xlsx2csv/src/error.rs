//! Conversion error types

use thiserror::Error;
use xlsx2csv_csv::CsvError;
use xlsx2csv_xlsx::XlsxError;

/// Result type for conversion operations
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Errors that stop a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Workbook could not be read
    #[error("{0}")]
    Xlsx(#[from] XlsxError),

    /// Core error (e.g. sheet index out of bounds)
    #[error("{0}")]
    Core(#[from] xlsx2csv_core::Error),

    /// CSV output error
    #[error("{0}")]
    Csv(#[from] CsvError),

    /// IO error on the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header row could not be decoded
    #[error("Failed to read header row: {0}")]
    HeaderRead(#[source] XlsxError),

    /// The header record could not be written
    #[error("Error writing header to CSV: {0}")]
    HeaderWrite(#[source] CsvError),

    /// At least one record failed to write during the run
    #[error("An error occurred during CSV writing: {0}")]
    WriteFailed(#[source] CsvError),
}
