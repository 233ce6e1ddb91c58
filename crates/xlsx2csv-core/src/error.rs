//! Error types for xlsx2csv-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in xlsx2csv-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Sheet index out of bounds
    #[error(
        "sheet-index {} is out of bounds. The workbook has {} sheets (indices 0 to {})",
        .index,
        .count,
        .count.saturating_sub(1)
    )]
    SheetOutOfBounds { index: i64, count: usize },
}
