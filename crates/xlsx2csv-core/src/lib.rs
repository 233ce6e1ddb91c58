//! # xlsx2csv-core
//!
//! Core types shared by the xlsx2csv crates.
//!
//! - [`StreamPath`] - a path argument that may name the standard streams (`-`)
//! - [`CellAddress`] - A1-style cell references as found in sheet XML
//! - [`normalize_row`] - fits a row to the header's column count
//! - [`ConvertOptions`] - settings for a single conversion run
//!
//! ## Example
//!
//! ```rust
//! use xlsx2csv_core::{normalize_row, RowShape, StreamPath};
//!
//! let input = StreamPath::parse("report.xlsx");
//! assert_eq!(input.derive_output().to_string(), "report.csv");
//!
//! let (record, shape) = normalize_row(vec!["a".to_string()], 3);
//! assert_eq!(record, vec!["a", "", ""]);
//! assert_eq!(shape, RowShape::Padded { original: 1 });
//! ```

pub mod address;
pub mod error;
pub mod options;
pub mod path;
pub mod row;

pub use address::CellAddress;
pub use error::{Error, Result};
pub use options::{sheet_position, ConvertOptions, PROGRESS_REPORT_INTERVAL};
pub use path::{StreamPath, CSV_EXTENSION, STREAM_SENTINEL};
pub use row::{normalize_row, RowShape};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
