//! # xlsx2csv-xlsx
//!
//! Streaming XLSX reader for xlsx2csv.
//!
//! The workbook parts that describe the sheets (`xl/workbook.xml`, its
//! relationships and the shared string table) are read when the workbook is
//! opened. Sheet data is never materialized: [`XlsxWorkbook::rows`] returns a
//! [`SheetRows`] iterator that decodes one `<row>` at a time straight out of
//! the zip entry.

pub mod error;
pub mod rows;
pub mod workbook;

mod escape;

#[cfg(feature = "fixtures")]
pub mod fixtures;

pub use error::{XlsxError, XlsxResult};
pub use rows::SheetRows;
pub use workbook::{SheetEntry, XlsxWorkbook};
