//! # xlsx2csv
//!
//! Streams one sheet of an XLSX workbook to CSV, row by row.
//!
//! The first row of the sheet is the header and fixes the column count:
//! shorter rows are padded with empty fields, longer ones are truncated.
//! Rows that fail to decode are logged and skipped. Progress is reported
//! every [`PROGRESS_REPORT_INTERVAL`] records, at which point the output is
//! flushed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use xlsx2csv::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = XlsxWorkbook::open("report.xlsx")?;
//! let output = OutputTarget::create(&StreamPath::parse("report.csv"))?;
//! let mut writer = CsvRecordWriter::new(output, &CsvWriteOptions::default());
//!
//! let stats = convert_sheet(&mut workbook, &mut writer, &ConvertOptions::default(), |n| {
//!     eprintln!("... processed {} rows", n)
//! })?;
//! finish_output(writer)?;
//! println!("wrote {} records", stats.records_written);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod output;
pub mod prelude;

pub use convert::{convert_rows, convert_sheet, select_sheet, ConversionStats};
pub use error::{ConvertError, ConvertResult};
pub use output::{finish_output, CloseOutput, OutputTarget};

// Re-export core types
pub use xlsx2csv_core::{
    normalize_row, CellAddress, ConvertOptions, RowShape, StreamPath, CSV_EXTENSION,
    PROGRESS_REPORT_INTERVAL, STREAM_SENTINEL,
};

// Re-export I/O types
pub use xlsx2csv_csv::{CsvError, CsvRecordWriter, CsvWriteOptions, LineTerminator};
pub use xlsx2csv_xlsx::{SheetEntry, SheetRows, XlsxError, XlsxWorkbook};
