//! # xlsx2csv-csv
//!
//! CSV record writer for xlsx2csv.

mod error;
mod options;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvWriteOptions, LineTerminator};
pub use writer::CsvRecordWriter;
