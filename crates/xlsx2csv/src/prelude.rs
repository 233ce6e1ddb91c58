//! Prelude module - common imports for xlsx2csv users
//!
//! ```rust
//! use xlsx2csv::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    convert_sheet,
    finish_output,
    select_sheet,
    ConversionStats,
    ConvertError,
    ConvertOptions,
    ConvertResult,

    // I/O types
    CsvRecordWriter,
    CsvWriteOptions,
    OutputTarget,
    StreamPath,
    XlsxWorkbook,
};
