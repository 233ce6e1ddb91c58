//! CSV record writer

use std::io::{self, Write};

use crate::error::{CsvError, CsvResult};
use crate::options::CsvWriteOptions;

/// Streams records to a writer, remembering the first failure.
///
/// Individual write errors are returned to the caller so it can log and move
/// on; [`CsvRecordWriter::take_error`] reports whether anything failed over
/// the whole run.
pub struct CsvRecordWriter<W: Write> {
    inner: csv::Writer<W>,
    error: Option<CsvError>,
}

impl<W: Write> CsvRecordWriter<W> {
    /// Create a writer with the given options
    pub fn new(writer: W, options: &CsvWriteOptions) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(options.line_terminator.to_csv())
            .from_writer(writer);

        Self {
            inner,
            error: None,
        }
    }

    /// Write one record
    pub fn write_record<I, T>(&mut self, record: I) -> CsvResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let result = self.inner.write_record(record).map_err(CsvError::from);
        self.track(result)
    }

    /// Push buffered records through to the underlying writer
    pub fn flush(&mut self) -> CsvResult<()> {
        let result = self.inner.flush().map_err(CsvError::from);
        self.track(result)
    }

    /// Take the first error seen by any write or flush, leaving the writer clean
    pub fn take_error(&mut self) -> Option<CsvError> {
        self.error.take()
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> CsvResult<W> {
        self.inner
            .into_inner()
            .map_err(|e| CsvError::Io(e.into_error()))
    }

    fn track(&mut self, result: CsvResult<()>) -> CsvResult<()> {
        if let Err(err) = &result {
            if self.error.is_none() {
                // csv::Error is not Clone
                let copy = match err {
                    CsvError::Io(e) => io::Error::new(e.kind(), e.to_string()),
                    CsvError::Csv(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
                };
                self.error = Some(CsvError::Io(copy));
            }
        }
        result
    }
}
