//! Output destinations and end-of-run finalization

use std::fs::File;
use std::io::{self, Write};

use crate::error::{ConvertError, ConvertResult};
use xlsx2csv_core::StreamPath;
use xlsx2csv_csv::CsvRecordWriter;

/// A writable destination whose release can fail observably
pub trait CloseOutput: Write {
    /// Flush and release the destination
    fn close(self) -> io::Result<()>;
}

/// Where CSV records go: stdout or a created file
#[derive(Debug)]
pub enum OutputTarget {
    Stdout(io::Stdout),
    File(File),
}

impl OutputTarget {
    /// Open the destination named by `path`, creating (or truncating) a file
    pub fn create(path: &StreamPath) -> io::Result<Self> {
        match path {
            StreamPath::Standard => Ok(OutputTarget::Stdout(io::stdout())),
            StreamPath::File(path) => Ok(OutputTarget::File(File::create(path)?)),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(out) => out.write(buf),
            OutputTarget::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(out) => out.flush(),
            OutputTarget::File(file) => file.flush(),
        }
    }
}

impl CloseOutput for OutputTarget {
    fn close(self) -> io::Result<()> {
        match self {
            // stdout belongs to the process; only flush it
            OutputTarget::Stdout(mut out) => out.flush(),
            OutputTarget::File(file) => file.sync_all(),
        }
    }
}

/// Flush the writer, close its destination and report any write failure.
///
/// A failure to close is logged only. A write or flush failure at any point
/// during the run is returned as [`ConvertError::WriteFailed`].
pub fn finish_output<W: CloseOutput>(mut writer: CsvRecordWriter<W>) -> ConvertResult<()> {
    if let Err(err) = writer.flush() {
        log::error!("Error flushing CSV output: {}", err);
    }
    let write_error = writer.take_error();

    match writer.into_inner() {
        Ok(output) => {
            if let Err(err) = output.close() {
                log::error!("Error closing output file: {}", err);
            }
        }
        Err(err) => log::error!("Error closing output file: {}", err),
    }

    match write_error {
        Some(err) => Err(ConvertError::WriteFailed(err)),
        None => Ok(()),
    }
}
