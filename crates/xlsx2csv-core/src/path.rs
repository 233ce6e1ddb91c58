//! Path arguments that may name a standard stream

use std::fmt;
use std::path::{Path, PathBuf};

/// Argument value that stands for stdin (input) or stdout (output)
pub const STREAM_SENTINEL: &str = "-";

/// Extension given to derived output files
pub const CSV_EXTENSION: &str = "csv";

/// An input or output location: either a standard stream or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPath {
    /// stdin when reading, stdout when writing
    Standard,
    /// A filesystem path
    File(PathBuf),
}

impl StreamPath {
    /// Interpret a command-line argument; `-` selects the standard stream
    pub fn parse(arg: &str) -> Self {
        if arg == STREAM_SENTINEL {
            StreamPath::Standard
        } else {
            StreamPath::File(PathBuf::from(arg))
        }
    }

    /// Returns true for the standard stream
    pub fn is_standard(&self) -> bool {
        matches!(self, StreamPath::Standard)
    }

    /// The file path, if this is not a standard stream
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            StreamPath::Standard => None,
            StreamPath::File(path) => Some(path),
        }
    }

    /// Output location used when none was given explicitly.
    ///
    /// A file input maps to its file name with the extension swapped for
    /// `.csv`, placed in the working directory. Standard input maps to
    /// standard output.
    pub fn derive_output(&self) -> StreamPath {
        match self {
            StreamPath::Standard => StreamPath::Standard,
            StreamPath::File(path) => {
                let mut name = path
                    .file_stem()
                    .unwrap_or_else(|| path.as_os_str())
                    .to_os_string();
                name.push(".");
                name.push(CSV_EXTENSION);
                StreamPath::File(PathBuf::from(name))
            }
        }
    }

    /// Resolve the output location from an optional explicit argument
    pub fn resolve_output(explicit: Option<&str>, input: &StreamPath) -> StreamPath {
        match explicit {
            Some(arg) => StreamPath::parse(arg),
            None => input.derive_output(),
        }
    }

    /// Human-readable description for status lines
    pub fn describe(&self, stream_name: &str) -> String {
        match self {
            StreamPath::Standard => stream_name.to_string(),
            StreamPath::File(path) => format!("file '{}'", path.display()),
        }
    }
}

impl fmt::Display for StreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPath::Standard => f.write_str(STREAM_SENTINEL),
            StreamPath::File(path) => write!(f, "{}", path.display()),
        }
    }
}
