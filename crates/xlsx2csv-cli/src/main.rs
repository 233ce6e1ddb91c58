//! xlsx2csv CLI - stream one sheet of a workbook to CSV

mod args;

use std::io::{self, IsTerminal, Read, Seek};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use xlsx2csv::prelude::*;
use xlsx2csv::LineTerminator;

use crate::args::{normalize_args, Cli, USAGE};

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_tracing(cli.verbose);

    let Some(input_arg) = cli.input.as_deref() else {
        eprintln!("{}", USAGE);
        eprintln!("{}", Cli::command().render_help());
        return Ok(());
    };

    let input = StreamPath::parse(input_arg);
    let output = StreamPath::resolve_output(cli.output.as_deref(), &input);

    if !cli.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", cli.delimiter);
    }
    let job = Job {
        input,
        output,
        options: ConvertOptions {
            sheet_index: cli.sheet_index,
            progress_interval: cli.progress_interval,
        },
        csv_options: CsvWriteOptions {
            delimiter: cli.delimiter as u8,
            line_terminator: if cli.crlf {
                LineTerminator::CRLF
            } else {
                LineTerminator::LF
            },
        },
    };
    tracing::debug!("Input {}, output {}", job.input, job.output);

    match &job.input {
        StreamPath::Standard => {
            eprintln!("Reading Excel data from stdin...");
            let workbook = XlsxWorkbook::from_stream(io::stdin().lock())
                .context("Failed to open Excel input")?;
            job.run(workbook)
        }
        StreamPath::File(path) => {
            let workbook = XlsxWorkbook::open(path)
                .with_context(|| format!("Failed to open Excel input '{}'", path.display()))?;
            job.run(workbook)
        }
    }
}

/// Diagnostics go to stderr so stdout stays clean for CSV data.
///
/// The library crates log through `log`; the subscriber picks those records
/// up as well. `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

/// One resolved conversion request
struct Job {
    input: StreamPath,
    output: StreamPath,
    options: ConvertOptions,
    csv_options: CsvWriteOptions,
}

impl Job {
    fn run<R: Read + Seek>(&self, mut workbook: XlsxWorkbook<R>) -> Result<()> {
        let sheet_name = select_sheet(&workbook, self.options.sheet_index)?.to_string();

        let target = OutputTarget::create(&self.output)
            .with_context(|| format!("Failed to create CSV file {}", self.output))?;
        let mut writer = CsvRecordWriter::new(target, &self.csv_options);

        eprintln!(
            "Converting sheet '{}' (index {}) from {} to {}...",
            sheet_name,
            self.options.sheet_index,
            self.input.describe("stdin"),
            self.output.describe("stdout"),
        );

        let stats = convert_sheet(&mut workbook, &mut writer, &self.options, |n| {
            eprintln!("... processed {} rows", n)
        })?;

        finish_output(writer)?;

        if stats.is_empty_sheet() {
            eprintln!("Warning: Sheet '{}' is empty.", sheet_name);
            return Ok(());
        }

        eprintln!(
            "Conversion complete! Successfully wrote {} rows.",
            stats.records_written
        );
        Ok(())
    }
}
