//! Command-line arguments

use std::ffi::OsString;

use clap::Parser;
use xlsx2csv::PROGRESS_REPORT_INTERVAL;

/// Usage line printed when no input is given
pub const USAGE: &str = "Usage: xlsx2csv [-o <output.csv>] [-sheet-index <index>] <input.xlsx | ->";

#[derive(Parser, Debug)]
#[command(name = "xlsx2csv")]
#[command(
    author,
    version,
    about = "Convert one sheet of an Excel workbook to CSV, streaming row by row"
)]
pub struct Cli {
    /// Input workbook (.xlsx), or '-' to read from stdin
    pub input: Option<String>,

    /// Path to the output CSV file. Use '-' for stdout. Defaults to <input_filename>.csv
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// 0-based index of the sheet to convert
    #[arg(
        long = "sheet-index",
        default_value_t = 0,
        value_name = "INDEX",
        allow_negative_numbers = true
    )]
    pub sheet_index: i64,

    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,

    /// End records with CRLF instead of LF
    #[arg(long)]
    pub crlf: bool,

    /// Report progress and flush output every N rows
    #[arg(long, default_value_t = PROGRESS_REPORT_INTERVAL, value_name = "N")]
    pub progress_interval: usize,

    /// Print debug diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

/// Long options that may also be spelled with a single dash (`-sheet-index 2`)
const LONG_OPTIONS: &[&str] = &[
    "sheet-index",
    "output",
    "delimiter",
    "progress-interval",
    "crlf",
    "verbose",
];

/// Rewrite single-dash long options to the double-dash form clap expects.
///
/// Arguments after a bare `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut end_of_options = false;
    args.into_iter()
        .map(|arg| {
            if end_of_options {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                end_of_options = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_OPTIONS.contains(&name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from))).unwrap()
    }

    #[test]
    fn test_single_dash_long_options() {
        assert_eq!(
            normalized(&["xlsx2csv", "-sheet-index", "2", "-sheet-index=3", "in.xlsx"]),
            vec!["xlsx2csv", "--sheet-index", "2", "--sheet-index=3", "in.xlsx"]
        );
    }

    #[test]
    fn test_other_arguments_untouched() {
        assert_eq!(
            normalized(&["xlsx2csv", "-o", "-", "-", "-v", "--sheet-index", "1"]),
            vec!["xlsx2csv", "-o", "-", "-", "-v", "--sheet-index", "1"]
        );
        assert_eq!(
            normalized(&["xlsx2csv", "--", "-sheet-index"]),
            vec!["xlsx2csv", "--", "-sheet-index"]
        );
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["xlsx2csv", "report.xlsx"]);
        assert_eq!(cli.input.as_deref(), Some("report.xlsx"));
        assert_eq!(cli.output, None);
        assert_eq!(cli.sheet_index, 0);
        assert_eq!(cli.delimiter, ',');
        assert_eq!(cli.progress_interval, 1000);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_original_flag_spelling() {
        let cli = parse(&["xlsx2csv", "-o", "-", "-sheet-index", "2", "-"]);
        assert_eq!(cli.input.as_deref(), Some("-"));
        assert_eq!(cli.output.as_deref(), Some("-"));
        assert_eq!(cli.sheet_index, 2);
    }

    #[test]
    fn test_input_is_optional() {
        let cli = parse(&["xlsx2csv"]);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_negative_sheet_index_reaches_bounds_check() {
        let cli = parse(&["xlsx2csv", "-sheet-index", "-1", "in.xlsx"]);
        assert_eq!(cli.sheet_index, -1);
        assert_eq!(cli.input.as_deref(), Some("in.xlsx"));

        let cli = parse(&["xlsx2csv", "-sheet-index=-2", "in.xlsx"]);
        assert_eq!(cli.sheet_index, -2);
    }

    #[test]
    fn test_crlf_flag() {
        assert!(parse(&["xlsx2csv", "-crlf", "in.xlsx"]).crlf);
        assert!(!parse(&["xlsx2csv", "in.xlsx"]).crlf);
    }
}
