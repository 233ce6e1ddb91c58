//! The sheet-to-CSV pipeline
//!
//! Rows flow from a [`SheetRows`](xlsx2csv_xlsx::SheetRows) iterator through
//! [`normalize_row`] into a [`CsvRecordWriter`] one at a time; nothing but
//! the header width is kept between rows.

use std::io::{Read, Seek, Write};

use crate::error::{ConvertError, ConvertResult};
use xlsx2csv_core::Error::SheetOutOfBounds;
use xlsx2csv_core::{normalize_row, sheet_position, ConvertOptions, RowShape};
use xlsx2csv_csv::CsvRecordWriter;
use xlsx2csv_xlsx::{XlsxResult, XlsxWorkbook};

/// Statistics from a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Width of the header row; `None` if the sheet had no rows
    pub column_count: Option<usize>,
    /// Rows taken from the sheet, header and unreadable rows included
    pub rows_read: usize,
    /// Records handed to the writer, header included
    pub records_written: usize,
    /// Rows that could not be decoded and were left out
    pub rows_skipped: usize,
    /// Rows padded with empty fields
    pub rows_padded: usize,
    /// Rows cut down to the header width
    pub rows_truncated: usize,
    /// Records the writer rejected
    pub write_failures: usize,
    /// Progress reports issued
    pub progress_reports: usize,
}

impl ConversionStats {
    /// Returns true if the sheet produced no rows at all
    pub fn is_empty_sheet(&self) -> bool {
        self.column_count.is_none()
    }
}

/// Check the sheet index against the workbook and return the sheet's name
pub fn select_sheet<R: Read + Seek>(
    workbook: &XlsxWorkbook<R>,
    index: i64,
) -> ConvertResult<&str> {
    let position = sheet_position(index, workbook.sheet_count())?;
    workbook
        .sheet_name(position)
        .ok_or_else(|| SheetOutOfBounds {
            index,
            count: workbook.sheet_count(),
        }
        .into())
}

/// Convert the sheet selected by `options.sheet_index`.
///
/// The row iterator is closed before returning; a failure there is logged
/// and does not fail the conversion. The writer is left open so the caller
/// decides when to flush and close it.
pub fn convert_sheet<R, W, P>(
    workbook: &mut XlsxWorkbook<R>,
    writer: &mut CsvRecordWriter<W>,
    options: &ConvertOptions,
    on_progress: P,
) -> ConvertResult<ConversionStats>
where
    R: Read + Seek,
    W: Write,
    P: FnMut(usize),
{
    let position = sheet_position(options.sheet_index, workbook.sheet_count())?;

    let mut rows = workbook.rows(position)?;
    let result = convert_rows(&mut rows, writer, options, on_progress);

    if let Err(err) = rows.close() {
        log::error!("Error closing row iterator: {}", err);
    }

    result
}

/// Write `rows` as CSV records normalized to the width of the first row.
///
/// `on_progress` is called with the number of records written every
/// `options.progress_interval` records, right before the writer is flushed.
pub fn convert_rows<I, W, P>(
    rows: I,
    writer: &mut CsvRecordWriter<W>,
    options: &ConvertOptions,
    mut on_progress: P,
) -> ConvertResult<ConversionStats>
where
    I: IntoIterator<Item = XlsxResult<Vec<String>>>,
    W: Write,
    P: FnMut(usize),
{
    let mut stats = ConversionStats::default();
    let mut rows = rows.into_iter();

    let header = match rows.next() {
        Some(Ok(header)) => header,
        Some(Err(err)) => return Err(ConvertError::HeaderRead(err)),
        None => return Ok(stats),
    };
    stats.rows_read = 1;

    let column_count = header.len();
    stats.column_count = Some(column_count);
    writer
        .write_record(&header)
        .map_err(ConvertError::HeaderWrite)?;
    stats.records_written = 1;
    log::debug!("Header has {} columns", column_count);

    for row in rows {
        stats.rows_read += 1;
        let row_number = stats.rows_read;

        let row = match row {
            Ok(row) => row,
            Err(err) => {
                log::error!("Error reading row {}: {}", row_number, err);
                stats.rows_skipped += 1;
                continue;
            }
        };

        let (record, shape) = normalize_row(row, column_count);
        match shape {
            RowShape::Exact => {}
            RowShape::Padded { .. } => stats.rows_padded += 1,
            RowShape::Truncated { original } => {
                log::warn!(
                    "Row {} has {} columns, more than header's {}. Truncating.",
                    row_number,
                    original,
                    column_count
                );
                stats.rows_truncated += 1;
            }
        }

        if let Err(err) = writer.write_record(&record) {
            log::error!("Error writing row {} to CSV: {}", row_number, err);
            stats.write_failures += 1;
        }
        stats.records_written += 1;

        if options.progress_due(stats.records_written) {
            on_progress(stats.records_written);
            stats.progress_reports += 1;
            if let Err(err) = writer.flush() {
                log::error!("Error flushing CSV output: {}", err);
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlsx2csv_csv::CsvWriteOptions;
    use xlsx2csv_xlsx::XlsxError;

    fn row(fields: &[&str]) -> XlsxResult<Vec<String>> {
        Ok(fields.iter().map(|s| s.to_string()).collect())
    }

    fn bad_row(n: u32) -> XlsxResult<Vec<String>> {
        Err(XlsxError::Row {
            row: n,
            message: "shared string index 99 out of bounds".into(),
        })
    }

    fn run(
        rows: Vec<XlsxResult<Vec<String>>>,
        options: &ConvertOptions,
    ) -> (ConvertResult<ConversionStats>, String, Vec<usize>) {
        let mut writer = CsvRecordWriter::new(Vec::new(), &CsvWriteOptions::default());
        let mut reports = Vec::new();
        let result = convert_rows(rows, &mut writer, options, |n| reports.push(n));
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        (result, out, reports)
    }

    #[test]
    fn test_rows_normalized_to_header() {
        let (result, out, _) = run(
            vec![
                row(&["id", "name", "qty"]),
                row(&["1", "apple"]),
                row(&["2", "pear", "5", "extra", "more"]),
                row(&["3", "fig", "7"]),
            ],
            &ConvertOptions::default(),
        );
        let stats = result.unwrap();
        assert_eq!(out, "id,name,qty\n1,apple,\n2,pear,5\n3,fig,7\n");
        assert_eq!(stats.column_count, Some(3));
        assert_eq!(stats.rows_padded, 1);
        assert_eq!(stats.rows_truncated, 1);
        assert_eq!(stats.records_written, 4);
    }

    #[test]
    fn test_unreadable_row_skipped_but_counted() {
        let (result, out, _) = run(
            vec![row(&["a"]), bad_row(2), row(&["c"])],
            &ConvertOptions::default(),
        );
        let stats = result.unwrap();
        assert_eq!(out, "a\nc\n");
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.records_written, 2);
    }

    #[test]
    fn test_empty_sheet_is_not_an_error() {
        let (result, out, reports) = run(Vec::new(), &ConvertOptions::default());
        let stats = result.unwrap();
        assert!(stats.is_empty_sheet());
        assert_eq!(stats.records_written, 0);
        assert_eq!(out, "");
        assert!(reports.is_empty());
    }

    #[test]
    fn test_header_read_failure_is_fatal() {
        let (result, out, _) = run(vec![bad_row(1), row(&["x"])], &ConvertOptions::default());
        assert!(matches!(result, Err(ConvertError::HeaderRead(_))));
        assert_eq!(out, "");
    }

    #[test]
    fn test_progress_every_interval() {
        let mut rows = vec![row(&["h1", "h2"])];
        rows.extend((0..25).map(|i| row(&[i.to_string().as_str(), "x"])));
        let options = ConvertOptions {
            progress_interval: 10,
            ..Default::default()
        };

        let (result, out, reports) = run(rows, &options);
        let stats = result.unwrap();
        assert_eq!(reports, vec![10, 20]);
        assert_eq!(stats.progress_reports, 2);
        assert_eq!(stats.records_written, 26);
        assert_eq!(out.lines().count(), 26);
    }

    #[test]
    fn test_header_width_zero() {
        let (result, out, _) = run(
            vec![row(&[]), row(&["dropped"])],
            &ConvertOptions::default(),
        );
        let stats = result.unwrap();
        assert_eq!(stats.column_count, Some(0));
        assert_eq!(stats.rows_truncated, 1);
        assert_eq!(stats.records_written, 2);
        assert!(!out.contains("dropped"));
    }
}
