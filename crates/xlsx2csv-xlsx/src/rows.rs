//! Lazy row iterator over a worksheet part

use std::io::BufRead;
use std::iter::FusedIterator;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use xlsx2csv_core::{CellAddress, MAX_ROWS};

/// Forward-only iterator over the rows of one worksheet.
///
/// Each item is the text of one row's cells, left to right. Cells are placed
/// by their column reference with empty strings filling the gaps, and rows
/// missing from the XML come back as empty rows so positions line up with
/// the sheet.
///
/// An `Err` item means that single row could not be decoded; iteration can
/// continue. If the XML itself breaks, iteration stops and the failure is
/// returned by [`SheetRows::close`].
pub struct SheetRows<'a, R: BufRead> {
    xml: Reader<R>,
    buf: Vec<u8>,
    shared_strings: &'a [String],
    /// 1-based number of the next row to yield
    next_row: u32,
    /// Row read ahead of a gap in the numbering
    pending: Option<(u32, XlsxResult<Vec<String>>)>,
    failure: Option<XlsxError>,
    finished: bool,
}

impl<'a, R: BufRead> SheetRows<'a, R> {
    /// Stream rows out of worksheet XML
    pub fn new(reader: R, shared_strings: &'a [String]) -> Self {
        Self {
            xml: Reader::from_reader(reader),
            buf: Vec::new(),
            shared_strings,
            next_row: 1,
            pending: None,
            failure: None,
            finished: false,
        }
    }

    /// Release the iterator, reporting a failure that ended iteration early
    pub fn close(mut self) -> XlsxResult<()> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Read up to the next `<row>` element and decode it
    fn read_next(&mut self) -> XlsxResult<Option<(u32, XlsxResult<Vec<String>>)>> {
        loop {
            // (row number, whether cells follow)
            let found = match self.xml.read_event_into(&mut self.buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"row" => {
                    Some((row_number(&e), true))
                }
                Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                    Some((row_number(&e), false))
                }
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => return Ok(None),
                Event::Eof => return Ok(None),
                _ => None,
            };
            self.buf.clear();

            if let Some((declared, has_cells)) = found {
                let number = declared
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|&n| n <= MAX_ROWS)
                    .unwrap_or(self.next_row);
                let row = if has_cells {
                    self.read_cells(number)?
                } else {
                    Ok(Vec::new())
                };
                let row = match declared {
                    Some(n) if n > u64::from(MAX_ROWS) => Err(XlsxError::Row {
                        row: number,
                        message: format!("row number {} is past the last sheet row {}", n, MAX_ROWS),
                    }),
                    _ => row,
                };
                return Ok(Some((number, row)));
            }
        }
    }

    /// Decode the cells of the current row, consuming through `</row>`.
    ///
    /// The outer error is fatal to the stream; the inner one only to this row.
    fn read_cells(&mut self, number: u32) -> XlsxResult<XlsxResult<Vec<String>>> {
        let mut cells: Vec<String> = Vec::new();
        let mut next_col = 0usize;
        let mut problem: Option<String> = None;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline = false;
        let mut in_text = false;
        let mut in_phonetic = false;

        loop {
            match self.xml.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"c" => cell = Some(PendingCell::from_element(&e)),
                    b"v" => in_value = cell.is_some(),
                    b"f" => {
                        if let Some(c) = cell.as_mut() {
                            c.has_formula = true;
                        }
                    }
                    b"is" => in_inline = cell.is_some(),
                    b"rPh" => in_phonetic = true,
                    b"t" => in_text = in_inline && !in_phonetic,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"c" => {
                        let empty = PendingCell::from_element(&e);
                        if problem.is_none() {
                            problem =
                                place_cell(&mut cells, &mut next_col, empty, self.shared_strings)
                                    .err();
                        }
                    }
                    b"f" => {
                        if let Some(c) = cell.as_mut() {
                            c.has_formula = true;
                        }
                    }
                    _ => {}
                },
                Event::Text(e) if in_value || in_text => {
                    let text = e.unescape()?;
                    if let Some(c) = cell.as_mut() {
                        c.push_text(in_value, &text);
                    }
                }
                Event::CData(e) if in_value || in_text => {
                    if let Some(c) = cell.as_mut() {
                        c.push_text(in_value, &String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(done) = cell.take() {
                            if problem.is_none() {
                                problem = place_cell(
                                    &mut cells,
                                    &mut next_col,
                                    done,
                                    self.shared_strings,
                                )
                                .err();
                            }
                        }
                        in_value = false;
                        in_inline = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_text = false,
                    b"row" => break,
                    _ => {}
                },
                Event::Eof => {
                    return Err(XlsxError::InvalidFormat(format!(
                        "sheet ends inside row {}",
                        number
                    )))
                }
                _ => {}
            }
            self.buf.clear();
        }
        self.buf.clear();

        Ok(match problem {
            Some(message) => Err(XlsxError::Row {
                row: number,
                message,
            }),
            None => Ok(cells),
        })
    }
}

impl<R: BufRead> Iterator for SheetRows<'_, R> {
    type Item = XlsxResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_none() && !self.finished {
            match self.read_next() {
                Ok(Some(parsed)) => self.pending = Some(parsed),
                Ok(None) => self.finished = true,
                Err(err) => {
                    log::debug!("Sheet stream stopped at row {}: {}", self.next_row, err);
                    self.failure = Some(err);
                    self.finished = true;
                }
            }
        }

        let (number, row) = self.pending.take()?;
        if number > self.next_row {
            // Rows absent from the XML are empty
            self.pending = Some((number, row));
            self.next_row += 1;
            return Some(Ok(Vec::new()));
        }
        self.next_row += 1;
        Some(row)
    }
}

impl<R: BufRead> FusedIterator for SheetRows<'_, R> {}

/// A `<c>` element collected up to its closing tag
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    kind: Option<String>,
    value: String,
    has_value: bool,
    inline: String,
    has_formula: bool,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.kind = attr.unescape_value().ok().map(|s| s.to_string()),
                _ => {}
            }
        }
        cell
    }

    fn push_text(&mut self, in_value: bool, text: &str) {
        if in_value {
            self.value.push_str(text);
            self.has_value = true;
        } else {
            self.inline.push_str(text);
        }
    }

    /// Stringify the cell the way it reads in a spreadsheet application
    fn text(&self, shared_strings: &[String]) -> Result<String, String> {
        match self.kind.as_deref() {
            Some("s") => {
                if !self.has_value {
                    return Ok(String::new());
                }
                let idx: usize = self
                    .value
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid shared string index '{}'", self.value))?;
                shared_strings
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| format!("shared string index {} out of bounds", idx))
            }
            Some("inlineStr") => Ok(decode_excel_escapes(&self.inline)),
            Some("b") if self.has_value => {
                let truthy = self.value == "1" || self.value.eq_ignore_ascii_case("true");
                Ok(if truthy { "TRUE" } else { "FALSE" }.to_string())
            }
            Some("str") => Ok(decode_excel_escapes(&self.value)),
            _ => Ok(self.value.clone()),
        }
    }
}

/// Put a finished cell at its column, padding any gap before it
fn place_cell(
    cells: &mut Vec<String>,
    next_col: &mut usize,
    cell: PendingCell,
    shared_strings: &[String],
) -> Result<(), String> {
    let col = match cell.reference.as_deref() {
        Some(reference) => {
            let addr = CellAddress::parse(reference).map_err(|e| e.to_string())?;
            let col = addr.col as usize;
            if col < *next_col {
                return Err(format!(
                    "cell {} is out of order (column {} already read)",
                    reference,
                    CellAddress::column_to_letters(addr.col)
                ));
            }
            col
        }
        None => *next_col,
    };
    *next_col = col + 1;

    let text = cell.text(shared_strings)?;
    // Blank cells (style-only) do not extend the row
    if !text.is_empty() || cell.has_formula {
        cells.resize(col, String::new());
        cells.push(text);
    }
    Ok(())
}

/// The `r` attribute of a `<row>` element, if present and a positive number
fn row_number(e: &BytesStart<'_>) -> Option<u64> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| attr.unescape_value().ok()?.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
}
