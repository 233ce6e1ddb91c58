//! Workbook container: sheet list, shared strings and access to sheet rows

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::rows::SheetRows;

/// A worksheet listed in `xl/workbook.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Sheet name as shown on its tab
    pub name: String,
    /// Path of the worksheet part inside the archive
    pub path: String,
}

/// An open XLSX workbook.
///
/// Holds the zip archive for the lifetime of the value; dropping the
/// workbook releases the underlying file or buffer.
pub struct XlsxWorkbook<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    shared_strings: Vec<String>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl XlsxWorkbook<Cursor<Vec<u8>>> {
    /// Open a workbook from a non-seekable stream such as stdin.
    ///
    /// The zip directory sits at the end of the container, so the stream is
    /// read into memory first.
    pub fn from_stream<S: Read>(mut stream: S) -> XlsxResult<Self> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        log::debug!("Read {} bytes of workbook data", bytes.len());
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Open a workbook from a seekable reader
    pub fn new(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let sheet_ids = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut sheets = Vec::with_capacity(sheet_ids.len());
        for (name, r_id) in sheet_ids {
            match sheet_paths.get(&r_id) {
                Some(path) => sheets.push(SheetEntry {
                    name,
                    path: path.clone(),
                }),
                None => log::warn!("Skipping sheet '{}': no worksheet part for {}", name, r_id),
            }
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;

        Ok(Self {
            archive,
            sheets,
            shared_strings,
        })
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Worksheets in workbook order
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Name of the sheet at `index`
    pub fn sheet_name(&self, index: usize) -> Option<&str> {
        self.sheets.get(index).map(|s| s.name.as_str())
    }

    /// Start streaming the rows of the sheet at `index`
    pub fn rows(&mut self, index: usize) -> XlsxResult<SheetRows<'_, impl BufRead + '_>> {
        let entry = self
            .sheets
            .get(index)
            .ok_or(xlsx2csv_core::Error::SheetOutOfBounds {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                count: self.sheets.len(),
            })?;

        let file = self
            .archive
            .by_name(&entry.path)
            .map_err(|_| XlsxError::MissingPart(entry.path.clone()))?;
        log::debug!("Streaming rows of '{}' from {}", entry.name, entry.path);

        Ok(SheetRows::new(BufReader::new(file), &self.shared_strings))
    }

    /// Sheet names and relationship ids from `xl/workbook.xml`, in tab order
    fn read_workbook_xml(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<(String, String)>> {
        let sheets = collect_attributes(archive, "xl/workbook.xml", b"sheet", &[b"name", b"id"])?
            .into_iter()
            .filter_map(|attrs| match <[Option<String>; 2]>::try_from(attrs) {
                Ok([Some(name), Some(r_id)]) => Some((name, r_id)),
                _ => None,
            })
            .collect();
        Ok(sheets)
    }

    /// Worksheet part paths keyed by relationship id
    fn read_workbook_rels(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let rels = collect_attributes(
            archive,
            "xl/_rels/workbook.xml.rels",
            b"Relationship",
            &[b"Id", b"Target", b"Type"],
        )?
        .into_iter()
        .filter_map(|attrs| match <[Option<String>; 3]>::try_from(attrs) {
            Ok([Some(id), Some(target), Some(kind)]) if kind.ends_with("/worksheet") => {
                Some((id, resolve_part_path(&target)))
            }
            _ => None,
        })
        .collect();
        Ok(rels)
    }

    /// Read the shared string table, if the workbook has one
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current.push_str(&e.unescape()?),
                Event::CData(e) if in_t => current.push_str(&String::from_utf8_lossy(&e)),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        log::debug!("Loaded {} shared strings", strings.len());
        Ok(strings)
    }
}

/// For every `element` in a required part, the values of the wanted
/// attributes (matched by local name, so `r:id` is found as `id`)
fn collect_attributes<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    part: &str,
    element: &[u8],
    wanted: &[&[u8]],
) -> XlsxResult<Vec<Vec<Option<String>>>> {
    let file = archive
        .by_name(part)
        .map_err(|_| XlsxError::MissingPart(part.to_string()))?;

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut buf = Vec::new();
    let mut found = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == element => {
                let mut values = vec![None; wanted.len()];
                for attr in e.attributes().flatten() {
                    let key = attr.key.local_name();
                    if let Some(slot) = wanted.iter().position(|w| *w == key.as_ref()) {
                        values[slot] = Some(attr.unescape_value()?.into_owned());
                    }
                }
                found.push(values);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    log::debug!("{}: {} <{}> elements", part, found.len(), String::from_utf8_lossy(element));
    Ok(found)
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="Data" sheetId="1" r:id="rId1"/>
<sheet name="Q&amp;A" sheetId="2" r:id="rId2"/>
<sheet name="Orphan" sheetId="3" r:id="rId9"/>
</sheets>
</workbook>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/other.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

    const SHARED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
<si><t>id</t></si>
<si><r><t>na</t></r><r><t>me</t></r><rPh sb="0" eb="1"><t>x</t></rPh></si>
<si/>
<si><t><![CDATA[<raw>]]></t></si>
</sst>"#;

    fn build(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn sample() -> Vec<u8> {
        build(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", RELS_XML),
            ("xl/sharedStrings.xml", SHARED_XML),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row></sheetData></worksheet>"#,
            ),
            (
                "xl/worksheets/other.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1"><v>9</v></c></row></sheetData></worksheet>"#,
            ),
        ])
    }

    #[test]
    fn test_sheet_list_follows_workbook_order() {
        let wb = XlsxWorkbook::new(Cursor::new(sample())).unwrap();
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.sheet_name(0), Some("Data"));
        assert_eq!(wb.sheet_name(1), Some("Q&A"));
        assert_eq!(wb.sheet_name(2), None);
        assert_eq!(wb.sheets()[1].path, "xl/worksheets/other.xml");
    }

    #[test]
    fn test_rows_use_shared_strings() {
        let mut wb = XlsxWorkbook::from_stream(sample().as_slice()).unwrap();
        let rows: Vec<_> = wb.rows(0).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![vec!["id".to_string(), "name".to_string()]]);

        let rows: Vec<_> = wb.rows(1).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![vec!["9".to_string()]]);
    }

    #[test]
    fn test_shared_strings_keep_empty_entries() {
        let mut archive = zip::ZipArchive::new(Cursor::new(sample())).unwrap();
        let strings = XlsxWorkbook::read_shared_strings(&mut archive).unwrap();
        assert_eq!(strings, vec!["id", "name", "", "<raw>"]);
    }

    #[test]
    fn test_rows_out_of_bounds() {
        let mut wb = XlsxWorkbook::new(Cursor::new(sample())).unwrap();
        match wb.rows(2) {
            Err(XlsxError::Core(xlsx2csv_core::Error::SheetOutOfBounds { index, count })) => {
                assert_eq!((index, count), (2, 2));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected out of bounds"),
        };
    }

    #[test]
    fn test_missing_content_types_rejected() {
        let bytes = build(&[("xl/workbook.xml", WORKBOOK_XML)]);
        let err = XlsxWorkbook::new(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = XlsxWorkbook::from_stream(&b"name,value\n1,2\n"[..]).err().unwrap();
        assert!(matches!(err, XlsxError::Zip(_)));
    }

    #[test]
    fn test_missing_worksheet_part() {
        let bytes = build(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", RELS_XML),
        ]);
        let mut wb = XlsxWorkbook::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(wb.rows(0).err(), Some(XlsxError::MissingPart(_))));
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, sample()).unwrap();

        let wb = XlsxWorkbook::open(&path).unwrap();
        assert_eq!(wb.sheet_count(), 2);
    }

    #[test]
    fn test_relationship_prefix_is_not_fixed() {
        let workbook = r#"<x:workbook xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<x:sheets><x:sheet name="Prefixed" sheetId="1" rel:id="rId1"/><x:sheet name="NoId" sheetId="2"/></x:sheets>
</x:workbook>"#;
        let bytes = build(&[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", RELS_XML),
        ]);
        let wb = XlsxWorkbook::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            wb.sheets(),
            &[SheetEntry {
                name: "Prefixed".into(),
                path: "xl/worksheets/sheet1.xml".into(),
            }]
        );
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(resolve_part_path("worksheets/a.xml"), "xl/worksheets/a.xml");
        assert_eq!(resolve_part_path("/xl/worksheets/a.xml"), "xl/worksheets/a.xml");
    }
}
