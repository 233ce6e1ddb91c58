//! Builds small XLSX files in memory for tests

use std::io::{Cursor, Write};
use std::path::Path;

use quick_xml::escape::escape;

use crate::error::XlsxResult;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// Assembles a minimal workbook: one worksheet part per sheet, optional
/// shared strings, cells written as inline strings.
#[derive(Debug, Default, Clone)]
pub struct WorkbookBuilder {
    sheets: Vec<(String, String)>,
    shared_strings: Vec<String>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet from rows of cell text; empty strings leave the cell out
    pub fn sheet<Rows, Cells, S>(mut self, name: &str, rows: Rows) -> Self
    where
        Rows: IntoIterator<Item = Cells>,
        Cells: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut data = String::new();
        for (r, cells) in rows.into_iter().enumerate() {
            data.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, text) in cells.into_iter().enumerate() {
                let text = text.as_ref();
                if text.is_empty() {
                    continue;
                }
                data.push_str(&format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    xlsx2csv_core::CellAddress::column_to_letters(c as u16),
                    r + 1,
                    escape(text)
                ));
            }
            data.push_str("</row>");
        }
        self.sheets.push((name.to_string(), data));
        self
    }

    /// Add a sheet from raw `<sheetData>` content
    pub fn sheet_xml(mut self, name: &str, sheet_data: &str) -> Self {
        self.sheets.push((name.to_string(), sheet_data.to_string()));
        self
    }

    /// Set the shared string table referenced by `t="s"` cells
    pub fn shared_strings<S: AsRef<str>>(mut self, strings: &[S]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Zip the workbook into bytes
    pub fn build(&self) -> XlsxResult<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        let mut workbook = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name.as_str()),
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook.as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(rels.as_bytes())?;

        if !self.shared_strings.is_empty() {
            let mut sst = String::from(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            );
            for s in &self.shared_strings {
                sst.push_str(&format!("<si><t>{}</t></si>", escape(s.as_str())));
            }
            sst.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options)?;
            zip.write_all(sst.as_bytes())?;
        }

        for (i, (_, data)) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    data
                )
                .as_bytes(),
            )?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the workbook to a file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }
}
