//! Small workbooks written on the fly for reader and pipeline tests.
use crate::spreadsheet::reference::index_to_reference;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Builds an `.xlsx` package. Numeric-looking values become number cells,
/// values starting with `#` become error cells, empty values leave no cell
/// and everything else is a string.
#[derive(Default)]
pub(crate) struct WorkbookFixture {
    sheets: Vec<(String, Vec<Vec<String>>)>,
    shared_strings: bool,
}

impl WorkbookFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect();
        self.sheets.push((name.to_owned(), rows));
        self
    }

    /// Store strings in `xl/sharedStrings.xml` instead of inline.
    pub(crate) fn shared_strings(mut self) -> Self {
        self.shared_strings = true;
        self
    }

    pub(crate) fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        let mut strings = Vec::<String>::new();

        let mut workbook = format!(r#"{XML_HEADER}<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#);
        let mut relationships = format!(r#"{XML_HEADER}<Relationships xmlns="{PACKAGE_REL_NS}">"#);
        for (index, (name, rows)) in self.sheets.iter().enumerate() {
            let number = index + 1;
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{number}" r:id="rId{number}"/>"#,
                escape(name)
            ));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{number}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{number}.xml"/>"#
            ));

            let mut worksheet = format!(r#"{XML_HEADER}<worksheet xmlns="{MAIN_NS}"><sheetData>"#);
            for (row, values) in rows.iter().enumerate() {
                worksheet.push_str(&format!(r#"<row r="{}">"#, row + 1));
                for (col, value) in values.iter().enumerate() {
                    let reference = index_to_reference(row, col);
                    if value.is_empty() {
                        continue;
                    } else if value.parse::<f64>().is_ok() {
                        worksheet.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                    } else if value.starts_with('#') {
                        worksheet.push_str(&format!(r#"<c r="{reference}" t="e"><v>{}</v></c>"#, escape(value)));
                    } else if self.shared_strings {
                        worksheet.push_str(&format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, strings.len()));
                        strings.push(value.to_owned());
                    } else {
                        worksheet.push_str(&format!(
                            r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                            escape(value)
                        ));
                    }
                }
                worksheet.push_str("</row>");
            }
            worksheet.push_str("</sheetData></worksheet>");
            zip.start_file(format!("xl/worksheets/sheet{number}.xml"), options).unwrap();
            zip.write_all(worksheet.as_bytes()).unwrap();
        }
        workbook.push_str("</sheets></workbook>");
        relationships.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(relationships.as_bytes()).unwrap();
        if self.shared_strings {
            let mut table = format!(r#"{XML_HEADER}<sst xmlns="{MAIN_NS}" count="{0}" uniqueCount="{0}">"#, strings.len());
            for value in &strings {
                table.push_str(&format!("<si><t>{}</t></si>", escape(value)));
            }
            table.push_str("</sst>");
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(table.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }
}

/// Writes an `.ods` package around a hand-written `content.xml`.
pub(crate) struct OdsFixture;

impl OdsFixture {
    pub(crate) fn write(dir: &Path, file_name: &str, content: &str) -> PathBuf {
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet").unwrap();
        zip.start_file("content.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }
}
