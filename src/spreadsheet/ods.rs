use crate::error::ImportError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::FileReader;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

/// ODS file MIME type identifier
const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
const SPREADSHEET: QName = QName(b"office:spreadsheet");
const TABLE: QName = QName(b"table:table");
const TABLE_ROW: QName = QName(b"table:table-row");
const TABLE_CELL: QName = QName(b"table:table-cell");
/// Cells hidden under a merged cell
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
/// Comments attached to a cell; their text is not cell content
const ANNOTATION: QName = QName(b"office:annotation");
const PARAGRAPH: QName = QName(b"text:p");
/// Run of spaces, count in `text:c`
const SPACES: QName = QName(b"text:s");

#[derive(Error, Debug)]
pub(crate) enum OdsError {
    #[error("Invalid ODS MIME type")]
    MimeTypeError,

    #[error("ODS file '{0}' is password protected")]
    PasswordProtectedError(String),
}

/// An OpenDocument spreadsheet (`.ods`).
pub(crate) struct OdsSpreadsheet {
    pub(crate) name: String,
    zip: ZipArchive<FileReader>,
}

impl OdsSpreadsheet {
    pub(crate) fn open(path: &Path) -> Result<Self, ImportError> {
        let name = path.display().to_string();
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;
        check_mime(&mut zip)?;
        if is_password_protected(&mut zip)? {
            Err(OdsError::PasswordProtectedError(name.to_owned()))?;
        }
        Ok(OdsSpreadsheet { name, zip })
    }
}

impl Spreadsheet for OdsSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, ImportError> {
        let mut sheets = Vec::<Sheet>::new();
        let mut sheet_name = String::new();
        let mut reader = self
            .zip
            .xml_reader("content.xml")?
            .ok_or_else(|| SpreadsheetError::FileError("content.xml".to_owned()))?;
        'sheets: loop {
            // Advance to the next accepted table
            match_xml_events!(reader => {
                Event::End(event) if event.name() == SPREADSHEET => break 'sheets,
                Event::Start(event) if event.name() == TABLE => {
                    sheet_name.clear();
                    if let Some(table_name) = event.get_attribute_value("table:name")? {
                        sheet_name.push_str(&table_name);
                    }
                    if criteria.accept(&sheet_name) {
                        break;
                    }
                    debug!(sheet = %sheet_name, "skipping sheet");
                    sheet_name.clear();
                }
            });
            if sheet_name.is_empty() {
                break;
            }
            let mut sheet = Sheet::new(&self.name, &sheet_name, criteria.range);
            sheet_name.clear();

            let mut row = 0usize;
            let mut col = 0usize;
            let mut row_count = 0usize;
            let mut col_count = 0usize;
            let mut kind = CellType::default();
            let mut value = String::new();
            let mut in_text = false;
            let mut in_annotation = false;
            match_xml_events!(reader => {
                Event::End(event) if event.name() == TABLE => break,
                Event::Start(event) if event.name() == TABLE_ROW => {
                    row_count = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
                    col = 0;
                }
                Event::End(event) if event.name() == TABLE_ROW => {
                    row += row_count;
                }
                Event::Start(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                    value.clear();
                    col_count = event.parse_attribute_value("table:number-columns-repeated")?.unwrap_or(1);
                    let value_type = event.get_attribute_value("office:value-type")?;
                    let is_error = event
                        .get_attribute_value("calcext:value-type")?
                        .map(|it| it == "error")
                        .unwrap_or(false);
                    kind = match value_type.as_deref() {
                        None => CellType::Empty,
                        Some("boolean") => CellType::Boolean,
                        Some("date") => CellType::IsoDateTime,
                        Some("time") => CellType::IsoDuration,
                        Some("string") if is_error && criteria.error_as_null => CellType::Empty,
                        Some("string") if is_error => CellType::Error,
                        Some("string") => CellType::Text,
                        Some(_) => CellType::Number,
                    };
                    let attribute = match kind {
                        CellType::Boolean => Some("office:boolean-value"),
                        CellType::IsoDateTime => Some("office:date-value"),
                        CellType::IsoDuration => Some("office:time-value"),
                        CellType::Number => Some("office:value"),
                        _ => None,
                    };
                    if let Some(attribute) = attribute {
                        if let Some(data) = event.get_attribute_value(attribute)? {
                            if kind == CellType::Boolean {
                                value.push(if data == "true" || data == "1" { '1' } else { '0' });
                            } else {
                                value.push_str(&data);
                            }
                        }
                    }
                    in_text = matches!(kind, CellType::Text | CellType::Error);
                }
                Event::End(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                    if kind != CellType::Empty && !value.is_empty() {
                        if kind == CellType::Error {
                            Err(SpreadsheetError::CellValueError(
                                sheet.file_name.to_owned(),
                                sheet.name.to_owned(),
                                index_to_reference(row, col),
                                value.to_owned(),
                            ))?
                        }
                        // Repeated cells are expanded only within the requested range
                        for row_number in row..row + row_count {
                            if sheet.after_row_upper_bound(row_number) {
                                break;
                            }
                            for col_number in col..col + col_count {
                                if sheet.contains(row_number, col_number) {
                                    sheet.push(Cell {
                                        row: row_number,
                                        col: col_number,
                                        kind,
                                        value: value.to_owned(),
                                    });
                                }
                            }
                        }
                    }
                    col += col_count;
                    in_text = false;
                    in_annotation = false;
                }
                Event::Start(event) if in_text && event.name() == ANNOTATION => in_annotation = true,
                Event::End(event) if in_text && event.name() == ANNOTATION => in_annotation = false,
                Event::Start(event) if in_text && !in_annotation && event.name() == PARAGRAPH => {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                }
                Event::Start(event) if in_text && !in_annotation && event.name() == SPACES => {
                    let count = event.parse_attribute_value("text:c")?.unwrap_or(1usize);
                    value.push_str(&" ".repeat(count));
                }
                Event::Text(event) if in_text && !in_annotation => value.push_bytes_text(&event)?,
                Event::GeneralRef(event) if in_text && !in_annotation => value.push_bytes_ref(&event)?,
            });
            sheets.push(sheet);
        }

        Ok(sheets)
    }
}

fn check_mime(zip: &mut ZipArchive<FileReader>) -> Result<(), ImportError> {
    if let Some(part) = &mut zip.part("mimetype")? {
        let mut buffer = Vec::new();
        part.read_to_end(&mut buffer)?;
        if buffer.as_slice() != MIME_TYPE {
            Err(OdsError::MimeTypeError)?;
        }
    }
    Ok(())
}

fn is_password_protected(zip: &mut ZipArchive<FileReader>) -> Result<bool, ImportError> {
    let mut reader = match zip.xml_reader("META-INF/manifest.xml")? {
        Some(reader) => reader,
        None => return Ok(false),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == QName(b"manifest:encryption-data") => return Ok(true),
    });
    Ok(false)
}
