//! # Spreadsheet Reading
//!
//! Reads test-plan workbooks (`.xlsx`, `.xlsm`, `.ods`) into per-sheet column
//! tables. Sheets are selected with [`Criteria`], leading header-noise rows are
//! dropped through the criteria range, and every remaining non-empty cell is
//! kept with its type so callers decide how strictly to interpret it.
pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod excel;
pub(crate) mod ods;
pub(crate) mod range;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod table;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::ConfigurationError;
use crate::error::ImportError;
use crate::error::ResultMessage;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::table::SheetTable;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

/// Type alias for buffered file reader
pub(crate) type FileReader = BufReader<File>;

#[derive(Error, Debug)]
pub(crate) enum SpreadsheetError {
    #[error("Missing part '{0}' in spreadsheet")]
    FileError(String),

    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Invalid cell value '{3}' at {2} in sheet '{1}' of '{0}'")]
    CellValueError(String, String, String, String),

    #[error("Sheet '{0}' references missing shared string {1}")]
    SharedStringError(String, usize),
}

/// A workbook whose sheets can be read as typed cells.
pub(crate) trait Spreadsheet {
    /// File name of this spreadsheet
    fn name(&self) -> String;

    /// Reads the accepted sheets in workbook order.
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, ImportError>;
}

/// Opens a workbook, choosing the reader from the file extension.
pub(crate) fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, ImportError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        Some("ods") => Ok(Box::new(OdsSpreadsheet::open(path)?)),
        _ => Err(ConfigurationError::UnsupportedFormat(path.display().to_string()).into()),
    }
}

/// Loads every accepted sheet of a workbook as a column table. The first
/// `skip_rows` rows are discarded; the row after them holds the headers.
/// Sheets with nothing below the discarded rows are left out.
pub(crate) fn load(path: &Path, skip_rows: usize, criteria: &Criteria) -> Result<Vec<SheetTable>, ImportError> {
    let mut spreadsheet = open_spreadsheet(path).with_prefix(&path.display().to_string())?;
    let criteria = Criteria {
        range: Some(Range::from_row(skip_rows)),
        ..criteria.to_owned()
    };
    let sheets = spreadsheet
        .read_sheets(&criteria)
        .with_prefix(&spreadsheet.name())?;
    let mut tables = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        if sheet.is_empty() {
            warn!(sheet = %sheet.name, skip_rows, "sheet has no cells below the skipped rows, ignoring it");
            continue;
        }
        let table = SheetTable::from_sheet(sheet, skip_rows);
        debug!(sheet = %table.name, columns = table.columns.len(), "loaded sheet");
        tables.push(table);
    }
    Ok(tables)
}
