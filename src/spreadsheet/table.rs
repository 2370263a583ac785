use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::sheet::Sheet;
use std::collections::BTreeMap;

/// Header prefix spreadsheet tools give to columns without a header.
const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// One column of a sheet below its header row.
#[derive(Debug)]
pub(crate) struct Column {
    /// Header text, empty when the header cell is blank
    pub(crate) header: String,
    /// Data row index (0 = first row under the header) to cell
    pub(crate) cells: BTreeMap<usize, Cell>,
}

impl Column {
    /// Columns without a real header only pad the layout.
    pub(crate) fn is_placeholder(&self) -> bool {
        let header = self.header.trim();
        header.is_empty() || header.starts_with(PLACEHOLDER_PREFIX)
    }

    pub(crate) fn get(&self, row: usize) -> Option<&Cell> {
        self.cells.get(&row)
    }
}

/// A sheet as ordered columns keyed by data row index.
#[derive(Debug)]
pub(crate) struct SheetTable {
    pub(crate) name: String,
    pub(crate) columns: Vec<Column>,
}

impl SheetTable {
    /// Splits a sheet into columns. Row `header_row` holds the headers and
    /// every row below it is data. Columns run from `A` to the last used
    /// column so that blank leading columns still count as placeholders.
    pub(crate) fn from_sheet(sheet: Sheet, header_row: usize) -> Self {
        let width = sheet.col_upper_bound.map(|upper| upper + 1).unwrap_or(0);
        let mut columns: Vec<Column> = (0..width)
            .map(|_| Column {
                header: String::new(),
                cells: BTreeMap::new(),
            })
            .collect();
        for cell in sheet.cells {
            if cell.row < header_row {
                continue;
            }
            let column = &mut columns[cell.col];
            if cell.row == header_row {
                column.header = cell.to_string();
            } else {
                column.cells.insert(cell.row - header_row - 1, cell);
            }
        }
        SheetTable {
            name: sheet.name,
            columns,
        }
    }

    /// Columns with a real header, in sheet order. Positions in this list are
    /// what the test-plan layout refers to.
    pub(crate) fn meaningful_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| !column.is_placeholder())
            .collect()
    }
}
