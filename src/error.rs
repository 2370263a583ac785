use thiserror::Error;

/// Main error type for the test-plan importer.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub(crate) enum ImportError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    CsvError(#[from] csv::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    OdsError(#[from] crate::spreadsheet::ods::OdsError),

    // Import taxonomy
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),

    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    #[error("Data error: {0}")]
    DataError(#[from] DataError),
}

/// Invalid or missing invocation parameters. Raised before any output exists.
#[derive(Error, Debug)]
pub(crate) enum ConfigurationError {
    #[error("Workbook '{0}' does not exist")]
    WorkbookNotFound(String),

    #[error("Roster file '{0}' does not exist")]
    RosterNotFound(String),

    #[error("Cannot detect spreadsheet format for '{0}'")]
    UnsupportedFormat(String),

    #[error("Workbook path '{0}' has no file name")]
    MissingFileName(String),

    #[error("Invalid sheet pattern '{0}': {1}")]
    InvalidSheetPattern(String, String),
}

/// A sheet or roster does not have the shape the importer relies on.
#[derive(Error, Debug)]
pub(crate) enum SchemaError {
    #[error("Sheet '{sheet}' has no {role} column at position {position} ({available} meaningful columns)")]
    MissingColumn {
        sheet: String,
        role: &'static str,
        position: usize,
        available: usize,
    },

    #[error("Roster '{file}' has no '{column}' column")]
    MissingRosterColumn { file: String, column: &'static str },
}

/// A cell value that cannot be used for derivation.
#[derive(Error, Debug)]
pub(crate) enum DataError {
    #[error("Sheet '{sheet}' row {row}: {role} value is missing")]
    MissingValue {
        sheet: String,
        row: usize,
        role: &'static str,
    },

    #[error("Sheet '{sheet}' cell {reference}: {role} must be text, found {kind} '{value}'")]
    InvalidFlag {
        sheet: String,
        reference: String,
        role: &'static str,
        kind: &'static str,
        value: String,
    },
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ImportError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ImportError::WithContextError(format!("{}: {}", message, e)))
    }
}
