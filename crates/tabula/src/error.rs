//! Error types for the access layer

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tabula operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening, reading, updating or exporting documents
#[derive(Debug, Error)]
pub enum Error {
    /// Document or delimited file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Named worksheet is not in the document
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// Document reports no worksheets
    #[error("There is no worksheet to load")]
    NoSheetsAvailable,

    /// Column name matches neither a raw header nor a normalized key
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Document handle is not open
    #[error("Workbook data not loaded")]
    NotLoaded,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XLSX error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] tabula_xlsx::XlsxError),

    /// Delimited-text error
    #[error("CSV error: {0}")]
    Csv(#[from] tabula_csv::CsvError),

    /// Document engine error
    #[error("{0}")]
    Core(#[from] tabula_core::Error),

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let message = err.to_string();
        Error::Io(
            err.into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message)),
        )
    }
}
