//! CSV error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File name pattern without exactly one offset placeholder
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Explicit offset list has no entry for a group
    #[error("No offset for partition {index} ({available} offsets supplied)")]
    MissingOffset { index: usize, available: usize },

    /// Sequential offset for a group does not fit in `u32`
    #[error("Offset for partition {index} overflows (base offset {base})")]
    OffsetOverflow { index: usize, base: u32 },

    /// A header was requested but the records carry no field names
    #[error("Header requested but no explicit header is set and records have no field names")]
    MissingHeader,
}
