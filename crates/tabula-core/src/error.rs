//! Errors raised by the cell grid

use thiserror::Error;

/// Result alias for grid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Grid errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Text that is not an A1 reference
    #[error("'{0}' is not a cell reference")]
    InvalidReference(String),

    /// Position past the last row or column a sheet can hold
    #[error("row {row}, column {col} lies outside the sheet")]
    OutOfRange { row: u32, col: u16 },

    #[error("sheet name '{name}' rejected: {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheet(String),
}
