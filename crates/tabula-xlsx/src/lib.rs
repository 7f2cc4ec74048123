//! # tabula-xlsx
//!
//! Loads a [`tabula_core::Workbook`] from an XLSX package and saves one back.
//!
//! Cell values are the only thing carried across: shared and inline strings,
//! numbers, booleans, error literals and formulas with their cached results.
//! Styles, comments and drawings are dropped on load and not written.

mod escape;

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
