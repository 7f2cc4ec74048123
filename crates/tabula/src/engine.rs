//! Document engine seam
//!
//! The access layer only needs a small capability set from the spreadsheet
//! engine underneath it: open a file, enumerate sheets, report each sheet's
//! last data row/column, get and set cell text, and save. [`DocumentEngine`]
//! and [`SheetAccess`] describe that set; the in-memory
//! [`Workbook`](tabula_core::Workbook) implements both, persisted as XLSX.

use std::path::Path;

use tabula_core::{CellValue, Workbook, Worksheet};
use tabula_xlsx::{XlsxReader, XlsxWriter};

use crate::error::{Error, Result};

/// Read access to one worksheet
///
/// Row materialization reads cells from worker threads, hence `Sync`.
pub trait SheetAccess: Send + Sync {
    /// Sheet name
    fn name(&self) -> &str;

    /// Last row holding data (0-based, inclusive), `None` when empty
    fn last_data_row(&self) -> Option<u32>;

    /// Last column holding data (0-based, inclusive), `None` when empty
    fn last_data_column(&self) -> Option<u16>;

    /// Text of a cell, `None` when the cell is empty
    fn cell_text(&self, row: u32, col: u16) -> Option<String>;
}

/// An open spreadsheet document
pub trait DocumentEngine: Sized + Send + Sync {
    /// Worksheet handle type
    type Sheet: SheetAccess;

    /// Open a document from disk
    fn open(path: &Path) -> Result<Self>;

    /// Sheet names in document order
    fn sheet_names(&self) -> Vec<String>;

    /// Look up a sheet by name
    fn sheet(&self, name: &str) -> Option<&Self::Sheet>;

    /// Look up a sheet by position
    fn sheet_at(&self, index: usize) -> Option<&Self::Sheet>;

    /// Overwrite a cell with text
    fn set_cell_text(&mut self, sheet: &str, row: u32, col: u16, value: &str) -> Result<()>;

    /// Current value of a cell
    fn cell_value(&self, sheet: &str, row: u32, col: u16) -> Result<CellValue>;

    /// Persist the document
    fn save(&self, path: &Path) -> Result<()>;
}

impl SheetAccess for Worksheet {
    fn name(&self) -> &str {
        Worksheet::name(self)
    }

    fn last_data_row(&self) -> Option<u32> {
        Worksheet::last_data_row(self)
    }

    fn last_data_column(&self) -> Option<u16> {
        Worksheet::last_data_column(self)
    }

    fn cell_text(&self, row: u32, col: u16) -> Option<String> {
        Worksheet::cell_text(self, row, col)
    }
}

impl DocumentEngine for Workbook {
    type Sheet = Worksheet;

    fn open(path: &Path) -> Result<Self> {
        Ok(XlsxReader::read_file(path)?)
    }

    fn sheet_names(&self) -> Vec<String> {
        Workbook::sheet_names(self)
    }

    fn sheet(&self, name: &str) -> Option<&Worksheet> {
        Workbook::sheet(self, name)
    }

    fn sheet_at(&self, index: usize) -> Option<&Worksheet> {
        Workbook::sheet_at(self, index)
    }

    fn set_cell_text(&mut self, sheet: &str, row: u32, col: u16, value: &str) -> Result<()> {
        let worksheet = self
            .sheet_mut(sheet)
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))?;
        worksheet.put(row, col, value)?;
        Ok(())
    }

    fn cell_value(&self, sheet: &str, row: u32, col: u16) -> Result<CellValue> {
        let worksheet = self
            .sheet(sheet)
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))?;
        Ok(worksheet.value(row, col))
    }

    fn save(&self, path: &Path) -> Result<()> {
        Ok(XlsxWriter::write_file(self, path)?)
    }
}
