//! Worksheet grid

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::reference::CellRef;
use crate::value::CellValue;
use crate::{MAX_COLS, MAX_ROWS};

/// Cells of one row keyed by column
pub type RowCells = BTreeMap<u16, CellValue>;

/// A named sparse grid.
///
/// Only non-empty cells are stored, so the last data row and column are the
/// largest keys present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    rows: BTreeMap<u32, RowCells>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored cell at a position
    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row)?.get(&col)
    }

    /// Cell value at a position, `Empty` when nothing is stored
    pub fn value(&self, row: u32, col: u16) -> CellValue {
        self.get(row, col).cloned().unwrap_or_default()
    }

    pub fn value_a1(&self, reference: &str) -> Result<CellValue> {
        let at = CellRef::parse(reference)?;
        Ok(self.value(at.row, at.col))
    }

    /// Text of a cell as rows are read out, `None` when there is nothing to show
    pub fn cell_text(&self, row: u32, col: u16) -> Option<String> {
        self.get(row, col).and_then(CellValue::display_text)
    }

    /// Store a value. Writing `Empty` clears the cell.
    pub fn put(&mut self, row: u32, col: u16, value: impl Into<CellValue>) -> Result<()> {
        if row >= MAX_ROWS || col >= MAX_COLS {
            return Err(Error::OutOfRange { row, col });
        }
        let value = value.into();
        if value.is_empty() {
            self.clear(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }
        Ok(())
    }

    pub fn put_a1(&mut self, reference: &str, value: impl Into<CellValue>) -> Result<()> {
        let at = CellRef::parse(reference)?;
        self.put(at.row, at.col, value)
    }

    /// Remove a cell, returning what it held
    pub fn clear(&mut self, row: u32, col: u16) -> Option<CellValue> {
        let cells = self.rows.get_mut(&row)?;
        let old = cells.remove(&col);
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        old
    }

    /// Zero-based index of the last row holding data
    pub fn last_data_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Zero-based index of the right-most column holding data in any row
    pub fn last_data_column(&self) -> Option<u16> {
        self.rows
            .values()
            .filter_map(|cells| cells.keys().next_back().copied())
            .max()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Non-empty rows in ascending order
    pub fn rows(&self) -> impl Iterator<Item = (u32, &RowCells)> + '_ {
        self.rows.iter().map(|(row, cells)| (*row, cells))
    }
}
