//! Materialized view of one worksheet

use std::ops::RangeInclusive;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::engine::SheetAccess;
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::pool::WorkerPool;

/// One header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column index (0-based)
    pub index: u16,
    /// Header text as read from the sheet
    pub raw: String,
    /// Normalized key row values are stored under
    pub key: String,
}

/// One data row, keyed by normalized column key
#[derive(Debug, Clone)]
pub struct Row {
    values: AHashMap<String, Option<String>>,
    source_row: u32,
}

impl Row {
    fn new(source_row: u32, capacity: usize) -> Self {
        Self {
            values: AHashMap::with_capacity(capacity),
            source_row,
        }
    }

    /// Sheet row index (0-based) this row was read from
    pub fn source_row(&self) -> u32 {
        self.source_row
    }

    /// Value under a normalized key. `None` for an empty cell or unknown key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }

    /// Check if the row has an entry for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over key/value pairs (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Values for `keys`, in that order
    pub fn values_for<'a, S: AsRef<str>>(&'a self, keys: &[S]) -> Vec<Option<&'a str>> {
        keys.iter().map(|k| self.get(k.as_ref())).collect()
    }

    fn insert(&mut self, key: &str, value: Option<String>) {
        self.values.insert(key.to_string(), value);
    }
}

/// Append-only row collection shared by workers
#[derive(Debug, Default)]
struct RowStore {
    rows: Mutex<Vec<Row>>,
}

impl RowStore {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn push(&self, row: Row) {
        self.rows.lock().push(row);
    }

    fn into_rows(self) -> Vec<Row> {
        self.rows.into_inner()
    }
}

/// Header table and materialized rows of one worksheet.
///
/// Rows sit in the order workers finished them, which need not match the
/// sheet. Use [`Row::source_row`] or [`SheetView::get_cell_value_at_row`]
/// when physical order matters.
#[derive(Debug, Clone)]
pub struct SheetView {
    name: String,
    header_row: u32,
    row_limit: u32,
    last_row: Option<u32>,
    last_column: Option<u16>,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl SheetView {
    /// Read the header and data rows of `sheet`.
    ///
    /// `header_row` is 1-based, with 0 meaning the first row. A non-zero
    /// `row_limit` reads that many rows after the header, even past the last
    /// data row (those rows come back empty). A zero limit reads through the
    /// sheet's last data row.
    pub fn load<S: SheetAccess + ?Sized>(
        sheet: &S,
        header_row: u32,
        row_limit: u32,
        pool: &WorkerPool,
    ) -> Self {
        let header_row = header_row.saturating_sub(1);
        let last_row = sheet.last_data_row();
        let last_column = sheet.last_data_column();

        let columns: Vec<Column> = match last_column {
            Some(last) => (0..=last)
                .map(|index| {
                    let raw = sheet.cell_text(header_row, index).unwrap_or_default();
                    let key = normalize(&raw);
                    Column { index, raw, key }
                })
                .collect(),
            None => Vec::new(),
        };

        let range = scan_range(header_row, row_limit, last_row);
        let store = RowStore::with_capacity(range.as_ref().map_or(0, |r| r.clone().count()));

        if let Some(range) = range {
            tracing::debug!(
                sheet = sheet.name(),
                first = range.start(),
                last = range.end(),
                columns = columns.len(),
                "materializing rows"
            );
            pool.for_each_index(range, |row_index| {
                let mut row = Row::new(row_index, columns.len());
                // Later columns overwrite earlier ones sharing a key
                for column in &columns {
                    row.insert(&column.key, sheet.cell_text(row_index, column.index));
                }
                store.push(row);
            });
        }

        let rows = store.into_rows();
        tracing::debug!(sheet = sheet.name(), rows = rows.len(), "sheet loaded");

        Self {
            name: sheet.name().to_string(),
            header_row,
            row_limit,
            last_row,
            last_column,
            columns,
            rows,
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header row index (0-based)
    pub fn header_row(&self) -> u32 {
        self.header_row
    }

    /// Requested row limit (0 = all)
    pub fn row_limit(&self) -> u32 {
        self.row_limit
    }

    /// Last data row reported by the engine
    pub fn last_row(&self) -> Option<u32> {
        self.last_row
    }

    /// Last data column reported by the engine
    pub fn last_column(&self) -> Option<u16> {
        self.last_column
    }

    /// Header table in column order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Materialized rows (order unspecified)
    pub fn rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Number of materialized rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows were materialized
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Normalized keys in column order
    pub fn column_keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    /// Raw header texts in column order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.raw.clone()).collect()
    }

    /// Resolve a raw header or normalized key to its column.
    ///
    /// Raw header text is tried first.
    pub fn find_column(&self, column_name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.raw == column_name)
            .or_else(|| self.columns.iter().find(|c| c.key == column_name))
            .ok_or_else(|| Error::ColumnNotFound(column_name.to_string()))
    }

    /// Value of a named column in `row`
    pub fn get_value<'r>(&self, column_name: &str, row: &'r Row) -> Result<Option<&'r str>> {
        let column = self.find_column(column_name)?;
        Ok(row.get(&column.key))
    }

    /// Value at `column` of the row at `position` in the row store.
    ///
    /// `position` indexes the store, not the sheet. Store order is whatever
    /// order workers finished in, so the same position can name a different
    /// sheet row in another load. See [`Self::get_cell_value_at_row`].
    pub fn get_cell_value(&self, column: u16, position: usize) -> Option<&str> {
        let key = &self.columns.get(usize::from(column))?.key;
        self.rows.get(position)?.get(key)
    }

    /// Value at `column` of the row read from sheet row `sheet_row` (0-based)
    pub fn get_cell_value_at_row(&self, column: u16, sheet_row: u32) -> Option<&str> {
        let key = &self.columns.get(usize::from(column))?.key;
        self.rows
            .iter()
            .find(|r| r.source_row == sheet_row)?
            .get(key)
    }

    /// Rows sorted by the sheet row they came from
    pub fn rows_in_sheet_order(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.source_row);
        rows
    }
}

impl<'a> IntoIterator for &'a SheetView {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

/// Rows to read after `header_row`, `None` when there are none
fn scan_range(header_row: u32, row_limit: u32, last_row: Option<u32>) -> Option<RangeInclusive<u32>> {
    let first = header_row.checked_add(1)?;
    let last = if row_limit == 0 {
        last_row?
    } else {
        header_row.saturating_add(row_limit)
    };
    (first <= last).then_some(first..=last)
}
