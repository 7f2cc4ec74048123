//! Open documents and their loaded sheets

use std::path::Path;

use once_cell::sync::OnceCell;
use tabula_core::{CellValue, Workbook};

use crate::engine::{DocumentEngine, SheetAccess};
use crate::error::{Error, Result};
use crate::pool::{WorkerPool, DEFAULT_MAX_WORKERS};
use crate::sheet_view::SheetView;

/// Options for opening a document
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Header row (1-based; 0 means the first row)
    pub header_row: u32,
    /// Rows to read after the header (0 = through the last data row)
    pub row_limit: u32,
    /// Sheet to load; empty selects the first sheet
    pub worksheet: String,
    /// Load every sheet, ignoring `worksheet`
    pub load_all_sheets: bool,
    /// Row materialization threads
    pub max_workers: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_row: 0,
            row_limit: 0,
            worksheet: String::new(),
            load_all_sheets: false,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl LoadOptions {
    /// Load only the named sheet
    pub fn worksheet<S: Into<String>>(name: S) -> Self {
        Self {
            worksheet: name.into(),
            ..Self::default()
        }
    }

    /// Load every sheet
    pub fn all_sheets() -> Self {
        Self {
            load_all_sheets: true,
            ..Self::default()
        }
    }

    /// Set the header row
    pub fn with_header_row(mut self, header_row: u32) -> Self {
        self.header_row = header_row;
        self
    }

    /// Set the row limit
    pub fn with_row_limit(mut self, row_limit: u32) -> Self {
        self.row_limit = row_limit;
        self
    }
}

/// Loaded sheet views by name, in load order
#[derive(Debug, Clone, Default)]
pub struct SheetViews {
    entries: Vec<(String, SheetView)>,
}

impl SheetViews {
    /// Insert a view, replacing any view already stored under `name`
    pub fn set<S: Into<String>>(&mut self, name: S, view: SheetView) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = view,
            None => self.entries.push((name, view)),
        }
    }

    /// Look up a view by name
    pub fn get(&self, name: &str) -> Option<&SheetView> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Check if a view is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in load order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, view)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SheetView)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of loaded views
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An open document plus the sheet views loaded from it.
///
/// Cell reads and updates go to the live document, not to the loaded rows:
/// after [`update_cell`](Self::update_cell) the views still hold the values
/// they were loaded with.
pub struct WorkbookStore<E: DocumentEngine = Workbook> {
    document: Option<E>,
    names: OnceCell<Vec<String>>,
    sheets: SheetViews,
}

impl<E: DocumentEngine> WorkbookStore<E> {
    /// Open the document at `path` and load sheets per `options`
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        tracing::info!(path = %path.display(), "opening workbook");
        let document = E::open(path)?;
        Self::from_document(document, options)
    }

    /// Load sheets from an already open document
    pub fn from_document(document: E, options: &LoadOptions) -> Result<Self> {
        let pool = WorkerPool::new(options.max_workers);
        let mut sheets = SheetViews::default();

        let load = |sheet: &E::Sheet| {
            SheetView::load(sheet, options.header_row, options.row_limit, &pool)
        };

        if options.load_all_sheets {
            for name in document.sheet_names() {
                let sheet = document
                    .sheet(&name)
                    .ok_or_else(|| Error::SheetNotFound(name.clone()))?;
                sheets.set(name, load(sheet));
            }
        } else if options.worksheet.is_empty() {
            let sheet = document.sheet_at(0).ok_or(Error::NoSheetsAvailable)?;
            sheets.set(sheet.name(), load(sheet));
        } else {
            let sheet = document
                .sheet(&options.worksheet)
                .ok_or_else(|| Error::SheetNotFound(options.worksheet.clone()))?;
            sheets.set(options.worksheet.as_str(), load(sheet));
        }

        tracing::info!(
            sheets = sheets.len(),
            rows = sheets.iter().map(|(_, v)| v.len()).sum::<usize>(),
            "workbook loaded"
        );

        Ok(Self {
            document: Some(document),
            names: OnceCell::new(),
            sheets,
        })
    }

    fn document(&self) -> Result<&E> {
        self.document.as_ref().ok_or(Error::NotLoaded)
    }

    /// Sheet names of the document in document order
    pub fn worksheet_names(&self) -> Result<&[String]> {
        let document = self.document()?;
        Ok(self.names.get_or_init(|| document.sheet_names()))
    }

    /// Loaded sheet views
    pub fn sheets(&self) -> &SheetViews {
        &self.sheets
    }

    /// Loaded view of a sheet
    pub fn sheet(&self, name: &str) -> Result<&SheetView> {
        self.sheets
            .get(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Loaded view of the document's first sheet
    pub fn first_sheet(&self) -> Result<&SheetView> {
        let first = self
            .document()?
            .sheet_at(0)
            .ok_or(Error::NoSheetsAvailable)?;
        self.sheet(first.name())
    }

    /// Write `value` into the live document at (`row`, `column`), both 0-based
    pub fn update_cell(&mut self, sheet: &str, column: u16, row: u32, value: &str) -> Result<()> {
        let document = self.document.as_mut().ok_or(Error::NotLoaded)?;
        document.set_cell_text(sheet, row, column, value)
    }

    /// Read the live document at (`row`, `column`), both 0-based
    pub fn read_cell_value(&self, sheet: &str, column: u16, row: u32) -> Result<CellValue> {
        self.document()?.cell_value(sheet, row, column)
    }

    /// Persist the live document to `path`
    pub fn save_workbook<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.document()?.save(path)?;
        tracing::info!(path = %path.display(), "workbook saved");
        Ok(())
    }

    /// Drop the document handle. Loaded views stay readable.
    pub fn release(&mut self) {
        self.document = None;
        self.names = OnceCell::new();
    }

    /// Check if the document handle is open
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }
}

impl<E: DocumentEngine> std::fmt::Debug for WorkbookStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookStore")
            .field("loaded", &self.is_loaded())
            .field("sheets", &self.sheets.names().collect::<Vec<_>>())
            .finish()
    }
}
