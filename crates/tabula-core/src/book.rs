//! Workbook: ordered named sheets

use crate::error::{Error, Result};
use crate::sheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const FORBIDDEN_NAME_CHARS: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];

/// Sheets in tab order. A new workbook has none.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty sheet and hand it back for filling
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut Worksheet> {
        let name = name.into();
        self.check_name(&name)?;
        self.sheets.push(Worksheet::new(name));
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Append a sheet built elsewhere
    pub fn push_sheet(&mut self, sheet: Worksheet) -> Result<()> {
        self.check_name(sheet.name())?;
        self.sheets.push(sheet);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Sheet names in tab order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    /// Sheet by exact name
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    pub fn sheet_at(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn sheet_at_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    fn check_name(&self, name: &str) -> Result<()> {
        let reject = |reason| Error::InvalidSheetName {
            name: name.to_string(),
            reason,
        };
        if name.trim().is_empty() {
            return Err(reject("blank"));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(reject("longer than 31 characters"));
        }
        if name.contains(FORBIDDEN_NAME_CHARS) {
            return Err(reject("contains one of \\ / ? * [ ] :"));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(reject("starts or ends with an apostrophe"));
        }
        // Packages compare sheet names case-insensitively
        if self.sheets.iter().any(|s| s.name().eq_ignore_ascii_case(name)) {
            return Err(Error::DuplicateSheet(name.to_string()));
        }
        Ok(())
    }
}
