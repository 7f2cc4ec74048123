//! Cell contents

use std::fmt;

/// What a cell holds.
///
/// Formulas are never evaluated here. A formula keeps the value the
/// producing application last computed for it, if the file carried one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Error literal as written in the file, e.g. `#N/A`
    Error(String),
    Formula {
        /// Formula source without the leading `=`
        formula: String,
        cached: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Formula cell with a cached result
    pub fn formula(formula: impl Into<String>, cached: Option<CellValue>) -> Self {
        CellValue::Formula {
            formula: formula.into(),
            cached: cached.map(Box::new),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The value a reader sees: the cached result for formulas, the cell itself otherwise
    pub fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula { cached: Some(v), .. } => v.resolved(),
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.resolved() {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.resolved() {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.resolved() {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Formula source, if this is a formula cell
    pub fn formula_source(&self) -> Option<&str> {
        match self {
            CellValue::Formula { formula, .. } => Some(formula),
            _ => None,
        }
    }

    /// Text rendering used when rows are read out of a sheet.
    ///
    /// `None` for empty cells and for formulas without a cached result.
    pub fn display_text(&self) -> Option<String> {
        match self.resolved() {
            CellValue::Empty | CellValue::Formula { .. } => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // f64 Display already drops a trailing ".0"
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Error(code) => f.write_str(code),
            CellValue::Formula { cached: Some(v), .. } => write!(f, "{}", v),
            CellValue::Formula { formula, cached: None } => write!(f, "={}", formula),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
