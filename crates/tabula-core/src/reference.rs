//! A1 references

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Zero-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `B7`, `$B$7` or `b7`
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidReference(text.to_string());

        let plain: String = text.chars().filter(|c| *c != '$').collect();
        let split = plain
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = plain.split_at(split);

        let col = column_index(letters).ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 || row > MAX_ROWS {
            return Err(invalid());
        }
        Ok(Self::new(row - 1, col))
    }

    /// Column letters for a zero-based column (0 -> `A`, 27 -> `AB`)
    pub fn column_name(col: u16) -> String {
        let mut n = u32::from(col) + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.iter().rev().map(|b| char::from(*b)).collect()
    }
}

fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let col = u16::try_from(n - 1).ok()?;
    (col < MAX_COLS).then_some(col)
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_name(self.col), u64::from(self.row) + 1)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        assert_eq!(CellRef::parse("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(CellRef::parse("$ab$12").unwrap(), CellRef::new(11, 27));
        assert_eq!(CellRef::parse("XFD1048576").unwrap(), CellRef::new(MAX_ROWS - 1, MAX_COLS - 1));
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "A", "12", "A0", "1A", "XFE1", "A1048577", "A-1", "ÄB1"] {
            assert!(CellRef::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CellRef::new(0, 25).to_string(), "Z1");
        assert_eq!(CellRef::new(99, 26).to_string(), "AA100");
        assert_eq!(CellRef::column_name(701), "ZZ");
        assert_eq!(CellRef::column_name(702), "AAA");
    }
}
