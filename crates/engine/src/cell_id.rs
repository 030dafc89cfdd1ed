//! Cell addressing.
//!
//! A `CellRef` is a zero-based (row, column) coordinate inside one sheet.
//! Report layouts are written in A1 notation ("C12", "J23"), so conversion
//! in both directions lives here.

use std::fmt;

/// Highest column index an xlsx sheet can address (XFD).
pub const MAX_COL: u16 = 16_383;

/// Highest row index an xlsx sheet can address (1048576).
pub const MAX_ROW: u32 = 1_048_575;

/// Zero-based cell coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u16,
}

impl CellRef {
    #[inline]
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference. `$` anchors are ignored.
    pub fn from_a1(a1: &str) -> Option<Self> {
        let s = a1.trim().replace('$', "");
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let col = letters_to_col(letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 || row - 1 > MAX_ROW {
            return None;
        }
        Some(Self::new(row - 1, col))
    }

    /// A1 notation, e.g. `CellRef::new(22, 9)` → "J23".
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Convert 0-based column index to Excel-style letter(s).
pub fn col_to_letters(col: u16) -> String {
    let mut result = String::new();
    let mut n = col as u32;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Convert Excel-style column letters to a 0-based index ("A" → 0, "AA" → 26).
pub fn letters_to_col(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if n > MAX_COL as u32 + 1 {
            return None;
        }
    }
    Some((n - 1) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(13), "N");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(MAX_COL), "XFD");
        assert_eq!(letters_to_col("xfd"), Some(MAX_COL));
        assert_eq!(letters_to_col("XFE"), None);
    }

    #[test]
    fn test_from_a1() {
        assert_eq!(CellRef::from_a1("C12"), Some(CellRef::new(11, 2)));
        assert_eq!(CellRef::from_a1("$J$23"), Some(CellRef::new(22, 9)));
        assert_eq!(CellRef::from_a1("AA1"), Some(CellRef::new(0, 26)));
        assert_eq!(CellRef::from_a1("A0"), None);
        assert_eq!(CellRef::from_a1("12"), None);
        assert_eq!(CellRef::from_a1("C"), None);
        assert_eq!(CellRef::from_a1("C1D"), None);
    }

    #[test]
    fn test_to_a1() {
        assert_eq!(CellRef::new(22, 9).to_a1(), "J23");
        assert_eq!(CellRef::new(0, 0).to_string(), "A1");
    }
}
