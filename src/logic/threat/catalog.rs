//! Sector Catalog
//!
//! Administrative grid codes: 5 rows (`A`..`E`) by 9 columns (`1`..`9`).
//! Independent of the numeric world position of a threat.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const SECTOR_ROWS: u8 = 5;
pub const SECTOR_COLUMNS: u8 = 9;
pub const SECTOR_COUNT: usize = (SECTOR_ROWS as usize) * (SECTOR_COLUMNS as usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sector {
    row: u8,
    column: u8,
}

impl Sector {
    /// `row` in `0..5`, `column` in `1..=9`
    pub fn new(row: u8, column: u8) -> Option<Self> {
        (row < SECTOR_ROWS && (1..=SECTOR_COLUMNS).contains(&column)).then_some(Self { row, column })
    }

    /// All 45 sectors, row-major (`A-1`, `A-2`, ... `E-9`)
    pub fn all() -> Vec<Sector> {
        (0..SECTOR_ROWS)
            .flat_map(|row| (1..=SECTOR_COLUMNS).map(move |column| Sector { row, column }))
            .collect()
    }

    /// Sector at a row-major catalog index
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= SECTOR_COUNT {
            return None;
        }
        let row = (index / SECTOR_COLUMNS as usize) as u8;
        let column = (index % SECTOR_COLUMNS as usize) as u8 + 1;
        Some(Self { row, column })
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    pub fn column(&self) -> u8 {
        self.column
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row_letter(), self.column)
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("unknown sector: {}", s);

        let (row, column) = s.trim().split_once('-').ok_or_else(invalid)?;
        let mut letters = row.chars();
        let letter = match (letters.next(), letters.next()) {
            (Some(c), None) => c.to_ascii_uppercase(),
            _ => return Err(invalid()),
        };
        if !letter.is_ascii_uppercase() {
            return Err(invalid());
        }
        let column: u8 = column.parse().map_err(|_| invalid())?;

        Sector::new(letter as u8 - b'A', column).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Sector {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sector> for String {
    fn from(sector: Sector) -> Self {
        sector.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_45_unique_codes() {
        let all = Sector::all();
        assert_eq!(all.len(), SECTOR_COUNT);
        assert_eq!(all.first().unwrap().to_string(), "A-1");
        assert_eq!(all.last().unwrap().to_string(), "E-9");

        let mut codes: Vec<String> = all.iter().map(|s| s.to_string()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 45);
    }

    #[test]
    fn test_index_matches_catalog_order() {
        let all = Sector::all();
        for (i, sector) in all.iter().enumerate() {
            assert_eq!(Sector::from_index(i), Some(*sector));
        }
        assert_eq!(Sector::from_index(45), None);
    }

    #[test]
    fn test_parse_rejects_outside_grid() {
        assert_eq!("c-7".parse::<Sector>().unwrap().to_string(), "C-7");
        assert!("F-1".parse::<Sector>().is_err());
        assert!("A-0".parse::<Sector>().is_err());
        assert!("A-10".parse::<Sector>().is_err());
        assert!("AA-1".parse::<Sector>().is_err());
        assert!("A1".parse::<Sector>().is_err());
    }
}
