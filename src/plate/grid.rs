//! Plate grid, well coordinates and annotation labels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const ROWS: usize = 8;
pub const COLS: usize = 12;

/// Annotation category. Each label owns exactly one plate grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    ConditionName,
    ConditionValue,
    CellsPerWell,
    Donor,
}

impl Label {
    /// All labels in display order.
    pub const ALL: [Label; 4] = [
        Label::ConditionName,
        Label::ConditionValue,
        Label::CellsPerWell,
        Label::Donor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::ConditionName => "ConditionName",
            Label::ConditionValue => "ConditionValue",
            Label::CellsPerWell => "CellsPerWell",
            Label::Donor => "Donor",
        }
    }

    /// Name of the file this label's grid is persisted to.
    pub fn file_name(&self) -> String {
        format!("{}_plate.json", self.as_str())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

/// A coordinate on the plate, always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Well {
    row: usize,
    col: usize,
}

impl Well {
    pub fn new(row: usize, col: usize) -> Result<Self, Error> {
        if row < ROWS && col < COLS {
            Ok(Self { row, col })
        } else {
            Err(Error::WellOutOfRange { row, col })
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Every well in row-major order (A1, A2, ... H12).
    pub fn all() -> impl Iterator<Item = Well> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Well { row, col }))
    }
}

pub fn row_letter(row: usize) -> char {
    (b'A' + row as u8) as char
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", row_letter(self.row), self.col + 1)
    }
}

impl FromStr for Well {
    type Err = Error;

    /// Parses plate notation such as `A1` or `h12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidWell(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !('A'..='H').contains(&letter) {
            return Err(invalid());
        }
        let digits = chars.as_str();
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let number: usize = digits.parse().map_err(|_| invalid())?;
        Well::new((letter as u8 - b'A') as usize, number - 1).map_err(|_| invalid())
    }
}

/// 8x12 matrix of annotation values. The empty string means unannotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<String>>>", into = "Vec<Vec<String>>")]
pub struct PlateGrid {
    cells: [[String; COLS]; ROWS],
}

impl Default for PlateGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl PlateGrid {
    pub fn empty() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| String::new())),
        }
    }

    pub fn get(&self, well: Well) -> &str {
        &self.cells[well.row][well.col]
    }

    pub fn set(&mut self, well: Well, value: impl Into<String>) {
        self.cells[well.row][well.col] = value.into();
    }

    pub fn clear(&mut self, well: Well) {
        self.cells[well.row][well.col].clear();
    }

    pub fn is_filled(&self, well: Well) -> bool {
        !self.get(well).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, v)| v.is_empty())
    }

    pub fn rows(&self) -> &[[String; COLS]; ROWS] {
        &self.cells
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Well, &str)> + '_ {
        Well::all().map(move |w| (w, self.get(w)))
    }

    /// Every cell joined row-major without separators.
    pub fn concatenated(&self) -> String {
        self.cells.iter().flatten().map(String::as_str).collect()
    }
}

impl TryFrom<Vec<Vec<Option<String>>>> for PlateGrid {
    type Error = String;

    fn try_from(rows: Vec<Vec<Option<String>>>) -> Result<Self, Self::Error> {
        if rows.len() != ROWS {
            return Err(format!("expected {} rows, found {}", ROWS, rows.len()));
        }
        let mut grid = PlateGrid::empty();
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != COLS {
                return Err(format!(
                    "row {} has {} columns, expected {}",
                    row_letter(r),
                    row.len(),
                    COLS
                ));
            }
            for (c, cell) in row.into_iter().enumerate() {
                grid.cells[r][c] = cell.unwrap_or_default();
            }
        }
        Ok(grid)
    }
}

impl From<PlateGrid> for Vec<Vec<String>> {
    fn from(grid: PlateGrid) -> Self {
        grid.cells.into_iter().map(Vec::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_notation() {
        let well: Well = "b7".parse().unwrap();
        assert_eq!((well.row(), well.col()), (1, 6));
        assert_eq!(well.to_string(), "B7");
        assert_eq!("H12".parse::<Well>().unwrap(), Well::new(7, 11).unwrap());

        assert!("I1".parse::<Well>().is_err());
        assert!("A0".parse::<Well>().is_err());
        assert!("A13".parse::<Well>().is_err());
        assert!("".parse::<Well>().is_err());
    }

    #[test]
    fn test_well_notation_plain_digits_only() {
        for bad in ["A+1", "A01", "A007", "A", "A 1", "A-1", "A1.0", "A١"] {
            assert!(
                matches!(bad.parse::<Well>(), Err(Error::InvalidWell(_))),
                "{bad:?} parsed"
            );
        }
        assert_eq!("a10".parse::<Well>().unwrap(), Well::new(0, 9).unwrap());
    }

    #[test]
    fn test_well_out_of_range() {
        assert!(matches!(
            Well::new(8, 0),
            Err(Error::WellOutOfRange { row: 8, col: 0 })
        ));
        assert!(Well::new(0, 12).is_err());
        assert_eq!(Well::all().count(), ROWS * COLS);
    }

    #[test]
    fn test_label_parse() {
        assert_eq!("donor".parse::<Label>().unwrap(), Label::Donor);
        assert_eq!(Label::CellsPerWell.file_name(), "CellsPerWell_plate.json");
        assert!("Volume".parse::<Label>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let grid: PlateGrid = serde_json::from_str(&serde_json::to_string(&vec![
            vec![""; COLS];
            ROWS
        ])
        .unwrap())
        .unwrap();
        assert!(grid.is_empty());

        let mut rows = vec![vec![serde_json::Value::from(""); COLS]; ROWS];
        rows[2][3] = serde_json::Value::Null;
        rows[0][0] = serde_json::Value::from("X");
        let grid: PlateGrid = serde_json::from_value(serde_json::Value::from(rows)).unwrap();
        assert_eq!(grid.get(Well::new(0, 0).unwrap()), "X");
        assert_eq!(grid.get(Well::new(2, 3).unwrap()), "");

        let short = vec![vec![""; COLS]; ROWS - 1];
        assert!(
            serde_json::from_str::<PlateGrid>(&serde_json::to_string(&short).unwrap()).is_err()
        );
        let narrow = vec![vec![""; COLS - 1]; ROWS];
        assert!(
            serde_json::from_str::<PlateGrid>(&serde_json::to_string(&narrow).unwrap()).is_err()
        );
    }

    #[test]
    fn test_concatenated() {
        let mut grid = PlateGrid::empty();
        grid.set(Well::new(0, 1).unwrap(), "ab");
        grid.set(Well::new(1, 0).unwrap(), "c");
        assert_eq!(grid.concatenated(), "abc");
    }
}
