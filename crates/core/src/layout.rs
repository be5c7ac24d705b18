//! Grid layouts exchanged with callers.
//!
//! A [`GridLayout`] is the plain per-cell labeling used on both sides of the
//! solver: as input it describes the shape (empty and wall cells), as output
//! it carries the placed boxes as well.
//!
//! ## Text format
//!
//! One line per row, top row first, using `.` for empty, `#` for wall and
//! `B` for box cells:
//!
//! ```rust
//! use u_boxfill_core::{CellState, GridLayout};
//!
//! let layout: GridLayout = "..#\n...".parse().unwrap();
//! assert_eq!(layout.width(), 3);
//! assert_eq!(layout.get(2, 0).unwrap(), CellState::Wall);
//! ```

use crate::error::{Error, Result};
use crate::grid::CellState;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major cell labeling of a rectangular grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "LayoutRepr", into = "LayoutRepr")
)]
pub struct GridLayout {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl GridLayout {
    /// Creates an all-empty layout.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::from_cells(width, height, vec![CellState::Empty; width * height])
    }

    /// Creates a layout from row-major cells.
    pub fn from_cells(width: usize, height: usize, cells: Vec<CellState>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidShape(format!(
                "layout dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if cells.len() != width * height {
            return Err(Error::InvalidShape(format!(
                "expected {} cells for a {}x{} layout, got {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub(crate) fn from_grid_cells(width: usize, height: usize, cells: Vec<CellState>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Creates a layout from rows (`rows[y][x]`).
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(y) = rows.iter().position(|r| r.len() != width) {
            return Err(Error::InvalidShape(format!(
                "row {} has {} cells, expected {}",
                y,
                rows[y].len(),
                width
            )));
        }
        Self::from_cells(width, height, rows.into_iter().flatten().collect())
    }

    /// Creates a layout from columns (`columns[x][y]`), the layout grid
    /// editors usually hand over.
    pub fn from_columns(columns: Vec<Vec<CellState>>) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if let Some(x) = columns.iter().position(|c| c.len() != height) {
            return Err(Error::InvalidShape(format!(
                "column {} has {} cells, expected {}",
                x,
                columns[x].len(),
                height
            )));
        }
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for column in &columns {
                cells.push(column[y]);
            }
        }
        Self::from_cells(width, height, cells)
    }

    /// Parses the text format described in the module docs.
    ///
    /// Blank lines and surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (y, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let row = line
                .chars()
                .enumerate()
                .map(|(x, c)| {
                    CellState::from_symbol(c).ok_or_else(|| {
                        Error::ParseError(format!("unknown cell symbol '{}' at ({}, {})", c, x, y))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(Error::ParseError("layout has no rows".into()));
        }
        Self::from_rows(rows).map_err(|e| match e {
            Error::InvalidShape(msg) => Error::ParseError(msg),
            other => other,
        })
    }

    /// Marks `(x, y)` as a wall (builder style).
    pub fn with_wall(mut self, x: usize, y: usize) -> Result<Self> {
        self.set(x, y, CellState::Wall)?;
        Ok(self)
    }

    /// Layout width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Layout height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(x + y * self.width)
    }

    /// Returns the state at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<CellState> {
        Ok(self.cells[self.index(x, y)?])
    }

    /// Sets the state at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> Result<()> {
        let idx = self.index(x, y)?;
        self.cells[idx] = state;
        Ok(())
    }

    /// Iterates `(x, y, state)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &s)| (i % width, i / width, s))
    }

    /// Number of cells in `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Cells as columns (`columns[x][y]`).
    pub fn to_columns(&self) -> Vec<Vec<CellState>> {
        (0..self.width)
            .map(|x| (0..self.height).map(|y| self.cells[x + y * self.width]).collect())
            .collect()
    }
}

/// Unvalidated serialized form of [`GridLayout`].
#[cfg(feature = "serde")]
#[doc(hidden)]
#[derive(Clone, Serialize, Deserialize)]
pub struct LayoutRepr {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutRepr> for GridLayout {
    type Error = Error;

    fn try_from(repr: LayoutRepr) -> Result<Self> {
        Self::from_cells(repr.width, repr.height, repr.cells)
    }
}

#[cfg(feature = "serde")]
impl From<GridLayout> for LayoutRepr {
    fn from(layout: GridLayout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            cells: layout.cells,
        }
    }
}

impl FromStr for GridLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "..#.\n#...\n....";
        let layout = GridLayout::parse(text).unwrap();
        assert_eq!(layout.width(), 4);
        assert_eq!(layout.height(), 3);
        assert_eq!(layout.count(CellState::Wall), 2);
        assert_eq!(layout.get(0, 1).unwrap(), CellState::Wall);
        assert_eq!(layout.to_string(), text);
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_indent() {
        let layout: GridLayout = "\n   ..\n   #B\n\n".parse().unwrap();
        assert_eq!(layout.height(), 2);
        assert_eq!(layout.get(1, 1).unwrap(), CellState::Box);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(GridLayout::parse(""), Err(Error::ParseError(_))));
        assert!(matches!(GridLayout::parse("..\n..."), Err(Error::ParseError(_))));
        assert!(matches!(GridLayout::parse(".x"), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_from_cells_validates_length() {
        assert!(GridLayout::from_cells(2, 2, vec![CellState::Empty; 3]).is_err());
        assert!(GridLayout::from_cells(0, 2, vec![]).is_err());
        assert!(GridLayout::new(3, 1).is_ok());
    }

    #[test]
    fn test_columns_round_trip_orientation() {
        use CellState::*;
        // Two columns of three cells: wall at x = 1, y = 2.
        let columns = vec![vec![Empty, Empty, Empty], vec![Empty, Empty, Wall]];
        let layout = GridLayout::from_columns(columns.clone()).unwrap();
        assert_eq!(layout.width(), 2);
        assert_eq!(layout.height(), 3);
        assert_eq!(layout.get(1, 2).unwrap(), Wall);
        assert_eq!(layout.to_string(), "..\n..\n.#");
        assert_eq!(layout.to_columns(), columns);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        use CellState::*;
        let err = GridLayout::from_rows(vec![vec![Empty, Empty], vec![Empty]]).unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn test_with_wall_bounds() {
        let layout = GridLayout::new(2, 2).unwrap().with_wall(1, 0).unwrap();
        assert_eq!(layout.iter().filter(|&(_, _, s)| s == CellState::Wall).count(), 1);
        assert!(GridLayout::new(2, 2).unwrap().with_wall(2, 0).is_err());
    }
}
