//! Cell grid and the greedy box placement procedure.
//!
//! A [`Grid`] is a fixed `width x height` array of cells stored row-major
//! (`index = x + y * width`). Boxes are placed one at a time by
//! [`Grid::place_box`], which scans forward from a cursor and never
//! backtracks: the resulting layout depends on the order in which boxes are
//! offered, which is what the genetic search in [`crate::ga`] optimizes.
//!
//! Placed boxes never touch each other, not even at the corners.

use crate::error::{Error, Result};
use crate::layout::GridLayout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellState {
    /// Free cell, eligible for box placement.
    #[default]
    Empty,
    /// Permanently excluded cell.
    Wall,
    /// Cell covered by a placed box.
    Box,
}

impl CellState {
    /// Single-character representation used by text layouts.
    pub fn symbol(self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Wall => '#',
            CellState::Box => 'B',
        }
    }

    /// Parses a text layout symbol.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellState::Empty),
            '#' => Some(CellState::Wall),
            'B' => Some(CellState::Box),
            _ => None,
        }
    }
}

/// Dimensions of a box in cell units.
///
/// Boxes have no identity: two boxes with equal dimensions are
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "(usize, usize)", into = "(usize, usize)")
)]
pub struct BoxSize {
    width: usize,
    height: usize,
}

impl BoxSize {
    /// Creates a box, rejecting zero dimensions.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidBox(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells covered, saturating at `usize::MAX`.
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

impl TryFrom<(usize, usize)> for BoxSize {
    type Error = Error;

    fn try_from((width, height): (usize, usize)) -> Result<Self> {
        Self::new(width, height)
    }
}

impl From<BoxSize> for (usize, usize) {
    fn from(b: BoxSize) -> Self {
        (b.width, b.height)
    }
}

impl std::fmt::Display for BoxSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// A rectangular grid of cells with placement bookkeeping.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    wall_count: usize,
    /// Cells currently in the `Box` state.
    boxed_cells: usize,
    fill_factor: f64,
    /// Linear index where the next placement attempt begins.
    cursor: usize,
}

impl Grid {
    /// Creates an all-empty grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidShape(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![CellState::Empty; width * height],
            wall_count: 0,
            boxed_cells: 0,
            fill_factor: 0.0,
            cursor: 0,
        })
    }

    /// Builds a grid whose walls mirror `layout`.
    ///
    /// The layout must not contain `Box` cells.
    pub fn from_layout(layout: &GridLayout) -> Result<Self> {
        let mut grid = Self::new(layout.width(), layout.height())?;
        for (x, y, state) in layout.iter() {
            match state {
                CellState::Empty => {}
                CellState::Wall => grid.set_wall(x, y)?,
                CellState::Box => {
                    return Err(Error::InvalidShape(format!(
                        "input shape has a box cell at ({}, {})",
                        x, y
                    )))
                }
            }
        }
        Ok(grid)
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of wall cells.
    pub fn wall_count(&self) -> usize {
        self.wall_count
    }

    /// Cells that count towards the fill factor denominator.
    pub fn available_cells(&self) -> usize {
        self.cells.len() - self.wall_count
    }

    /// Number of cells covered by boxes.
    pub fn boxed_cells(&self) -> usize {
        self.boxed_cells
    }

    /// Fraction of available area covered by placed boxes.
    pub fn fill_factor(&self) -> f64 {
        self.fill_factor
    }

    /// Fill factor recomputed from the cell states.
    pub fn recomputed_fill_factor(&self) -> f64 {
        let available = self.available_cells();
        if available == 0 {
            return 0.0;
        }
        let boxed = self
            .cells
            .iter()
            .filter(|&&c| c == CellState::Box)
            .count();
        boxed as f64 / available as f64
    }

    /// Linear index where the next placement attempt starts.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
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

    /// Returns the state of cell `(x, y)`.
    pub fn cell_state(&self, x: usize, y: usize) -> Result<CellState> {
        let idx = self.index(x, y)?;
        Ok(self.cells[idx])
    }

    /// Marks cell `(x, y)` as a wall.
    pub fn set_wall(&mut self, x: usize, y: usize) -> Result<()> {
        let idx = self.index(x, y)?;
        self.ensure_clear()?;
        if self.cells[idx] != CellState::Wall {
            self.cells[idx] = CellState::Wall;
            self.wall_count += 1;
        }
        Ok(())
    }

    /// Marks cell `(x, y)` as empty.
    pub fn set_empty(&mut self, x: usize, y: usize) -> Result<()> {
        let idx = self.index(x, y)?;
        self.ensure_clear()?;
        if self.cells[idx] == CellState::Wall {
            self.wall_count -= 1;
        }
        self.cells[idx] = CellState::Empty;
        Ok(())
    }

    fn ensure_clear(&self) -> Result<()> {
        if self.boxed_cells > 0 {
            return Err(Error::GridNotClear(self.boxed_cells));
        }
        Ok(())
    }

    /// Tries to place `size` at the first valid position at or after the cursor.
    ///
    /// Returns `false` when the box does not fit anywhere in the remaining
    /// scan range; the grid is left unchanged in that case.
    pub fn place_box(&mut self, size: BoxSize) -> bool {
        let available = self.available_cells();
        if available == 0 {
            return false;
        }

        let (w, h) = (size.width(), size.height());
        let total = self.cells.len();
        let mut start = self.cursor;

        while start < total {
            let sx = start % self.width;
            let sy = start / self.width;

            // Every later start lies on this row or below it.
            if h > self.height - sy {
                return false;
            }

            if w > self.width - sx {
                start += self.width - sx;
                continue;
            }

            if self.footprint_conflicts(sx, sy, w, h) {
                start += 1;
                continue;
            }

            for y in sy..sy + h {
                let row = y * self.width;
                self.cells[row + sx..row + sx + w].fill(CellState::Box);
            }
            self.boxed_cells += size.area();
            self.fill_factor = self.boxed_cells as f64 / available as f64;
            self.cursor = start + w + 1;
            return true;
        }

        false
    }

    /// Places boxes in order, returning how many were placed.
    pub fn place_all(&mut self, order: &[BoxSize]) -> usize {
        order.iter().filter(|&&b| self.place_box(b)).count()
    }

    fn footprint_conflicts(&self, sx: usize, sy: usize, w: usize, h: usize) -> bool {
        (sy..sy + h).any(|y| (sx..sx + w).any(|x| self.cell_conflicts(x, y)))
    }

    /// A cell conflicts when it is not empty or borders a box on either side
    /// or anywhere in the row above.
    fn cell_conflicts(&self, x: usize, y: usize) -> bool {
        let idx = x + y * self.width;
        let is_box = |i: usize| self.cells[i] == CellState::Box;

        if self.cells[idx] != CellState::Empty {
            return true;
        }

        let has_left = x > 0;
        let has_right = x + 1 < self.width;

        if has_left && is_box(idx - 1) {
            return true;
        }
        if has_right && is_box(idx + 1) {
            return true;
        }

        if y > 0 {
            let above = idx - self.width;
            if is_box(above) {
                return true;
            }
            // Corner checks ignore whether the side cells are walls.
            if has_left && is_box(above - 1) {
                return true;
            }
            if has_right && is_box(above + 1) {
                return true;
            }
        }

        false
    }

    /// Resets every box cell to empty; walls are kept.
    pub fn clear_boxes(&mut self) {
        for cell in self.cells.iter_mut() {
            if *cell == CellState::Box {
                *cell = CellState::Empty;
            }
        }
        self.boxed_cells = 0;
        self.fill_factor = 0.0;
        self.cursor = 0;
    }

    /// Snapshot of the current cell states.
    pub fn to_layout(&self) -> GridLayout {
        GridLayout::from_grid_cells(self.width, self.height, self.cells.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(w: usize, h: usize) -> BoxSize {
        BoxSize::new(w, h).unwrap()
    }

    /// Every boxed cell's 8 neighbours are out of bounds, walls, empty,
    /// or part of the same rectangle.
    fn assert_no_touching(grid: &Grid, placed: &[(usize, usize, BoxSize)]) {
        let owner = |x: usize, y: usize| {
            placed.iter().position(|&(px, py, s)| {
                x >= px && x < px + s.width() && y >= py && y < py + s.height()
            })
        };
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.cell_state(x, y).unwrap() != CellState::Box {
                    continue;
                }
                let me = owner(x, y);
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx < 0 || ny < 0 {
                            continue;
                        }
                        let (nx, ny) = (nx as usize, ny as usize);
                        if let Ok(CellState::Box) = grid.cell_state(nx, ny) {
                            assert_eq!(owner(nx, ny), me, "boxes touch at ({}, {})", nx, ny);
                        }
                    }
                }
            }
        }
    }

    /// Places boxes and records the top-left corner of each successful one.
    fn place_tracked(grid: &mut Grid, boxes: &[BoxSize]) -> Vec<(usize, usize, BoxSize)> {
        let mut placed = Vec::new();
        for &size in boxes {
            let before: Vec<CellState> = grid.to_layout().cells().to_vec();
            if grid.place_box(size) {
                let after = grid.to_layout();
                let first = after
                    .cells()
                    .iter()
                    .zip(&before)
                    .position(|(a, b)| a != b)
                    .unwrap();
                placed.push((first % grid.width(), first / grid.width(), size));
            }
        }
        placed
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.total_cells(), 6);
        assert_eq!(grid.wall_count(), 0);
        assert_eq!(grid.fill_factor(), 0.0);
        assert_eq!(grid.cell_state(2, 1).unwrap(), CellState::Empty);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(Grid::new(0, 4), Err(Error::InvalidShape(_))));
        assert!(matches!(BoxSize::new(2, 0), Err(Error::InvalidBox(_))));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = Grid::new(4, 4).unwrap();
        assert!(matches!(
            grid.cell_state(4, 0),
            Err(Error::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(grid.set_wall(0, 4).is_err());
        assert!(grid.set_empty(7, 7).is_err());
    }

    #[test]
    fn test_wall_count_tracking() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_wall(1, 1).unwrap();
        grid.set_wall(1, 1).unwrap();
        assert_eq!(grid.wall_count(), 1);
        grid.set_wall(0, 2).unwrap();
        assert_eq!(grid.wall_count(), 2);
        grid.set_empty(1, 1).unwrap();
        grid.set_empty(2, 2).unwrap();
        assert_eq!(grid.wall_count(), 1);
        assert_eq!(grid.available_cells(), 8);
    }

    #[test]
    fn test_wall_edit_rejected_while_boxes_placed() {
        let mut grid = Grid::new(4, 4).unwrap();
        assert!(grid.place_box(b(1, 1)));
        assert_eq!(grid.set_wall(3, 3), Err(Error::GridNotClear(1)));
        grid.clear_boxes();
        assert!(grid.set_wall(3, 3).is_ok());
    }

    #[test]
    fn test_single_box_in_empty_grid() {
        let mut grid = Grid::new(4, 4).unwrap();
        assert!(grid.place_box(b(2, 2)));
        assert_eq!(grid.boxed_cells(), 4);
        assert_eq!(grid.fill_factor(), 0.25);
        assert_eq!(grid.cursor(), 3);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(grid.cell_state(x, y).unwrap(), CellState::Box);
        }
        assert_eq!(grid.cell_state(2, 0).unwrap(), CellState::Empty);
    }

    #[test]
    fn test_boxes_keep_one_cell_gap() {
        let mut grid = Grid::new(5, 1).unwrap();
        assert!(grid.place_box(b(1, 1)));
        assert!(grid.place_box(b(1, 1)));
        assert!(grid.place_box(b(1, 1)));
        assert!(!grid.place_box(b(1, 1)));
        let row: String = (0..5)
            .map(|x| grid.cell_state(x, 0).unwrap().symbol())
            .collect();
        assert_eq!(row, "B.B.B");
    }

    #[test]
    fn test_width_overflow_moves_to_next_row() {
        let mut grid = Grid::new(4, 4).unwrap();
        assert!(grid.place_box(b(2, 1)));
        // Cursor at 3: a 2-wide box does not fit at x = 3, so the scan
        // jumps to row 1, where the box above conflicts, then to row 2.
        assert!(grid.place_box(b(2, 1)));
        assert_eq!(grid.cell_state(0, 2).unwrap(), CellState::Box);
        assert_eq!(grid.cell_state(1, 2).unwrap(), CellState::Box);
        assert_eq!(grid.cursor(), 8 + 3);
    }

    #[test]
    fn test_height_overflow_stops_scan() {
        let mut grid = Grid::new(4, 3).unwrap();
        assert!(!grid.place_box(b(1, 4)));
        assert_eq!(grid.fill_factor(), 0.0);
        assert_eq!(grid.cursor(), 0);
    }

    #[test]
    fn test_diagonal_contact_is_a_conflict() {
        // A box at (0,0) must block a 1x1 at (1,1).
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_wall(1, 0).unwrap();
        grid.set_wall(2, 0).unwrap();
        grid.set_wall(0, 1).unwrap();
        assert!(grid.place_box(b(1, 1)));
        assert!(grid.place_box(b(1, 1)));
        assert_eq!(grid.cell_state(1, 1).unwrap(), CellState::Empty);
        assert_eq!(grid.cell_state(2, 1).unwrap(), CellState::Box);
    }

    #[test]
    fn test_two_by_two_with_one_wall_fits_one_box() {
        for (wx, wy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let mut grid = Grid::new(2, 2).unwrap();
            grid.set_wall(wx, wy).unwrap();
            let placed = grid.place_all(&[b(1, 1), b(1, 1)]);
            assert_eq!(placed, 1);
            assert_eq!(grid.fill_factor(), 1.0 / 3.0);
        }
    }

    #[test]
    fn test_all_wall_grid_never_places() {
        let mut grid = Grid::new(3, 2).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                grid.set_wall(x, y).unwrap();
            }
        }
        assert_eq!(grid.available_cells(), 0);
        assert!(!grid.place_box(b(1, 1)));
        assert_eq!(grid.fill_factor(), 0.0);
        assert_eq!(grid.recomputed_fill_factor(), 0.0);
    }

    #[test]
    fn test_zero_boxes_leave_grid_untouched() {
        let mut grid = Grid::new(4, 3).unwrap();
        grid.set_wall(2, 1).unwrap();
        let before = grid.to_layout();
        assert_eq!(grid.place_all(&[]), 0);
        assert_eq!(grid.fill_factor(), 0.0);
        assert_eq!(grid.to_layout(), before);
    }

    #[test]
    fn test_fill_factor_matches_cells_at_every_step() {
        let mut grid = Grid::new(9, 7).unwrap();
        grid.set_wall(4, 0).unwrap();
        grid.set_wall(4, 1).unwrap();
        grid.set_wall(0, 5).unwrap();
        let boxes = [b(2, 2), b(3, 1), b(1, 1), b(2, 3), b(1, 2), b(4, 1), b(1, 1)];
        for &size in &boxes {
            grid.place_box(size);
            assert_eq!(grid.fill_factor(), grid.recomputed_fill_factor());
        }
        assert!(grid.boxed_cells() > 0);
    }

    #[test]
    fn test_fill_factor_is_exact_ratio() {
        let mut grid = Grid::new(10, 1).unwrap();
        assert_eq!(grid.place_all(&[b(1, 1), b(1, 1), b(1, 1)]), 3);
        assert_eq!(grid.fill_factor(), 0.3);

        // Every non-wall cell boxed.
        let layout: GridLayout = ".#.#.#.#.#.#.#.#.#.".parse().unwrap();
        let mut grid = Grid::from_layout(&layout).unwrap();
        assert_eq!(grid.place_all(&[b(1, 1); 10]), 10);
        assert_eq!(grid.fill_factor(), 1.0);
        assert_eq!(grid.fill_factor(), grid.recomputed_fill_factor());
    }

    #[test]
    fn test_huge_dimensions_do_not_fit() {
        let mut grid = Grid::new(4, 3).unwrap();
        assert!(grid.place_box(b(1, 1)));
        assert!(!grid.place_box(b(usize::MAX, 1)));
        assert!(!grid.place_box(b(1, usize::MAX)));
        assert!(!grid.place_box(b(usize::MAX, usize::MAX)));
        assert_eq!(grid.boxed_cells(), 1);
        assert_eq!(grid.cursor(), 2);
        assert!(grid.place_box(b(2, 1)));
    }

    #[test]
    fn test_placed_boxes_never_touch() {
        let mut grid = Grid::new(10, 8).unwrap();
        grid.set_wall(3, 3).unwrap();
        grid.set_wall(6, 0).unwrap();
        let boxes = [
            b(2, 2),
            b(1, 3),
            b(3, 1),
            b(1, 1),
            b(2, 1),
            b(1, 2),
            b(2, 2),
            b(1, 1),
            b(3, 2),
        ];
        let placed = place_tracked(&mut grid, &boxes);
        assert!(placed.len() >= 3);
        assert_no_touching(&grid, &placed);
    }

    #[test]
    fn test_clear_matches_fresh_grid() {
        let mut shape = Grid::new(6, 5).unwrap();
        shape.set_wall(2, 2).unwrap();
        shape.set_wall(5, 0).unwrap();
        let boxes = [b(2, 1), b(1, 2), b(2, 2), b(1, 1)];

        let mut fresh = shape.clone();
        fresh.place_all(&boxes);

        let mut reused = shape.clone();
        reused.place_all(&[b(3, 3), b(1, 1)]);
        reused.clear_boxes();
        assert_eq!(reused.cursor(), 0);
        assert_eq!(reused.fill_factor(), 0.0);
        assert_eq!(reused.to_layout(), shape.to_layout());

        reused.place_all(&boxes);
        assert_eq!(reused.to_layout(), fresh.to_layout());
        assert_eq!(reused.fill_factor(), fresh.fill_factor());
    }
}
