//! Solve result representation.

use crate::grid::{BoxSize, CellState};
use crate::layout::GridLayout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a box filling run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    /// Final labeling: empty, wall and box cells.
    pub layout: GridLayout,

    /// Fraction of non-wall cells covered by boxes (0.0 - 1.0).
    pub fill_factor: f64,

    /// Winning box order, including boxes that did not fit.
    pub order: Vec<BoxSize>,

    /// Boxes that were placed, in placement order.
    pub placed: Vec<BoxSize>,

    /// Boxes that found no position.
    pub unplaced: Vec<BoxSize>,

    /// Number of generations run.
    pub generations: u32,

    /// Best fitness of the initial population, then one entry per generation.
    pub fitness_history: Vec<f64>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl SolveResult {
    /// Result for a run with nothing to place.
    pub fn empty(layout: GridLayout) -> Self {
        Self {
            layout,
            fill_factor: 0.0,
            order: Vec::new(),
            placed: Vec::new(),
            unplaced: Vec::new(),
            generations: 0,
            fitness_history: Vec::new(),
            computation_time_ms: 0,
        }
    }

    /// Returns true if every box was placed.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Number of placed boxes.
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// Number of boxes that did not fit.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// Returns true if at least one box was placed.
    pub fn is_successful(&self) -> bool {
        !self.placed.is_empty()
    }

    /// Number of cells covered by boxes.
    pub fn boxed_cells(&self) -> usize {
        self.layout.count(CellState::Box)
    }

    /// Cell labeling as columns (`[x][y]`), for shells that index that way.
    pub fn columns(&self) -> Vec<Vec<CellState>> {
        self.layout.to_columns()
    }
}
