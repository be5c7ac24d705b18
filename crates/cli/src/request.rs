//! JSON request/response types for the command-line runner.

use serde::{Deserialize, Serialize};
use u_boxfill_core::{BoxSize, GaConfig, GridLayout, SolveResult};

/// A box filling request.
///
/// ```json
/// {
///   "shape": ["....", ".#..", "...."],
///   "boxes": [[2, 1], [1, 1]],
///   "config": { "population_size": 10, "iterations": 50 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Grid shape, as text rows or as a full layout object.
    pub shape: ShapeSpec,

    /// Boxes as `[width, height]` pairs.
    #[serde(default)]
    pub boxes: Vec<BoxSize>,

    /// Algorithm parameters.
    #[serde(default)]
    pub config: Option<GaConfig>,
}

/// Accepted shape encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeSpec {
    /// Text rows using `.` for empty and `#` for wall cells.
    Rows(Vec<String>),
    /// Explicit layout object.
    Layout(GridLayout),
}

impl ShapeSpec {
    /// Resolves the shape into a layout.
    pub fn to_layout(&self) -> u_boxfill_core::Result<GridLayout> {
        match self {
            ShapeSpec::Rows(rows) => GridLayout::parse(&rows.join("\n")),
            ShapeSpec::Layout(layout) => Ok(layout.clone()),
        }
    }
}

/// Command-line overrides applied on top of the request config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub population_size: Option<usize>,
    pub iterations: Option<u32>,
    pub mutation_probability: Option<f64>,
}

impl ConfigOverrides {
    /// Merges the overrides into `base`.
    pub fn apply(&self, base: Option<GaConfig>) -> GaConfig {
        let mut config = base.unwrap_or_default();
        if let Some(size) = self.population_size {
            config = config.with_population_size(size);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_iterations(iterations);
        }
        if let Some(p) = self.mutation_probability {
            config = config.with_mutation_probability(p);
        }
        config
    }
}

/// Response written by `solve --output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Fill factor (0.0 - 1.0).
    pub fill_factor: f64,

    /// Final labeling as text rows.
    pub rows: Vec<String>,

    /// Full labeling.
    pub layout: GridLayout,

    /// Placed boxes in placement order.
    pub placed: Vec<BoxSize>,

    /// Boxes that did not fit.
    pub unplaced: Vec<BoxSize>,

    /// Generations run.
    pub generations: u32,

    /// Best fitness per generation.
    pub fitness_history: Vec<f64>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl From<SolveResult> for SolveResponse {
    fn from(r: SolveResult) -> Self {
        Self {
            fill_factor: r.fill_factor,
            rows: r.layout.to_string().lines().map(str::to_owned).collect(),
            layout: r.layout,
            placed: r.placed,
            unplaced: r.unplaced,
            generations: r.generations,
            fitness_history: r.fitness_history,
            computation_time_ms: r.computation_time_ms,
        }
    }
}
