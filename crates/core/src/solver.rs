//! Box filling solver.
//!
//! Translates a caller's shape and box list into a walled [`Grid`] template
//! and a [`BoxSize`] gene list, runs the genetic search, then re-places the
//! winning order on a clean copy of the template. The search itself never
//! keeps a filled grid around, so the final layout is always rebuilt here.

use crate::error::Result;
use crate::ga::{GaConfig, GaProblem, GaProgress, GaRunner};
use crate::grid::{BoxSize, Grid};
use crate::layout::GridLayout;
use crate::result::SolveResult;
use rand::prelude::*;
use std::time::Instant;

/// Converts `(width, height)` pairs into boxes, rejecting zero dimensions.
pub fn boxes_from_dims(dims: &[(usize, usize)]) -> Result<Vec<BoxSize>> {
    dims.iter().map(|&d| BoxSize::try_from(d)).collect()
}

/// GA problem: order boxes to maximize the fill factor of a walled grid.
#[derive(Debug, Clone)]
pub struct BoxFillProblem {
    /// Grid with walls applied and no boxes.
    template: Grid,
    boxes: Vec<BoxSize>,
}

impl BoxFillProblem {
    /// Builds the problem from an input shape (empty and wall cells only).
    pub fn new(shape: &GridLayout, boxes: Vec<BoxSize>) -> Result<Self> {
        Ok(Self {
            template: Grid::from_layout(shape)?,
            boxes,
        })
    }

    /// The walled, box-free grid every evaluation starts from.
    pub fn template(&self) -> &Grid {
        &self.template
    }

    /// Boxes to place.
    pub fn boxes(&self) -> &[BoxSize] {
        &self.boxes
    }

    /// Places `order` on a fresh copy of the template.
    pub fn decode(&self, order: &[BoxSize]) -> Grid {
        let mut grid = self.template.clone();
        grid.place_all(order);
        grid
    }
}

impl GaProblem for BoxFillProblem {
    type Gene = BoxSize;

    fn genes(&self) -> &[BoxSize] {
        &self.boxes
    }

    fn evaluate(&self, genes: &[BoxSize]) -> f64 {
        self.decode(genes).fill_factor()
    }
}

/// Genetic box filling solver.
#[derive(Debug, Clone, Default)]
pub struct BoxFiller {
    config: GaConfig,
}

impl BoxFiller {
    /// Creates a solver with the given configuration.
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Solves with a thread-local RNG.
    pub fn solve(&self, shape: &GridLayout, boxes: &[BoxSize]) -> Result<SolveResult> {
        self.solve_with_rng(shape, boxes, &mut thread_rng())
    }

    /// Solves with a specific RNG (for reproducible runs).
    pub fn solve_with_rng<R: Rng>(
        &self,
        shape: &GridLayout,
        boxes: &[BoxSize],
        rng: &mut R,
    ) -> Result<SolveResult> {
        self.solve_inner::<R, fn(GaProgress)>(shape, boxes, rng, None)
    }

    /// Solves with a per-generation progress callback.
    pub fn solve_with_progress<F>(
        &self,
        shape: &GridLayout,
        boxes: &[BoxSize],
        progress_callback: F,
    ) -> Result<SolveResult>
    where
        F: Fn(GaProgress),
    {
        self.solve_inner(shape, boxes, &mut thread_rng(), Some(progress_callback))
    }

    fn solve_inner<R: Rng, F>(
        &self,
        shape: &GridLayout,
        boxes: &[BoxSize],
        rng: &mut R,
        progress_callback: Option<F>,
    ) -> Result<SolveResult>
    where
        F: Fn(GaProgress),
    {
        let start = Instant::now();

        let problem = BoxFillProblem::new(shape, boxes.to_vec())?;
        let runner = GaRunner::new(self.config.clone(), problem)?;

        if boxes.is_empty() {
            log::info!("No boxes to place");
            return Ok(SolveResult::empty(runner.problem().template().to_layout()));
        }

        let template = runner.problem().template();
        log::info!(
            "Filling {}x{} grid ({} walls) with {} boxes: population={}, iterations={}",
            template.width(),
            template.height(),
            template.wall_count(),
            boxes.len(),
            self.config.population_size,
            self.config.iterations
        );

        let ga_result = runner.run_with_rng_and_progress(rng, progress_callback);
        let order = ga_result.best.into_genes();

        let mut grid = runner.problem().template().clone();
        let (placed, unplaced): (Vec<BoxSize>, Vec<BoxSize>) =
            order.iter().copied().partition(|&b| grid.place_box(b));

        if !unplaced.is_empty() {
            log::warn!(
                "{} of {} boxes could not be placed",
                unplaced.len(),
                order.len()
            );
        }
        log::info!(
            "Best fill factor {:.4} after {} generations ({} mutations)",
            grid.fill_factor(),
            ga_result.generations,
            ga_result.mutations
        );

        Ok(SolveResult {
            layout: grid.to_layout(),
            fill_factor: grid.fill_factor(),
            order,
            placed,
            unplaced,
            generations: ga_result.generations,
            fitness_history: ga_result.history,
            computation_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
