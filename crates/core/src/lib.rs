//! # U-Boxfill Core
//!
//! Fills a walled grid with rectangular boxes, searching box orderings with a
//! genetic algorithm.
//!
//! ## Core Components
//!
//! - **Grid**: [`Grid`], [`CellState`], [`BoxSize`] - cell array and the greedy
//!   cursor-based placement procedure
//! - **GA engine**: [`GaRunner`], [`GaProblem`], [`Genotype`] - permutation search
//!   with pairwise order-preserving crossover and mirror mutation
//! - **Solver**: [`BoxFiller`], [`BoxFillProblem`] - translation between caller
//!   shapes and the engine
//! - **Layouts**: [`GridLayout`] - per-cell labeling used for input and output
//!
//! ## Placement Rules
//!
//! Boxes are axis-aligned, never rotated, never overlap walls, and never touch
//! another box, not even diagonally. Boxes that find no position are skipped.
//! The fill factor is the boxed area divided by the number of non-wall cells.
//!
//! ## Quick Start
//!
//! ```rust
//! use u_boxfill_core::{boxes_from_dims, BoxFiller, GaConfig, GridLayout};
//!
//! let shape = GridLayout::parse(
//!     "......\n\
//!      ..##..\n\
//!      ......",
//! )
//! .unwrap();
//! let boxes = boxes_from_dims(&[(2, 1), (1, 1), (2, 3)]).unwrap();
//!
//! let config = GaConfig::new()
//!     .with_population_size(6)
//!     .with_iterations(10)
//!     .with_mutation_probability(0.05);
//!
//! let result = BoxFiller::new(config).solve(&shape, &boxes).unwrap();
//! println!("{}\nfill factor: {:.4}", result.layout, result.fill_factor);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod ga;
pub mod grid;
pub mod layout;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use ga::{GaConfig, GaProblem, GaProgress, GaResult, GaRunner, Genotype};
pub use grid::{BoxSize, CellState, Grid};
pub use layout::GridLayout;
pub use result::SolveResult;
pub use solver::{boxes_from_dims, BoxFillProblem, BoxFiller};
