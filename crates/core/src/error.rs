//! Error types for U-Boxfill.

use thiserror::Error;

/// Errors raised by grid construction, translation and solver configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A cell coordinate lies outside the grid.
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The grid shape is malformed (zero size, ragged rows, box cells in an input shape).
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// A box has a zero dimension.
    #[error("Invalid box: {0}")]
    InvalidBox(String),

    /// Algorithm parameters are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Walls can only be edited while no boxes are placed.
    #[error("Grid still holds {0} boxed cells; clear boxes before editing walls")]
    GridNotClear(usize),

    /// A text shape could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
