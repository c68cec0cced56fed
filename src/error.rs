use std::path::PathBuf;

use thiserror::Error;

use crate::maze::{Cell, Coord};

/// Failures raised by the maze core and its persistence layer.
///
/// An unreachable goal is not an error: solvers report it as
/// [`SearchOutcome::NoPath`](crate::solvers::SearchOutcome::NoPath).
#[derive(Debug, Error)]
pub enum MazeError {
    #[error("coordinate ({}, {}) is outside the {rows}x{cols} grid", .coord.0, .coord.1)]
    OutOfBounds { coord: Coord, rows: u16, cols: u16 },

    #[error("expected exactly one {cell:?} cell, found {count}")]
    NotFound { cell: Cell, count: usize },

    #[error("invalid endpoint ({}, {}): {reason}", .coord.0, .coord.1)]
    InvalidEndpoint { coord: Coord, reason: &'static str },

    #[error("grid dimensions must be at least 1x1, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("density must be between 0 and 1, got {0}")]
    InvalidDensity(f64),

    #[error("malformed maze input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("no maze_<N>.csv files found in {}", .0.display())]
    NoMazeFiles(PathBuf),

    #[error("{} already holds maze_{}.csv, no index is left", .0.display(), u32::MAX)]
    IndexExhausted(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("pdf export failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
