use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing file, wrong extension, malformed or non-integer WKT.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("input file '{}' not found", .0.display())]
    InputFileMissing(PathBuf),

    /// Attempt to construct a rectangle with non-positive extent.
    #[error("invalid rectangle: min ({min_x}, {min_y}) does not precede max ({max_x}, {max_y})")]
    InvalidRectangle {
        min_x: i64,
        min_y: i64,
        max_x: i64,
        max_y: i64,
    },

    /// An arrangement or boolean operation could not be completed.
    #[error("geometry operation failed: {0}")]
    Geometry(#[from] polycover_geometry::Error),

    /// An algorithm was requested whose backing solver is not built in.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The exact solver exceeded its deadline.
    #[error("solver timed out after {0} second(s)")]
    Timeout(f64),

    /// A computed cover does not equal the input polygon.
    #[error("computed cover does not equal the input polygon")]
    CoverInvalid,
}
