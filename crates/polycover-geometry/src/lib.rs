//! Exact 2D rectilinear geometry on integer coordinates.
//!
//! Everything in this crate assumes axis-aligned input: segments are
//! horizontal or vertical, polygons are rectilinear. Coordinates are `i64`,
//! so all predicates are exact; there is no epsilon anywhere.

mod arrangement;
mod assemble;
mod point;
mod polygon;
mod segment;

pub use arrangement::Arrangement;
pub use assemble::assemble_regions;
pub use point::{Direction, Point};
pub use polygon::{MultiPolygon, Polygon, PolygonWithHoles};
pub use segment::{Ray, RayHit, Segment};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed polygon ring: {0}")]
    MalformedRing(String),

    #[error("cannot build an arrangement from zero segments")]
    EmptyArrangement,

    #[error("region boundary assembly stalled at ({0}, {1})")]
    UnclosedBoundary(i64, i64),
}
