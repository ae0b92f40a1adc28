use std::collections::HashMap;

use polycover_geometry::{Point, PolygonWithHoles};

use crate::{Costs, Error, Rectangle, RuntimeEnvironment};

/// A cover: the rectangles whose union equals the polygon. Rectangles may
/// overlap.
pub type Cover = Vec<Rectangle>;

/// Per-point cover multiplicity, maintained by external pixel-based solvers
/// and threaded through postprocessor chains untouched.
pub type PixelCoverage = HashMap<Point, usize>;

/// Anything that can produce a cover for a polygon: an algorithm, or a
/// postprocessor chain ending in one.
pub trait CoverProvider {
    fn cover_for(
        &self,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error>;

    /// Whether the most recent run was cut short by a deadline.
    fn timed_out(&self) -> bool {
        false
    }
}
