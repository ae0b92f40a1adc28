use polycover_geometry::PolygonWithHoles;

use crate::{Costs, Cover, CoverProvider, Error, RuntimeEnvironment};

/// Front-end for the exact ILP formulations (`ilp`, `ilp-pixel`).
///
/// The solver itself is an external dependency that is not part of this
/// build; constructing the algorithm is allowed so callers can report a
/// uniform error, but producing a cover always fails with
/// [`Error::Unsupported`].
#[derive(Debug)]
pub struct IlpAlgorithm {
    pixel_based: bool,
    #[allow(dead_code)]
    timeout_seconds: f64,
}

impl IlpAlgorithm {
    #[must_use]
    pub fn new(pixel_based: bool, timeout_seconds: f64) -> Self {
        Self {
            pixel_based,
            timeout_seconds,
        }
    }
}

impl CoverProvider for IlpAlgorithm {
    fn cover_for(
        &self,
        _polygon: &PolygonWithHoles,
        _costs: &Costs,
        _env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error> {
        let name = if self.pixel_based { "ilp-pixel" } else { "ilp" };
        Err(Error::Unsupported(format!(
            "the {name} formulation needs an ILP solver, which is not available in this build"
        )))
    }
}
