//! Cover postprocessors.
//!
//! A postprocessor wraps a previous cover provider (an algorithm or another
//! postprocessor) and transforms the cover it produces in place, preserving
//! validity and never increasing the cost. Chains are built by value:
//! `Postprocessor::over(...)` keeps an owned linked list down to the
//! underlying algorithm.

mod join;
mod join_full;
mod prune;
mod split;
mod trim;

pub use join::Join;
pub use join_full::JoinFull;
pub use prune::Prune;
pub use split::{BoundingBoxSplit, PartitionSplit};
pub use trim::Trim;

use polycover_geometry::PolygonWithHoles;

use crate::{Costs, Cover, CoverProvider, Error, PixelCoverage, RuntimeEnvironment};

/// An in-place cover transformation.
pub trait CoverTransform {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
        pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error>;
}

enum Previous {
    Algorithm(Box<dyn CoverProvider>),
    Chain(Box<Postprocessor>),
}

/// A cover provider that postprocesses the cover of its predecessor.
pub struct Postprocessor {
    previous: Previous,
    transform: Box<dyn CoverTransform>,
}

impl Postprocessor {
    /// Wrap an algorithm with a first transform.
    #[must_use]
    pub fn over_algorithm(
        algorithm: Box<dyn CoverProvider>,
        transform: Box<dyn CoverTransform>,
    ) -> Self {
        Self {
            previous: Previous::Algorithm(algorithm),
            transform,
        }
    }

    /// Append a transform to an existing chain.
    #[must_use]
    pub fn over(previous: Postprocessor, transform: Box<dyn CoverTransform>) -> Self {
        Self {
            previous: Previous::Chain(Box::new(previous)),
            transform,
        }
    }

    fn provide(
        &self,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
        pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<Cover, Error> {
        let mut cover = match &self.previous {
            Previous::Algorithm(algorithm) => algorithm.cover_for(polygon, costs, env)?,
            Previous::Chain(chain) => chain.provide(polygon, costs, env, pixel_coverage)?,
        };
        self.transform
            .apply(&mut cover, polygon, costs, env, pixel_coverage)?;
        Ok(cover)
    }
}

impl CoverProvider for Postprocessor {
    fn cover_for(
        &self,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error> {
        let mut pixel_coverage = None;
        self.provide(polygon, costs, env, &mut pixel_coverage)
    }

    fn timed_out(&self) -> bool {
        match &self.previous {
            Previous::Algorithm(algorithm) => algorithm.timed_out(),
            Previous::Chain(chain) => chain.timed_out(),
        }
    }
}
