use log::{debug, trace};
use polycover_geometry::PolygonWithHoles;

use crate::graph::BaseRectGraph;
use crate::{extract, Cover, Error, Rectangle};

/// Per-polygon scratch state shared along an algorithm/postprocessor chain.
///
/// Every field starts empty and is filled on first use; the runner clears the
/// environment between polygons. Derived structures depend only on earlier
/// ones: the graph is built from the base rectangles, the coverage counts
/// from the graph and the current cover.
#[derive(Debug, Default)]
pub struct RuntimeEnvironment {
    pub base_rectangles: Vec<Rectangle>,
    /// For each graph node, how many cover rectangles fully contain its base.
    pub cover_counts: Vec<usize>,
    pub graph: BaseRectGraph,
    /// Set by postprocessors that change the cover, so external pixel-based
    /// coverage holders know to resynchronize. One-shot: cleared with the
    /// rest of the environment.
    pub pixel_coverage_invalidated: bool,
}

impl RuntimeEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.base_rectangles.clear();
        self.cover_counts.clear();
        self.graph.clear();
        self.pixel_coverage_invalidated = false;
    }

    /// The polygon's base rectangles, computing them on first access.
    pub fn base_rectangles(&mut self, polygon: &PolygonWithHoles) -> Result<&[Rectangle], Error> {
        if self.base_rectangles.is_empty() {
            self.base_rectangles = extract::base_rectangles(polygon)?;
        }
        Ok(&self.base_rectangles)
    }

    /// The base-rectangle graph, building it on first access.
    pub fn graph(&mut self, polygon: &PolygonWithHoles) -> Result<&BaseRectGraph, Error> {
        if self.graph.is_empty() {
            if self.base_rectangles.is_empty() {
                self.base_rectangles = extract::base_rectangles(polygon)?;
            }
            self.graph.build(self.base_rectangles.clone());
        }
        Ok(&self.graph)
    }

    /// Per-node coverage counts for `cover`, computing them on first access.
    pub fn coverage(
        &mut self,
        polygon: &PolygonWithHoles,
        cover: &Cover,
    ) -> Result<&mut Vec<usize>, Error> {
        if self.cover_counts.is_empty() {
            self.graph(polygon)?;
            let mut counts = vec![0usize; self.graph.nodes().len()];
            for rectangle in cover {
                debug!("counting base rectangles covered by {rectangle}");
                for id in self
                    .graph
                    .contained(rectangle.top_right(), rectangle.bottom_left())
                {
                    trace!("base rectangle {id} is covered");
                    counts[id] += 1;
                }
            }
            self.cover_counts = counts;
        }
        Ok(&mut self.cover_counts)
    }
}
