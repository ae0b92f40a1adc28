use log::{debug, info};
use polycover_geometry::PolygonWithHoles;

use super::CoverTransform;
use crate::{Costs, Cover, Error, PixelCoverage, RuntimeEnvironment};

/// Remove fully redundant cover rectangles: those all of whose base
/// rectangles are also covered by at least one other cover rectangle.
#[derive(Debug, Default)]
pub struct Prune;

impl CoverTransform for Prune {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        _costs: &Costs,
        env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        info!("pruning cover of {} rectangle(s)", cover.len());
        env.pixel_coverage_invalidated = true;
        env.coverage(polygon, cover)?;

        let RuntimeEnvironment {
            graph,
            cover_counts,
            ..
        } = env;

        let mut pruned = 0usize;
        let mut i = 0usize;
        while i < cover.len() {
            let rectangle = cover[i];
            debug!("checking cover rectangle {rectangle}");

            let mut contains_any = false;
            let redundant = graph
                .contained(rectangle.top_right(), rectangle.bottom_left())
                .all(|id| {
                    contains_any = true;
                    cover_counts[id] > 1
                })
                && contains_any;

            if redundant {
                debug!("rectangle {rectangle} is fully redundant, pruning");
                for id in graph.contained(rectangle.top_right(), rectangle.bottom_left()) {
                    cover_counts[id] -= 1;
                }
                cover.swap_remove(i);
                pruned += 1;
            } else {
                i += 1;
            }
        }

        info!("pruned {pruned} rectangle(s)");
        Ok(())
    }
}
