use log::{debug, info};
use polycover_geometry::PolygonWithHoles;

use super::CoverTransform;
use crate::{Costs, Cover, Error, PixelCoverage, Rectangle, RuntimeEnvironment};

/// Exhaustive pairwise joining: per pass, the single join with the largest
/// cost reduction over all rectangle pairs is applied; passes repeat until
/// no join improves the cover.
///
/// Quadratic per pass, and every applied join strictly decreases the total
/// cost, so the loop terminates.
#[derive(Debug, Default)]
pub struct JoinFull;

impl CoverTransform for JoinFull {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        _env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        info!("exhaustively joining cover of {} rectangle(s)", cover.len());

        loop {
            let Some((i, j, joined, reduction)) = best_join(cover, polygon, costs) else {
                break;
            };
            debug!(
                "joining {} and {} into {joined} (saves {reduction})",
                cover[i], cover[j]
            );
            cover.swap_remove(j);
            cover.swap_remove(i);
            cover.push(joined);
        }

        info!("exhaustive join finished with {} rectangle(s)", cover.len());
        Ok(())
    }
}

/// The best cost-reducing valid join over all pairs, as
/// `(i, j, joined, reduction)` with `i < j`.
fn best_join(
    cover: &Cover,
    polygon: &PolygonWithHoles,
    costs: &Costs,
) -> Option<(usize, usize, Rectangle, u64)> {
    let mut best: Option<(usize, usize, Rectangle, u64)> = None;

    for i in 0..cover.len() {
        for j in (i + 1)..cover.len() {
            let joined = cover[i].join(&cover[j]);
            let separate =
                costs.total_of_rectangle(&cover[i]) + costs.total_of_rectangle(&cover[j]);
            let merged = costs.total_of_rectangle(&joined);
            if merged >= separate {
                continue;
            }
            let reduction = separate - merged;
            if best.as_ref().is_some_and(|&(_, _, _, r)| r >= reduction) {
                continue;
            }
            if !join_is_valid(polygon, &joined) {
                continue;
            }
            best = Some((i, j, joined, reduction));
        }
    }

    best
}

/// Unlike the aligned join, arbitrary pairs can produce a bounding box that
/// sticks out anywhere, so every polygon edge is tested.
fn join_is_valid(polygon: &PolygonWithHoles, rectangle: &Rectangle) -> bool {
    polygon
        .all_edges()
        .all(|edge| !rectangle.fully_intersects(&edge))
}
