use log::{debug, info, trace};
use polycover_geometry::{assemble_regions, PolygonWithHoles};

use super::CoverTransform;
use crate::algorithms::PartitionAlgorithm;
use crate::{Costs, Cover, CoverProvider, Error, PixelCoverage, Rectangle, RuntimeEnvironment};

/// Replace each cover rectangle by the bounding boxes of the connected
/// components of its uniquely covered area, when that is cheaper.
#[derive(Debug, Default)]
pub struct BoundingBoxSplit;

/// Replace each cover rectangle by a minimum partition of the connected
/// components of its uniquely covered area, when that is cheaper.
#[derive(Debug, Default)]
pub struct PartitionSplit;

impl CoverTransform for BoundingBoxSplit {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        apply_split(cover, polygon, costs, env, |rectangle, _costs, env| {
            trace!("attempting bounding box split of {rectangle}");
            let components = uniquely_covered_polygons(rectangle, env)?;
            let mut replacement = Vec::with_capacity(components.len());
            for component in &components {
                let (bottom_left, top_right) = component.bounding_box();
                replacement.push(Rectangle::from_corners(bottom_left, top_right)?);
            }
            trace!("split into {} rectangle(s)", replacement.len());
            Ok(replacement)
        })
    }
}

impl CoverTransform for PartitionSplit {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        apply_split(cover, polygon, costs, env, |rectangle, costs, env| {
            trace!("attempting partition split of {rectangle}");
            let components = uniquely_covered_polygons(rectangle, env)?;
            let partition = PartitionAlgorithm;
            let mut replacement = Vec::new();
            for component in &components {
                replacement.extend(partition.cover_for(component, costs, env)?);
            }
            trace!("split into {} rectangle(s)", replacement.len());
            Ok(replacement)
        })
    }
}

/// Shared splitter loop: propose a replacement per rectangle, swap it in
/// when strictly cheaper, and keep the coverage counts in sync.
///
/// Replacements are held back until the scan finishes so they are not
/// themselves re-split within the same pass.
fn apply_split<F>(
    cover: &mut Cover,
    polygon: &PolygonWithHoles,
    costs: &Costs,
    env: &mut RuntimeEnvironment,
    mut split_rectangle: F,
) -> Result<(), Error>
where
    F: FnMut(&Rectangle, &Costs, &mut RuntimeEnvironment) -> Result<Vec<Rectangle>, Error>,
{
    info!("splitting cover of {} rectangle(s)", cover.len());
    env.pixel_coverage_invalidated = true;
    env.coverage(polygon, cover)?;

    let mut newly_added: Vec<Rectangle> = Vec::new();
    let mut index = 0usize;
    while index < cover.len() {
        let rectangle = cover[index];
        let current_cost = costs.total_of_rectangle(&rectangle);

        let split = split_rectangle(&rectangle, costs, env)?;
        let split_cost = costs.total_of_cover(&split);
        debug!("rectangle costs {current_cost}, proposed split {split_cost}");

        if split_cost < current_cost {
            debug!("split improves the cover, swapping it in");
            reduce_covered_amount(&rectangle, &split, env);
            newly_added.extend(split);
            cover.swap_remove(index);
        } else {
            index += 1;
        }
    }

    cover.append(&mut newly_added);
    Ok(())
}

/// Decrement coverage counts of the bases the replaced rectangle covered
/// that none of the replacement rectangles still cover.
fn reduce_covered_amount(
    original: &Rectangle,
    replacement: &[Rectangle],
    env: &mut RuntimeEnvironment,
) {
    let RuntimeEnvironment {
        graph,
        cover_counts,
        ..
    } = env;

    for id in graph.contained(original.top_right(), original.bottom_left()) {
        let base = &graph.nodes()[id].base;
        let still_covered = replacement.iter().any(|r| r.fully_contains(base));
        if !still_covered {
            cover_counts[id] -= 1;
        }
    }
}

/// The connected components of the uniquely covered base rectangles inside
/// `rectangle`, as polygons with holes.
fn uniquely_covered_polygons(
    rectangle: &Rectangle,
    env: &mut RuntimeEnvironment,
) -> Result<Vec<PolygonWithHoles>, Error> {
    let RuntimeEnvironment {
        graph,
        cover_counts,
        ..
    } = env;

    let mut unique: Vec<Rectangle> = graph
        .contained(rectangle.top_right(), rectangle.bottom_left())
        .filter(|&id| cover_counts[id] == 1)
        .map(|id| graph.nodes()[id].base)
        .collect();
    unique.sort();

    let boxes: Vec<_> = unique
        .iter()
        .map(|base| (base.bottom_left(), base.top_right()))
        .collect();
    Ok(assemble_regions(&boxes)?)
}
