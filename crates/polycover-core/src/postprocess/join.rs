use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace};
use polycover_geometry::PolygonWithHoles;

use super::CoverTransform;
use crate::{Costs, Cover, Error, PixelCoverage, Rectangle, RuntimeEnvironment};

/// Merge neighboring aligned cover rectangles when the merged rectangle is
/// cheaper than the pair.
///
/// Rectangles sharing a y-extent are candidates for horizontal joins,
/// rectangles sharing an x-extent for vertical joins. Within a group,
/// consecutive rectangles (ordered along the join axis) are merged greedily:
/// a successful join immediately becomes the predecessor of the next
/// candidate.
#[derive(Debug, Default)]
pub struct Join;

type AlignmentMap = BTreeMap<(i64, i64), Vec<usize>>;

impl CoverTransform for Join {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        costs: &Costs,
        _env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        info!("joining aligned rectangles in cover of {}", cover.len());

        debug!("joining horizontally aligned rectangles");
        let mut joined: BTreeSet<usize> = BTreeSet::new();
        for (_, group) in x_alignments(cover) {
            joined.extend(join_aligned(polygon, cover, &group, costs, false));
        }
        for &index in joined.iter().rev() {
            cover.remove(index);
        }

        debug!("joining vertically aligned rectangles");
        let mut joined: BTreeSet<usize> = BTreeSet::new();
        for (_, group) in y_alignments(cover) {
            joined.extend(join_aligned(polygon, cover, &group, costs, true));
        }
        for &index in joined.iter().rev() {
            cover.remove(index);
        }

        info!("join finished with {} rectangle(s)", cover.len());
        Ok(())
    }
}

/// Group cover indices by shared `(min_y, max_y)`, each group sorted by
/// `min_x`: the horizontally joinable chains.
fn x_alignments(cover: &Cover) -> AlignmentMap {
    let mut aligned = AlignmentMap::new();
    for (index, rectangle) in cover.iter().enumerate() {
        aligned
            .entry((rectangle.min_y(), rectangle.max_y()))
            .or_default()
            .push(index);
    }
    for group in aligned.values_mut() {
        group.sort_by_key(|&i| cover[i].min_x());
    }
    aligned
}

/// Group cover indices by shared `(min_x, max_x)`, each group sorted by
/// `min_y`: the vertically joinable chains.
fn y_alignments(cover: &Cover) -> AlignmentMap {
    let mut aligned = AlignmentMap::new();
    for (index, rectangle) in cover.iter().enumerate() {
        aligned
            .entry((rectangle.min_x(), rectangle.max_x()))
            .or_default()
            .push(index);
    }
    for group in aligned.values_mut() {
        group.sort_by_key(|&i| cover[i].min_y());
    }
    aligned
}

/// Try to merge consecutive rectangles of one aligned group. Successful
/// joins are pushed onto the cover; the returned set holds the indices they
/// replace.
fn join_aligned(
    polygon: &PolygonWithHoles,
    cover: &mut Cover,
    group: &[usize],
    costs: &Costs,
    vertical_join: bool,
) -> BTreeSet<usize> {
    let mut replaced = BTreeSet::new();
    if group.len() < 2 {
        return replaced;
    }

    let mut prev_index = group[0];
    for &index in &group[1..] {
        let previous = cover[prev_index];
        let current = cover[index];

        let separate_cost =
            costs.total_of_rectangle(&previous) + costs.total_of_rectangle(&current);
        let proposed = current.join(&previous);
        let proposed_cost = costs.total_of_rectangle(&proposed);
        trace!("join candidate {proposed}: {proposed_cost} vs {separate_cost}");

        if proposed_cost < separate_cost && join_is_valid(polygon, &proposed, vertical_join) {
            debug!("joining {previous} and {current} into {proposed}");
            replaced.insert(prev_index);
            replaced.insert(index);
            cover.push(proposed);
            prev_index = cover.len() - 1;
        } else {
            prev_index = index;
        }
    }

    replaced
}

/// A joined rectangle is valid when it lies inside the polygon. Edges
/// parallel to the join axis cannot cross it (the end rectangles already lie
/// inside the polygon), so only the perpendicular edges are tested.
fn join_is_valid(polygon: &PolygonWithHoles, rectangle: &Rectangle, vertical_join: bool) -> bool {
    polygon
        .all_edges()
        .filter(|edge| {
            if vertical_join {
                edge.is_horizontal()
            } else {
                edge.is_vertical()
            }
        })
        .all(|edge| !rectangle.fully_intersects(&edge))
}
