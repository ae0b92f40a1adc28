use log::info;
use polycover_geometry::PolygonWithHoles;

use super::CoverTransform;
use crate::graph::{BaseRectNode, PointNodeMap};
use crate::{Costs, Cover, Error, PixelCoverage, Rectangle, RuntimeEnvironment};

/// Shrink each cover rectangle's sides inward while the border strip just
/// inside the side consists only of base rectangles covered more than once.
///
/// Sides are processed top, left, bottom, right. Assumes no fully redundant
/// rectangles remain (run [`Prune`](super::Prune) first); a rectangle that
/// could be trimmed away entirely is left one strip wide instead.
#[derive(Debug, Default)]
pub struct Trim;

impl CoverTransform for Trim {
    fn apply(
        &self,
        cover: &mut Cover,
        polygon: &PolygonWithHoles,
        _costs: &Costs,
        env: &mut RuntimeEnvironment,
        _pixel_coverage: &mut Option<PixelCoverage>,
    ) -> Result<(), Error> {
        info!("trimming cover of {} rectangle(s)", cover.len());
        env.pixel_coverage_invalidated = true;
        env.coverage(polygon, cover)?;

        let RuntimeEnvironment {
            graph,
            cover_counts,
            ..
        } = env;
        let nodes = graph.nodes();
        let top_right_map = graph.top_right_map();
        let bottom_left_map = graph.bottom_left_map();

        for rectangle in cover.iter_mut() {
            trim_top(rectangle, nodes, top_right_map, cover_counts);
            trim_left(rectangle, nodes, bottom_left_map, cover_counts);
            trim_bottom(rectangle, nodes, bottom_left_map, cover_counts);
            trim_right(rectangle, nodes, top_right_map, cover_counts);
        }

        Ok(())
    }
}

fn trim_top(
    rectangle: &mut Rectangle,
    nodes: &[BaseRectNode],
    top_right_map: &PointNodeMap,
    counts: &mut [usize],
) {
    let Some(&start) = top_right_map.get(&rectangle.top_right()) else {
        return;
    };

    let mut anchor = start;
    loop {
        let anchor_node = &nodes[anchor];
        let strip_height = anchor_node.base.height();
        if strip_height >= rectangle.height() {
            // the last remaining strip is never trimmed away
            return;
        }

        // walk the top row leftward; it is removable only if every base in
        // it is covered elsewhere too
        let top_left = rectangle.top_left();
        let mut seen = Vec::new();
        let mut removable = true;
        let mut cursor = anchor;
        loop {
            if counts[cursor] == 1 {
                removable = false;
                break;
            }
            seen.push(cursor);
            if nodes[cursor].base.top_left() == top_left {
                break;
            }
            match nodes[cursor].left {
                Some(left) => cursor = left,
                None => {
                    removable = false;
                    break;
                }
            }
        }

        if !removable {
            return;
        }
        rectangle.shrink_down(strip_height);
        for id in seen {
            counts[id] -= 1;
        }
        match anchor_node.bottom {
            Some(below) => anchor = below,
            None => return,
        }
    }
}

fn trim_left(
    rectangle: &mut Rectangle,
    nodes: &[BaseRectNode],
    bottom_left_map: &PointNodeMap,
    counts: &mut [usize],
) {
    let Some(&start) = bottom_left_map.get(&rectangle.bottom_left()) else {
        return;
    };

    let mut anchor = start;
    loop {
        let anchor_node = &nodes[anchor];
        let strip_width = anchor_node.base.width();
        if strip_width >= rectangle.width() {
            return;
        }

        let top_left = rectangle.top_left();
        let mut seen = Vec::new();
        let mut removable = true;
        let mut cursor = anchor;
        loop {
            if counts[cursor] == 1 {
                removable = false;
                break;
            }
            seen.push(cursor);
            if nodes[cursor].base.top_left() == top_left {
                break;
            }
            match nodes[cursor].top {
                Some(top) => cursor = top,
                None => {
                    removable = false;
                    break;
                }
            }
        }

        if !removable {
            return;
        }
        rectangle.shrink_left(strip_width);
        for id in seen {
            counts[id] -= 1;
        }
        match anchor_node.right {
            Some(right) => anchor = right,
            None => return,
        }
    }
}

fn trim_bottom(
    rectangle: &mut Rectangle,
    nodes: &[BaseRectNode],
    bottom_left_map: &PointNodeMap,
    counts: &mut [usize],
) {
    let Some(&start) = bottom_left_map.get(&rectangle.bottom_left()) else {
        return;
    };

    let mut anchor = start;
    loop {
        let anchor_node = &nodes[anchor];
        let strip_height = anchor_node.base.height();
        if strip_height >= rectangle.height() {
            return;
        }

        let bottom_right = rectangle.bottom_right();
        let mut seen = Vec::new();
        let mut removable = true;
        let mut cursor = anchor;
        loop {
            if counts[cursor] == 1 {
                removable = false;
                break;
            }
            seen.push(cursor);
            if nodes[cursor].base.bottom_right() == bottom_right {
                break;
            }
            match nodes[cursor].right {
                Some(right) => cursor = right,
                None => {
                    removable = false;
                    break;
                }
            }
        }

        if !removable {
            return;
        }
        rectangle.shrink_up(strip_height);
        for id in seen {
            counts[id] -= 1;
        }
        match anchor_node.top {
            Some(top) => anchor = top,
            None => return,
        }
    }
}

fn trim_right(
    rectangle: &mut Rectangle,
    nodes: &[BaseRectNode],
    top_right_map: &PointNodeMap,
    counts: &mut [usize],
) {
    let Some(&start) = top_right_map.get(&rectangle.top_right()) else {
        return;
    };

    let mut anchor = start;
    loop {
        let anchor_node = &nodes[anchor];
        let strip_width = anchor_node.base.width();
        if strip_width >= rectangle.width() {
            return;
        }

        let bottom_right = rectangle.bottom_right();
        let mut seen = Vec::new();
        let mut removable = true;
        let mut cursor = anchor;
        loop {
            if counts[cursor] == 1 {
                removable = false;
                break;
            }
            seen.push(cursor);
            if nodes[cursor].base.bottom_right() == bottom_right {
                break;
            }
            match nodes[cursor].bottom {
                Some(below) => cursor = below,
                None => {
                    removable = false;
                    break;
                }
            }
        }

        if !removable {
            return;
        }
        rectangle.shrink_right(strip_width);
        for id in seen {
            counts[id] -= 1;
        }
        match anchor_node.left {
            Some(left) => anchor = left,
            None => return,
        }
    }
}
