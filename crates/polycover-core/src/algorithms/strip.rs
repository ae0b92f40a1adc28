use std::collections::BTreeSet;

use log::{info, trace};
use polycover_geometry::PolygonWithHoles;

use crate::{Costs, Cover, CoverProvider, Error, Rectangle, RuntimeEnvironment};

/// Cover a polygon with maximal horizontal strips.
///
/// An adaptation of the Kumar–Ramesh strip construction to the base
/// rectangle graph: for every node without a top neighbor, expand left and
/// right while the neighboring columns are at least as tall, then take the
/// full-height strip under that span. Duplicate strips are dropped.
#[derive(Debug, Default)]
pub struct StripAlgorithm;

impl CoverProvider for StripAlgorithm {
    fn cover_for(
        &self,
        polygon: &PolygonWithHoles,
        _costs: &Costs,
        env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error> {
        info!("strip algorithm running");

        let graph = env.graph(polygon)?;
        let nodes = graph.nodes();
        let heights = graph.node_heights();

        let mut cover: BTreeSet<Rectangle> = BTreeSet::new();
        for (i, node) in nodes.iter().enumerate() {
            if node.top.is_some() {
                continue;
            }
            let height = heights[i];
            trace!("node {i} with height {height} has no top neighbor");

            let mut left = i;
            while let Some(l) = nodes[left].left {
                if heights[l] < height {
                    break;
                }
                left = l;
            }
            let mut right = i;
            while let Some(r) = nodes[right].right {
                if heights[r] < height {
                    break;
                }
                right = r;
            }

            let mut bottom_left = left;
            for _ in 0..height {
                match nodes[bottom_left].bottom {
                    Some(below) => bottom_left = below,
                    None => break,
                }
            }

            let strip = Rectangle::spanning(
                nodes[bottom_left].base.bottom_left(),
                nodes[right].base.top_right(),
            );
            trace!("found strip {strip}");
            cover.insert(strip);
        }

        Ok(cover.into_iter().collect())
    }
}
