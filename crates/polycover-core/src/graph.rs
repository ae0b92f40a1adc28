//! The base-rectangle graph (BRG).
//!
//! Base rectangles are linked into a grid graph: two nodes are left/right
//! neighbors when they share a full vertical edge and top/bottom neighbors
//! when they share a full horizontal edge. Nodes live in one dense vector
//! and refer to each other by index; two corner maps allow point lookups.

use indexmap::IndexMap;
use log::{info, trace};
use polycover_geometry::{Point, PolygonWithHoles};

use crate::{extract, Error, Rectangle};

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct BaseRectNode {
    pub base: Rectangle,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub top: Option<NodeId>,
    pub bottom: Option<NodeId>,
}

impl BaseRectNode {
    fn new(base: Rectangle) -> Self {
        Self {
            base,
            left: None,
            right: None,
            top: None,
            bottom: None,
        }
    }
}

pub type PointNodeMap = IndexMap<Point, NodeId>;

#[derive(Debug, Default)]
pub struct BaseRectGraph {
    nodes: Vec<BaseRectNode>,
    bottom_left: PointNodeMap,
    top_right: PointNodeMap,
}

impl BaseRectGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygon(polygon: &PolygonWithHoles) -> Result<Self, Error> {
        let mut graph = Self::new();
        graph.build(extract::base_rectangles(polygon)?);
        Ok(graph)
    }

    /// Rebuild the graph from a set of base rectangles.
    ///
    /// Rectangles are inserted sorted by top-left corner (x ascending, then y
    /// descending), so each node's left and top neighbors are already present
    /// when it is inserted: the left neighbor is the node whose top-right
    /// corner equals this node's top-left, the top neighbor the node whose
    /// bottom-left corner does.
    pub fn build(&mut self, mut base_rectangles: Vec<Rectangle>) {
        info!(
            "building base rect graph with {} node(s)",
            base_rectangles.len()
        );
        self.clear();
        self.nodes.reserve(base_rectangles.len());

        base_rectangles.sort_by(|first, second| {
            let (a, b) = (first.top_left(), second.top_left());
            a.x.cmp(&b.x).then(b.y.cmp(&a.y))
        });

        for rectangle in base_rectangles {
            let id = self.nodes.len();
            let mut node = BaseRectNode::new(rectangle);
            let top_left = rectangle.top_left();

            if let Some(&left) = self.top_right.get(&top_left) {
                node.left = Some(left);
                self.nodes[left].right = Some(id);
            }
            if let Some(&top) = self.bottom_left.get(&top_left) {
                node.top = Some(top);
                self.nodes[top].bottom = Some(id);
            }

            self.bottom_left.insert(rectangle.bottom_left(), id);
            self.top_right.insert(rectangle.top_right(), id);
            self.nodes.push(node);
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[BaseRectNode] {
        &self.nodes
    }

    #[must_use]
    pub fn bottom_left_map(&self) -> &PointNodeMap {
        &self.bottom_left
    }

    #[must_use]
    pub fn top_right_map(&self) -> &PointNodeMap {
        &self.top_right
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.bottom_left.clear();
        self.top_right.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes whose base rectangles lie inside the query
    /// rectangle `[bottom_left, top_right]`.
    ///
    /// The walk starts at the node under the query's top-right corner and
    /// proceeds column-major: down a column while the bases stay above the
    /// query bottom, then left to the top of the next column. The query
    /// corners must be corners of the base subdivision; otherwise the
    /// iterator is empty.
    #[must_use]
    pub fn contained(&self, top_right: Point, bottom_left: Point) -> ContainedNodes<'_> {
        let start = self.top_right.get(&top_right).copied();
        ContainedNodes {
            graph: self,
            state: start.map(|id| (id, id)),
            bottom_left,
        }
    }

    /// For each node, the length of the longest downward chain ending at it.
    #[must_use]
    pub fn node_heights(&self) -> Vec<usize> {
        let mut heights = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if node.bottom.is_some() {
                continue;
            }
            let mut height = 0usize;
            let mut above = self.nodes[i].top;
            while let Some(id) = above {
                height += 1;
                heights[id] = height;
                above = self.nodes[id].top;
            }
        }
        heights
    }

    /// Every rectangle that is a union of base rectangles.
    ///
    /// For each node, rectangles are emitted with that node's top-right
    /// corner fixed, walking left over the columns and down each column as
    /// far as the clamped column height allows.
    #[must_use]
    pub fn all_rectangles(&self) -> Vec<Rectangle> {
        let heights = self.node_heights();
        let mut rectangles = Vec::new();

        for (i, node) in self.nodes.iter().enumerate() {
            let top_right = node.base.top_right();
            trace!("enumerating rectangles with top-right base {}", node.base);

            let mut max_height = heights[i];
            let mut left = Some(i);
            while let Some(column) = left {
                max_height = max_height.min(heights[column]);
                let mut down = column;
                for depth in 0..=max_height {
                    rectangles.push(Rectangle::spanning(
                        self.nodes[down].base.bottom_left(),
                        top_right,
                    ));
                    if depth < max_height {
                        match self.nodes[down].bottom {
                            Some(below) => down = below,
                            None => break,
                        }
                    }
                }
                left = self.nodes[column].left;
            }
        }

        rectangles
    }

    /// The number of rectangles [`BaseRectGraph::all_rectangles`] yields,
    /// without materializing them.
    #[must_use]
    pub fn count_all_rectangles(&self) -> usize {
        let heights = self.node_heights();
        let mut count = 0usize;

        for (i, _) in self.nodes.iter().enumerate() {
            let mut max_height = heights[i];
            let mut left = Some(i);
            while let Some(column) = left {
                max_height = max_height.min(heights[column]);
                count += max_height + 1;
                left = self.nodes[column].left;
            }
        }

        count
    }

    /// All union rectangles that cannot be extended in any direction.
    #[must_use]
    pub fn maximal_rectangles(&self) -> Vec<Rectangle> {
        let heights = self.node_heights();
        let mut rectangles = std::collections::BTreeSet::new();

        for (i, node) in self.nodes.iter().enumerate() {
            if node.top.is_some() {
                continue;
            }

            for depth in 0..=heights[i] {
                let mut left = i;
                let mut right = i;
                let mut min_height = heights[i];

                while let Some(l) = self.nodes[left].left {
                    if heights[l] < depth {
                        break;
                    }
                    min_height = min_height.min(heights[l]);
                    left = l;
                }
                while let Some(r) = self.nodes[right].right {
                    if heights[r] < depth {
                        break;
                    }
                    min_height = min_height.min(heights[r]);
                    right = r;
                }

                // expanding any further would cut into a shorter column
                if min_height == depth {
                    let mut bottom_left = left;
                    for _ in 0..depth {
                        match self.nodes[bottom_left].bottom {
                            Some(below) => bottom_left = below,
                            None => break,
                        }
                    }
                    rectangles.insert(Rectangle::spanning(
                        self.nodes[bottom_left].base.bottom_left(),
                        self.nodes[right].base.top_right(),
                    ));
                }
            }
        }

        rectangles.into_iter().collect()
    }
}

/// Iterator over the nodes contained in a query rectangle; see
/// [`BaseRectGraph::contained`].
pub struct ContainedNodes<'a> {
    graph: &'a BaseRectGraph,
    /// `(top of current column, cursor)`; `None` when exhausted.
    state: Option<(NodeId, NodeId)>,
    bottom_left: Point,
}

impl Iterator for ContainedNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let (column, cursor) = self.state?;
        let nodes = self.graph.nodes();

        let below = nodes[cursor].bottom;
        let descend = nodes[cursor].base.bottom_left().y > self.bottom_left.y && below.is_some();
        self.state = if descend {
            below.map(|id| (column, id))
        } else {
            let left = nodes[column].left;
            let step_left =
                nodes[column].base.bottom_left().x > self.bottom_left.x && left.is_some();
            if step_left {
                left.map(|id| (id, id))
            } else {
                None
            }
        };

        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycover_geometry::Polygon;

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Rectangle {
        Rectangle::new(x0, y0, x1, y1).unwrap()
    }

    /// 2x2 grid of unit squares.
    fn unit_grid() -> BaseRectGraph {
        let mut graph = BaseRectGraph::new();
        graph.build(vec![
            rect(0, 0, 1, 1),
            rect(1, 0, 2, 1),
            rect(0, 1, 1, 2),
            rect(1, 1, 2, 2),
        ]);
        graph
    }

    fn l_shape_graph() -> BaseRectGraph {
        let l = PolygonWithHoles::new(
            Polygon::new(
                [(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)]
                    .iter()
                    .map(|&(x, y)| Point::new(x, y))
                    .collect(),
            )
            .unwrap(),
            vec![],
        );
        BaseRectGraph::from_polygon(&l).unwrap()
    }

    #[test]
    fn corner_maps_index_every_node() {
        let graph = unit_grid();
        for (id, node) in graph.nodes().iter().enumerate() {
            assert_eq!(graph.bottom_left_map()[&node.base.bottom_left()], id);
            assert_eq!(graph.top_right_map()[&node.base.top_right()], id);
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = unit_grid();
        for (id, node) in graph.nodes().iter().enumerate() {
            if let Some(right) = node.right {
                assert_eq!(graph.nodes()[right].left, Some(id));
            }
            if let Some(top) = node.top {
                assert_eq!(graph.nodes()[top].bottom, Some(id));
            }
        }
        // every interior edge of the 2x2 grid is linked
        let linked = graph
            .nodes()
            .iter()
            .flat_map(|n| [n.left, n.right, n.top, n.bottom])
            .flatten()
            .count();
        assert_eq!(linked, 8);
    }

    #[test]
    fn contained_iterator_visits_each_node_once() {
        let graph = unit_grid();
        let ids: Vec<NodeId> = graph
            .contained(Point::new(2, 2), Point::new(0, 0))
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn contained_iterator_respects_query_bounds() {
        let graph = unit_grid();
        let ids: Vec<NodeId> = graph
            .contained(Point::new(2, 2), Point::new(1, 1))
            .collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(graph.nodes()[ids[0]].base, rect(1, 1, 2, 2));
    }

    #[test]
    fn contained_iterator_is_empty_for_unknown_corner() {
        let graph = unit_grid();
        assert_eq!(
            graph
                .contained(Point::new(3, 3), Point::new(0, 0))
                .count(),
            0
        );
    }

    #[test]
    fn node_heights_count_downward_chains() {
        let graph = unit_grid();
        for (id, node) in graph.nodes().iter().enumerate() {
            let expected = if node.bottom.is_some() { 1 } else { 0 };
            assert_eq!(graph.node_heights()[id], expected);
        }
    }

    #[test]
    fn all_rectangles_of_unit_grid() {
        let graph = unit_grid();
        let mut all = graph.all_rectangles();
        all.sort();
        all.dedup();
        // 4 units, 2 horizontal dominoes, 2 vertical dominoes, 1 full square
        assert_eq!(all.len(), 9);
        assert_eq!(graph.count_all_rectangles(), 9);
        assert!(all.contains(&rect(0, 0, 2, 2)));
        assert!(all.contains(&rect(0, 0, 2, 1)));
        assert!(all.contains(&rect(1, 0, 2, 2)));
    }

    #[test]
    fn all_rectangles_of_l_shape() {
        let graph = l_shape_graph();
        let mut all = graph.all_rectangles();
        all.sort();
        all.dedup();
        // 3 bases + the two dominoes spanning the corner
        assert_eq!(all.len(), 5);
        assert!(all.contains(&rect(0, 0, 4, 2)));
        assert!(all.contains(&rect(0, 0, 2, 4)));
    }

    #[test]
    fn maximal_rectangles_of_l_shape() {
        let graph = l_shape_graph();
        let maximal = graph.maximal_rectangles();
        assert_eq!(maximal, vec![rect(0, 0, 2, 4), rect(0, 0, 4, 2)]);
    }
}
