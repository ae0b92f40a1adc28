//! Maximum independent set of crossing good diagonals.
//!
//! Vertical and horizontal good diagonals form a bipartite graph with an
//! edge per crossing. A maximum set of pairwise non-crossing diagonals is a
//! maximum independent set of that graph, which by König's theorem is the
//! complement of a minimum vertex cover derived from a maximum matching:
//! verticals reachable from an unmatched vertical by alternating paths plus
//! horizontals not so reachable. This is the same set a max-flow/min-cut
//! formulation with unit capacities selects from its residual graph.

use std::collections::BTreeSet;

use log::{debug, trace};
use polycover_geometry::{Point, Segment};

/// Pick the kept diagonals from the crossing pairs and mark their endpoints
/// as handled concave vertices.
pub fn independent_diagonal_set(
    crossing_pairs: &[(Segment, Segment)],
    handled: &mut BTreeSet<Point>,
) -> Vec<Segment> {
    if crossing_pairs.is_empty() {
        debug!("no crossing good diagonals, nothing to thin");
        return Vec::new();
    }

    let graph = BipartiteGraph::from_pairs(crossing_pairs);
    let matching = graph.maximum_matching();
    let reachable = graph.alternating_reachability(&matching);

    let mut kept = Vec::new();
    for (i, &vertical) in graph.verticals.iter().enumerate() {
        if reachable.left[i] {
            trace!("keeping vertical diagonal {vertical}");
            kept.push(vertical);
        }
    }
    for (j, &horizontal) in graph.horizontals.iter().enumerate() {
        if !reachable.right[j] {
            trace!("keeping horizontal diagonal {horizontal}");
            kept.push(horizontal);
        }
    }

    for diagonal in &kept {
        handled.insert(diagonal.source);
        handled.insert(diagonal.target);
    }

    debug!(
        "kept {} of {} crossing diagonal(s)",
        kept.len(),
        graph.verticals.len() + graph.horizontals.len()
    );
    kept
}

struct BipartiteGraph {
    verticals: Vec<Segment>,
    horizontals: Vec<Segment>,
    /// For each vertical, the indices of the horizontals it crosses.
    edges: Vec<Vec<usize>>,
}

struct Matching {
    /// Per vertical: its matched horizontal.
    left: Vec<Option<usize>>,
    /// Per horizontal: its matched vertical.
    right: Vec<Option<usize>>,
}

struct Reachability {
    left: Vec<bool>,
    right: Vec<bool>,
}

impl BipartiteGraph {
    fn from_pairs(pairs: &[(Segment, Segment)]) -> Self {
        let mut verticals: Vec<Segment> = Vec::new();
        let mut horizontals: Vec<Segment> = Vec::new();
        let mut edges: Vec<Vec<usize>> = Vec::new();

        let mut index_of = |list: &mut Vec<Segment>, segment: Segment| match list
            .iter()
            .position(|&s| s == segment)
        {
            Some(i) => i,
            None => {
                list.push(segment);
                list.len() - 1
            }
        };

        for &(vertical, horizontal) in pairs {
            let v = index_of(&mut verticals, vertical);
            let h = index_of(&mut horizontals, horizontal);
            if edges.len() <= v {
                edges.resize_with(v + 1, Vec::new);
            }
            if !edges[v].contains(&h) {
                edges[v].push(h);
            }
        }

        Self {
            verticals,
            horizontals,
            edges,
        }
    }

    /// Kuhn's augmenting-path maximum matching.
    fn maximum_matching(&self) -> Matching {
        let mut matching = Matching {
            left: vec![None; self.verticals.len()],
            right: vec![None; self.horizontals.len()],
        };

        for v in 0..self.verticals.len() {
            let mut seen = vec![false; self.horizontals.len()];
            self.try_augment(v, &mut seen, &mut matching);
        }

        matching
    }

    fn try_augment(&self, v: usize, seen: &mut [bool], matching: &mut Matching) -> bool {
        for &h in &self.edges[v] {
            if seen[h] {
                continue;
            }
            seen[h] = true;
            let free = match matching.right[h] {
                None => true,
                Some(owner) => self.try_augment(owner, seen, matching),
            };
            if free {
                matching.left[v] = Some(h);
                matching.right[h] = Some(v);
                return true;
            }
        }
        false
    }

    /// Vertices reachable from unmatched verticals by alternating paths:
    /// vertical -> horizontal over any crossing, horizontal -> vertical only
    /// over a matching edge.
    fn alternating_reachability(&self, matching: &Matching) -> Reachability {
        let mut reach = Reachability {
            left: vec![false; self.verticals.len()],
            right: vec![false; self.horizontals.len()],
        };

        let mut stack: Vec<usize> = (0..self.verticals.len())
            .filter(|&v| matching.left[v].is_none())
            .collect();
        for &v in &stack {
            reach.left[v] = true;
        }

        while let Some(v) = stack.pop() {
            for &h in &self.edges[v] {
                if reach.right[h] {
                    continue;
                }
                reach.right[h] = true;
                if let Some(owner) = matching.right[h] {
                    if !reach.left[owner] {
                        reach.left[owner] = true;
                        stack.push(owner);
                    }
                }
            }
        }

        reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: i64, ay: i64, bx: i64, by: i64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by))
    }

    #[test]
    fn single_crossing_keeps_one_diagonal() {
        let vertical = seg(2, 0, 2, 4);
        let horizontal = seg(0, 2, 4, 2);
        let mut handled = BTreeSet::new();
        let kept = independent_diagonal_set(&[(vertical, horizontal)], &mut handled);
        assert_eq!(kept.len(), 1);
        assert_eq!(handled.len(), 2);
    }

    #[test]
    fn star_crossing_keeps_the_independent_side() {
        // one vertical crossing three horizontals: the horizontals are
        // pairwise non-crossing, so all three survive and the vertical goes
        let vertical = seg(5, 0, 5, 10);
        let horizontals = [seg(0, 2, 9, 2), seg(0, 5, 9, 5), seg(0, 8, 9, 8)];
        let pairs: Vec<_> = horizontals.iter().map(|&h| (vertical, h)).collect();
        let mut handled = BTreeSet::new();
        let kept = independent_diagonal_set(&pairs, &mut handled);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(Segment::is_horizontal));
    }

    #[test]
    fn two_disjoint_crossings_keep_one_each() {
        let pairs = [
            (seg(2, 0, 2, 4), seg(0, 2, 4, 2)),
            (seg(12, 0, 12, 4), seg(10, 2, 14, 2)),
        ];
        let mut handled = BTreeSet::new();
        let kept = independent_diagonal_set(&pairs, &mut handled);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn empty_input_keeps_nothing() {
        let mut handled = BTreeSet::new();
        assert!(independent_diagonal_set(&[], &mut handled).is_empty());
        assert!(handled.is_empty());
    }
}
