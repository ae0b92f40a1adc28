use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;

use crate::{Error, Point, Segment};

/// A planar subdivision induced by a set of axis-aligned segments.
///
/// Overlapping collinear segments are merged, and every segment endpoint and
/// crossing (including T-intersections) becomes a vertex. Bounded faces are
/// traced as counter-clockwise vertex cycles.
#[derive(Debug)]
pub struct Arrangement {
    faces: Vec<Vec<Point>>,
}

/// Per-line bookkeeping: the merged spans lying on the line and the
/// coordinates at which they must be split into elementary edges.
#[derive(Debug, Default)]
struct Line {
    spans: Vec<(i64, i64)>,
    cuts: BTreeSet<i64>,
}

impl Line {
    fn covers(&self, v: i64) -> bool {
        self.spans.iter().any(|&(lo, hi)| lo <= v && v <= hi)
    }
}

const DIR_RIGHT: usize = 0;
const DIR_UP: usize = 1;
const DIR_LEFT: usize = 2;
const DIR_DOWN: usize = 3;

type Adjacency = BTreeMap<Point, [Option<Point>; 4]>;

impl Arrangement {
    pub fn build(segments: &[Segment]) -> Result<Self, Error> {
        if segments.is_empty() {
            return Err(Error::EmptyArrangement);
        }

        let mut verticals: BTreeMap<i64, Line> = BTreeMap::new();
        let mut horizontals: BTreeMap<i64, Line> = BTreeMap::new();

        for segment in segments {
            if segment.is_vertical() {
                let line = verticals.entry(segment.source.x).or_default();
                line.spans.push((segment.min_y(), segment.max_y()));
                line.cuts.insert(segment.min_y());
                line.cuts.insert(segment.max_y());
            } else {
                let line = horizontals.entry(segment.source.y).or_default();
                line.spans.push((segment.min_x(), segment.max_x()));
                line.cuts.insert(segment.min_x());
                line.cuts.insert(segment.max_x());
            }
        }

        for line in verticals.values_mut().chain(horizontals.values_mut()) {
            merge_spans(&mut line.spans);
        }

        // Record every crossing as a cut on both participating lines.
        let mut crossings: Vec<(i64, i64)> = Vec::new();
        for (&x, vline) in &verticals {
            for (&y, hline) in &horizontals {
                if hline.covers(x) && vline.covers(y) {
                    crossings.push((x, y));
                }
            }
        }
        for (x, y) in crossings {
            if let Some(line) = verticals.get_mut(&x) {
                line.cuts.insert(y);
            }
            if let Some(line) = horizontals.get_mut(&y) {
                line.cuts.insert(x);
            }
        }

        let mut adjacency: Adjacency = BTreeMap::new();
        for (&x, line) in &verticals {
            for (a, b) in elementary(line) {
                link(&mut adjacency, Point::new(x, a), Point::new(x, b), DIR_UP);
            }
        }
        for (&y, line) in &horizontals {
            for (a, b) in elementary(line) {
                link(&mut adjacency, Point::new(a, y), Point::new(b, y), DIR_RIGHT);
            }
        }

        let faces = walk_faces(&adjacency);
        debug!(
            "arrangement: {} segment(s), {} vertices, {} bounded face(s)",
            segments.len(),
            adjacency.len(),
            faces.len()
        );

        Ok(Self { faces })
    }

    /// The outer boundary cycles of all bounded faces, each counter-clockwise.
    pub fn bounded_faces(&self) -> impl Iterator<Item = &[Point]> {
        self.faces.iter().map(Vec::as_slice)
    }
}

fn merge_spans(spans: &mut Vec<(i64, i64)>) {
    spans.sort_unstable();
    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(spans.len());
    for &(lo, hi) in spans.iter() {
        match merged.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    *spans = merged;
}

/// Elementary (vertex-free interior) intervals of a line's merged spans.
fn elementary(line: &Line) -> Vec<(i64, i64)> {
    let mut result = Vec::new();
    for &(lo, hi) in &line.spans {
        let mut prev = lo;
        for &cut in line.cuts.range((lo + 1)..hi) {
            result.push((prev, cut));
            prev = cut;
        }
        result.push((prev, hi));
    }
    result
}

/// Register the undirected elementary edge `a -> b` (with `dir` the direction
/// from `a` to `b`) in both directions.
fn link(adjacency: &mut Adjacency, a: Point, b: Point, dir: usize) {
    adjacency.entry(a).or_default()[dir] = Some(b);
    adjacency.entry(b).or_default()[(dir + 2) % 4] = Some(a);
}

/// Trace all face cycles.
///
/// From an incoming direction, the next edge is the first outgoing direction
/// clockwise from the incoming edge's reverse; with that rule every bounded
/// face comes out as a counter-clockwise cycle and the unbounded face as
/// clockwise cycles, which are discarded by their negative signed area.
fn walk_faces(adjacency: &Adjacency) -> Vec<Vec<Point>> {
    let mut visited: HashSet<(Point, usize)> = HashSet::new();
    let mut faces = Vec::new();

    for (&start, slots) in adjacency {
        for start_dir in 0..4 {
            if slots[start_dir].is_none() || visited.contains(&(start, start_dir)) {
                continue;
            }

            let mut cycle = Vec::new();
            let (mut at, mut dir) = (start, start_dir);
            loop {
                visited.insert((at, dir));
                cycle.push(at);
                let Some(next) = adjacency[&at][dir] else {
                    break;
                };

                let reverse = (dir + 2) % 4;
                let mut next_dir = reverse;
                for k in 1..=4 {
                    let candidate = (reverse + 4 - k) % 4;
                    if adjacency[&next][candidate].is_some() {
                        next_dir = candidate;
                        break;
                    }
                }

                at = next;
                dir = next_dir;
                if at == start && dir == start_dir {
                    break;
                }
            }

            if signed_area_doubled(&cycle) > 0 {
                faces.push(cycle);
            }
        }
    }

    faces
}

fn signed_area_doubled(cycle: &[Point]) -> i64 {
    let n = cycle.len();
    (0..n)
        .map(|i| {
            let a = cycle[i];
            let b = cycle[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: i64, ay: i64, bx: i64, by: i64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by))
    }

    fn square_edges(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<Segment> {
        vec![
            seg(x0, y0, x1, y0),
            seg(x1, y0, x1, y1),
            seg(x1, y1, x0, y1),
            seg(x0, y1, x0, y0),
        ]
    }

    #[test]
    fn square_has_one_bounded_face() {
        let arr = Arrangement::build(&square_edges(0, 0, 4, 4)).unwrap();
        let faces: Vec<_> = arr.bounded_faces().collect();
        assert_eq!(faces.len(), 1);
        assert_eq!(signed_area_doubled(faces[0]), 32);
    }

    #[test]
    fn crossing_cut_splits_square_into_two_faces() {
        let mut segments = square_edges(0, 0, 4, 4);
        segments.push(seg(2, 0, 2, 4));
        let arr = Arrangement::build(&segments).unwrap();
        assert_eq!(arr.bounded_faces().count(), 2);
    }

    #[test]
    fn t_intersections_and_overlaps_are_handled() {
        let mut segments = square_edges(0, 0, 4, 4);
        // two overlapping collinear cuts plus a T against the boundary
        segments.push(seg(2, 0, 2, 3));
        segments.push(seg(2, 1, 2, 4));
        segments.push(seg(0, 2, 2, 2));
        let arr = Arrangement::build(&segments).unwrap();
        assert_eq!(arr.bounded_faces().count(), 3);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(Arrangement::build(&[]), Err(Error::EmptyArrangement)));
    }
}
