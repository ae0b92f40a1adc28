use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use crate::{Error, Point, Polygon, PolygonWithHoles};

const DIR_RIGHT: usize = 0;
const DIR_UP: usize = 1;
const DIR_LEFT: usize = 2;
const DIR_DOWN: usize = 3;

/// Assemble the union of interior-disjoint axis-aligned boxes into polygons
/// with holes, one per connected component.
///
/// Boxes are `(bottom_left, top_right)` corner pairs. Boundary pieces shared
/// by two boxes cancel; the surviving edges are linked into cycles with the
/// region kept on the left, so outer boundaries come out counter-clockwise
/// and holes clockwise. Components touching only in a corner point are
/// reported as separate polygons, and holes touching only in a corner stay
/// separate holes.
pub fn assemble_regions(boxes: &[(Point, Point)]) -> Result<Vec<PolygonWithHoles>, Error> {
    if boxes.is_empty() {
        return Ok(Vec::new());
    }

    // signed side coverage per line: +1 where the region lies on the
    // positive side of the line, -1 where it lies on the negative side
    let mut verticals: BTreeMap<i64, Vec<SignedSpan>> = BTreeMap::new();
    let mut horizontals: BTreeMap<i64, Vec<SignedSpan>> = BTreeMap::new();
    for (index, &(bl, tr)) in boxes.iter().enumerate() {
        verticals.entry(bl.x).or_default().push(SignedSpan {
            lo: bl.y,
            hi: tr.y,
            sign: 1,
            owner: index,
        });
        verticals.entry(tr.x).or_default().push(SignedSpan {
            lo: bl.y,
            hi: tr.y,
            sign: -1,
            owner: index,
        });
        horizontals.entry(bl.y).or_default().push(SignedSpan {
            lo: bl.x,
            hi: tr.x,
            sign: 1,
            owner: index,
        });
        horizontals.entry(tr.y).or_default().push(SignedSpan {
            lo: bl.x,
            hi: tr.x,
            sign: -1,
            owner: index,
        });
    }

    let components = connected_components(boxes.len(), &verticals, &horizontals);
    let pinches = PinchResolver::new(boxes, &components);

    let mut adjacency: BTreeMap<Point, [Option<Point>; 4]> = BTreeMap::new();
    for (&x, spans) in &verticals {
        for (lo, hi, net) in boundary_intervals(spans) {
            let (a, b) = (Point::new(x, lo), Point::new(x, hi));
            if net > 0 {
                // region to the right only: traverse downward
                set_edge(&mut adjacency, b, DIR_DOWN, a)?;
            } else {
                set_edge(&mut adjacency, a, DIR_UP, b)?;
            }
        }
    }
    for (&y, spans) in &horizontals {
        for (lo, hi, net) in boundary_intervals(spans) {
            let (a, b) = (Point::new(lo, y), Point::new(hi, y));
            if net > 0 {
                // region above only: traverse rightward
                set_edge(&mut adjacency, a, DIR_RIGHT, b)?;
            } else {
                set_edge(&mut adjacency, b, DIR_LEFT, a)?;
            }
        }
    }

    let cycles = walk_cycles(&adjacency, &pinches)?;

    let mut outers: Vec<Polygon> = Vec::new();
    let mut holes: Vec<(Polygon, Point)> = Vec::new();
    for cycle in cycles {
        let area2 = signed_area_doubled(&cycle);
        let anchor = hole_anchor(&cycle);
        let polygon = Polygon::new(cycle)?;
        if area2 > 0 {
            outers.push(polygon);
        } else {
            holes.push((polygon, anchor));
        }
    }
    trace!(
        "assembled {} outer cycle(s), {} hole cycle(s) from {} box(es)",
        outers.len(),
        holes.len(),
        boxes.len()
    );

    let mut hole_sets: Vec<Vec<Polygon>> = vec![Vec::new(); outers.len()];
    for (hole, anchor) in holes {
        // anchor is a doubled-coordinate point strictly inside the hole
        let owner = outers
            .iter()
            .position(|o| o.contains_half_grid(anchor.x, anchor.y));
        match owner {
            Some(i) => hole_sets[i].push(hole),
            None => {
                let v = hole.vertices()[0];
                return Err(Error::UnclosedBoundary(v.x, v.y));
            }
        }
    }

    Ok(outers
        .into_iter()
        .zip(hole_sets)
        .map(|(outer, hole_set)| PolygonWithHoles::new(outer, hole_set))
        .collect())
}

#[derive(Debug, Clone, Copy)]
struct SignedSpan {
    lo: i64,
    hi: i64,
    sign: i64,
    owner: usize,
}

/// Collapse a line's signed spans into maximal boundary intervals.
///
/// Splits at every span endpoint, sums the signs per elementary interval
/// (disjoint boxes make the sum -1, 0 or +1), and re-merges runs with equal
/// non-zero sum.
fn boundary_intervals(spans: &[SignedSpan]) -> Vec<(i64, i64, i64)> {
    let mut stops: BTreeSet<i64> = BTreeSet::new();
    for span in spans {
        stops.insert(span.lo);
        stops.insert(span.hi);
    }
    let stops: Vec<i64> = stops.into_iter().collect();

    let mut result: Vec<(i64, i64, i64)> = Vec::new();
    for window in stops.windows(2) {
        let (a, b) = (window[0], window[1]);
        let net: i64 = spans
            .iter()
            .filter(|span| span.lo <= a && b <= span.hi)
            .map(|span| span.sign)
            .sum();
        if net == 0 {
            continue;
        }
        match result.last_mut() {
            Some(last) if last.1 == a && last.2 == net => last.1 = b,
            _ => result.push((a, b, net)),
        }
    }
    result
}

/// Union-find of boxes over shared positive-length boundary pieces.
fn connected_components(
    count: usize,
    verticals: &BTreeMap<i64, Vec<SignedSpan>>,
    horizontals: &BTreeMap<i64, Vec<SignedSpan>>,
) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..count).collect();

    fn find(parent: &mut Vec<usize>, mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for spans in verticals.values().chain(horizontals.values()) {
        for a in spans {
            for b in spans {
                // a box's right/top side against another's left/bottom side
                if a.sign == -1 && b.sign == 1 && a.lo.max(b.lo) < a.hi.min(b.hi) {
                    let (ra, rb) = (find(&mut parent, a.owner), find(&mut parent, b.owner));
                    parent[ra] = rb;
                }
            }
        }
    }

    (0..count).map(|i| find(&mut parent, i)).collect()
}

/// Resolves the continuation at pinch vertices (four boundary edges around
/// one point).
///
/// Such a vertex has two diagonally opposite quadrants covered. When both
/// covered quadrants belong to the same connected component, the pinch
/// squeezes the region between two holes (or a hole and the outside) and
/// the walk must turn right to keep each cavity's cycle simple; when they
/// belong to different components, two boxes touch corners and the walk
/// must turn left to keep the components' boundaries separate.
struct PinchResolver {
    bottom_left: BTreeMap<Point, usize>,
    top_right: BTreeMap<Point, usize>,
    bottom_right: BTreeMap<Point, usize>,
    top_left: BTreeMap<Point, usize>,
}

impl PinchResolver {
    fn new(boxes: &[(Point, Point)], components: &[usize]) -> Self {
        let mut resolver = Self {
            bottom_left: BTreeMap::new(),
            top_right: BTreeMap::new(),
            bottom_right: BTreeMap::new(),
            top_left: BTreeMap::new(),
        };
        for (index, &(bl, tr)) in boxes.iter().enumerate() {
            let component = components[index];
            resolver.bottom_left.insert(bl, component);
            resolver.top_right.insert(tr, component);
            resolver
                .bottom_right
                .insert(Point::new(tr.x, bl.y), component);
            resolver.top_left.insert(Point::new(bl.x, tr.y), component);
        }
        resolver
    }

    /// Whether the two covered quadrants at a pinch vertex belong to one
    /// component. `None` when the vertex is not a pinch between two boxes.
    fn same_component(&self, vertex: Point) -> Option<bool> {
        // covered north-east and south-west quadrants: the vertex is one
        // box's bottom-left corner and another's top-right
        if let (Some(&ne), Some(&sw)) = (self.bottom_left.get(&vertex), self.top_right.get(&vertex))
        {
            return Some(ne == sw);
        }
        // covered north-west and south-east quadrants
        if let (Some(&nw), Some(&se)) =
            (self.bottom_right.get(&vertex), self.top_left.get(&vertex))
        {
            return Some(nw == se);
        }
        None
    }
}

/// Walk all boundary cycles. Ordinary vertices have exactly one outgoing
/// edge; at pinch vertices the [`PinchResolver`] decides the turn.
fn walk_cycles(
    adjacency: &BTreeMap<Point, [Option<Point>; 4]>,
    pinches: &PinchResolver,
) -> Result<Vec<Vec<Point>>, Error> {
    let mut visited: BTreeSet<(Point, usize)> = BTreeSet::new();
    let mut cycles = Vec::new();

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
                    return Err(Error::UnclosedBoundary(at.x, at.y));
                };

                let slots = adjacency
                    .get(&next)
                    .ok_or(Error::UnclosedBoundary(next.x, next.y))?;
                let outgoing: Vec<usize> = (0..4).filter(|&d| slots[d].is_some()).collect();
                let next_dir = match outgoing.as_slice() {
                    [only] => *only,
                    [_, _] => {
                        let same = pinches
                            .same_component(next)
                            .ok_or(Error::UnclosedBoundary(next.x, next.y))?;
                        if same {
                            (dir + 3) % 4 // turn right
                        } else {
                            (dir + 1) % 4 // turn left
                        }
                    }
                    _ => return Err(Error::UnclosedBoundary(next.x, next.y)),
                };
                if slots[next_dir].is_none() {
                    return Err(Error::UnclosedBoundary(next.x, next.y));
                }

                at = next;
                dir = next_dir;
                if at == start && dir == start_dir {
                    break;
                }
            }
            cycles.push(cycle);
        }
    }

    Ok(cycles)
}

/// A doubled-coordinate point strictly inside the region bounded by a hole
/// cycle: half a unit above the midpoint of any of its leftward (bottom)
/// edges.
fn hole_anchor(cycle: &[Point]) -> Point {
    let n = cycle.len();
    for i in 0..n {
        let a = cycle[i];
        let b = cycle[(i + 1) % n];
        if a.y == b.y && b.x < a.x {
            return Point::new(a.x + b.x, 2 * a.y + 1);
        }
    }
    // cycles produced by walk_cycles always contain a leftward edge
    Point::new(2 * cycle[0].x + 1, 2 * cycle[0].y + 1)
}

fn set_edge(
    adjacency: &mut BTreeMap<Point, [Option<Point>; 4]>,
    from: Point,
    dir: usize,
    to: Point,
) -> Result<(), Error> {
    let slot = &mut adjacency.entry(from).or_default()[dir];
    if slot.is_some() {
        // two boundary edges leaving one vertex in the same direction means
        // the boxes were not interior-disjoint
        return Err(Error::UnclosedBoundary(from.x, from.y));
    }
    *slot = Some(to);
    Ok(())
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
