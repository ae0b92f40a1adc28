use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace};
use polycover_geometry::{Direction, Point, PolygonWithHoles, Ray, RayHit, Segment};

use crate::concave::{self, ConcaveMap};
use crate::{extract, Costs, Cover, CoverProvider, Error, RuntimeEnvironment};

use super::partition_matching::independent_diagonal_set;

/// Minimum-cardinality partition of a polygon into interior-disjoint
/// rectangles.
///
/// Good diagonals (chords between axis-aligned concave vertices that stay in
/// the interior) are thinned to a maximum independent set of pairwise
/// non-crossing ones; every concave vertex not resolved by a diagonal gets an
/// arbitrary cut along one of its open directions. The final cut set plus
/// the polygon edges is fed through the planar arrangement, whose
/// rectangular faces are the partition.
#[derive(Debug, Default)]
pub struct PartitionAlgorithm;

impl CoverProvider for PartitionAlgorithm {
    fn cover_for(
        &self,
        polygon: &PolygonWithHoles,
        _costs: &Costs,
        _env: &mut RuntimeEnvironment,
    ) -> Result<Cover, Error> {
        info!("partition algorithm running");

        let concave_map = concave::find_concave_vertices(polygon);
        let mut handled: BTreeSet<Point> = BTreeSet::new();

        let good_diagonals = find_good_diagonals(polygon, &concave_map);
        let crossing_pairs = find_crossing_diagonals(&good_diagonals);

        let mut cuts = independent_diagonal_set(&crossing_pairs, &mut handled);

        let crossing: BTreeSet<Segment> = crossing_pairs
            .iter()
            .flat_map(|&(v, h)| [v, h])
            .collect();

        debug!("keeping non-crossing good diagonals");
        for &diagonal in &good_diagonals {
            if !crossing.contains(&diagonal) {
                cuts.push(diagonal);
                handled.insert(diagonal.source);
                handled.insert(diagonal.target);
            }
        }

        debug!("picking arbitrary cuts for remaining concave vertices");
        for (&vertex, directions) in &concave_map {
            if !handled.contains(&vertex) {
                let cut = pick_cut(polygon, vertex, directions, &cuts, &mut handled)?;
                cuts.push(cut);
            }
        }
        debug!("used {} cut(s)", cuts.len());

        let partition = extract::parse_rectangles(
            &extract::create_arrangement(polygon, &cuts)?,
            polygon,
        )?;

        info!("partition algorithm finished with {} rectangle(s)", partition.len());
        Ok(partition)
    }
}

/// All good diagonals: interior chords between two concave vertices sharing
/// an x or y coordinate whose open directions face each other.
fn find_good_diagonals(polygon: &PolygonWithHoles, concave_vertices: &ConcaveMap) -> Vec<Segment> {
    let mut x_aligned: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    let mut y_aligned: BTreeMap<i64, Vec<i64>> = BTreeMap::new();

    debug!("grouping aligned concave vertices");
    for vertex in concave_vertices.keys() {
        x_aligned.entry(vertex.y).or_default().push(vertex.x);
        y_aligned.entry(vertex.x).or_default().push(vertex.y);
    }
    for list in x_aligned.values_mut().chain(y_aligned.values_mut()) {
        list.sort_unstable();
    }

    let mut good_diagonals = Vec::new();
    debug!("finding good vertical diagonals");
    collect_good_diagonals(
        polygon,
        Direction::UP,
        &y_aligned,
        concave_vertices,
        &mut good_diagonals,
    );
    debug!("finding good horizontal diagonals");
    collect_good_diagonals(
        polygon,
        Direction::RIGHT,
        &x_aligned,
        concave_vertices,
        &mut good_diagonals,
    );

    good_diagonals
}

fn collect_good_diagonals(
    polygon: &PolygonWithHoles,
    positive: Direction,
    aligned: &BTreeMap<i64, Vec<i64>>,
    concave_vertices: &ConcaveMap,
    good_diagonals: &mut Vec<Segment>,
) {
    let negative = positive.rot180();
    let horizontal = positive.dy == 0;

    let at = |fixed: i64, variable: i64| {
        if horizontal {
            Point::new(variable, fixed)
        } else {
            Point::new(fixed, variable)
        }
    };

    for (&fixed, variables) in aligned {
        if variables.len() <= 1 {
            continue;
        }

        let mut i = 0usize;
        while i + 1 < variables.len() {
            let point = at(fixed, variables[i]);
            trace!("candidate good diagonal source: {point}");

            let open = &concave_vertices[&point];
            if !open.contains(&positive) {
                // not open towards the next aligned vertex; it may still be
                // the target of a diagonal from the vertex after it
                i += 1;
                continue;
            }

            let other = at(fixed, variables[i + 1]);
            let other_open = &concave_vertices[&other];
            if !other_open.contains(&negative) {
                i += 1;
                continue;
            }

            let diagonal = Segment::new(point, other);
            trace!("candidate good diagonal: {diagonal}");
            if is_valid_good_diagonal(&diagonal, polygon) {
                good_diagonals.push(diagonal);
            }

            // the pair is resolved either way; the target cannot also pair
            // with the vertex after it across this axis
            i += 2;
        }
    }
}

/// A diagonal is good when no polygon edge crosses its interior.
fn is_valid_good_diagonal(diagonal: &Segment, polygon: &PolygonWithHoles) -> bool {
    polygon
        .all_edges()
        .all(|edge| !intersects_interior(&edge, diagonal))
}

/// Whether two axis-aligned segments intersect beyond mere endpoint contact:
/// collinear overlap, or a crossing through either interior.
fn intersects_interior(first: &Segment, second: &Segment) -> bool {
    match (first.is_vertical(), second.is_vertical()) {
        (true, true) => {
            first.source.x == second.source.x
                && !(second.min_y() >= first.max_y() || second.max_y() <= first.min_y())
        }
        (false, false) => {
            first.source.y == second.source.y
                && !(second.min_x() >= first.max_x() || second.max_x() <= first.min_x())
        }
        (vertical, _) => {
            let (vertical_seg, horizontal_seg) = if vertical {
                (first, second)
            } else {
                (second, first)
            };
            let y = horizontal_seg.source.y;
            let x = vertical_seg.source.x;
            vertical_seg.min_y() < y
                && y < vertical_seg.max_y()
                && horizontal_seg.min_x() < x
                && x < horizontal_seg.max_x()
        }
    }
}

/// Pair up every vertical good diagonal with every horizontal one it
/// intersects (endpoint contact included).
fn find_crossing_diagonals(good_diagonals: &[Segment]) -> Vec<(Segment, Segment)> {
    debug!("determining crossing good diagonals");

    let verticals: Vec<&Segment> = good_diagonals.iter().filter(|d| d.is_vertical()).collect();
    let horizontals: Vec<&Segment> = good_diagonals.iter().filter(|d| d.is_horizontal()).collect();

    let mut crossings = Vec::new();
    for &vertical in &verticals {
        for &horizontal in &horizontals {
            if vertical.intersects(horizontal) {
                trace!("{vertical} and {horizontal} cross");
                crossings.push((*vertical, *horizontal));
            }
        }
    }
    crossings
}

/// One arbitrary cut for a leftover concave vertex: a ray along its first
/// open direction, stopped at the closest intersection with the boundary or
/// any previous cut.
fn pick_cut(
    polygon: &PolygonWithHoles,
    vertex: Point,
    directions: &[Direction; 2],
    previous_cuts: &[Segment],
    handled: &mut BTreeSet<Point>,
) -> Result<Segment, Error> {
    trace!("picking a cut for concave vertex {vertex}");
    handled.insert(vertex);

    let direction = directions[0];
    let ray = Ray::new(vertex, direction);

    let mut intersections: BTreeSet<Point> = BTreeSet::new();
    for edge in polygon.all_edges() {
        if let Some(RayHit::At(point)) = ray.intersect(&edge) {
            intersections.insert(point);
        }
    }
    for cut in previous_cuts {
        if let Some(RayHit::At(point)) = ray.intersect(cut) {
            intersections.insert(point);
        }
    }
    // the ray leaves through the vertex itself at parameter zero
    intersections.remove(&vertex);

    let closest = if direction.dx + direction.dy > 0 {
        intersections.first().copied()
    } else {
        intersections.last().copied()
    };
    let closest = closest.ok_or_else(|| {
        Error::InvalidInput(format!(
            "cut ray from concave vertex {vertex} towards {direction} misses the boundary"
        ))
    })?;

    trace!("picked cut {vertex} -> {closest}");
    Ok(Segment::new(vertex, closest))
}
