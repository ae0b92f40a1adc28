//! Concave-vertex detection and cut rays.
//!
//! A polygon vertex is concave when its interior angle exceeds 180 degrees.
//! Every concave vertex carries the two axis directions facing the interior,
//! along which cut rays are shot to slice the polygon into base rectangles.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::trace;
use polycover_geometry::{Direction, Point, Polygon, PolygonWithHoles, Ray, RayHit, Segment};

/// Concave vertices mapped to their two open (interior-facing) directions.
///
/// Iteration order is discovery order: outer boundary first, then each hole
/// in turn, following edge order. Later passes that pick one cut per leftover
/// concave vertex rely on this order being deterministic.
pub type ConcaveMap = IndexMap<Point, [Direction; 2]>;

/// Find the concave vertices of a polygon with holes.
///
/// Hole vertices that are concave with respect to the overall region are
/// merged in by symmetric difference: a vertex found on both the outer
/// boundary and a hole is dropped.
pub fn find_concave_vertices(polygon: &PolygonWithHoles) -> ConcaveMap {
    trace!("finding concave vertices of polygon with holes");

    let mut concave = find_concave_vertices_of_ring(polygon.outer());

    for hole in polygon.holes() {
        for (vertex, directions) in find_concave_vertices_of_ring(hole) {
            if concave.shift_remove(&vertex).is_none() {
                concave.insert(vertex, directions);
            }
        }
    }

    concave
}

/// Find the concave vertices of a single boundary ring.
pub fn find_concave_vertices_of_ring(ring: &Polygon) -> ConcaveMap {
    let mut concave = ConcaveMap::new();

    let edges: Vec<Segment> = ring.edges().collect();
    for (i, edge) in edges.iter().enumerate() {
        let next = &edges[(i + 1) % edges.len()];
        if let Some((vertex, directions)) = concave_vertex_of(edge, next) {
            trace!("edge {edge} has concave vertex {vertex}");
            concave.insert(vertex, directions);
        }
    }

    trace!("{} concave vertices found", concave.len());
    concave
}

/// The shared endpoint of two consecutive edges, with its open directions,
/// if the turn there is concave.
pub fn concave_vertex_of(edge: &Segment, next_edge: &Segment) -> Option<(Point, [Direction; 2])> {
    let direction = edge.direction().normalize();

    if next_edge.direction().normalize() != direction.rot270() {
        return None;
    }

    Some((edge.target, [direction, direction.rot90()]))
}

/// The closest intersection of a cut ray with the polygon boundary.
///
/// Edges incident to the ray's source are ignored. Among the candidate hits,
/// rays going up or right take the lexicographically smallest point and rays
/// going down or left the largest; that is the closest point along the ray
/// either way.
pub fn closest_intersection(ray: &Ray, polygon: &PolygonWithHoles) -> Option<Point> {
    let mut intersections: BTreeSet<Point> = BTreeSet::new();

    for edge in polygon.all_edges() {
        if edge.source == ray.source || edge.target == ray.source {
            continue;
        }
        match ray.intersect(&edge) {
            Some(RayHit::At(point)) => {
                intersections.insert(point);
            }
            Some(RayHit::Along(overlap)) => {
                intersections.insert(overlap.source);
                intersections.insert(overlap.target);
            }
            None => {}
        }
    }

    if ray.direction.dx > 0 || ray.direction.dy > 0 {
        intersections.first().copied()
    } else {
        intersections.last().copied()
    }
}
