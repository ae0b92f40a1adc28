//! Base-rectangle extraction.
//!
//! The base rectangles of a polygon are the bounded rectangular faces of the
//! planar arrangement of its edges together with two cuts shot from every
//! concave vertex. They are interior-disjoint and their union is exactly the
//! polygon.

use log::{debug, trace};
use polycover_geometry::{Arrangement, Direction, Point, PolygonWithHoles, Ray, Segment};

use crate::concave;
use crate::{Error, Rectangle};

/// Compute the base rectangles of `polygon`.
///
/// Fails with the underlying [`polycover_geometry::Error::EmptyArrangement`]
/// when the polygon has no concave vertices and no holes; such a polygon is
/// itself a rectangle and callers are expected to special-case it.
pub fn base_rectangles(polygon: &PolygonWithHoles) -> Result<Vec<Rectangle>, Error> {
    debug!("generating base rectangles");

    let concave_vertices = concave::find_concave_vertices(polygon);
    if concave_vertices.is_empty() && !polygon.has_holes() {
        return Err(Error::Geometry(polycover_geometry::Error::EmptyArrangement));
    }

    let mut cuts: Vec<Segment> = Vec::with_capacity(2 * concave_vertices.len());
    for entry in &concave_vertices {
        pick_cuts(polygon, entry, &mut cuts)?;
    }
    debug!("picked {} cut(s)", cuts.len());

    parse_rectangles(&create_arrangement(polygon, &cuts)?, polygon)
}

/// Emit the two cut segments of one concave vertex.
fn pick_cuts(
    polygon: &PolygonWithHoles,
    (&vertex, directions): (&Point, &[Direction; 2]),
    cuts: &mut Vec<Segment>,
) -> Result<(), Error> {
    trace!("picking cuts for concave vertex {vertex}");

    for &direction in directions {
        let ray = Ray::new(vertex, direction);
        let hit = concave::closest_intersection(&ray, polygon).ok_or_else(|| {
            Error::InvalidInput(format!(
                "cut ray from concave vertex {vertex} towards {direction} misses the boundary"
            ))
        })?;
        trace!("picked cut {vertex} -> {hit}");
        cuts.push(Segment::new(vertex, hit));
    }
    Ok(())
}

/// The planar arrangement of the polygon's edges and the given cuts.
pub fn create_arrangement(
    polygon: &PolygonWithHoles,
    cuts: &[Segment],
) -> Result<Arrangement, Error> {
    let mut segments: Vec<Segment> = cuts.to_vec();
    segments.extend(polygon.all_edges());

    debug!("constructing arrangement with {} segment(s)", segments.len());
    Ok(Arrangement::build(&segments)?)
}

/// Extract the rectangular bounded faces of an arrangement.
///
/// A face counts as a rectangle when walking its boundary changes direction
/// exactly four times, ignoring 180-degree reversals. Faces whose bounding
/// box coincides with a hole's are the holes themselves and are dropped.
pub fn parse_rectangles(
    arrangement: &Arrangement,
    polygon: &PolygonWithHoles,
) -> Result<Vec<Rectangle>, Error> {
    let hole_boxes: Vec<(Point, Point)> =
        polygon.holes().iter().map(|h| h.bounding_box()).collect();

    let mut rectangles = Vec::new();
    for cycle in arrangement.bounded_faces() {
        let Some((bottom_left, top_right)) = rectangular_face_bounds(cycle) else {
            continue;
        };

        if hole_boxes.contains(&(bottom_left, top_right)) {
            trace!("face at {bottom_left} is a hole, skipping");
            continue;
        }

        rectangles.push(Rectangle::from_corners(bottom_left, top_right)?);
    }

    debug!("parsed {} rectangle(s) from arrangement", rectangles.len());
    Ok(rectangles)
}

/// The bounding box of a face cycle, if the face is a rectangle.
fn rectangular_face_bounds(cycle: &[Point]) -> Option<(Point, Point)> {
    let n = cycle.len();
    let (mut min_x, mut max_x) = (cycle[0].x, cycle[0].x);
    let (mut min_y, mut max_y) = (cycle[0].y, cycle[0].y);
    for vertex in cycle {
        min_x = min_x.min(vertex.x);
        max_x = max_x.max(vertex.x);
        min_y = min_y.min(vertex.y);
        max_y = max_y.max(vertex.y);
    }

    let direction_of = |i: usize| {
        Segment::new(cycle[i], cycle[(i + 1) % n])
            .direction()
            .normalize()
    };

    let mut changes = 0usize;
    let mut current = direction_of(0);
    for i in 1..=n {
        let next = direction_of(i % n);
        if next != current && next != current.rot180() {
            changes += 1;
            if changes > 4 {
                return None;
            }
        }
        current = next;
    }

    (changes == 4).then_some((Point::new(min_x, min_y), Point::new(max_x, max_y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycover_geometry::Polygon;

    fn polygon(outer: &[(i64, i64)], holes: &[&[(i64, i64)]]) -> PolygonWithHoles {
        let ring = |coords: &[(i64, i64)]| {
            Polygon::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
        };
        PolygonWithHoles::new(ring(outer), holes.iter().map(|h| ring(h)).collect())
    }

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Rectangle {
        Rectangle::new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn l_shape_splits_into_three_base_rectangles() {
        let l = polygon(&[(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)], &[]);
        let mut bases = base_rectangles(&l).unwrap();
        bases.sort();
        assert_eq!(
            bases,
            vec![rect(0, 0, 2, 2), rect(0, 2, 2, 4), rect(2, 0, 4, 2)]
        );
    }

    #[test]
    fn base_rectangles_are_interior_disjoint_and_cover_the_area() {
        let plus = polygon(
            &[
                (2, 0),
                (4, 0),
                (4, 2),
                (6, 2),
                (6, 4),
                (4, 4),
                (4, 6),
                (2, 6),
                (2, 4),
                (0, 4),
                (0, 2),
                (2, 2),
            ],
            &[],
        );
        let bases = base_rectangles(&plus).unwrap();
        assert_eq!(bases.len(), 5);
        for (i, a) in bases.iter().enumerate() {
            for b in bases.iter().skip(i + 1) {
                assert!(!a.intersects(b), "{a} and {b} overlap");
            }
        }
        let total: u64 = bases.iter().map(Rectangle::area).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn hole_faces_are_discarded() {
        let donut = polygon(
            &[(0, 0), (6, 0), (6, 6), (0, 6)],
            &[&[(2, 2), (4, 2), (4, 4), (2, 4)]],
        );
        let bases = base_rectangles(&donut).unwrap();
        let total: u64 = bases.iter().map(Rectangle::area).sum();
        assert_eq!(total, 32);
        assert!(!bases.contains(&rect(2, 2, 4, 4)));
    }

    #[test]
    fn rectangle_without_holes_is_rejected() {
        let square = polygon(&[(0, 0), (2, 0), (2, 2), (0, 2)], &[]);
        assert!(matches!(
            base_rectangles(&square),
            Err(Error::Geometry(polycover_geometry::Error::EmptyArrangement))
        ));
    }
}
