//! Cover validation.
//!
//! Both checkers are exact: they compare polygon membership and cover
//! membership of every elementary cell in the grid induced by all x and y
//! coordinates of the polygon and the cover. Two closed rectilinear regions
//! on that grid are equal exactly when every cell center lands on the same
//! side of both, which is the symmetric-difference test of the coordinates
//! involved.

use log::debug;
use polycover_geometry::PolygonWithHoles;

use crate::{Cover, Rectangle};

/// Whether the union of the cover equals the polygon exactly.
///
/// This is the symmetric-difference formulation: valid iff joining all cover
/// rectangles yields the input polygon with nothing left over on either
/// side.
#[must_use]
pub fn is_valid_cover(cover: &Cover, polygon: &PolygonWithHoles) -> bool {
    debug!("verifying cover of {} rectangle(s)", cover.len());
    if cover.is_empty() {
        return false;
    }

    let (xs, ys) = grid_coordinates(cover, polygon);
    for x_pair in xs.windows(2) {
        for y_pair in ys.windows(2) {
            let center_x2 = x_pair[0] + x_pair[1];
            let center_y2 = y_pair[0] + y_pair[1];
            let in_polygon = polygon.contains_half_grid(center_x2, center_y2);
            let in_cover = cover
                .iter()
                .any(|r| rectangle_contains_half_grid(r, center_x2, center_y2));
            if in_polygon != in_cover {
                debug!(
                    "cell around ({}, {}) differs: polygon {in_polygon}, cover {in_cover}",
                    center_x2 / 2,
                    center_y2 / 2
                );
                return false;
            }
        }
    }
    true
}

/// Redundant subtractive checker: every rectangle must stay inside the
/// polygon, and subtracting all rectangles from the polygon must leave
/// nothing.
#[must_use]
pub fn verify_cover(cover: &Cover, polygon: &PolygonWithHoles) -> bool {
    debug!("verifying cover (subtractive) of {} rectangle(s)", cover.len());
    if cover.is_empty() {
        return false;
    }

    let (xs, ys) = grid_coordinates(cover, polygon);
    for x_pair in xs.windows(2) {
        for y_pair in ys.windows(2) {
            let center_x2 = x_pair[0] + x_pair[1];
            let center_y2 = y_pair[0] + y_pair[1];
            let in_polygon = polygon.contains_half_grid(center_x2, center_y2);
            let covering = cover
                .iter()
                .filter(|r| rectangle_contains_half_grid(r, center_x2, center_y2))
                .count();
            if covering > 0 && !in_polygon {
                // a rectangle pokes outside the polygon
                return false;
            }
            if in_polygon && covering == 0 {
                // part of the polygon is left uncovered
                return false;
            }
        }
    }
    true
}

fn rectangle_contains_half_grid(rectangle: &Rectangle, x2: i64, y2: i64) -> bool {
    2 * rectangle.min_x() < x2
        && x2 < 2 * rectangle.max_x()
        && 2 * rectangle.min_y() < y2
        && y2 < 2 * rectangle.max_y()
}

fn grid_coordinates(cover: &Cover, polygon: &PolygonWithHoles) -> (Vec<i64>, Vec<i64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for ring in std::iter::once(polygon.outer()).chain(polygon.holes().iter()) {
        for vertex in ring.vertices() {
            xs.push(vertex.x);
            ys.push(vertex.y);
        }
    }
    for rectangle in cover {
        xs.push(rectangle.min_x());
        xs.push(rectangle.max_x());
        ys.push(rectangle.min_y());
        ys.push(rectangle.max_y());
    }

    xs.sort_unstable();
    xs.dedup();
    ys.sort_unstable();
    ys.dedup();
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycover_geometry::{Point, Polygon};

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Rectangle {
        Rectangle::new(x0, y0, x1, y1).unwrap()
    }

    fn polygon(outer: &[(i64, i64)]) -> PolygonWithHoles {
        PolygonWithHoles::new(
            Polygon::new(outer.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap(),
            vec![],
        )
    }

    #[test]
    fn exact_cover_is_valid() {
        let square = polygon(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        let cover = vec![rect(0, 0, 1, 1)];
        assert!(is_valid_cover(&cover, &square));
        assert!(verify_cover(&cover, &square));
    }

    #[test]
    fn overlapping_rectangles_equal_to_the_polygon_are_valid() {
        let square = polygon(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        let cover = vec![rect(0, 0, 1, 1), rect(0, 0, 1, 1)];
        assert!(is_valid_cover(&cover, &square));
        assert!(verify_cover(&cover, &square));
    }

    #[test]
    fn poking_outside_is_rejected_by_both_checkers() {
        let square = polygon(&[(0, 0), (2, 0), (2, 2), (0, 2)]);
        let cover = vec![rect(0, 0, 2, 2), rect(1, 1, 3, 2)];
        assert!(!is_valid_cover(&cover, &square));
        assert!(!verify_cover(&cover, &square));
    }

    #[test]
    fn uncovered_area_is_rejected() {
        let l = polygon(&[(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)]);
        let cover = vec![rect(0, 0, 4, 2)];
        assert!(!is_valid_cover(&cover, &l));
        assert!(!verify_cover(&cover, &l));
    }

    #[test]
    fn l_shape_strip_cover_is_valid() {
        let l = polygon(&[(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)]);
        let cover = vec![rect(0, 0, 4, 2), rect(0, 0, 2, 4)];
        assert!(is_valid_cover(&cover, &l));
        assert!(verify_cover(&cover, &l));
    }

    #[test]
    fn empty_cover_is_invalid() {
        let square = polygon(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        assert!(!is_valid_cover(&vec![], &square));
    }
}
