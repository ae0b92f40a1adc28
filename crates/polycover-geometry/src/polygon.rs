use crate::{Error, Point, Segment};

/// A closed simple rectilinear polygon, stored as its vertex ring.
///
/// Construction normalizes the ring: a repeated closing vertex is dropped,
/// as are collinear intermediate vertices, so edges strictly alternate
/// between horizontal and vertical. Orientation is kept as given; use
/// [`Polygon::is_counter_clockwise`] / [`Polygon::reversed`] to adjust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(ring: Vec<Point>) -> Result<Self, Error> {
        let mut vertices = ring;
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        vertices.dedup();

        // Drop collinear intermediate vertices (including the wrap-around).
        let mut cleaned: Vec<Point> = Vec::with_capacity(vertices.len());
        let n = vertices.len();
        for i in 0..n {
            let prev = vertices[(i + n - 1) % n];
            let cur = vertices[i];
            let next = vertices[(i + 1) % n];
            let straight = (prev.x == cur.x && cur.x == next.x)
                || (prev.y == cur.y && cur.y == next.y);
            if !straight {
                cleaned.push(cur);
            }
        }

        if cleaned.len() < 4 {
            return Err(Error::MalformedRing(format!(
                "ring has {} corner(s), need at least 4",
                cleaned.len()
            )));
        }

        for i in 0..cleaned.len() {
            let a = cleaned[i];
            let b = cleaned[(i + 1) % cleaned.len()];
            if a.x != b.x && a.y != b.y {
                return Err(Error::MalformedRing(format!(
                    "edge {a} -> {b} is not axis-aligned"
                )));
            }
        }

        Ok(Self { vertices: cleaned })
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Twice the signed area (shoelace); positive for counter-clockwise rings.
    #[must_use]
    pub fn signed_area_doubled(&self) -> i64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }

    #[must_use]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area_doubled() > 0
    }

    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.vertices.reverse();
        self
    }

    /// Bounding box as `(bottom_left, top_right)`.
    #[must_use]
    pub fn bounding_box(&self) -> (Point, Point) {
        let min_x = self.vertices.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = self.vertices.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = self.vertices.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = self.vertices.iter().map(|p| p.y).max().unwrap_or(0);
        (Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Even-odd containment for a query point given in *doubled* coordinates.
    ///
    /// The query must not lie on the boundary; callers guarantee this by
    /// testing cell centers, whose doubled coordinates are odd while all
    /// doubled vertex coordinates are even.
    #[must_use]
    pub fn contains_half_grid(&self, x2: i64, y2: i64) -> bool {
        let mut crossings = 0usize;
        for edge in self.edges() {
            if edge.is_vertical() {
                let ex2 = edge.source.x * 2;
                if ex2 > x2 && edge.min_y() * 2 < y2 && y2 < edge.max_y() * 2 {
                    crossings += 1;
                }
            }
        }
        crossings % 2 == 1
    }

}

/// A rectilinear polygon with rectilinear holes.
///
/// Construction normalizes orientations the conventional way: the outer
/// boundary counter-clockwise, every hole clockwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonWithHoles {
    outer: Polygon,
    holes: Vec<Polygon>,
}

pub type MultiPolygon = Vec<PolygonWithHoles>;

impl PolygonWithHoles {
    #[must_use]
    pub fn new(outer: Polygon, holes: Vec<Polygon>) -> Self {
        let outer = if outer.is_counter_clockwise() {
            outer
        } else {
            outer.reversed()
        };
        let holes = holes
            .into_iter()
            .map(|h| if h.is_counter_clockwise() { h.reversed() } else { h })
            .collect();
        Self { outer, holes }
    }

    #[must_use]
    pub fn outer(&self) -> &Polygon {
        &self.outer
    }

    #[must_use]
    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    #[must_use]
    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// All edges: outer boundary first, then each hole's.
    pub fn all_edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.outer
            .edges()
            .chain(self.holes.iter().flat_map(|h| h.edges()))
    }

    #[must_use]
    pub fn bounding_box(&self) -> (Point, Point) {
        self.outer.bounding_box()
    }

    /// Even-odd containment for a doubled-coordinate query point: inside the
    /// outer boundary and outside every hole.
    #[must_use]
    pub fn contains_half_grid(&self, x2: i64, y2: i64) -> bool {
        self.outer.contains_half_grid(x2, y2)
            && !self.holes.iter().any(|h| h.contains_half_grid(x2, y2))
    }
}
