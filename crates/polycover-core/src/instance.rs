//! Problem instances: the input polygons and the cost model.

use std::fmt::Write as _;
use std::fs;
use std::ops::AddAssign;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use polycover_geometry::{MultiPolygon, Point, Polygon, PolygonWithHoles};

use crate::{Cover, Error, Rectangle};

/// The cost model: every rectangle costs `creation + area * rectangle.area()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Costs {
    pub creation: u64,
    pub area: u64,
}

impl Costs {
    #[must_use]
    pub const fn new(creation: u64, area: u64) -> Self {
        Self { creation, area }
    }

    #[must_use]
    pub fn of_rectangle(&self, rectangle: &Rectangle) -> CoverCosts {
        CoverCosts {
            creation: self.creation,
            area: self.area * rectangle.area(),
        }
    }

    #[must_use]
    pub fn of_cover(&self, cover: &[Rectangle]) -> CoverCosts {
        let mut total = CoverCosts::default();
        for rectangle in cover {
            total += self.of_rectangle(rectangle);
        }
        total
    }

    #[must_use]
    pub fn total_of_rectangle(&self, rectangle: &Rectangle) -> u64 {
        self.of_rectangle(rectangle).total()
    }

    #[must_use]
    pub fn total_of_cover(&self, cover: &[Rectangle]) -> u64 {
        self.of_cover(cover).total()
    }
}

/// Accumulated creation and area cost of a cover, reported separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverCosts {
    pub creation: u64,
    pub area: u64,
}

impl CoverCosts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.creation + self.area
    }
}

impl AddAssign for CoverCosts {
    fn add_assign(&mut self, other: Self) {
        self.creation += other.creation;
        self.area += other.area;
    }
}

/// One problem instance: the polygons read from a WKT file plus the costs.
#[derive(Debug)]
pub struct ProblemInstance {
    name: String,
    multi_polygon: MultiPolygon,
    costs: Costs,
}

impl ProblemInstance {
    /// Load a `MULTIPOLYGON` WKT file.
    ///
    /// The file must exist, carry a `.wkt` extension, and contain only
    /// integer coordinates.
    pub fn load(wkt_path: &Path, creation_cost: u64, area_cost: u64) -> Result<Self, Error> {
        if !wkt_path.exists() {
            return Err(Error::InputFileMissing(wkt_path.to_path_buf()));
        }
        if wkt_path.extension().and_then(|e| e.to_str()) != Some("wkt") {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a .wkt file",
                wkt_path.display()
            )));
        }

        let contents = fs::read_to_string(wkt_path)
            .map_err(|e| Error::InvalidInput(format!("cannot read '{}': {e}", wkt_path.display())))?;
        let multi_polygon = parse_multi_polygon(&contents)?;
        info!(
            "loaded {} polygon(s) from '{}'",
            multi_polygon.len(),
            wkt_path.display()
        );

        Ok(Self {
            name: instance_name(wkt_path),
            multi_polygon,
            costs: Costs::new(creation_cost, area_cost),
        })
    }

    #[must_use]
    pub fn from_parts(name: String, multi_polygon: MultiPolygon, costs: Costs) -> Self {
        Self {
            name,
            multi_polygon,
            costs,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn multi_polygon(&self) -> &MultiPolygon {
        &self.multi_polygon
    }

    #[must_use]
    pub fn costs(&self) -> Costs {
        self.costs
    }
}

/// Derive the instance name from its path: parent directory and file stem
/// joined by `_`, with path separators and spaces replaced by `_`.
fn instance_name(wkt_path: &Path) -> String {
    let parent = wkt_path
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let stem = wkt_path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    format!("{parent}_{stem}")
        .replace(['\\', '/', ' '], "_")
}

/// Parse a WKT `MULTIPOLYGON` with integer coordinates.
pub fn parse_multi_polygon(contents: &str) -> Result<MultiPolygon, Error> {
    let parsed = wkt::Wkt::<f64>::from_str(contents.trim())
        .map_err(|e| Error::InvalidInput(format!("malformed WKT: {e}")))?;

    let wkt::Wkt::MultiPolygon(multi) = parsed else {
        return Err(Error::InvalidInput(
            "expected a MULTIPOLYGON geometry".to_string(),
        ));
    };

    let mut polygons = MultiPolygon::new();
    for polygon in multi.0 {
        let mut rings = polygon.0.into_iter();
        let Some(outer) = rings.next() else {
            return Err(Error::InvalidInput("polygon without rings".to_string()));
        };
        let outer = convert_ring(&outer)?;
        let holes = rings
            .map(|ring| convert_ring(&ring))
            .collect::<Result<Vec<_>, _>>()?;
        polygons.push(PolygonWithHoles::new(outer, holes));
    }

    if polygons.is_empty() {
        return Err(Error::InvalidInput(
            "MULTIPOLYGON contains no polygons".to_string(),
        ));
    }
    debug!("parsed {} polygon(s)", polygons.len());
    Ok(polygons)
}

fn convert_ring(ring: &wkt::types::LineString<f64>) -> Result<Polygon, Error> {
    let mut points = Vec::with_capacity(ring.0.len());
    for coord in &ring.0 {
        points.push(Point::new(exact(coord.x)?, exact(coord.y)?));
    }
    Polygon::new(points).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn exact(value: f64) -> Result<i64, Error> {
    let rounded = value.round();
    if rounded != value || !rounded.is_finite() {
        return Err(Error::InvalidInput(format!(
            "coordinate {value} is not an integer"
        )));
    }
    Ok(rounded as i64)
}

/// Format polygons as a WKT `MULTIPOLYGON` string.
#[must_use]
pub fn multi_polygon_to_wkt(multi_polygon: &MultiPolygon) -> String {
    if multi_polygon.is_empty() {
        return "MULTIPOLYGON EMPTY".to_string();
    }

    let mut out = String::from("MULTIPOLYGON(");
    for (i, polygon) in multi_polygon.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('(');
        write_ring(&mut out, polygon.outer());
        for hole in polygon.holes() {
            out.push(',');
            write_ring(&mut out, hole);
        }
        out.push(')');
    }
    out.push(')');
    out
}

/// Format a cover as a WKT multipolygon of rectangles.
#[must_use]
pub fn cover_to_wkt(cover: &Cover) -> String {
    let polygons: MultiPolygon = cover
        .iter()
        .map(|r| PolygonWithHoles::new(r.as_polygon(), vec![]))
        .collect();
    multi_polygon_to_wkt(&polygons)
}

fn write_ring(out: &mut String, ring: &Polygon) {
    out.push('(');
    for (i, vertex) in ring.vertices().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{} {}", vertex.x, vertex.y);
    }
    if let Some(first) = ring.vertices().first() {
        let _ = write!(out, ",{} {}", first.x, first.y);
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_of_rectangle_splits_creation_and_area() {
        let costs = Costs::new(10, 3);
        let r = Rectangle::new(0, 0, 2, 2).unwrap();
        let c = costs.of_rectangle(&r);
        assert_eq!(c.creation, 10);
        assert_eq!(c.area, 12);
        assert_eq!(c.total(), 22);
        assert_eq!(costs.total_of_cover(&[r, r]), 44);
    }

    #[test]
    fn parses_multipolygon_with_hole() {
        let wkt = "MULTIPOLYGON(((0 0,6 0,6 6,0 6,0 0),(2 2,4 2,4 4,2 4,2 2)))";
        let polygons = parse_multi_polygon(wkt).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 1);
    }

    #[test]
    fn rejects_non_integer_coordinates() {
        let wkt = "MULTIPOLYGON(((0 0,1.5 0,1.5 1,0 1,0 0)))";
        assert!(matches!(
            parse_multi_polygon(wkt),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_other_geometries() {
        assert!(parse_multi_polygon("POINT(1 2)").is_err());
    }

    #[test]
    fn wkt_round_trip() {
        let wkt = "MULTIPOLYGON(((0 0,4 0,4 2,2 2,2 4,0 4,0 0)))";
        let polygons = parse_multi_polygon(wkt).unwrap();
        assert_eq!(multi_polygon_to_wkt(&polygons), wkt);
    }

    #[test]
    fn instance_name_joins_parent_and_stem() {
        let name = instance_name(Path::new("/data/batch a/poly1.wkt"));
        assert_eq!(name, "batch_a_poly1");
    }
}
