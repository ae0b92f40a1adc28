//! Property tests over random histogram polygons.
//!
//! A histogram polygon is the union of unit-width columns of varying
//! heights. Assembling those columns gives an arbitrary staircase-shaped
//! rectilinear polygon, which exercises extraction, the graph and all three
//! algorithms without hand-picking shapes.

use polycover_core::algorithms::{GreedySetCover, PartitionAlgorithm, StripAlgorithm};
use polycover_core::postprocess::{CoverTransform, Join, Prune, Trim};
use polycover_core::{extract, validate, Costs, CoverProvider, Rectangle, RuntimeEnvironment};
use polycover_geometry::{assemble_regions, Point, PolygonWithHoles};
use proptest::prelude::*;

fn histogram_polygon(heights: &[i64]) -> PolygonWithHoles {
    let boxes: Vec<(Point, Point)> = heights
        .iter()
        .enumerate()
        .map(|(i, &h)| (Point::new(i as i64, 0), Point::new(i as i64 + 1, h)))
        .collect();
    let mut regions = assemble_regions(&boxes).unwrap();
    assert_eq!(regions.len(), 1);
    regions.pop().unwrap()
}

fn is_rectangle(polygon: &PolygonWithHoles) -> bool {
    polygon.outer().vertex_count() == 4 && !polygon.has_holes()
}

proptest! {
    #[test]
    fn base_rectangles_tile_the_polygon(
        heights in proptest::collection::vec(1i64..6, 2..10),
    ) {
        let polygon = histogram_polygon(&heights);
        prop_assume!(!is_rectangle(&polygon));

        let bases = extract::base_rectangles(&polygon).unwrap();

        for (i, a) in bases.iter().enumerate() {
            for b in bases.iter().skip(i + 1) {
                prop_assert!(!a.intersects(b), "{a} and {b} overlap");
            }
        }

        let base_area: u64 = bases.iter().map(Rectangle::area).sum();
        let polygon_area = polygon.outer().signed_area_doubled() as u64 / 2;
        prop_assert_eq!(base_area, polygon_area);

        // the tiling itself is a valid (overlap-free) cover
        prop_assert!(validate::is_valid_cover(&bases, &polygon));
    }

    #[test]
    fn every_algorithm_produces_a_valid_cover(
        heights in proptest::collection::vec(1i64..6, 2..10),
        creation in 0u64..20,
        area in 0u64..5,
    ) {
        let polygon = histogram_polygon(&heights);
        prop_assume!(!is_rectangle(&polygon));
        let costs = Costs::new(creation, area);

        for provider in [
            Box::new(StripAlgorithm) as Box<dyn CoverProvider>,
            Box::new(PartitionAlgorithm),
            Box::new(GreedySetCover),
        ] {
            let mut env = RuntimeEnvironment::new();
            let cover = provider.cover_for(&polygon, &costs, &mut env).unwrap();
            prop_assert!(
                validate::is_valid_cover(&cover, &polygon),
                "invalid cover {:?} of heights {:?}",
                cover,
                heights
            );
        }
    }

    #[test]
    fn postprocessing_preserves_validity_and_never_raises_cost(
        heights in proptest::collection::vec(1i64..6, 2..10),
        creation in 0u64..20,
    ) {
        let polygon = histogram_polygon(&heights);
        prop_assume!(!is_rectangle(&polygon));
        let costs = Costs::new(creation, 1);

        let mut env = RuntimeEnvironment::new();
        let mut cover = StripAlgorithm.cover_for(&polygon, &costs, &mut env).unwrap();
        let mut pixels = None;
        let mut last_cost = costs.total_of_cover(&cover);

        for transform in [
            Box::new(Prune) as Box<dyn CoverTransform>,
            Box::new(Trim),
            Box::new(Join),
        ] {
            transform
                .apply(&mut cover, &polygon, &costs, &mut env, &mut pixels)
                .unwrap();
            let cost = costs.total_of_cover(&cover);
            prop_assert!(cost <= last_cost);
            prop_assert!(
                validate::is_valid_cover(&cover, &polygon),
                "invalid cover {:?} of heights {:?}",
                cover,
                heights
            );
            last_cost = cost;
        }
    }

    #[test]
    fn partition_rectangles_are_interior_disjoint(
        heights in proptest::collection::vec(1i64..6, 2..10),
    ) {
        let polygon = histogram_polygon(&heights);
        prop_assume!(!is_rectangle(&polygon));

        let mut env = RuntimeEnvironment::new();
        let cover = PartitionAlgorithm
            .cover_for(&polygon, &Costs::new(0, 1), &mut env)
            .unwrap();

        for (i, a) in cover.iter().enumerate() {
            for b in cover.iter().skip(i + 1) {
                prop_assert!(!a.intersects(b));
            }
        }
    }
}
