//! End-to-end algorithm scenarios on small polygons.

use polycover_core::algorithms::{GreedySetCover, PartitionAlgorithm, StripAlgorithm};
use polycover_core::{validate, Costs, CoverProvider, Rectangle, RuntimeEnvironment};
use polycover_geometry::{Point, Polygon, PolygonWithHoles};

fn polygon(outer: &[(i64, i64)], holes: &[&[(i64, i64)]]) -> PolygonWithHoles {
    let ring = |coords: &[(i64, i64)]| {
        Polygon::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    };
    PolygonWithHoles::new(ring(outer), holes.iter().map(|h| ring(h)).collect())
}

fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Rectangle {
    Rectangle::new(x0, y0, x1, y1).unwrap()
}

fn l_shape() -> PolygonWithHoles {
    polygon(&[(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)], &[])
}

fn plus_shape() -> PolygonWithHoles {
    polygon(
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
    )
}

fn donut() -> PolygonWithHoles {
    polygon(
        &[(0, 0), (6, 0), (6, 6), (0, 6)],
        &[&[(2, 2), (4, 2), (4, 4), (2, 4)]],
    )
}

fn unit_costs() -> Costs {
    Costs::new(0, 1)
}

#[test]
fn strip_covers_the_l_shape_with_two_strips() {
    let l = l_shape();
    let mut env = RuntimeEnvironment::new();
    let cover = StripAlgorithm.cover_for(&l, &unit_costs(), &mut env).unwrap();

    assert_eq!(cover, vec![rect(0, 0, 2, 4), rect(0, 0, 4, 2)]);
    assert!(validate::is_valid_cover(&cover, &l));
}

#[test]
fn partition_covers_the_l_shape_with_two_rectangles() {
    let l = l_shape();
    let mut env = RuntimeEnvironment::new();
    let cover = PartitionAlgorithm
        .cover_for(&l, &unit_costs(), &mut env)
        .unwrap();

    assert_eq!(cover.len(), 2);
    assert!(validate::is_valid_cover(&cover, &l));
    // a partition is interior-disjoint
    for (i, a) in cover.iter().enumerate() {
        for b in cover.iter().skip(i + 1) {
            assert!(!a.intersects(b));
        }
    }
}

#[test]
fn greedy_covers_the_l_shape_with_two_rectangles() {
    let l = l_shape();
    let mut env = RuntimeEnvironment::new();
    let cover = GreedySetCover
        .cover_for(&l, &unit_costs(), &mut env)
        .unwrap();

    assert_eq!(cover.len(), 2);
    assert!(validate::is_valid_cover(&cover, &l));
}

#[test]
fn all_three_algorithms_cover_the_plus_shape() {
    let plus = plus_shape();
    let costs = Costs::new(10, 1);

    for provider in [
        Box::new(StripAlgorithm) as Box<dyn CoverProvider>,
        Box::new(PartitionAlgorithm),
        Box::new(GreedySetCover),
    ] {
        let mut env = RuntimeEnvironment::new();
        let cover = provider.cover_for(&plus, &costs, &mut env).unwrap();
        assert!(
            validate::is_valid_cover(&cover, &plus),
            "invalid cover of the plus shape: {cover:?}"
        );
        assert!(validate::verify_cover(&cover, &plus));
    }
}

#[test]
fn partition_of_the_plus_shape_uses_the_crossing_diagonal_thinning() {
    // four concave vertices, four pairwise-crossing good diagonals; the
    // kept independent pair splits the plus into three rectangles
    let plus = plus_shape();
    let mut env = RuntimeEnvironment::new();
    let cover = PartitionAlgorithm
        .cover_for(&plus, &unit_costs(), &mut env)
        .unwrap();

    assert_eq!(cover.len(), 3);
    assert!(validate::is_valid_cover(&cover, &plus));
}

#[test]
fn partition_of_the_donut_emits_exactly_four_rectangles() {
    // four concave vertices (the hole corners), no good diagonals, one
    // hole: n - L - H + 1 = 4 - 0 - 1 + 1 = 4
    let donut = donut();
    let mut env = RuntimeEnvironment::new();
    let cover = PartitionAlgorithm
        .cover_for(&donut, &unit_costs(), &mut env)
        .unwrap();

    assert_eq!(cover.len(), 4);
    assert!(validate::is_valid_cover(&cover, &donut));
    let total_area: u64 = cover.iter().map(Rectangle::area).sum();
    assert_eq!(total_area, 32);
}

#[test]
fn strip_and_greedy_handle_the_donut() {
    let donut = donut();
    for provider in [
        Box::new(StripAlgorithm) as Box<dyn CoverProvider>,
        Box::new(GreedySetCover),
    ] {
        let mut env = RuntimeEnvironment::new();
        let cover = provider.cover_for(&donut, &unit_costs(), &mut env).unwrap();
        assert!(validate::is_valid_cover(&cover, &donut));
    }
}

#[test]
fn greedy_prefers_cheap_large_rectangles() {
    // with zero creation cost and unit area cost, greedy seeds with a
    // maximal domino and completes the corner without re-covering it
    let l = l_shape();
    let mut env = RuntimeEnvironment::new();
    let cover = GreedySetCover
        .cover_for(&l, &unit_costs(), &mut env)
        .unwrap();

    let mut sorted = cover.clone();
    sorted.sort();
    assert_eq!(sorted, vec![rect(0, 0, 2, 4), rect(2, 0, 4, 2)]);
}

#[test]
fn environment_is_reused_across_chain_members() {
    let l = l_shape();
    let mut env = RuntimeEnvironment::new();
    StripAlgorithm
        .cover_for(&l, &unit_costs(), &mut env)
        .unwrap();
    assert!(!env.graph.is_empty());
    assert_eq!(env.base_rectangles.len(), 3);

    // a second run against the same environment must not rebuild
    let nodes_before = env.graph.nodes().len();
    GreedySetCover
        .cover_for(&l, &unit_costs(), &mut env)
        .unwrap();
    assert_eq!(env.graph.nodes().len(), nodes_before);

    env.clear();
    assert!(env.graph.is_empty());
    assert!(env.base_rectangles.is_empty());
}
