//! Runner behavior: trivial skipping, aggregation, error surfacing.

use std::io::Write as _;

use polycover_core::algorithms::{IlpAlgorithm, StripAlgorithm};
use polycover_core::instance::parse_multi_polygon;
use polycover_core::runner::{run_algorithm, Validity};
use polycover_core::{Costs, ProblemInstance};

fn instance_from_wkt(wkt: &str, creation: u64, area: u64) -> ProblemInstance {
    ProblemInstance::from_parts(
        "test_instance".to_string(),
        parse_multi_polygon(wkt).unwrap(),
        Costs::new(creation, area),
    )
}

#[test]
fn rectangles_are_skipped_and_totals_aggregate() {
    // a unit square (skipped) and an L shape (covered by two strips)
    let instance = instance_from_wkt(
        "MULTIPOLYGON(((0 0,1 0,1 1,0 1,0 0)),\
         ((10 0,14 0,14 2,12 2,12 4,10 4,10 0)))",
        1,
        1,
    );

    let results = run_algorithm(&StripAlgorithm, &instance, true);

    // aggregate row plus one row for the non-trivial polygon
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].validity, Validity::Valid);
    assert_eq!(results[1].validity, Validity::Valid);
    assert_eq!(results[1].cover_size, 2);
    assert_eq!(results[0].cover_size, results[1].cover_size);
    assert_eq!(results[0].cost, results[1].cost);
    // total cost: two rectangles, areas 8 each, creation 1 each
    assert_eq!(results[0].cost.total(), 18);
}

#[test]
fn unchecked_runs_report_no_validity() {
    let instance = instance_from_wkt(
        "MULTIPOLYGON(((0 0,4 0,4 2,2 2,2 4,0 4,0 0)))",
        0,
        1,
    );
    let results = run_algorithm(&StripAlgorithm, &instance, false);
    assert_eq!(results[0].validity, Validity::Unchecked);
    assert_eq!(results[1].validity, Validity::Unchecked);
}

#[test]
fn unsupported_algorithm_marks_polygons_invalid_and_continues() {
    let instance = instance_from_wkt(
        "MULTIPOLYGON(((0 0,4 0,4 2,2 2,2 4,0 4,0 0)),\
         ((10 0,14 0,14 2,12 2,12 4,10 4,10 0)))",
        1,
        1,
    );

    let results = run_algorithm(&IlpAlgorithm::new(false, 0.0), &instance, true);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].validity, Validity::Invalid);
    assert_eq!(results[1].validity, Validity::Invalid);
    assert_eq!(results[2].validity, Validity::Invalid);
    assert!(results[1].cover.is_empty());
}

#[test]
fn instance_loading_validates_path_and_extension() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.wkt");
    assert!(matches!(
        ProblemInstance::load(&missing, 1, 1),
        Err(polycover_core::Error::InputFileMissing(_))
    ));

    let wrong_ext = dir.path().join("poly.txt");
    std::fs::write(&wrong_ext, "MULTIPOLYGON(((0 0,1 0,1 1,0 1,0 0)))").unwrap();
    assert!(matches!(
        ProblemInstance::load(&wrong_ext, 1, 1),
        Err(polycover_core::Error::InvalidInput(_))
    ));

    let good = dir.path().join("poly.wkt");
    let mut file = std::fs::File::create(&good).unwrap();
    writeln!(file, "MULTIPOLYGON(((0 0,4 0,4 2,2 2,2 4,0 4,0 0)))").unwrap();
    let instance = ProblemInstance::load(&good, 2, 3).unwrap();
    assert_eq!(instance.costs(), Costs::new(2, 3));
    assert_eq!(instance.multi_polygon().len(), 1);
    assert!(instance.name().ends_with("_poly"));
}
