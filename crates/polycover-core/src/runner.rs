//! The per-polygon driver.
//!
//! Runs a cover provider over every polygon of an instance, timing and
//! validating each result. Row 0 of the returned results aggregates sizes,
//! costs and durations over the whole instance.

use std::fmt;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::{validate, Cover, CoverCosts, CoverProvider, ProblemInstance, RuntimeEnvironment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Invalid,
    Valid,
    Unchecked,
    Timeout,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Validity::Invalid => "invalid",
            Validity::Valid => "valid",
            Validity::Unchecked => "unchecked",
            Validity::Timeout => "timeout",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub cover_size: usize,
    pub cost: CoverCosts,
    pub execution_time: Duration,
    pub validity: Validity,
    pub cover: Cover,
}

impl RunResult {
    fn empty(validity: Validity) -> Self {
        Self {
            cover_size: 0,
            cost: CoverCosts::default(),
            execution_time: Duration::ZERO,
            validity,
            cover: Vec::new(),
        }
    }
}

/// Cover every polygon of the instance with the given provider.
///
/// Hole-free polygons with exactly four corners are rectangles and are
/// skipped. A provider error on one polygon marks that polygon invalid and
/// processing continues. The first returned result is the aggregate.
pub fn run_algorithm(
    provider: &dyn CoverProvider,
    instance: &ProblemInstance,
    verify: bool,
) -> Vec<RunResult> {
    let polygons = instance.multi_polygon();
    let mut results: Vec<RunResult> = Vec::with_capacity(polygons.len() + 1);
    results.push(RunResult::empty(if verify {
        Validity::Valid
    } else {
        Validity::Unchecked
    }));

    let mut skipped = 0usize;
    let mut env = RuntimeEnvironment::new();
    for polygon in polygons {
        if polygon.outer().vertex_count() == 4 && !polygon.has_holes() {
            info!("polygon is a hole-free rectangle, skipping");
            skipped += 1;
            continue;
        }

        env.clear();
        info!(
            "computing cover for polygon {} / {}",
            results.len(),
            polygons.len()
        );

        let started = Instant::now();
        let outcome = provider.cover_for(polygon, &instance.costs(), &mut env);
        let execution_time = started.elapsed();

        let (cover, validity) = match outcome {
            Ok(cover) => {
                let validity = if provider.timed_out() {
                    Validity::Timeout
                } else if verify {
                    if validate::is_valid_cover(&cover, polygon) {
                        Validity::Valid
                    } else {
                        Validity::Invalid
                    }
                } else {
                    Validity::Unchecked
                };
                (cover, validity)
            }
            Err(crate::Error::Timeout(seconds)) => {
                warn!("polygon {} timed out after {seconds}s", results.len());
                (Vec::new(), Validity::Timeout)
            }
            Err(error) => {
                warn!("covering polygon {} failed: {error}", results.len());
                (Vec::new(), Validity::Invalid)
            }
        };

        let cost = instance.costs().of_cover(&cover);
        info!(
            "finished within {}ns, validity status: {validity}",
            execution_time.as_nanos()
        );

        results[0].cover_size += cover.len();
        results[0].cost += cost;
        results[0].execution_time += execution_time;
        match validity {
            Validity::Timeout => results[0].validity = Validity::Timeout,
            Validity::Invalid => results[0].validity = Validity::Invalid,
            _ => {}
        }

        results.push(RunResult {
            cover_size: cover.len(),
            cost,
            execution_time,
            validity,
            cover,
        });
    }

    info!("{skipped} trivial polygon(s) skipped");
    results
}
