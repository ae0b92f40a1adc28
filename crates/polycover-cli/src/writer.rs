//! Result output: one JSON document per run, or CSV rows appended per run.

use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde_json::json;

use polycover_core::instance::{cover_to_wkt, multi_polygon_to_wkt};
use polycover_core::runner::{RunResult, Validity};
use polycover_core::ProblemInstance;

const CSV_HEADER: &str = "time_start,time_end,instance_name,num_polygons,polygon_id,algorithm,\
creation_cost,area_cost,cover_size,total_creation_cost,total_area_cost,total_cost,\
execution_time_seconds,execution_time_milliseconds,execution_time_nanoseconds,valid\n";

/// Write the run results to `output_path`: `.csv` appends one row per
/// polygon plus the total, anything else gets the JSON document. Parent
/// directories are created as needed.
pub fn write_result(
    instance: &ProblemInstance,
    results: &[RunResult],
    algorithm_full_name: &str,
    output_path: &Path,
    time_start: SystemTime,
    time_end: SystemTime,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create '{}'", parent.display()))?;
        }
    }

    if output_path.extension().and_then(|e| e.to_str()) == Some("csv") {
        let fresh = !output_path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)
            .with_context(|| format!("cannot open '{}'", output_path.display()))?;
        if fresh {
            file.write_all(CSV_HEADER.as_bytes())?;
        }
        file.write_all(
            result_to_csv(instance, results, algorithm_full_name, time_start, time_end).as_bytes(),
        )?;
    } else {
        let document =
            result_to_json(instance, results, algorithm_full_name, time_start, time_end);
        fs::write(output_path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("cannot write '{}'", output_path.display()))?;
    }

    Ok(())
}

fn result_to_json(
    instance: &ProblemInstance,
    results: &[RunResult],
    algorithm_full_name: &str,
    time_start: SystemTime,
    time_end: SystemTime,
) -> serde_json::Value {
    let cover: Vec<_> = results
        .iter()
        .flat_map(|r| r.cover.iter().copied())
        .collect();

    let mut document = json!({
        "time_start": format_time(time_start),
        "time_end": format_time(time_end),
        "algorithm": algorithm_full_name,
        "instance_name": instance.name(),
        "input_polygon": multi_polygon_to_wkt(instance.multi_polygon()),
        "creation_cost": instance.costs().creation,
        "area_cost": instance.costs().area,
        "cover": cover_to_wkt(&cover),
        "cover_size": results[0].cover_size,
        "total_cost": results[0].cost.total(),
        "total_creation_cost": results[0].cost.creation,
        "total_area_cost": results[0].cost.area,
        "execution_time_seconds": results[0].execution_time.as_secs(),
        "execution_time_milliseconds": results[0].execution_time.as_millis() as u64,
        "execution_time_nanoseconds": results[0].execution_time.as_nanos() as u64,
        "is_valid": validity_to_json(results[0].validity),
    });

    let per_polygon: Vec<serde_json::Value> = results
        .iter()
        .enumerate()
        .skip(1)
        .map(|(index, result)| {
            json!({
                "polygon": index,
                "cover_size": result.cover_size,
                "total_cost": result.cost.total(),
                "total_creation_cost": result.cost.creation,
                "total_area_cost": result.cost.area,
                "execution_time_seconds": result.execution_time.as_secs(),
                "execution_time_milliseconds": result.execution_time.as_millis() as u64,
                "execution_time_nanoseconds": result.execution_time.as_nanos() as u64,
                "is_valid": validity_to_json(result.validity),
            })
        })
        .collect();
    document["polygon"] = serde_json::Value::Array(per_polygon);

    document
}

fn result_to_csv(
    instance: &ProblemInstance,
    results: &[RunResult],
    algorithm_full_name: &str,
    time_start: SystemTime,
    time_end: SystemTime,
) -> String {
    let mut rows = String::new();
    for (index, result) in results.iter().enumerate() {
        let valid = match result.validity {
            Validity::Valid => "true",
            Validity::Invalid => "false",
            Validity::Timeout => "timeout",
            Validity::Unchecked => "null",
        };
        rows.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            format_time(time_start),
            format_time(time_end),
            instance.name(),
            results.len() - 1,
            index,
            algorithm_full_name,
            instance.costs().creation,
            instance.costs().area,
            result.cover_size,
            result.cost.creation,
            result.cost.area,
            result.cost.total(),
            result.execution_time.as_secs(),
            result.execution_time.as_millis(),
            result.execution_time.as_nanos(),
            valid,
        ));
    }
    rows
}

fn validity_to_json(validity: Validity) -> serde_json::Value {
    match validity {
        Validity::Valid => json!(true),
        Validity::Invalid => json!(false),
        Validity::Timeout => json!("timeout"),
        Validity::Unchecked => serde_json::Value::Null,
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_time(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
