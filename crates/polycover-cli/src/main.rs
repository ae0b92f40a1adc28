mod writer;

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;

use polycover_core::algorithms::{GreedySetCover, IlpAlgorithm, PartitionAlgorithm, StripAlgorithm};
use polycover_core::postprocess::{
    BoundingBoxSplit, CoverTransform, Join, JoinFull, PartitionSplit, Postprocessor, Prune, Trim,
};
use polycover_core::runner::{self, Validity};
use polycover_core::{CoverProvider, ProblemInstance};

const POSTPROCESSOR_NAMES: [&str; 6] =
    ["prune", "trim", "join", "join-full", "bbox-split", "partition-split"];

#[derive(Parser)]
#[command(name = "polycover")]
#[command(about = "Compute low-cost rectangle covers of rectilinear polygons", long_about = None)]
struct Cli {
    /// Path to the problem instance's WKT file (MULTIPOLYGON)
    #[arg(short, long)]
    input: PathBuf,

    /// Creation and area cost of a rectangle
    #[arg(short, long, num_args = 2, value_names = ["CREATION", "AREA"])]
    costs: Vec<u64>,

    /// Algorithm to run: greedy, strip, partition, ilp or ilp-pixel,
    /// optionally followed by +postprocessor tokens (e.g. greedy+prune+trim)
    #[arg(short, long)]
    algorithm: String,

    /// Postprocessors to run on the cover, in order
    #[arg(short, long, num_args = 0.., value_parser = POSTPROCESSOR_NAMES)]
    postprocessors: Vec<String>,

    /// Where to write the JSON or CSV result (CSV appends, JSON overwrites)
    #[arg(short, long)]
    output: PathBuf,

    /// Verify that the result is a valid cover; verification time is not
    /// counted towards the execution time
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    verify: bool,

    /// Per-polygon timeout in seconds for the exact solver
    #[arg(short, long, default_value_t = 0.0)]
    timeout: f64,

    /// Path to write logs to (stderr when omitted)
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_logging(cli.log_file.as_deref()) {
        eprintln!("Error: {error:#}");
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(log_file: Option<&std::path::Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] - [{}]: {}",
            buf.timestamp(),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create log file '{}'", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
        println!("Log file: {}", path.display());
    } else {
        println!("Log file: -");
    }

    builder.init();
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.costs.len() != 2 {
        bail!("--costs takes exactly two values: CREATION AREA");
    }
    let (creation_cost, area_cost) = (cli.costs[0], cli.costs[1]);

    println!(
        "Problem instance:\n\tInput WKT: {}\n\tCreation cost: {creation_cost}\n\tArea cost: {area_cost}",
        cli.input.display()
    );

    let instance = ProblemInstance::load(&cli.input, creation_cost, area_cost)?;

    // the algorithm flag may carry +postprocessor tokens, which run before
    // any from --postprocessors
    let mut tokens = cli.algorithm.split('+');
    let algorithm_name = tokens.next().unwrap_or_default().to_ascii_lowercase();
    let mut postprocessor_names: Vec<String> =
        tokens.map(|t| t.to_ascii_lowercase()).collect();
    postprocessor_names.extend(cli.postprocessors.iter().map(|p| p.to_ascii_lowercase()));

    let algorithm = build_algorithm(&algorithm_name, cli.timeout)?;
    let provider = build_chain(algorithm, &postprocessor_names)?;

    let full_name = std::iter::once(algorithm_name.as_str())
        .chain(postprocessor_names.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("+");

    println!(
        "\nUsing:\n\tAlgorithm: {algorithm_name}\n\tPostprocessors: {}\n\tFull algorithm name: {full_name}",
        if postprocessor_names.is_empty() {
            "-".to_string()
        } else {
            postprocessor_names.join(" ")
        }
    );
    println!("Output path: {}", cli.output.display());
    println!(
        "Cover verification: {}",
        if cli.verify { "on" } else { "off" }
    );

    let time_start = SystemTime::now();
    println!("\nStart creating cover at {}...", writer::format_time(time_start));
    let results = runner::run_algorithm(provider.as_ref(), &instance, cli.verify);
    let time_end = SystemTime::now();
    println!("Finished at {}.\n\nResults:", writer::format_time(time_end));

    let mut exit_bits = 0u8;
    for (index, result) in results.iter().enumerate().skip(1) {
        println!("Polygon {index}/{}:", results.len() - 1);
        print_result(result);
        match result.validity {
            Validity::Invalid => {
                exit_bits |= 1;
                let message = format!(
                    "Algorithm '{full_name}' failed to cover polygon {index}/{} in instance '{}' \
                     with creation cost {creation_cost} and area cost {area_cost}",
                    results.len() - 1,
                    instance.name()
                );
                eprintln!("{message}");
                warn!("{message}");
            }
            Validity::Timeout => {
                exit_bits |= 2;
                let message = format!(
                    "Algorithm '{full_name}' reached timeout on polygon {index}/{} in instance '{}' \
                     with creation cost {creation_cost} and area cost {area_cost}",
                    results.len() - 1,
                    instance.name()
                );
                eprintln!("{message}");
                warn!("{message}");
            }
            _ => {}
        }
    }

    println!("\nTotal for all polygons in this instance:");
    print_result(&results[0]);

    println!("\nWriting result to: {}", cli.output.display());
    writer::write_result(&instance, &results, &full_name, &cli.output, time_start, time_end)?;

    Ok(ExitCode::from(exit_bits))
}

fn build_algorithm(name: &str, timeout: f64) -> Result<Box<dyn CoverProvider>> {
    Ok(match name {
        "greedy" => Box::new(GreedySetCover),
        "strip" => Box::new(StripAlgorithm),
        "partition" => Box::new(PartitionAlgorithm),
        "ilp" => Box::new(IlpAlgorithm::new(false, timeout)),
        "ilp-pixel" => Box::new(IlpAlgorithm::new(true, timeout)),
        other => bail!("unknown algorithm name '{other}'"),
    })
}

fn build_chain(
    algorithm: Box<dyn CoverProvider>,
    postprocessor_names: &[String],
) -> Result<Box<dyn CoverProvider>> {
    let mut prune_used = false;
    let mut names = postprocessor_names.iter();

    let Some(first) = names.next() else {
        return Ok(algorithm);
    };
    warn_about_order(first, &mut prune_used);
    let mut chain = Postprocessor::over_algorithm(algorithm, build_transform(first)?);

    for name in names {
        warn_about_order(name, &mut prune_used);
        chain = Postprocessor::over(chain, build_transform(name)?);
    }

    Ok(Box::new(chain))
}

fn warn_about_order(name: &str, prune_used: &mut bool) {
    if name == "prune" {
        *prune_used = true;
    } else if name == "trim" && !*prune_used {
        eprintln!(
            "WARNING: 'trim' assumes there are no fully redundant rectangles in the cover; \
             you may want to prune first"
        );
    }
}

fn build_transform(name: &str) -> Result<Box<dyn CoverTransform>> {
    Ok(match name {
        "prune" => Box::new(Prune),
        "trim" => Box::new(Trim),
        "join" => Box::new(Join),
        "join-full" => Box::new(JoinFull),
        "bbox-split" => Box::new(BoundingBoxSplit),
        "partition-split" => Box::new(PartitionSplit),
        other => bail!("unknown postprocessor name '{other}'"),
    })
}

fn print_result(result: &runner::RunResult) {
    println!("\tTotal cost: {}", result.cost.total());
    println!("\tCreation cost: {}", result.cost.creation);
    println!("\tArea cost: {}", result.cost.area);
    println!("\tCover size: {}", result.cover_size);
    println!(
        "\tExecution time: {}s",
        result.execution_time.as_secs_f64()
    );
    let valid = match result.validity {
        Validity::Valid => "yes",
        Validity::Invalid => "NO",
        Validity::Timeout => "TIMEOUT",
        Validity::Unchecked => "not checked (pass --verify true to enable verification)",
    };
    println!("\tValid: {valid}");
}
