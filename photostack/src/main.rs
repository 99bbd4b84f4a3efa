use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use photostack::{
    ClipPolicy, ImageReport, ProgressCallback, RgbImage, StackConfig, StackRunner, StackingMethod,
    StackingProgress, StackingStage, ZoomFactor, ZoomedImage, read_ppm,
};

/// Iteration counts above this get a warning about run time.
const SLOW_ITERATION_COUNT: i32 = 10;
const DEFAULT_ITERATIONS: i32 = 3;
const DEFAULT_TOLERANCE: f32 = 0.1;

fn main() {
    let matches = cli().get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    let log_dir = matches
        .get_one::<PathBuf>("log-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = common::log_setup::setup_logging(log_level, &log_dir, "photostack") {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let result = match matches.subcommand() {
        Some(("stack", sub)) => run_stack(sub),
        Some(("zoom", sub)) => run_zoom(sub),
        _ => Ok(()),
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("photostack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stack same-sized PPM images and zoom single images")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log level used when RUST_LOG is not set")
                .value_name("LEVEL")
                .default_value("info")
                .global(true),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .help("Directory for daily log files")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value("logs")
                .global(true),
        )
        .subcommand(
            Command::new("stack")
                .about("Combine a batch of same-sized images pixel by pixel")
                .arg(
                    Arg::new("inputs")
                        .help("Input PPM files")
                        .value_name("FILE")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("method")
                        .short('m')
                        .long("method")
                        .help(
                            "Stacking method, may be repeated. Defaults to mean and median, \
                             plus sigma clipping when --iterations or --tolerance is given",
                        )
                        .value_name("METHOD")
                        .value_parser(["mean", "median", "iterations", "tolerance"])
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("iterations")
                        .short('n')
                        .long("iterations")
                        .help("Sigma clipping pass count")
                        .value_name("N")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i32)),
                )
                .arg(
                    Arg::new("tolerance")
                        .short('t')
                        .long("tolerance")
                        .help("Sigma clipping convergence tolerance, from 0 to 1")
                        .value_name("T")
                        .value_parser(parse_tolerance),
                )
                .arg(output_dir_arg()),
        )
        .subcommand(
            Command::new("zoom")
                .about("Upscale one image with nearest-neighbor sampling")
                .arg(
                    Arg::new("input")
                        .help("Input PPM file")
                        .value_name("FILE")
                        .required(true)
                        .index(1)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("factor")
                        .short('f')
                        .long("factor")
                        .help("Zoom factor, may be repeated")
                        .value_name("K")
                        .default_values(["2", "4"])
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(output_dir_arg()),
        )
}

fn output_dir_arg() -> Arg {
    Arg::new("output-dir")
        .short('o')
        .long("output-dir")
        .help("Directory output images are written to")
        .value_name("DIR")
        .default_value(".")
        .value_parser(value_parser!(PathBuf))
}

fn parse_tolerance(value: &str) -> Result<f32, String> {
    let tolerance: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&tolerance) {
        Ok(tolerance)
    } else {
        Err(format!("tolerance must be between 0 and 1, got {}", tolerance))
    }
}

fn output_dir(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn progress_logger() -> ProgressCallback {
    ProgressCallback::new(Arc::new(|p: StackingProgress| {
        tracing::debug!(stage = ?p.stage, current = p.current, total = p.total, "Progress");
    }))
}

/// Which stacking runs were requested. Clipping parameters are passed through
/// raw so invalid values reach the library and get reported there.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Requested {
    Method(StackingMethod),
    Iterations(i32),
    Tolerance(f32),
}

fn requested_methods(matches: &ArgMatches) -> Result<Vec<Requested>> {
    let iterations = matches.get_one::<i32>("iterations").copied();
    let tolerance = matches.get_one::<f32>("tolerance").copied();

    let names: Vec<&str> = match matches.get_many::<String>("method") {
        Some(values) => values.map(String::as_str).collect(),
        None => {
            let mut names = vec!["mean", "median"];
            if iterations.is_some() {
                names.push("iterations");
            }
            if tolerance.is_some() {
                names.push("tolerance");
            }
            names
        }
    };

    names
        .into_iter()
        .map(|name| match name {
            "mean" => Ok(Requested::Method(StackingMethod::Mean)),
            "median" => Ok(Requested::Method(StackingMethod::Median)),
            "iterations" => Ok(Requested::Iterations(iterations.unwrap_or(DEFAULT_ITERATIONS))),
            "tolerance" => Ok(Requested::Tolerance(tolerance.unwrap_or(DEFAULT_TOLERANCE))),
            other => anyhow::bail!("Unknown stacking method '{}'", other),
        })
        .collect()
}

fn load_frames(paths: &[PathBuf], progress: &ProgressCallback) -> Result<Vec<RgbImage>> {
    let start = Instant::now();
    let mut frames = Vec::with_capacity(paths.len());

    for (i, path) in paths.iter().enumerate() {
        let frame = read_ppm(path).with_context(|| format!("Failed to load frame {}", i + 1))?;
        frames.push(frame);
        photostack::stacking::report_progress(progress, i + 1, paths.len(), StackingStage::Loading);
    }

    tracing::info!(
        frame_count = frames.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded frames"
    );

    Ok(frames)
}

fn run_stack(matches: &ArgMatches) -> Result<()> {
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .context("No input files given")?
        .cloned()
        .collect();
    let output_dir = output_dir(matches);
    let requested = requested_methods(matches)?;
    let progress = progress_logger();

    let frames = load_frames(&inputs, &progress)?;

    let mut failures = 0usize;
    for request in requested {
        let method = match resolve(request) {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        let runner = StackRunner::new(StackConfig::new(method, &output_dir))
            .with_progress(progress.clone());

        match runner.run(&frames) {
            Ok(path) => tracing::info!(method = %method, path = %path.display(), "Output written"),
            Err(e) if e.is_invalid_parameter() => tracing::warn!("{}", e),
            Err(e) => {
                tracing::error!(method = %method, "{}", e);
                failures += 1;
            }
        }
    }

    for frame in &frames {
        frame.log_report();
    }

    if failures > 0 {
        anyhow::bail!("{} stacking run(s) failed", failures);
    }

    Ok(())
}

/// Turn a raw request into a method, surfacing invalid clipping parameters
/// as the library's no-op errors.
fn resolve(request: Requested) -> Result<StackingMethod, photostack::StackError> {
    match request {
        Requested::Method(method) => Ok(method),
        Requested::Iterations(count) => {
            if count > SLOW_ITERATION_COUNT {
                tracing::warn!(iterations = count, "This may take a while...");
            }
            ClipPolicy::iterations(count).map(StackingMethod::SigmaClip)
        }
        Requested::Tolerance(tolerance) => {
            ClipPolicy::tolerance(tolerance).map(StackingMethod::SigmaClip)
        }
    }
}

fn run_zoom(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<PathBuf>("input")
        .context("No input file given")?;
    let output_dir = output_dir(matches);

    let base = read_ppm(input).with_context(|| format!("Failed to load {}", input.display()))?;
    base.log_report();

    let factors: Vec<u32> = matches
        .get_many::<u32>("factor")
        .map(|values| values.copied().collect())
        .unwrap_or_default();

    for factor in factors {
        let zoomed = ZoomedImage::new(base.clone(), ZoomFactor::new(factor)?);
        let path = write_zoomed(&zoomed, &output_dir)?;
        tracing::info!(factor, path = %path.display(), "Zoomed image written");
        zoomed.log_report();
    }

    Ok(())
}

fn write_zoomed(zoomed: &ZoomedImage, dir: &Path) -> Result<PathBuf> {
    let start = Instant::now();
    let path = zoomed
        .write(dir)
        .with_context(|| format!("Failed to zoom by {}", zoomed.factor()))?;
    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Zoom complete");
    Ok(path)
}
