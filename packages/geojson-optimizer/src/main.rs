//! optimize-geojson - shrink GeoJSON layers for the suitability dashboard
//!
//! Rounds every coordinate of a FeatureCollection, drops elevation values and
//! writes the result minified, then prints how much was saved.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{debug, info};

use geojson_optimizer::{parse_precision_arg, run_job, OptimizeOptions};

#[derive(Parser)]
#[command(
    name = "optimize-geojson",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reduce GeoJSON coordinate precision and strip elevation values",
    after_help = "Examples:\n  optimize-geojson public/iligan_safdz.geojson public/iligan_safdz_optimized.geojson 4\n  optimize-geojson input.geojson output.geojson 3 0.0001"
)]
struct Cli {
    /// GeoJSON FeatureCollection to read
    input: PathBuf,

    /// Where to write the minified result
    output: PathBuf,

    /// Decimal places to keep (defaults to 4 when missing or not an integer)
    #[arg(allow_negative_numbers = true)]
    precision: Option<String>,

    /// Positional form of --simplify, for the `<in> <out> [precision] [tolerance]` usage
    #[arg(value_name = "SIMPLIFY_TOLERANCE", allow_negative_numbers = true, conflicts_with = "simplify")]
    simplify_tolerance: Option<f64>,

    /// Simplify polygon rings with this Douglas-Peucker tolerance, in degrees
    #[arg(long, value_name = "TOLERANCE")]
    simplify: Option<f64>,

    /// Worker threads for large collections (defaults to the number of CPUs)
    #[arg(long, env = "GEOJSON_OPTIMIZER_THREADS")]
    threads: Option<usize>,

    /// Process features on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log verbosity (logs go to stderr)
    #[arg(long, value_enum, env = "GEOJSON_OPTIMIZER_LOG_LEVEL", default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .filter_level(cli.log_level.into())
        .init();

    info!("optimize-geojson v{} starting", env!("CARGO_PKG_VERSION"));

    let options = OptimizeOptions::default()
        .with_precision(parse_precision_arg(cli.precision.as_deref()))
        .with_simplify_tolerance(cli.simplify.or(cli.simplify_tolerance))
        .with_parallel(!cli.sequential)
        .with_threads(cli.threads);
    debug!("Options: {options:?}");

    let report = run_job(&cli.input, &cli.output, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
