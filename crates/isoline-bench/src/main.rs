//! isoline-bench: CLI tool for contour and label parameter experimentation.
//!
//! Contours a synthetic field or a grid loaded from JSON with configurable
//! levels, smoothing, and label placement, printing per-level diagnostics.
//! Useful for:
//!
//! - Comparing placement policies (`spacing` vs `count`)
//! - Tuning label isolation, smoothing factor, and kernel
//! - Measuring per-level durations to identify slow levels
//! - Seeing how parameter changes affect line, label, and vertex counts
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin isoline-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use isoline::label::{Justify, PlacementPolicy};
use isoline::{
    Clock, ContourConfig, ContourDiagnostics, ContourEngine, Grid, GridHeader, Kernel, LevelSet,
    ScalarField, SmoothingConfig,
};
use tracing_subscriber::{EnvFilter, fmt};

/// Contour and label parameter experimentation for isoline.
///
/// Contours a grid with configurable parameters and prints detailed
/// per-level timing and count diagnostics.
#[derive(Parser)]
#[command(name = "isoline-bench", version)]
struct Cli {
    /// Synthetic field to contour when no grid file is given.
    #[arg(long, value_enum, default_value_t = Field::Peaks)]
    field: Field,

    /// Grid file (JSON serialization of `isoline::Grid`). Overrides `--field`.
    #[arg(long)]
    grid_json: Option<PathBuf>,

    /// Node columns of the synthetic field.
    #[arg(long, default_value_t = 121, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    cols: usize,

    /// Node rows of the synthetic field.
    #[arg(long, default_value_t = 121, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    rows: usize,

    /// Spacing between contour levels.
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Spacing between annotated levels (0 annotates nothing).
    #[arg(long, default_value_t = 2.0)]
    annotation_interval: f64,

    /// Label placement policy.
    #[arg(long, value_enum, default_value_t = Policy::Spacing)]
    policy: Policy,

    /// Track distance between labels (spacing policy).
    #[arg(long, default_value_t = 1.5)]
    label_spacing: f64,

    /// Labels per line (count policy).
    #[arg(long, default_value_t = 2, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    label_count: usize,

    /// Minimum distance between any two labels (0 disables the check).
    #[arg(long, default_value_t = 0.0)]
    isolation: f64,

    /// Side that higher values lie on, looking along each line.
    #[arg(long, value_enum, default_value_t = Side::AsTraced)]
    orientation: Side,

    /// Resampling factor (0 disables smoothing).
    #[arg(long, default_value_t = 0)]
    smooth_factor: usize,

    /// Smoothing curve.
    #[arg(long, value_enum, default_value_t = Curve::Akima)]
    kernel: Curve,

    /// Write the contour set of the first run as JSON to this file.
    #[arg(long)]
    lines_json: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full contour config as a JSON string.
    ///
    /// When provided, all other contour parameter flags are ignored.
    /// The JSON must be a valid `ContourConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "ISOLINE_LOG", default_value = "info")]
    log_level: String,
}

/// Synthetic field selection.
#[derive(Clone, Copy, ValueEnum)]
enum Field {
    /// Three peaks and two pits over `[-3, 3]^2`.
    Peaks,
    /// `x^2 - y^2` over `[-1, 1]^2`, with a saddle at the origin.
    Saddle,
    /// Zonal bands on a global longitude-periodic grid.
    Bands,
    /// A tilted plane over `[0, 10]^2`.
    Ramp,
}

/// Label placement policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// One label every `--label-spacing` units of track distance.
    Spacing,
    /// `--label-count` labels per line.
    Count,
}

/// Line orientation selection.
#[derive(Clone, Copy, ValueEnum)]
enum Side {
    /// Keep the direction lines were traced in.
    AsTraced,
    /// Higher values on the right.
    Right,
    /// Higher values on the left.
    Left,
}

/// Smoothing kernel selection.
#[derive(Clone, Copy, ValueEnum)]
enum Curve {
    /// Piecewise linear.
    Linear,
    /// Akima spline.
    Akima,
    /// Natural cubic spline.
    Cubic,
}

/// Build a [`ContourConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<ContourConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let mut config = ContourConfig {
        levels: LevelSet::Interval {
            interval: cli.interval,
            annotation_interval: cli.annotation_interval,
        },
        orientation: match cli.orientation {
            Side::AsTraced => 0,
            Side::Right => 1,
            Side::Left => -1,
        },
        smoothing: SmoothingConfig {
            factor: cli.smooth_factor,
            kernel: match cli.kernel {
                Curve::Linear => Kernel::Linear,
                Curve::Akima => Kernel::Akima,
                Curve::Cubic => Kernel::Cubic,
            },
        },
        ..ContourConfig::default()
    };
    config.labels.policy = match cli.policy {
        Policy::Spacing => PlacementPolicy::Spacing {
            interval: cli.label_spacing,
            initial_offset: 0.0,
        },
        Policy::Count => PlacementPolicy::Count {
            n: cli.label_count,
            min_separation: 0.0,
            justify: Justify::Spread,
        },
    };
    config.labels.isolation = cli.isolation;
    Ok(config)
}

/// Sample one of the synthetic fields.
fn synthetic_grid(field: Field, cols: usize, rows: usize) -> Result<Grid, isoline::GridError> {
    match field {
        Field::Peaks => Grid::from_fn(GridHeader::new(-3.0, 3.0, -3.0, 3.0), cols, rows, peaks),
        Field::Saddle => Grid::from_fn(GridHeader::new(-1.0, 1.0, -1.0, 1.0), cols, rows, |x, y| {
            x.mul_add(x, -(y * y))
        }),
        Field::Bands => Grid::from_fn(
            GridHeader::new(-180.0, 180.0, -90.0, 90.0).periodic(),
            cols,
            rows,
            |lon, lat| {
                10.0f64.mul_add(
                    (3.0 * lat.to_radians()).sin(),
                    5.0 * (2.0 * lon.to_radians()).cos(),
                )
            },
        ),
        Field::Ramp => Grid::from_fn(GridHeader::new(0.0, 10.0, 0.0, 10.0), cols, rows, |x, y| {
            0.5f64.mul_add(y, x)
        }),
    }
}

/// The classic three-peak test surface.
fn peaks(x: f64, y: f64) -> f64 {
    let a = 3.0 * (1.0 - x).powi(2) * (-x * x - (y + 1.0).powi(2)).exp();
    let b = 10.0 * (x / 5.0 - x.powi(3) - y.powi(5)) * (-x * x - y * y).exp();
    let c = (-(x + 1.0).powi(2) - y * y).exp() / 3.0;
    a - b - c
}

/// Load the grid named on the command line, or sample the synthetic field.
fn load_grid(cli: &Cli) -> Result<Grid, String> {
    let Some(ref path) = cli.grid_json else {
        return synthetic_grid(cli.field, cli.cols, cli.rows)
            .map_err(|e| format!("Error building synthetic grid: {e}"));
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

/// Install the log subscriber. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let grid = match load_grid(&cli) {
        Ok(g) => g,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let header = grid.header();
    eprintln!(
        "Grid: {}x{} over x=[{}, {}] y=[{}, {}]{}",
        grid.n_cols(),
        grid.n_rows(),
        header.x_min,
        header.x_max,
        header.y_min,
        header.y_max,
        if header.periodic_x { " (periodic)" } else { "" },
    );
    if let Some((min, max)) = grid.data_range() {
        eprintln!("Values: [{min}, {max}]");
    }
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let engine = ContourEngine::new();
    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match engine.contour_timed(&grid, &config, &StdClock) {
            Ok(set) => {
                if cli.json {
                    match serde_json::to_string_pretty(&set.diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", set.diagnostics.report());
                }

                // Write lines on the first run only.
                if run == 0
                    && let Some(ref lines_path) = cli.lines_json
                {
                    match serde_json::to_string(&set) {
                        Ok(json) => match std::fs::write(lines_path, &json) {
                            Ok(()) => eprintln!(
                                "Lines written to {} ({} bytes)",
                                lines_path.display(),
                                json.len(),
                            ),
                            Err(e) => {
                                eprintln!("Error writing lines to {}: {e}", lines_path.display());
                            }
                        },
                        Err(e) => eprintln!("Error serializing lines: {e}"),
                    }
                }

                all_diagnostics.push(set.diagnostics);
            }
            Err(e) => {
                eprintln!("Contour error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ContourDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-level means, by position in the level list.
    let mut per_level: Vec<(f64, Vec<f64>)> = Vec::new();
    for diagnostics in all_diagnostics {
        for (i, level) in diagnostics.levels.iter().enumerate() {
            if per_level.len() <= i {
                per_level.push((level.level, Vec::new()));
            }
            per_level[i].1.push(level.duration.as_secs_f64() * 1000.0);
        }
    }

    println!();
    println!("{:>12} {:>12}", "Level", "Mean (ms)");
    println!("{}", "-".repeat(26));
    for (level, level_durations) in &per_level {
        let level_mean = level_durations.iter().sum::<f64>() / level_durations.len() as f64;
        println!("{level:>12} {level_mean:>10.3}ms");
    }
}
