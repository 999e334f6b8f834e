#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Display shell for the borehole map pipeline.
//!
//! Loads the survey dataset once, then either runs a single render cycle
//! per subcommand or drops into an interactive menu that re-renders on every
//! parameter or threshold change. Artifacts are written as `GeoJSON` plus a
//! histogram JSON for whatever front end displays them.
//!
//! Uses `indicatif-log-bridge` (via [`borehole_map_cli_utils::init_logger`])
//! so log lines and the load spinner share the terminal cleanly.

mod interactive;

use std::path::{Path, PathBuf};

use borehole_map_cli_utils::{MultiProgress, RowSpinner};
use borehole_map_dataset::config::DatasetConfig;
use borehole_map_dataset::{Dataset, load_csv};
use borehole_map_parameter::classify::classify_samples;
use borehole_map_parameter::registry::ParameterRegistry;
use borehole_map_render::artifacts::{ArtifactPaths, clear_artifacts, write_artifacts};
use borehole_map_render::{RenderOptions, RenderOutcome, RenderRequest, render_cycle};
use clap::{Parser, Subcommand};

/// Env var consulted when `--data` is not given.
const DATA_ENV: &str = "BOREHOLE_MAP_DATA";
/// Env var consulted when `--output` is not given.
const OUTPUT_DIR_ENV: &str = "BOREHOLE_MAP_OUTPUT_DIR";

const DEFAULT_DATA: &str = "dataset.csv";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(
    name = "borehole_map",
    about = "Groundwater quality map and histogram renderer"
)]
struct Cli {
    /// Survey CSV (defaults to `BOREHOLE_MAP_DATA`, then `dataset.csv`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Dataset column mapping TOML (defaults to the built-in Uganda mapping)
    #[arg(long, global = true)]
    dataset_config: Option<PathBuf>,
    /// Parameter registry TOML (defaults to the built-in registry)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known parameters and their limits
    Parameters,
    /// Render one parameter to `map.geojson` and `distribution.json`
    Render {
        /// Parameter name or alias (e.g., "Nitrate", "pH", "EC")
        #[arg(long)]
        parameter: String,
        /// Replace the registry limit with a single upper bound
        #[arg(long)]
        threshold: Option<f64>,
        /// Histogram bin count for numeric parameters
        #[arg(long, default_value_t = borehole_map_render::DEFAULT_BINS)]
        bins: usize,
        /// Output directory (defaults to `BOREHOLE_MAP_OUTPUT_DIR`, then `output`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print compliance counts for every parameter in the dataset
    Summary,
    /// Print the first rows of the loaded dataset
    Preview {
        /// Number of samples to show
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = borehole_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let registry = load_registry(cli.registry.as_deref())?;
    let load = || -> Result<Dataset, Box<dyn std::error::Error>> {
        let config = load_dataset_config(cli.dataset_config.as_deref())?;
        let data = resolve_path(cli.data.clone(), std::env::var(DATA_ENV).ok(), DEFAULT_DATA);
        load_dataset(&data, &config, &multi)
    };

    let Some(command) = cli.command else {
        let dataset = load()?;
        let dir = resolve_path(None, std::env::var(OUTPUT_DIR_ENV).ok(), DEFAULT_OUTPUT_DIR);
        return interactive::run(&dataset, &registry, &dir);
    };

    match command {
        Commands::Parameters => print_parameters(&registry),
        Commands::Render {
            parameter,
            threshold,
            bins,
            output,
        } => {
            let dataset = load()?;
            let dir = resolve_path(output, std::env::var(OUTPUT_DIR_ENV).ok(), DEFAULT_OUTPUT_DIR);
            let mut request = RenderRequest::new(parameter);
            if let Some(bound) = threshold {
                request = request.with_threshold(bound);
            }
            let options = RenderOptions {
                bins,
                ..RenderOptions::default()
            };

            match publish(render_cycle(&dataset, &registry, &request, &options), &dir) {
                Ok(paths) => {
                    println!("Map:          {}", paths.map.display());
                    println!("Distribution: {}", paths.distribution.display());
                }
                Err(message) => {
                    eprintln!("Error: {message}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Summary => print_summary(&load()?, &registry),
        Commands::Preview { rows } => {
            for line in preview_lines(&load()?, rows) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Writes a rendered cycle's artifacts into `dir`.
///
/// A failed cycle clears whatever an earlier cycle left in `dir`. Either
/// kind of failure comes back as the message to show the user.
fn publish(outcome: RenderOutcome, dir: &Path) -> Result<ArtifactPaths, String> {
    match outcome {
        RenderOutcome::Rendered(output) => write_artifacts(&output, dir).map_err(|e| e.to_string()),
        RenderOutcome::Failed { message } => {
            if let Err(e) = clear_artifacts(dir) {
                log::warn!("Failed to clear stale artifacts: {e}");
            }
            Err(message)
        }
    }
}

/// Picks the flag value, then the env var, then the default.
fn resolve_path(flag: Option<PathBuf>, env: Option<String>, default: &str) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn load_registry(path: Option<&Path>) -> Result<ParameterRegistry, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::info!("Loading parameter registry from {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            Ok(ParameterRegistry::from_toml_str(&contents)?)
        }
        None => Ok(ParameterRegistry::builtin()),
    }
}

fn load_dataset_config(path: Option<&Path>) -> Result<DatasetConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(DatasetConfig::from_toml_str(&contents)?)
        }
        None => Ok(DatasetConfig::uganda_boreholes()),
    }
}

fn load_dataset(
    path: &Path,
    config: &DatasetConfig,
    multi: &MultiProgress,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let progress = RowSpinner::attach(multi);
    Ok(load_csv(path, config, Some(progress))?)
}

fn print_parameters(registry: &ParameterRegistry) {
    println!("{:<26} {:<12} {:<18} LIMIT", "NAME", "UNIT", "KIND");
    println!("{}", "-".repeat(72));
    for spec in registry.parameters() {
        println!(
            "{:<26} {:<12} {:<18} {}",
            spec.name,
            spec.unit,
            spec.kind.tag().as_ref(),
            spec.limit_description().unwrap_or_default()
        );
    }
}

fn print_summary(dataset: &Dataset, registry: &ParameterRegistry) {
    println!("{} ({} samples)", dataset.name, dataset.len());
    println!();

    for spec in registry.parameters() {
        let set = classify_samples(&dataset.samples, spec);
        if set.is_empty() {
            continue;
        }

        let counts = set
            .counts()
            .iter()
            .map(|(classification, count)| format!("{classification}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");

        println!("{:<26} {counts}", spec.name);
        if set.missing > 0 || !set.rejected.is_empty() {
            println!(
                "{:<26} ({} missing, {} unparseable)",
                "",
                set.missing,
                set.rejected.len()
            );
        }
    }
}

/// Formats the first `rows` samples as aligned text, header first.
fn preview_lines(dataset: &Dataset, rows: usize) -> Vec<String> {
    let row = |site: &str, lat: &str, lng: &str, cells: Vec<String>| {
        let mut line = format!("{site:<20} {lat:>10} {lng:>10}");
        for cell in cells {
            line.push_str(&format!(" {cell:>12}"));
        }
        line
    };

    let mut lines = vec![row("SITE", "LAT", "LNG", dataset.columns.clone())];
    for sample in dataset.samples.iter().take(rows) {
        let cells = dataset
            .columns
            .iter()
            .map(|column| {
                sample
                    .value(column)
                    .map_or_else(|| "-".to_string(), ToString::to_string)
            })
            .collect();
        lines.push(row(
            &sample.site_id,
            &format!("{:.5}", sample.location.latitude),
            &format!("{:.5}", sample.location.longitude),
            cells,
        ));
    }
    if dataset.len() > rows {
        lines.push(format!("... {} more", dataset.len() - rows));
    }
    lines
}
