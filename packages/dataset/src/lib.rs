#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loader for borehole survey datasets.
//!
//! Reads a survey export into an in-memory [`Dataset`] of [`Sample`]s using
//! a [`config::DatasetConfig`] column mapping. The dataset is loaded once
//! and then passed by shared reference to every render cycle.

pub mod config;
pub mod progress;
pub mod utm;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use borehole_map_parameter_models::{Location, Sample, SampleValue};

use crate::config::{CoordinateColumns, DatasetConfig};
use crate::progress::LoadProgress;

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Dataset config TOML is malformed.
    #[error("Dataset config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A column required by the config is absent from the header row.
    #[error("Missing column: {column}")]
    MissingColumn {
        /// The missing column name.
        column: String,
    },
}

/// An in-memory survey dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Dataset name (from the config).
    pub name: String,
    /// Header row, minus ignored columns.
    pub columns: Vec<String>,
    /// Loaded samples in file order.
    pub samples: Vec<Sample>,
    /// Rows dropped for missing, unparseable or zero coordinates.
    pub skipped_rows: usize,
}

impl Dataset {
    /// Wraps already-built samples.
    #[must_use]
    pub fn from_samples(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            samples,
            skipped_rows: 0,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Loads a CSV file from disk.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not valid CSV,
/// or lacks the configured coordinate columns.
pub fn load_csv(
    path: &Path,
    config: &DatasetConfig,
    progress: Option<Arc<dyn LoadProgress>>,
) -> Result<Dataset, DatasetError> {
    log::info!("Loading {} from {}", config.name, path.display());
    let file = std::fs::File::open(path)?;
    load_csv_reader(file, config, progress)
}

/// Loads CSV data from any reader.
///
/// Every non-ignored column becomes a [`SampleValue`]: finite numbers become
/// [`SampleValue::Number`], anything else [`SampleValue::Text`], and
/// missing-value markers are left absent.
///
/// # Errors
///
/// Returns [`DatasetError`] if the data is not valid CSV or lacks the
/// configured coordinate columns.
pub fn load_csv_reader<R: Read>(
    reader: R,
    config: &DatasetConfig,
    progress: Option<Arc<dyn LoadProgress>>,
) -> Result<Dataset, DatasetError> {
    let progress = progress.unwrap_or_else(progress::no_progress);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let position_of = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: column.to_owned(),
            })
    };
    let [y_column, x_column] = config.coordinates.column_names();
    let y_idx = position_of(y_column)?;
    let x_idx = position_of(x_column)?;

    let site_idxs: Vec<usize> = config
        .site_id
        .iter()
        .filter_map(|column| headers.iter().position(|h| h == column))
        .collect();

    let value_columns: Vec<(usize, &String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !config.is_ignored(h))
        .collect();

    progress.started(&config.name);

    let mut samples = Vec::new();
    let mut skipped_rows = 0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        progress.record_read();

        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let Some(location) = parse_location(cell(y_idx), cell(x_idx), &config.coordinates) else {
            log::debug!(
                "Skipping row {}: unusable coordinates ({:?}, {:?})",
                row_idx + 1,
                cell(y_idx),
                cell(x_idx)
            );
            skipped_rows += 1;
            continue;
        };

        let site_id = site_idxs
            .iter()
            .map(|&idx| cell(idx))
            .find(|s| !config.is_missing(s))
            .map_or_else(|| format!("row {}", row_idx + 1), str::to_owned);

        let mut sample = Sample::new(site_id, location);
        for &(idx, column) in &value_columns {
            let raw = cell(idx);
            if config.is_missing(raw) {
                continue;
            }
            sample.values.insert(column.clone(), parse_value(raw));
        }
        samples.push(sample);
    }

    if skipped_rows > 0 {
        log::warn!("Skipped {skipped_rows} rows with missing or zero coordinates");
    }
    log::info!("Loaded {} samples from {}", samples.len(), config.name);
    progress.finished(samples.len(), skipped_rows);

    Ok(Dataset {
        name: config.name.clone(),
        columns: value_columns.into_iter().map(|(_, c)| c.clone()).collect(),
        samples,
        skipped_rows,
    })
}

/// Parses a cell as a finite number where possible.
fn parse_value(raw: &str) -> SampleValue {
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => SampleValue::Number(n),
        _ => SampleValue::Text(raw.to_owned()),
    }
}

/// Parses the two coordinate cells. Returns `None` if either is missing,
/// unparseable, or zero.
fn parse_location(y: &str, x: &str, columns: &CoordinateColumns) -> Option<Location> {
    let y = y.parse::<f64>().ok()?;
    let x = x.parse::<f64>().ok()?;
    if y == 0.0 || x == 0.0 {
        return None;
    }

    match columns {
        CoordinateColumns::LatLng { .. } => {
            ((-90.0..=90.0).contains(&y) && (-180.0..=180.0).contains(&x))
                .then(|| Location::new(y, x))
        }
        CoordinateColumns::Utm {
            zone, hemisphere, ..
        } => utm::utm_to_location(x, y, *zone, *hemisphere),
    }
}
