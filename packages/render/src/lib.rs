#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renders classified borehole samples as a point map and a histogram.
//!
//! A render cycle looks the selected parameter up in the registry,
//! classifies the shared dataset once, and builds both views from that one
//! [`ClassifiedSet`], so the map and the histogram always agree on which
//! samples are compliant. Failures inside a cycle are caught by
//! [`render_cycle`] and turned into a user-visible message; nothing partial
//! is returned.

pub mod artifacts;
pub mod histogram;
pub mod map;
pub mod palette;

use borehole_map_dataset::Dataset;
use borehole_map_parameter::UnknownParameterError;
use borehole_map_parameter::classify::{ClassifiedSet, classify_samples};
use borehole_map_parameter::registry::ParameterRegistry;
use borehole_map_parameter_models::{InvalidThresholdError, Location};
use borehole_map_render_models::{RenderOutput, RenderStats, TileLayer};

use crate::palette::Palette;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 20;

/// Popup fields shown on every marker when present in the record.
pub const DEFAULT_AUXILIARY_FIELDS: &[&str] = &["District", "Ph", "Total dissolved solids"];

/// Errors raised while building render artifacts.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No sample has a usable value for the parameter.
    #[error("no samples with a usable value for {parameter}")]
    NoSamples {
        /// The selected parameter.
        parameter: String,
    },

    /// Histogram bin count must be positive.
    #[error("invalid histogram bin count: {0}")]
    InvalidBinCount(usize),

    /// A threshold override could not be applied.
    #[error(transparent)]
    InvalidThreshold(#[from] InvalidThresholdError),

    /// Artifact serialization failed.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Artifact write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can abort a render cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Registry lookup miss.
    #[error(transparent)]
    UnknownParameter(#[from] UnknownParameterError),

    /// Artifact construction failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Basemap configuration.
#[derive(Debug, Clone)]
pub struct BaseMap {
    /// Initial center.
    pub center: Location,
    /// Initial zoom level.
    pub zoom: u8,
    /// Basemap tile layers.
    pub tile_layers: Vec<TileLayer>,
    /// Marker radius in pixels.
    pub marker_radius: u8,
}

impl Default for BaseMap {
    /// Centered on Uganda with satellite and terrain basemaps.
    fn default() -> Self {
        Self {
            center: Location::new(1.373_333, 32.290_275),
            zoom: 6,
            tile_layers: vec![
                TileLayer {
                    name: "Esri Satellite".to_string(),
                    url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
                    attribution: "Esri".to_string(),
                },
                TileLayer {
                    name: "Stamen Terrain".to_string(),
                    url: "https://stamen-tiles-{s}.a.ssl.fastly.net/terrain/{z}/{x}/{y}.png"
                        .to_string(),
                    attribution: "Stamen Terrain".to_string(),
                },
            ],
            marker_radius: 6,
        }
    }
}

/// Knobs for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Histogram bin count for numeric parameters.
    pub bins: usize,
    /// Popup fields always shown on each marker (`n/a` when absent).
    pub auxiliary_fields: Vec<String>,
    /// Basemap configuration.
    pub base_map: BaseMap,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            auxiliary_fields: DEFAULT_AUXILIARY_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            base_map: BaseMap::default(),
        }
    }
}

/// Builds the map and distribution views from one classified set.
///
/// # Errors
///
/// Returns [`RenderError::NoSamples`] if nothing is plottable and
/// [`RenderError::InvalidBinCount`] for a zero bin count.
pub fn render(
    set: &ClassifiedSet<'_>,
    options: &RenderOptions,
) -> Result<RenderOutput, RenderError> {
    if set.is_empty() {
        return Err(RenderError::NoSamples {
            parameter: set.spec.name.clone(),
        });
    }

    let palette = Palette::for_set(set);
    let distribution_view = histogram::build_distribution(set, &palette, options.bins)?;
    let map_view = map::build_map_view(set, &palette, options);

    Ok(RenderOutput {
        parameter: set.spec.name.clone(),
        unit: set.spec.unit.clone(),
        map_view,
        distribution_view,
        stats: RenderStats {
            included: set.len(),
            missing: set.missing,
            rejected: set.rejected.len(),
        },
    })
}

/// What the user asked to see in one cycle.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Parameter name or alias.
    pub parameter: String,
    /// Optional single upper bound replacing the registry's limit.
    pub threshold: Option<f64>,
}

impl RenderRequest {
    /// Requests `parameter` judged by its registry limit.
    #[must_use]
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            threshold: None,
        }
    }

    /// Overrides the registry limit with a single upper bound.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Result of one render cycle as seen by the display shell.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Both artifacts were produced.
    Rendered(Box<RenderOutput>),
    /// The cycle aborted; show `message` instead of any artifact.
    Failed {
        /// User-visible error message.
        message: String,
    },
}

impl RenderOutcome {
    /// The rendered output, if the cycle succeeded.
    #[must_use]
    pub fn output(&self) -> Option<&RenderOutput> {
        match self {
            Self::Rendered(output) => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

/// Runs one render cycle over the shared dataset.
///
/// Never propagates an error: lookup misses and render failures are logged
/// and returned as [`RenderOutcome::Failed`].
#[must_use]
pub fn render_cycle(
    dataset: &Dataset,
    registry: &ParameterRegistry,
    request: &RenderRequest,
    options: &RenderOptions,
) -> RenderOutcome {
    match try_render_cycle(dataset, registry, request, options) {
        Ok(output) => {
            log::info!(
                "Rendered {}: {} included, {} missing, {} rejected",
                output.parameter,
                output.stats.included,
                output.stats.missing,
                output.stats.rejected
            );
            RenderOutcome::Rendered(Box::new(output))
        }
        Err(e) => {
            log::error!("Render cycle for {} failed: {e}", request.parameter);
            RenderOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

/// Fallible body of [`render_cycle`].
///
/// # Errors
///
/// Returns [`CycleError`] if the parameter is unknown, the threshold
/// override is invalid, or rendering fails.
pub fn try_render_cycle(
    dataset: &Dataset,
    registry: &ParameterRegistry,
    request: &RenderRequest,
    options: &RenderOptions,
) -> Result<RenderOutput, CycleError> {
    let spec = registry.lookup(&request.parameter)?;
    let spec = match request.threshold {
        Some(bound) => spec.with_threshold(bound).map_err(RenderError::from)?,
        None => spec.clone(),
    };

    let set = classify_samples(&dataset.samples, &spec);
    Ok(render(&set, options)?)
}
