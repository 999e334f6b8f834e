#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map and histogram artifact types produced by the borehole map renderer.
//!
//! These types are serialized to JSON for the display shell. They carry no
//! behavior beyond simple accessors; the renderer builds them and the shell
//! draws them.

use borehole_map_parameter_models::{Classification, Location, SampleValue};
use serde::{Deserialize, Serialize};

/// Everything produced by one render cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    /// Canonical parameter name.
    pub parameter: String,
    /// Parameter unit.
    pub unit: String,
    /// Point map of classified samples.
    pub map_view: MapView,
    /// Value distribution of the same samples.
    pub distribution_view: DistributionView,
    /// How many samples made it into the views.
    pub stats: RenderStats,
}

/// Inclusion statistics for one render cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    /// Samples drawn on both views.
    pub included: usize,
    /// Samples with no value for the parameter.
    pub missing: usize,
    /// Samples whose value could not be parsed.
    pub rejected: usize,
}

/// A basemap tile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    /// Layer name shown in the layer control.
    pub name: String,
    /// XYZ URL template.
    pub url: String,
    /// Attribution text.
    pub attribution: String,
}

/// One labelled field in a marker popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupField {
    /// Field name.
    pub label: String,
    /// Formatted value.
    pub value: String,
}

/// A single borehole marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Site identifier.
    pub site_id: String,
    /// Marker position.
    pub location: Location,
    /// Parameter value for this site.
    pub value: SampleValue,
    /// Derived label.
    pub classification: Classification,
    /// Fill color as `#rrggbb`.
    pub color: String,
    /// Marker radius in pixels.
    pub radius: u8,
    /// Popup payload: parameter value, auxiliary fields, location.
    pub popup: Vec<PopupField>,
}

/// A named, toggleable group of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayer {
    /// Layer name (e.g. `"Nitrate >= 10 mg/L"`).
    pub name: String,
    /// Markers in this layer.
    pub markers: Vec<MapMarker>,
}

/// One legend swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Legend text.
    pub label: String,
    /// Swatch color as `#rrggbb`.
    pub color: String,
}

/// Geographic point map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Initial map center.
    pub center: Location,
    /// Initial zoom level.
    pub zoom: u8,
    /// Basemap tile layers.
    pub tile_layers: Vec<TileLayer>,
    /// Marker overlays.
    pub layers: Vec<MarkerLayer>,
    /// Color legend.
    pub legend: Vec<LegendEntry>,
}

impl MapView {
    /// Iterates every marker across all layers.
    pub fn markers(&self) -> impl Iterator<Item = &MapMarker> {
        self.layers.iter().flat_map(|layer| layer.markers.iter())
    }

    /// Total number of markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.markers.len()).sum()
    }
}

/// One histogram bin. Numeric bins carry bounds; categorical bins don't.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Axis label.
    pub label: String,
    /// Inclusive lower bound.
    pub lower: Option<f64>,
    /// Upper bound (exclusive, except for the last bin).
    pub upper: Option<f64>,
}

/// Per-classification bar heights, aligned with [`DistributionView::bins`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSeries {
    /// The label this series counts.
    pub classification: Classification,
    /// Bar color as `#rrggbb`.
    pub color: String,
    /// Count per bin.
    pub counts: Vec<usize>,
}

impl HistogramSeries {
    /// Total samples in this series.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Stacked histogram of a parameter's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionView {
    /// X axis title.
    pub x_label: String,
    /// Bins along the X axis.
    pub bins: Vec<HistogramBin>,
    /// One series per classification.
    pub series: Vec<HistogramSeries>,
}

impl DistributionView {
    /// Total samples across every series.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.series.iter().map(HistogramSeries::total).sum()
    }

    /// Samples counted under `classification`.
    #[must_use]
    pub fn count_for(&self, classification: &Classification) -> usize {
        self.series
            .iter()
            .filter(|s| &s.classification == classification)
            .map(HistogramSeries::total)
            .sum()
    }
}
