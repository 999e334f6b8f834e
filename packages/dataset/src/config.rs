//! Config-driven dataset column mapping.
//!
//! [`DatasetConfig`] captures everything survey-specific about a CSV export
//! (which column names the site, where the coordinates live, which columns
//! to ignore) so a single loader handles every export.

use serde::Deserialize;

use crate::DatasetError;
use crate::utm::Hemisphere;

/// The built-in config for the Uganda borehole survey export.
const UGANDA_BOREHOLES_TOML: &str = include_str!("../datasets/uganda_boreholes.toml");

/// Column mapping for one survey export.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Unique identifier (e.g., `"uganda_boreholes"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Column names for the site identifier, tried in order (first
    /// non-empty wins).
    #[serde(default)]
    pub site_id: Vec<String>,
    /// Where the coordinates live.
    pub coordinates: CoordinateColumns,
    /// Columns dropped entirely at load time.
    #[serde(default)]
    pub ignored_columns: Vec<String>,
    /// Cell contents treated as a missing value (case-insensitive).
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
}

fn default_missing_markers() -> Vec<String> {
    vec![String::new(), "NA".to_string(), "nan".to_string()]
}

/// How to extract a position from a row.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinateColumns {
    /// Latitude/longitude columns in degrees.
    LatLng {
        /// Latitude column name.
        latitude: String,
        /// Longitude column name.
        longitude: String,
    },
    /// UTM grid reference columns in metres.
    Utm {
        /// Easting column name.
        easting: String,
        /// Northing column name.
        northing: String,
        /// UTM zone number (1-60).
        zone: u8,
        /// Zone hemisphere.
        #[serde(default)]
        hemisphere: Hemisphere,
    },
}

impl CoordinateColumns {
    /// The two source column names, in (y-ish, x-ish) order.
    #[must_use]
    pub fn column_names(&self) -> [&str; 2] {
        match self {
            Self::LatLng {
                latitude,
                longitude,
            } => [latitude.as_str(), longitude.as_str()],
            Self::Utm {
                easting, northing, ..
            } => [northing.as_str(), easting.as_str()],
        }
    }
}

impl DatasetConfig {
    /// Returns the built-in Uganda borehole survey mapping.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (fixed at compile time).
    #[must_use]
    pub fn uganda_boreholes() -> Self {
        Self::from_toml_str(UGANDA_BOREHOLES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse uganda_boreholes.toml: {e}"))
    }

    /// Parses a dataset config from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] if the TOML is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, DatasetError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Whether `cell` is one of the configured missing-value markers.
    #[must_use]
    pub fn is_missing(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.missing_markers
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(cell))
    }

    /// Whether `column` should be dropped at load time.
    #[must_use]
    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored_columns.iter().any(|c| c == column)
            || self.coordinates.column_names().contains(&column)
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::uganda_boreholes()
    }
}
