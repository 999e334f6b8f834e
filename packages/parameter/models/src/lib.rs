#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borehole sample, water-quality parameter and classification types.
//!
//! These types are shared by the parameter registry, the dataset loader and
//! the renderer. A [`Sample`] is one borehole survey record, a
//! [`ParameterSpec`] describes how one measured column is judged, and a
//! [`Classification`] is the derived compliance label for one
//! (sample, parameter) pair.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single measured or recorded value from a borehole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// A numeric reading.
    Number(f64),
    /// A textual value (a category, or a reading that failed numeric
    /// parsing at load time).
    Text(String),
}

impl SampleValue {
    /// Returns the value as a finite number, parsing text if necessary.
    ///
    /// Returns `None` for non-numeric text and for non-finite numbers.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl std::fmt::Display for SampleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Geographic position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One borehole survey record.
///
/// `values` is keyed by the source column name. A missing reading is the
/// absence of a key, never a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Village / site identifier.
    pub site_id: String,
    /// Borehole position.
    pub location: Location,
    /// Recorded values by column name.
    pub values: BTreeMap<String, SampleValue>,
}

impl Sample {
    /// Creates a sample with no recorded values.
    #[must_use]
    pub fn new(site_id: impl Into<String>, location: Location) -> Self {
        Self {
            site_id: site_id.into(),
            location,
            values: BTreeMap::new(),
        }
    }

    /// Adds a value for `column`, returning the updated sample.
    #[must_use]
    pub fn with_value(mut self, column: impl Into<String>, value: SampleValue) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Returns the value recorded under exactly `column`.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&SampleValue> {
        self.values.get(column)
    }

    /// Returns the value recorded for `spec`, trying the canonical name and
    /// then each alias. Exact column matches win over case-insensitive ones.
    #[must_use]
    pub fn value_for(&self, spec: &ParameterSpec) -> Option<&SampleValue> {
        spec.column_names()
            .find_map(|name| self.values.get(name))
            .or_else(|| {
                self.values
                    .iter()
                    .find(|(column, _)| spec.matches_name(column))
                    .map(|(_, value)| value)
            })
    }
}

/// Flat discriminant of [`ParameterKind`], used for listings and filters.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParameterKindTag {
    /// Discrete attribute without compliance semantics
    Categorical,
    /// Numeric reading without a regulatory limit
    Numerical,
    /// Numeric reading with one upper limit
    SingleThreshold,
    /// Numeric reading with a closed acceptable interval
    RangeThreshold,
}

/// How values of a parameter are judged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Discrete attribute (e.g. district). The raw value is the label.
    Categorical,
    /// Numeric reading with no regulatory limit.
    Numerical,
    /// Compliant only while the value stays strictly below `bound`.
    SingleThreshold {
        /// Upper limit. A value equal to the bound is non-compliant.
        bound: f64,
    },
    /// Compliant only within the closed interval `[low, high]`.
    RangeThreshold {
        /// Lowest acceptable value (inclusive).
        low: f64,
        /// Highest acceptable value (inclusive).
        high: f64,
    },
}

impl ParameterKind {
    /// Returns the flat discriminant for this kind.
    #[must_use]
    pub const fn tag(&self) -> ParameterKindTag {
        match self {
            Self::Categorical => ParameterKindTag::Categorical,
            Self::Numerical => ParameterKindTag::Numerical,
            Self::SingleThreshold { .. } => ParameterKindTag::SingleThreshold,
            Self::RangeThreshold { .. } => ParameterKindTag::RangeThreshold,
        }
    }

    /// Whether values of this kind are expected to be numbers.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Categorical)
    }

    /// Whether this kind carries compliance semantics.
    #[must_use]
    pub const fn has_threshold(&self) -> bool {
        matches!(
            self,
            Self::SingleThreshold { .. } | Self::RangeThreshold { .. }
        )
    }
}

/// Registry entry describing one water-quality parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Canonical parameter name (e.g. `"Nitrate"`).
    pub name: String,
    /// Display unit (e.g. `"mg/L"`). Empty for unitless parameters.
    #[serde(default)]
    pub unit: String,
    /// How values are judged.
    pub kind: ParameterKind,
    /// Alternate column spellings found in survey exports.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterSpec {
    /// Creates a spec with no aliases or description.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            kind,
            aliases: Vec::new(),
            description: None,
        }
    }

    /// Iterates the canonical name followed by every alias.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Case-insensitive match against the canonical name or any alias.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.column_names().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Returns a copy judged against a single user-supplied upper bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is categorical or the bound is not
    /// finite.
    pub fn with_threshold(&self, bound: f64) -> Result<Self, InvalidThresholdError> {
        if !self.kind.is_numeric() || !bound.is_finite() {
            return Err(InvalidThresholdError {
                parameter: self.name.clone(),
                bound,
            });
        }
        Ok(Self {
            kind: ParameterKind::SingleThreshold { bound },
            ..self.clone()
        })
    }

    /// Formats `value` with this parameter's unit.
    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        if self.unit.is_empty() {
            format!("{value}")
        } else {
            format!("{value} {}", self.unit)
        }
    }

    /// Human-readable description of the acceptable range, if any.
    #[must_use]
    pub fn limit_description(&self) -> Option<String> {
        match self.kind {
            ParameterKind::SingleThreshold { bound } => {
                Some(format!("< {}", self.format_value(bound)))
            }
            ParameterKind::RangeThreshold { low, high } => {
                Some(format!("{low} to {}", self.format_value(high)))
            }
            ParameterKind::Categorical | ParameterKind::Numerical => None,
        }
    }
}

/// Error returned when a threshold override cannot be applied to a
/// [`ParameterSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidThresholdError {
    /// The parameter the override was applied to.
    pub parameter: String,
    /// The rejected bound.
    pub bound: f64,
}

impl std::fmt::Display for InvalidThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid threshold {} for parameter {}",
            self.bound, self.parameter
        )
    }
}

impl std::error::Error for InvalidThresholdError {}

/// Derived label for one (sample, parameter) pair.
///
/// Never stored on a [`Sample`]; recomputed every render cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    /// Within the regulatory limit.
    Compliant,
    /// Outside the regulatory limit.
    NonCompliant,
    /// Numeric parameter with no limit.
    NotApplicable,
    /// Categorical parameter; carries the raw category value.
    Category(String),
}

/// Label for [`Classification::Compliant`].
pub const COMPLIANT_LABEL: &str = "compliant";
/// Label for [`Classification::NonCompliant`].
pub const NON_COMPLIANT_LABEL: &str = "non-compliant";
/// Label for [`Classification::NotApplicable`].
pub const NOT_APPLICABLE_LABEL: &str = "n/a";

impl Classification {
    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Compliant => COMPLIANT_LABEL,
            Self::NonCompliant => NON_COMPLIANT_LABEL,
            Self::NotApplicable => NOT_APPLICABLE_LABEL,
            Self::Category(category) => category,
        }
    }

    /// Whether this is a compliance judgement (as opposed to `n/a` or a
    /// category).
    #[must_use]
    pub const fn is_compliance(&self) -> bool {
        matches!(self, Self::Compliant | Self::NonCompliant)
    }

    /// Parses a label produced by [`Self::label`]. Unknown labels are
    /// treated as categories.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            COMPLIANT_LABEL => Self::Compliant,
            NON_COMPLIANT_LABEL => Self::NonCompliant,
            NOT_APPLICABLE_LABEL => Self::NotApplicable,
            other => Self::Category(other.to_string()),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nitrate() -> ParameterSpec {
        ParameterSpec {
            aliases: vec!["NO3".to_string()],
            ..ParameterSpec::new(
                "Nitrate",
                "mg/L",
                ParameterKind::SingleThreshold { bound: 10.0 },
            )
        }
    }

    #[test]
    fn text_values_parse_as_numbers() {
        assert_eq!(SampleValue::Text(" 7.2 ".to_string()).as_number(), Some(7.2));
        assert_eq!(SampleValue::Text("clear".to_string()).as_number(), None);
        assert_eq!(SampleValue::Text("inf".to_string()).as_number(), None);
        assert_eq!(SampleValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn value_for_prefers_exact_then_case_insensitive_alias() {
        let spec = nitrate();
        let sample = Sample::new("Kasese", Location::new(0.18, 30.08))
            .with_value("no3", SampleValue::Number(4.0));
        assert_eq!(sample.value_for(&spec), Some(&SampleValue::Number(4.0)));

        let sample = sample.with_value("Nitrate", SampleValue::Number(12.0));
        assert_eq!(sample.value_for(&spec), Some(&SampleValue::Number(12.0)));
    }

    #[test]
    fn missing_value_is_absent() {
        let sample = Sample::new("Gulu", Location::new(2.77, 32.29));
        assert!(sample.value_for(&nitrate()).is_none());
    }

    #[test]
    fn threshold_override_replaces_kind() {
        let spec = ParameterSpec::new("Alkalinity", "mg/L", ParameterKind::Numerical);
        let overridden = spec.with_threshold(500.0).unwrap();
        assert_eq!(
            overridden.kind,
            ParameterKind::SingleThreshold { bound: 500.0 }
        );
        assert_eq!(overridden.name, "Alkalinity");
    }

    #[test]
    fn threshold_override_rejects_categorical_and_nan() {
        let district = ParameterSpec::new("District", "", ParameterKind::Categorical);
        assert!(district.with_threshold(1.0).is_err());
        assert!(nitrate().with_threshold(f64::NAN).is_err());
    }

    #[test]
    fn classification_labels_round_trip_through_json() {
        let labels = vec![
            Classification::Compliant,
            Classification::NonCompliant,
            Classification::NotApplicable,
            Classification::Category("Kabale".to_string()),
        ];
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"["compliant","non-compliant","n/a","Kabale"]"#);
        let back: Vec<Classification> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, labels);
    }

    #[test]
    fn limit_descriptions() {
        assert_eq!(nitrate().limit_description().unwrap(), "< 10 mg/L");
        let ph = ParameterSpec::new(
            "pH",
            "",
            ParameterKind::RangeThreshold {
                low: 5.5,
                high: 9.5,
            },
        );
        assert_eq!(ph.limit_description().unwrap(), "5.5 to 9.5");
        assert_eq!(ph.kind.tag().to_string(), "range_threshold");
    }
}
