//! Parameter registry: the single table of known water-quality parameters.
//!
//! Each `.toml` file in `packages/parameter/parameters/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a parameter is as
//! simple as creating a new TOML file and adding it to the list below.
//! Users can replace the built-in table with their own TOML file containing
//! a `[[parameters]]` array.

use std::collections::BTreeSet;

use borehole_map_parameter_models::{ParameterKind, ParameterSpec};
use serde::Deserialize;

use crate::{RegistryError, UnknownParameterError};

/// TOML configs embedded at compile time.
const PARAMETER_TOMLS: &[(&str, &str)] = &[
    // ── Physical ─────────────────────────────────────────────────────
    ("ph", include_str!("../parameters/ph.toml")),
    (
        "electrical_conductivity",
        include_str!("../parameters/electrical_conductivity.toml"),
    ),
    (
        "total_dissolved_solids",
        include_str!("../parameters/total_dissolved_solids.toml"),
    ),
    ("turbidity", include_str!("../parameters/turbidity.toml")),
    ("colour", include_str!("../parameters/colour.toml")),
    (
        "suspended_solids",
        include_str!("../parameters/suspended_solids.toml"),
    ),
    // ── Chemical ─────────────────────────────────────────────────────
    ("alkalinity", include_str!("../parameters/alkalinity.toml")),
    ("hardness", include_str!("../parameters/hardness.toml")),
    ("chloride", include_str!("../parameters/chloride.toml")),
    ("nitrate", include_str!("../parameters/nitrate.toml")),
    ("nitrite", include_str!("../parameters/nitrite.toml")),
    ("iron", include_str!("../parameters/iron.toml")),
    ("copper", include_str!("../parameters/copper.toml")),
    ("fluoride", include_str!("../parameters/fluoride.toml")),
    ("sulphate", include_str!("../parameters/sulphate.toml")),
    ("manganese", include_str!("../parameters/manganese.toml")),
    // ── Microbiological ──────────────────────────────────────────────
    ("e_coli", include_str!("../parameters/e_coli.toml")),
    (
        "total_coliforms",
        include_str!("../parameters/total_coliforms.toml"),
    ),
    // ── Site attributes ──────────────────────────────────────────────
    ("district", include_str!("../parameters/district.toml")),
    ("source_type", include_str!("../parameters/source_type.toml")),
];

/// Total number of built-in parameters (used in tests).
#[cfg(test)]
const EXPECTED_PARAMETER_COUNT: usize = 20;

/// Parses a single parameter definition.
///
/// # Errors
///
/// Returns an error string if the TOML is malformed.
pub fn parse_parameter_toml(toml_str: &str) -> Result<ParameterSpec, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Shape of a user-supplied registry file.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    parameters: Vec<ParameterSpec>,
}

/// Read-only lookup table from parameter name to [`ParameterSpec`].
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    parameters: Vec<ParameterSpec>,
}

impl ParameterRegistry {
    /// Builds a registry from `parameters`, validating names and bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a name is empty, a name or alias is
    /// duplicated, or a threshold bound is non-finite or inverted.
    pub fn new(parameters: Vec<ParameterSpec>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();

        for spec in &parameters {
            if spec.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            for name in spec.column_names() {
                if !seen.insert(name.trim().to_lowercase()) {
                    return Err(RegistryError::Duplicate {
                        name: name.to_string(),
                    });
                }
            }
            validate_bounds(spec)?;
        }

        Ok(Self { parameters })
    }

    /// Returns the registry compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if any embedded TOML config is malformed or the embedded set
    /// fails validation (both are fixed at compile time).
    #[must_use]
    pub fn builtin() -> Self {
        let parameters = PARAMETER_TOMLS
            .iter()
            .map(|(name, toml)| {
                parse_parameter_toml(toml)
                    .unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
            })
            .collect();

        Self::new(parameters)
            .unwrap_or_else(|e| panic!("Built-in parameter registry is invalid: {e}"))
    }

    /// Parses a registry from a TOML document with a `[[parameters]]`
    /// array.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the TOML is malformed or fails
    /// validation.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::de::from_str(toml_str)?;
        Self::new(file.parameters)
    }

    /// Looks up a parameter by canonical name or alias.
    ///
    /// An exact canonical-name match wins; otherwise the name is compared
    /// case-insensitively against every name and alias.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownParameterError`] if no entry matches.
    pub fn lookup(&self, name: &str) -> Result<&ParameterSpec, UnknownParameterError> {
        self.parameters
            .iter()
            .find(|spec| spec.name == name)
            .or_else(|| self.parameters.iter().find(|spec| spec.matches_name(name)))
            .ok_or_else(|| UnknownParameterError {
                name: name.to_string(),
            })
    }

    /// All entries, in registration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Entries that carry a compliance threshold.
    pub fn thresholded(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|spec| spec.kind.has_threshold())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_bounds(spec: &ParameterSpec) -> Result<(), RegistryError> {
    let invalid = |message: &str| RegistryError::InvalidBounds {
        parameter: spec.name.clone(),
        message: message.to_string(),
    };

    match spec.kind {
        ParameterKind::SingleThreshold { bound } if !bound.is_finite() => {
            Err(invalid("bound is not finite"))
        }
        ParameterKind::RangeThreshold { low, high } if !low.is_finite() || !high.is_finite() => {
            Err(invalid("range bounds are not finite"))
        }
        ParameterKind::RangeThreshold { low, high } if low > high => {
            Err(invalid("low bound exceeds high bound"))
        }
        _ => Ok(()),
    }
}
