#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Water-quality parameter registry and compliance classifier.
//!
//! The [`registry`] module holds the canonical table of known parameters
//! (unit, kind and regulatory bounds). The [`classify`] module turns a
//! sample's raw value into a [`Classification`] for one parameter. Both are
//! pure: nothing here keeps state between render cycles.
//!
//! [`Classification`]: borehole_map_parameter_models::Classification

pub mod classify;
pub mod registry;

pub use borehole_map_parameter_models as models;

/// Returned when a parameter name is not present in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter: {name}")]
pub struct UnknownParameterError {
    /// The name that was looked up.
    pub name: String,
}

/// A sample value could not be interpreted as the type its parameter kind
/// expects. Recovered by excluding the sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse {raw:?} as a number for {parameter}{}", site_suffix(.site_id))]
pub struct ValueParseError {
    /// Parameter being classified.
    pub parameter: String,
    /// The offending raw value.
    pub raw: String,
    /// Site the value came from, when known.
    pub site_id: Option<String>,
}

impl ValueParseError {
    /// Attaches the originating site id.
    #[must_use]
    pub fn at_site(mut self, site_id: &str) -> Self {
        self.site_id = Some(site_id.to_string());
        self
    }
}

#[allow(clippy::ref_option)]
fn site_suffix(site_id: &Option<String>) -> String {
    site_id
        .as_ref()
        .map(|id| format!(" at site {id}"))
        .unwrap_or_default()
}

/// Errors raised while building a [`registry::ParameterRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry TOML could not be parsed.
    #[error("Registry TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two entries share a name or alias (case-insensitive).
    #[error("Duplicate parameter name or alias: {name}")]
    Duplicate {
        /// The clashing name.
        name: String,
    },

    /// An entry has an empty name.
    #[error("Parameter with empty name")]
    EmptyName,

    /// An entry's bounds are unusable.
    #[error("Invalid bounds for {parameter}: {message}")]
    InvalidBounds {
        /// The parameter with bad bounds.
        parameter: String,
        /// Description of what went wrong.
        message: String,
    },
}
