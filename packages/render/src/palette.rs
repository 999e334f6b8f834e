//! Color assignment shared by the map and the histogram.
//!
//! A [`Palette`] is built once per render cycle from the classified set and
//! handed to both views, so a label always gets the same color on each.

use std::collections::BTreeMap;

use borehole_map_parameter::classify::{ClassifiedSample, ClassifiedSet};
use borehole_map_parameter_models::Classification;

/// Fill for compliant samples.
pub const COMPLIANT_COLOR: &str = "#2ca02c";
/// Fill for non-compliant samples.
pub const NON_COMPLIANT_COLOR: &str = "#d62728";
/// Histogram fill for numerical parameters without a limit.
pub const NOT_APPLICABLE_COLOR: &str = "#1f77b4";

/// Discrete palette for categorical parameters (cycled when exhausted).
const CATEGORY_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Continuous color stops (viridis) for numerical parameters, low to high.
const GRADIENT_STOPS: &[(u8, u8, u8)] = &[
    (0x44, 0x01, 0x54),
    (0x3b, 0x52, 0x8b),
    (0x21, 0x91, 0x8c),
    (0x5e, 0xc9, 0x62),
    (0xfd, 0xe7, 0x25),
];

/// Colors for one render cycle.
#[derive(Debug, Clone)]
pub struct Palette {
    categories: BTreeMap<String, &'static str>,
    range: Option<(f64, f64)>,
}

impl Palette {
    /// Builds the palette for `set`.
    ///
    /// Categories are colored in sorted order; numeric values span the
    /// gradient from the set's minimum to its maximum.
    #[must_use]
    pub fn for_set(set: &ClassifiedSet<'_>) -> Self {
        let mut categories = BTreeMap::new();
        for item in &set.included {
            if let Classification::Category(category) = &item.classification {
                categories.entry(category.clone()).or_insert("");
            }
        }
        for (idx, color) in categories.values_mut().enumerate() {
            *color = CATEGORY_COLORS[idx % CATEGORY_COLORS.len()];
        }

        let range = set.numbers().fold(None, |acc: Option<(f64, f64)>, n| {
            Some(acc.map_or((n, n), |(lo, hi)| (lo.min(n), hi.max(n))))
        });

        Self { categories, range }
    }

    /// Minimum and maximum numeric value, if any.
    #[must_use]
    pub const fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Color for a whole series / legend entry.
    #[must_use]
    pub fn series_color(&self, classification: &Classification) -> String {
        match classification {
            Classification::Compliant => COMPLIANT_COLOR.to_string(),
            Classification::NonCompliant => NON_COMPLIANT_COLOR.to_string(),
            Classification::NotApplicable => NOT_APPLICABLE_COLOR.to_string(),
            Classification::Category(category) => self
                .categories
                .get(category)
                .copied()
                .unwrap_or(CATEGORY_COLORS[0])
                .to_string(),
        }
    }

    /// Color for an individual marker.
    ///
    /// Numerical parameters without a limit are shaded by value; everything
    /// else uses its series color.
    #[must_use]
    pub fn marker_color(&self, item: &ClassifiedSample<'_>) -> String {
        match (&item.classification, item.number(), self.range) {
            (Classification::NotApplicable, Some(value), Some((lo, hi))) => {
                let t = if hi > lo { range_fraction(value, lo, hi) } else { 0.5 };
                gradient(t)
            }
            (classification, _, _) => self.series_color(classification),
        }
    }
}

/// Position of `value` within `[lo, hi]` as a fraction.
///
/// Works on halved operands so ranges spanning most of `f64` don't overflow
/// to infinity. Callers must ensure `hi > lo`.
pub(crate) fn range_fraction(value: f64, lo: f64, hi: f64) -> f64 {
    (value / 2.0 - lo / 2.0) / (hi / 2.0 - lo / 2.0)
}

/// Samples the gradient at `t` in `[0, 1]` (clamped).
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn gradient(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (GRADIENT_STOPS.len() - 1) as f64;
    let scaled = t * segments;
    let idx = (scaled.floor() as usize).min(GRADIENT_STOPS.len() - 2);
    let frac = scaled - idx as f64;

    let (r0, g0, b0) = GRADIENT_STOPS[idx];
    let (r1, g1, b1) = GRADIENT_STOPS[idx + 1];
    let lerp = |a: u8, b: u8| {
        (f64::from(b) - f64::from(a))
            .mul_add(frac, f64::from(a))
            .round() as u8
    };

    format!("#{:02x}{:02x}{:02x}", lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

#[cfg(test)]
mod tests {
    use borehole_map_parameter::classify::classify_samples;
    use borehole_map_parameter_models::{
        Location, ParameterKind, ParameterSpec, Sample, SampleValue,
    };

    use super::*;

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(gradient(0.0), "#440154");
        assert_eq!(gradient(1.0), "#fde725");
        assert_eq!(gradient(0.5), "#21918c");
        assert_eq!(gradient(-3.0), "#440154");
        assert_eq!(gradient(f64::NAN), "#440154");
    }

    #[test]
    fn categories_get_distinct_stable_colors() {
        let at = Location::new(1.0, 32.0);
        let samples = vec![
            Sample::new("a", at).with_value("District", SampleValue::Text("Mbale".into())),
            Sample::new("b", at).with_value("District", SampleValue::Text("Arua".into())),
            Sample::new("c", at).with_value("District", SampleValue::Text("Mbale".into())),
        ];
        let spec = ParameterSpec::new("District", "", ParameterKind::Categorical);
        let set = classify_samples(&samples, &spec);
        let palette = Palette::for_set(&set);

        let arua = palette.series_color(&Classification::Category("Arua".into()));
        let mbale = palette.series_color(&Classification::Category("Mbale".into()));
        assert_eq!(arua, CATEGORY_COLORS[0]);
        assert_eq!(mbale, CATEGORY_COLORS[1]);
        assert_eq!(palette.marker_color(&set.included[0]), mbale);
    }

    #[test]
    fn numerical_markers_follow_gradient() {
        let at = Location::new(1.0, 32.0);
        let samples = vec![
            Sample::new("a", at).with_value("Alkalinity", SampleValue::Number(100.0)),
            Sample::new("b", at).with_value("Alkalinity", SampleValue::Number(300.0)),
        ];
        let spec = ParameterSpec::new("Alkalinity", "mg/L", ParameterKind::Numerical);
        let set = classify_samples(&samples, &spec);
        let palette = Palette::for_set(&set);

        assert_eq!(palette.range(), Some((100.0, 300.0)));
        assert_eq!(palette.marker_color(&set.included[0]), "#440154");
        assert_eq!(palette.marker_color(&set.included[1]), "#fde725");
    }

    #[test]
    fn extreme_range_keeps_gradient_positions() {
        let at = Location::new(1.0, 32.0);
        let samples = vec![
            Sample::new("a", at).with_value("Alkalinity", SampleValue::Number(-1e308)),
            Sample::new("b", at).with_value("Alkalinity", SampleValue::Number(0.0)),
            Sample::new("c", at).with_value("Alkalinity", SampleValue::Number(1e308)),
        ];
        let spec = ParameterSpec::new("Alkalinity", "mg/L", ParameterKind::Numerical);
        let set = classify_samples(&samples, &spec);
        let palette = Palette::for_set(&set);

        assert_eq!(palette.marker_color(&set.included[0]), "#440154");
        assert_eq!(palette.marker_color(&set.included[1]), "#21918c");
        assert_eq!(palette.marker_color(&set.included[2]), "#fde725");
        assert!((range_fraction(1e308, -1e308, 1e308) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compliance_uses_fixed_two_color_scheme() {
        let at = Location::new(1.0, 32.0);
        let samples = vec![
            Sample::new("a", at).with_value("Iron", SampleValue::Number(0.1)),
            Sample::new("b", at).with_value("Iron", SampleValue::Number(0.3)),
        ];
        let spec = ParameterSpec::new(
            "Iron",
            "mg/L",
            ParameterKind::SingleThreshold { bound: 0.3 },
        );
        let set = classify_samples(&samples, &spec);
        let palette = Palette::for_set(&set);

        assert_eq!(palette.marker_color(&set.included[0]), COMPLIANT_COLOR);
        assert_eq!(palette.marker_color(&set.included[1]), NON_COMPLIANT_COLOR);
    }
}
