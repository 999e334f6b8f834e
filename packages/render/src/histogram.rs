//! Distribution view: a stacked histogram with one series per label.
//!
//! Numeric parameters use fixed-width bins between the observed minimum and
//! maximum; categorical parameters get one bar per category.

use std::collections::BTreeMap;

use borehole_map_parameter::classify::ClassifiedSet;
use borehole_map_parameter_models::{Classification, ParameterKind};
use borehole_map_render_models::{DistributionView, HistogramBin, HistogramSeries};

use crate::RenderError;
use crate::palette::{Palette, range_fraction};

/// Builds the histogram for `set`.
///
/// # Errors
///
/// Returns [`RenderError::InvalidBinCount`] if `bins` is zero.
pub fn build_distribution(
    set: &ClassifiedSet<'_>,
    palette: &Palette,
    bins: usize,
) -> Result<DistributionView, RenderError> {
    if bins == 0 {
        return Err(RenderError::InvalidBinCount(bins));
    }

    let x_label = if set.spec.unit.is_empty() {
        set.spec.name.clone()
    } else {
        format!("{} ({})", set.spec.name, set.spec.unit)
    };

    let (bins, assignments) = if set.spec.kind == ParameterKind::Categorical {
        categorical_bins(set)
    } else {
        numeric_bins(set, palette.range(), bins)
    };

    let mut by_label: BTreeMap<&Classification, Vec<usize>> = BTreeMap::new();
    for (item, bin) in set.included.iter().zip(assignments) {
        by_label
            .entry(&item.classification)
            .or_insert_with(|| vec![0; bins.len()])[bin] += 1;
    }

    let series = by_label
        .into_iter()
        .map(|(classification, counts)| HistogramSeries {
            classification: classification.clone(),
            color: palette.series_color(classification),
            counts,
        })
        .collect();

    Ok(DistributionView {
        x_label,
        bins,
        series,
    })
}

/// One bin per distinct category, sorted. Returns the bins and each
/// included sample's bin index.
fn categorical_bins(set: &ClassifiedSet<'_>) -> (Vec<HistogramBin>, Vec<usize>) {
    let mut categories: Vec<&str> = set
        .included
        .iter()
        .map(|item| item.classification.label())
        .collect();
    categories.sort_unstable();
    categories.dedup();

    let assignments = set
        .included
        .iter()
        .map(|item| {
            categories
                .binary_search(&item.classification.label())
                .unwrap_or_default()
        })
        .collect();

    let bins = categories
        .into_iter()
        .map(|label| HistogramBin {
            label: label.to_string(),
            lower: None,
            upper: None,
        })
        .collect();

    (bins, assignments)
}

/// Fixed-width bins over `range`. The maximum value lands in the last bin;
/// a degenerate range collapses to a single bin.
///
/// Edges and positions are interpolated rather than computed from `hi - lo`,
/// which overflows for ranges spanning most of `f64`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn numeric_bins(
    set: &ClassifiedSet<'_>,
    range: Option<(f64, f64)>,
    bins: usize,
) -> (Vec<HistogramBin>, Vec<usize>) {
    let Some((lo, hi)) = range else {
        return (Vec::new(), Vec::new());
    };

    let bins = if hi > lo { bins } else { 1 };
    let edge = |i: usize| {
        if i == bins {
            hi
        } else {
            let f = i as f64 / bins as f64;
            hi.mul_add(f, lo * (1.0 - f))
        }
    };

    let edges: Vec<HistogramBin> = (0..bins)
        .map(|i| {
            let lower = edge(i);
            let upper = edge(i + 1);
            HistogramBin {
                label: format!("{} - {}", format_edge(lower), format_edge(upper)),
                lower: Some(lower),
                upper: Some(upper),
            }
        })
        .collect();

    let assignments = set
        .numbers()
        .map(|value| {
            if hi <= lo {
                return 0;
            }
            let position = range_fraction(value, lo, hi) * bins as f64;
            if position.is_finite() {
                (position.max(0.0).floor() as usize).min(bins - 1)
            } else {
                bins - 1
            }
        })
        .collect();

    (edges, assignments)
}

/// Formats a bin edge with at most three decimals, trimming trailing zeros.
fn format_edge(value: f64) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use borehole_map_parameter::classify::classify_samples;
    use borehole_map_parameter_models::{Location, ParameterSpec, Sample, SampleValue};

    use super::*;

    fn samples(column: &str, values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Sample::new(format!("site {i}"), Location::new(1.0, 32.0))
                    .with_value(column, SampleValue::Number(*v))
            })
            .collect()
    }

    fn nitrate() -> ParameterSpec {
        ParameterSpec::new(
            "Nitrate",
            "mg/L",
            ParameterKind::SingleThreshold { bound: 10.0 },
        )
    }

    #[test]
    fn bins_span_min_to_max_and_max_is_counted() {
        let data = samples("Nitrate", &[0.0, 5.0, 10.0, 20.0]);
        let set = classify_samples(&data, &nitrate());
        let view = build_distribution(&set, &Palette::for_set(&set), 4).unwrap();

        assert_eq!(view.x_label, "Nitrate (mg/L)");
        assert_eq!(view.bins.len(), 4);
        assert_eq!(view.bins[0].label, "0 - 5");
        assert_eq!(view.bins[3].upper, Some(20.0));
        assert_eq!(view.total_count(), 4);

        let compliant = &view.series[0];
        assert_eq!(compliant.classification, Classification::Compliant);
        assert_eq!(compliant.counts, vec![1, 1, 0, 0]);
        let non_compliant = &view.series[1];
        assert_eq!(non_compliant.classification, Classification::NonCompliant);
        assert_eq!(non_compliant.counts, vec![0, 0, 1, 1]);
    }

    #[test]
    fn degenerate_range_collapses_to_one_bin() {
        let data = samples("Nitrate", &[4.0, 4.0, 4.0]);
        let set = classify_samples(&data, &nitrate());
        let view = build_distribution(&set, &Palette::for_set(&set), 20).unwrap();

        assert_eq!(view.bins.len(), 1);
        assert_eq!(view.bins[0].label, "4 - 4");
        assert_eq!(view.series[0].counts, vec![3]);
    }

    #[test]
    fn range_spanning_f64_stays_finite() {
        let data = samples("Nitrate", &[-1e308, 0.0, 1e308]);
        let set = classify_samples(&data, &nitrate());
        let view = build_distribution(&set, &Palette::for_set(&set), 4).unwrap();

        assert_eq!(view.bins.len(), 4);
        for bin in &view.bins {
            assert!(bin.lower.is_some_and(f64::is_finite), "{}", bin.label);
            assert!(bin.upper.is_some_and(f64::is_finite), "{}", bin.label);
            assert!(!bin.label.contains("inf"), "{}", bin.label);
            assert!(!bin.label.contains("NaN"), "{}", bin.label);
        }
        assert_eq!(view.bins[0].lower, Some(-1e308));
        assert_eq!(view.bins[3].upper, Some(1e308));

        let compliant = &view.series[0];
        assert_eq!(compliant.counts, vec![1, 0, 1, 0]);
        let non_compliant = &view.series[1];
        assert_eq!(non_compliant.classification, Classification::NonCompliant);
        assert_eq!(non_compliant.counts, vec![0, 0, 0, 1]);
    }

    #[test]
    fn zero_bins_is_an_error() {
        let data = samples("Nitrate", &[1.0]);
        let set = classify_samples(&data, &nitrate());
        assert!(matches!(
            build_distribution(&set, &Palette::for_set(&set), 0),
            Err(RenderError::InvalidBinCount(0))
        ));
    }

    #[test]
    fn categorical_has_one_bar_per_category() {
        let at = Location::new(1.0, 32.0);
        let data = vec![
            Sample::new("a", at).with_value("District", SampleValue::Text("Mbale".into())),
            Sample::new("b", at).with_value("District", SampleValue::Text("Arua".into())),
            Sample::new("c", at).with_value("District", SampleValue::Text("Mbale".into())),
        ];
        let spec = ParameterSpec::new("District", "", ParameterKind::Categorical);
        let set = classify_samples(&data, &spec);
        let view = build_distribution(&set, &Palette::for_set(&set), 20).unwrap();

        assert_eq!(view.x_label, "District");
        let labels: Vec<&str> = view.bins.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Arua", "Mbale"]);
        assert_eq!(
            view.count_for(&Classification::Category("Mbale".into())),
            2
        );
        assert_eq!(view.series[1].counts, vec![0, 2]);
    }

    #[test]
    fn edge_formatting() {
        assert_eq!(format_edge(2.5), "2.5");
        assert_eq!(format_edge(10.0), "10");
        assert_eq!(format_edge(0.123_456), "0.123");
        assert_eq!(format_edge(-0.0001), "0");
    }
}
