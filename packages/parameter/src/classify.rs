//! Compliance classification.
//!
//! Boundary policy differs by kind: a single threshold is an inclusive
//! upper bound (a value equal to the bound is non-compliant) while a range
//! is an inclusive interval (values equal to either end are compliant).

use std::collections::BTreeMap;

use borehole_map_parameter_models::{
    Classification, ParameterKind, ParameterSpec, Sample, SampleValue,
};

use crate::ValueParseError;

/// Classifies a numeric reading against `kind`.
///
/// Categorical kinds label the number itself.
#[must_use]
pub fn classify_number(value: f64, kind: &ParameterKind) -> Classification {
    match *kind {
        ParameterKind::SingleThreshold { bound } => {
            if value >= bound {
                Classification::NonCompliant
            } else {
                Classification::Compliant
            }
        }
        ParameterKind::RangeThreshold { low, high } => {
            if value < low || value > high {
                Classification::NonCompliant
            } else {
                Classification::Compliant
            }
        }
        ParameterKind::Numerical => Classification::NotApplicable,
        ParameterKind::Categorical => Classification::Category(value.to_string()),
    }
}

/// Classifies one sample value for `spec`.
///
/// Returns `Ok(None)` when the value is absent: a missing reading is
/// skipped, never defaulted to a classification.
///
/// # Errors
///
/// Returns [`ValueParseError`] when a numeric kind receives text that is
/// not a finite number.
pub fn classify(
    value: Option<&SampleValue>,
    spec: &ParameterSpec,
) -> Result<Option<Classification>, ValueParseError> {
    Ok(normalize(value, spec)?.map(|(_, classification)| classification))
}

/// Normalizes and classifies one value in a single parse.
///
/// The normalized value is the parsed number for numeric kinds and the
/// trimmed category for categorical ones.
fn normalize(
    value: Option<&SampleValue>,
    spec: &ParameterSpec,
) -> Result<Option<(SampleValue, Classification)>, ValueParseError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if spec.kind == ParameterKind::Categorical {
        let category = value.to_string().trim().to_string();
        return Ok(Some((
            SampleValue::Text(category.clone()),
            Classification::Category(category),
        )));
    }

    let number = value.as_number().ok_or_else(|| ValueParseError {
        parameter: spec.name.clone(),
        raw: value.to_string(),
        site_id: None,
    })?;

    Ok(Some((
        SampleValue::Number(number),
        classify_number(number, &spec.kind),
    )))
}

/// A sample that has a usable value for the selected parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedSample<'a> {
    /// The source record.
    pub sample: &'a Sample,
    /// Normalized value: a number for numeric kinds, the trimmed category
    /// for categorical ones.
    pub value: SampleValue,
    /// The derived label.
    pub classification: Classification,
}

impl ClassifiedSample<'_> {
    /// The value as a number, if numeric.
    #[must_use]
    pub const fn number(&self) -> Option<f64> {
        match self.value {
            SampleValue::Number(n) => Some(n),
            SampleValue::Text(_) => None,
        }
    }
}

/// Result of classifying a whole dataset for one parameter.
///
/// Both the map and the histogram are built from the same set, so they
/// cannot disagree about a sample's label.
#[derive(Debug, Clone)]
pub struct ClassifiedSet<'a> {
    /// The spec the set was classified against.
    pub spec: ParameterSpec,
    /// Samples with a usable value, in input order.
    pub included: Vec<ClassifiedSample<'a>>,
    /// Number of samples with no value for the parameter.
    pub missing: usize,
    /// Samples whose value could not be parsed for the parameter kind.
    pub rejected: Vec<ValueParseError>,
}

impl ClassifiedSet<'_> {
    /// Number of included samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.included.len()
    }

    /// Whether no samples were included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// Included sample counts per classification.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<Classification, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.included {
            *counts.entry(item.classification.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Numeric values of the included samples.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.included.iter().filter_map(ClassifiedSample::number)
    }
}

/// Classifies every sample in `samples` for `spec`.
///
/// Missing values are counted and skipped; unparseable values are logged,
/// recorded in [`ClassifiedSet::rejected`] and skipped.
#[must_use]
pub fn classify_samples<'a>(samples: &'a [Sample], spec: &ParameterSpec) -> ClassifiedSet<'a> {
    let mut included = Vec::with_capacity(samples.len());
    let mut missing = 0;
    let mut rejected = Vec::new();

    for sample in samples {
        match normalize(sample.value_for(spec), spec) {
            Ok(Some((value, classification))) => {
                included.push(ClassifiedSample {
                    sample,
                    value,
                    classification,
                });
            }
            Ok(None) => missing += 1,
            Err(e) => {
                let e = e.at_site(&sample.site_id);
                log::warn!("Excluding sample: {e}");
                rejected.push(e);
            }
        }
    }

    log::debug!(
        "Classified {} for {}: {} included, {missing} missing, {} rejected",
        samples.len(),
        spec.name,
        included.len(),
        rejected.len(),
    );

    ClassifiedSet {
        spec: spec.clone(),
        included,
        missing,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use borehole_map_parameter_models::Location;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn nitrate() -> ParameterSpec {
        ParameterSpec::new(
            "Nitrate",
            "mg/L",
            ParameterKind::SingleThreshold { bound: 10.0 },
        )
    }

    fn ph() -> ParameterSpec {
        ParameterSpec::new(
            "pH",
            "",
            ParameterKind::RangeThreshold {
                low: 5.5,
                high: 9.5,
            },
        )
    }

    fn num(value: f64) -> SampleValue {
        SampleValue::Number(value)
    }

    fn label(value: f64, spec: &ParameterSpec) -> Classification {
        classify(Some(&num(value)), spec).unwrap().unwrap()
    }

    #[test]
    fn single_threshold_bound_is_non_compliant() {
        for bound in [0.1, 1.0, 10.0, 250.0, 2500.0] {
            let spec = ParameterSpec::new("X", "", ParameterKind::SingleThreshold { bound });
            assert_eq!(label(bound, &spec), Classification::NonCompliant);
            assert_eq!(label(bound - EPSILON, &spec), Classification::Compliant);
        }
    }

    #[test]
    fn range_bounds_are_compliant() {
        for (low, high) in [(5.5, 9.5), (6.5, 8.5), (0.0, 1.0)] {
            let spec = ParameterSpec::new("X", "", ParameterKind::RangeThreshold { low, high });
            assert_eq!(label(low, &spec), Classification::Compliant);
            assert_eq!(label(high, &spec), Classification::Compliant);
            assert_eq!(label(low - EPSILON, &spec), Classification::NonCompliant);
            assert_eq!(label(high + EPSILON, &spec), Classification::NonCompliant);
        }
    }

    #[test]
    fn ph_examples() {
        let spec = ph();
        assert_eq!(label(5.5, &spec), Classification::Compliant);
        assert_eq!(label(5.4, &spec), Classification::NonCompliant);
        assert_eq!(label(9.6, &spec), Classification::NonCompliant);
        assert_eq!(label(7.0, &spec), Classification::Compliant);
    }

    #[test]
    fn nitrate_examples() {
        let spec = nitrate();
        assert_eq!(label(10.0, &spec), Classification::NonCompliant);
        assert_eq!(label(9.999, &spec), Classification::Compliant);
    }

    #[test]
    fn missing_value_is_skipped_for_every_kind() {
        for kind in [
            ParameterKind::Categorical,
            ParameterKind::Numerical,
            ParameterKind::SingleThreshold { bound: 1.0 },
            ParameterKind::RangeThreshold {
                low: 0.0,
                high: 1.0,
            },
        ] {
            let spec = ParameterSpec::new("X", "", kind);
            assert_eq!(classify(None, &spec).unwrap(), None);
        }
    }

    #[test]
    fn categorical_label_is_raw_value() {
        let spec = ParameterSpec::new("District", "", ParameterKind::Categorical);
        let value = SampleValue::Text(" Kabale ".to_string());
        assert_eq!(
            classify(Some(&value), &spec).unwrap(),
            Some(Classification::Category("Kabale".to_string()))
        );
    }

    #[test]
    fn numerical_is_not_applicable() {
        let spec = ParameterSpec::new("Alkalinity", "mg/L", ParameterKind::Numerical);
        assert_eq!(label(120.0, &spec), Classification::NotApplicable);
        assert_eq!(label(120.0, &spec).label(), "n/a");
    }

    #[test]
    fn numeric_text_is_parsed_and_garbage_rejected() {
        let spec = nitrate();
        let text = SampleValue::Text("12.5".to_string());
        assert_eq!(
            classify(Some(&text), &spec).unwrap(),
            Some(Classification::NonCompliant)
        );

        let garbage = SampleValue::Text("<0.01".to_string());
        let err = classify(Some(&garbage), &spec).unwrap_err();
        assert_eq!(err.parameter, "Nitrate");
        assert_eq!(err.raw, "<0.01");
    }

    #[test]
    fn classify_samples_partitions_dataset() {
        let at = Location::new(0.3, 32.6);
        let samples = vec![
            Sample::new("a", at).with_value("Nitrate", num(3.0)),
            Sample::new("b", at).with_value("Nitrate", num(10.0)),
            Sample::new("c", at),
            Sample::new("d", at).with_value("Nitrate", SampleValue::Text("bad".to_string())),
            Sample::new("e", at).with_value("NO3", num(11.0)),
        ];
        let spec = ParameterSpec {
            aliases: vec!["NO3".to_string()],
            ..nitrate()
        };

        let set = classify_samples(&samples, &spec);

        assert_eq!(set.len(), 3);
        assert_eq!(set.missing, 1);
        assert_eq!(set.rejected.len(), 1);
        assert_eq!(set.rejected[0].site_id.as_deref(), Some("d"));

        let counts = set.counts();
        assert_eq!(counts[&Classification::Compliant], 1);
        assert_eq!(counts[&Classification::NonCompliant], 2);
        assert_eq!(set.numbers().collect::<Vec<_>>(), vec![3.0, 10.0, 11.0]);
    }

    #[test]
    fn included_value_is_the_number_that_was_classified() {
        let at = Location::new(0.3, 32.6);
        let samples = vec![
            Sample::new("a", at).with_value("Nitrate", SampleValue::Text(" 12.5 ".to_string())),
            Sample::new("b", at).with_value("District", SampleValue::Text(" Arua ".to_string())),
        ];

        let nitrate = classify_samples(&samples, &nitrate());
        assert_eq!(nitrate.included.len(), 1);
        assert_eq!(nitrate.included[0].value, num(12.5));
        assert_eq!(nitrate.included[0].number(), Some(12.5));
        assert_eq!(
            nitrate.included[0].classification,
            Classification::NonCompliant
        );

        let district = ParameterSpec::new("District", "", ParameterKind::Categorical);
        let district = classify_samples(&samples, &district);
        assert_eq!(
            district.included[0].value,
            SampleValue::Text("Arua".to_string())
        );
        assert_eq!(
            district.included[0].classification,
            Classification::Category("Arua".to_string())
        );
    }

    #[test]
    fn switching_parameter_reclassifies_from_scratch() {
        let at = Location::new(0.3, 32.6);
        let samples = vec![
            Sample::new("a", at)
                .with_value("Nitrate", num(12.0))
                .with_value("pH", num(7.0)),
        ];

        let by_nitrate = classify_samples(&samples, &nitrate());
        let by_ph = classify_samples(&samples, &ph());

        assert_eq!(
            by_nitrate.included[0].classification,
            Classification::NonCompliant
        );
        assert_eq!(by_ph.included[0].classification, Classification::Compliant);
    }
}
