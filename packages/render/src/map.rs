//! Map view: one colored marker per classified sample.
//!
//! Markers are grouped into one overlay layer per label, named after the
//! limit they were judged against (e.g. `"Nitrate < 10 mg/L"` and
//! `"Nitrate >= 10 mg/L"`), on top of the configured basemap tiles.

use std::collections::BTreeMap;

use borehole_map_parameter::classify::{ClassifiedSample, ClassifiedSet};
use borehole_map_parameter_models::{Classification, ParameterKind, ParameterSpec, SampleValue};
use borehole_map_render_models::{LegendEntry, MapMarker, MapView, MarkerLayer, PopupField};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};

use crate::RenderOptions;
use crate::palette::Palette;

/// Builds the map view for `set`.
#[must_use]
pub fn build_map_view(
    set: &ClassifiedSet<'_>,
    palette: &Palette,
    options: &RenderOptions,
) -> MapView {
    let mut grouped: BTreeMap<&Classification, Vec<MapMarker>> = BTreeMap::new();
    for item in &set.included {
        grouped
            .entry(&item.classification)
            .or_default()
            .push(build_marker(item, &set.spec, palette, options));
    }

    let mut legend = Vec::new();
    let layers = grouped
        .into_iter()
        .map(|(classification, markers)| {
            let name = layer_name(&set.spec, classification);
            if set.spec.kind != ParameterKind::Numerical {
                legend.push(LegendEntry {
                    label: name.clone(),
                    color: palette.series_color(classification),
                });
            }
            MarkerLayer { name, markers }
        })
        .collect();

    if let (ParameterKind::Numerical, Some((lo, hi))) = (set.spec.kind, palette.range()) {
        legend.push(LegendEntry {
            label: set.spec.format_value(lo),
            color: crate::palette::gradient(0.0),
        });
        legend.push(LegendEntry {
            label: set.spec.format_value(hi),
            color: crate::palette::gradient(1.0),
        });
    }

    MapView {
        center: options.base_map.center,
        zoom: options.base_map.zoom,
        tile_layers: options.base_map.tile_layers.clone(),
        layers,
        legend,
    }
}

/// Overlay name for the markers carrying `classification`.
#[must_use]
pub fn layer_name(spec: &ParameterSpec, classification: &Classification) -> String {
    match (spec.kind, classification) {
        (ParameterKind::SingleThreshold { bound }, Classification::Compliant) => {
            format!("{} < {}", spec.name, spec.format_value(bound))
        }
        (ParameterKind::SingleThreshold { bound }, Classification::NonCompliant) => {
            format!("{} >= {}", spec.name, spec.format_value(bound))
        }
        (ParameterKind::RangeThreshold { low, high }, Classification::Compliant) => {
            format!("{} within {low} to {}", spec.name, spec.format_value(high))
        }
        (ParameterKind::RangeThreshold { low, high }, Classification::NonCompliant) => {
            format!("{} outside {low} to {}", spec.name, spec.format_value(high))
        }
        (_, Classification::Category(category)) => format!("{}: {category}", spec.name),
        _ => spec.name.clone(),
    }
}

fn build_marker(
    item: &ClassifiedSample<'_>,
    spec: &ParameterSpec,
    palette: &Palette,
    options: &RenderOptions,
) -> MapMarker {
    let sample = item.sample;

    let mut popup = vec![PopupField {
        label: spec.name.clone(),
        value: match item.number() {
            Some(n) => spec.format_value(n),
            None => item.value.to_string(),
        },
    }];

    for field in &options.auxiliary_fields {
        let value = sample
            .values
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(field))
            .map_or_else(|| "n/a".to_string(), |(_, v)| v.to_string());
        popup.push(PopupField {
            label: field.clone(),
            value,
        });
    }

    popup.push(PopupField {
        label: "Site".to_string(),
        value: sample.site_id.clone(),
    });
    popup.push(PopupField {
        label: "Location".to_string(),
        value: format!(
            "{:.5}, {:.5}",
            sample.location.latitude, sample.location.longitude
        ),
    });

    MapMarker {
        site_id: sample.site_id.clone(),
        location: sample.location,
        value: item.value.clone(),
        classification: item.classification.clone(),
        color: palette.marker_color(item),
        radius: options.base_map.marker_radius,
        popup,
    }
}

/// Exports every marker as a `GeoJSON` point feature.
///
/// Each feature carries the value, label, color, layer and popup fields as
/// properties.
#[must_use]
pub fn to_feature_collection(view: &MapView, parameter: &str) -> FeatureCollection {
    let features = view
        .layers
        .iter()
        .flat_map(|layer| {
            layer
                .markers
                .iter()
                .map(move |marker| marker_feature(marker, &layer.name))
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("parameter".to_string(), parameter.into());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

fn marker_feature(marker: &MapMarker, layer: &str) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("siteId".to_string(), marker.site_id.clone().into());
    properties.insert(
        "value".to_string(),
        match &marker.value {
            SampleValue::Number(n) => (*n).into(),
            SampleValue::Text(s) => s.clone().into(),
        },
    );
    properties.insert(
        "classification".to_string(),
        marker.classification.label().into(),
    );
    properties.insert("color".to_string(), marker.color.clone().into());
    properties.insert("radius".to_string(), marker.radius.into());
    properties.insert("layer".to_string(), layer.into());
    for field in &marker.popup {
        properties.insert(field.label.clone(), field.value.clone().into());
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            marker.location.longitude,
            marker.location.latitude,
        ]))),
        id: Some(Id::String(marker.site_id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use borehole_map_parameter::classify::classify_samples;
    use borehole_map_parameter_models::{Location, Sample};

    use super::*;
    use crate::palette::{COMPLIANT_COLOR, NON_COMPLIANT_COLOR};

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

    fn ph_samples() -> Vec<Sample> {
        vec![
            Sample::new("Soroti", Location::new(1.71, 33.61))
                .with_value("pH", SampleValue::Number(7.1))
                .with_value("District", SampleValue::Text("Soroti".into())),
            Sample::new("Masaka", Location::new(-0.33, 31.73))
                .with_value("pH", SampleValue::Number(5.4)),
            Sample::new("Hoima", Location::new(1.43, 31.35)),
        ]
    }

    #[test]
    fn groups_markers_by_label_with_limit_names() {
        let data = ph_samples();
        let set = classify_samples(&data, &ph());
        let view = build_map_view(&set, &Palette::for_set(&set), &RenderOptions::default());

        assert_eq!(view.marker_count(), 2);
        assert_eq!(view.layers.len(), 2);
        assert_eq!(view.layers[0].name, "pH within 5.5 to 9.5");
        assert_eq!(view.layers[0].markers[0].color, COMPLIANT_COLOR);
        assert_eq!(view.layers[1].name, "pH outside 5.5 to 9.5");
        assert_eq!(view.layers[1].markers[0].color, NON_COMPLIANT_COLOR);
        assert_eq!(view.legend.len(), 2);
        assert_eq!(view.zoom, 6);
        assert_eq!(view.tile_layers.len(), 2);
    }

    #[test]
    fn popup_carries_value_auxiliary_fields_and_location() {
        let data = ph_samples();
        let set = classify_samples(&data, &ph());
        let options = RenderOptions {
            auxiliary_fields: vec!["district".to_string(), "Depth".to_string()],
            ..RenderOptions::default()
        };
        let view = build_map_view(&set, &Palette::for_set(&set), &options);
        let popup = &view.layers[0].markers[0].popup;

        let fields: Vec<(&str, &str)> = popup
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("pH", "7.1"),
                ("district", "Soroti"),
                ("Depth", "n/a"),
                ("Site", "Soroti"),
                ("Location", "1.71000, 33.61000"),
            ]
        );
    }

    #[test]
    fn single_threshold_layer_names() {
        let spec = ParameterSpec::new(
            "Nitrate",
            "mg/L",
            ParameterKind::SingleThreshold { bound: 10.0 },
        );
        assert_eq!(
            layer_name(&spec, &Classification::Compliant),
            "Nitrate < 10 mg/L"
        );
        assert_eq!(
            layer_name(&spec, &Classification::NonCompliant),
            "Nitrate >= 10 mg/L"
        );
    }

    #[test]
    fn geojson_export_has_one_point_per_marker() {
        let data = ph_samples();
        let set = classify_samples(&data, &ph());
        let view = build_map_view(&set, &Palette::for_set(&set), &RenderOptions::default());
        let collection = to_feature_collection(&view, "pH");

        assert_eq!(collection.features.len(), 2);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["parameter"], "pH");

        let masaka = &json["features"][1];
        assert_eq!(masaka["geometry"]["coordinates"][0], 31.73);
        assert_eq!(masaka["geometry"]["coordinates"][1], -0.33);
        assert_eq!(masaka["properties"]["classification"], "non-compliant");
        assert_eq!(masaka["properties"]["layer"], "pH outside 5.5 to 9.5");
    }
}
