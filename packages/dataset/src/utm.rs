//! WGS 84 / UTM grid to latitude/longitude conversion.
//!
//! Survey exports record borehole positions as UTM grid references
//! (`Grid_E` / `Grid_N`). The map needs geographic degrees, so each row is
//! projected back with the footpoint-latitude series from Snyder's
//! *Map Projections: A Working Manual* (USGS PP 1395, eq. 8-18 to 8-25).

use borehole_map_parameter_models::Location;
use serde::Deserialize;

/// Scale factor on the central meridian.
const K0: f64 = 0.9996;
/// WGS 84 semi-major axis in metres.
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS 84 flattening.
const FLATTENING: f64 = 1.0 / 298.257_223_563;
/// False easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied in the southern hemisphere.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    /// EPSG:326xx.
    #[default]
    North,
    /// EPSG:327xx.
    South,
}

/// Converts a UTM grid reference to WGS 84 degrees.
///
/// Returns `None` for zones outside `1..=60` or non-finite results.
#[must_use]
#[allow(clippy::many_single_char_names, clippy::suboptimal_flops)]
pub fn utm_to_location(
    easting: f64,
    northing: f64,
    zone: u8,
    hemisphere: Hemisphere,
) -> Option<Location> {
    if !(1..=60).contains(&zone) || !easting.is_finite() || !northing.is_finite() {
        return None;
    }

    let e2 = FLATTENING * (2.0 - FLATTENING);
    let ep2 = e2 / (1.0 - e2);
    let x = easting - FALSE_EASTING;
    let y = match hemisphere {
        Hemisphere::North => northing,
        Hemisphere::South => northing - FALSE_NORTHING_SOUTH,
    };

    // Footpoint latitude from the meridional arc.
    let m = y / K0;
    let mu = m
        / (SEMI_MAJOR_AXIS
            * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin, cos) = phi1.sin_cos();
    let tan = phi1.tan();
    let n1 = SEMI_MAJOR_AXIS / (1.0 - e2 * sin * sin).sqrt();
    let t1 = tan * tan;
    let c1 = ep2 * cos * cos;
    let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / (1.0 - e2 * sin * sin).powf(1.5);
    let d = x / (n1 * K0);

    let latitude = phi1
        - (n1 * tan / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let central_meridian = (f64::from(zone) - 1.0).mul_add(6.0, -180.0) + 3.0;
    let longitude = central_meridian.to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos;

    let location = Location::new(latitude.to_degrees(), longitude.to_degrees());
    (location.latitude.is_finite() && location.longitude.is_finite()).then_some(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn origin_of_zone_36_is_on_equator_at_central_meridian() {
        let loc = utm_to_location(500_000.0, 0.0, 36, Hemisphere::North).unwrap();
        assert!(loc.latitude.abs() < TOLERANCE);
        assert!((loc.longitude - 33.0).abs() < TOLERANCE);
    }

    #[test]
    fn converts_kampala_grid_reference() {
        let loc = utm_to_location(453_000.0, 35_000.0, 36, Hemisphere::North).unwrap();
        assert!((loc.latitude - 0.316_647).abs() < 1e-5);
        assert!((loc.longitude - 32.577_620).abs() < 1e-5);
    }

    #[test]
    fn converts_known_reference_in_another_zone() {
        let loc = utm_to_location(448_251.795, 5_411_932.678, 31, Hemisphere::North).unwrap();
        assert!((loc.latitude - 48.8582).abs() < 1e-4);
        assert!((loc.longitude - 2.2945).abs() < 1e-4);
    }

    #[test]
    fn southern_hemisphere_uses_false_northing() {
        let loc = utm_to_location(500_000.0, 9_000_000.0, 36, Hemisphere::South).unwrap();
        assert!((loc.latitude - -9.046_562).abs() < 1e-5);
        assert!((loc.longitude - 33.0).abs() < TOLERANCE);
    }

    #[test]
    fn rejects_invalid_zone() {
        assert!(utm_to_location(500_000.0, 0.0, 0, Hemisphere::North).is_none());
        assert!(utm_to_location(500_000.0, 0.0, 61, Hemisphere::North).is_none());
        assert!(utm_to_location(f64::NAN, 0.0, 36, Hemisphere::North).is_none());
    }
}
