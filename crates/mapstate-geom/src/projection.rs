// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::f64::consts::{FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::Extent;

/// WGS84 ellipsoid semi-major axis used by spherical Web Mercator.
const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude bound beyond which Web Mercator diverges.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Coordinate systems the viewer can display or ingest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Geographic longitude/latitude in degrees (EPSG:4326).
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// Spherical Web Mercator in metres (EPSG:3857).
    #[serde(rename = "EPSG:3857")]
    WebMercator,
    /// Swiss LV95 in metres (EPSG:2056).
    #[serde(rename = "EPSG:2056")]
    Lv95,
}

impl CoordinateSystem {
    /// EPSG code string, e.g. `"EPSG:2056"`.
    #[must_use]
    pub fn epsg(&self) -> &'static str {
        match self {
            Self::Wgs84 => "EPSG:4326",
            Self::WebMercator => "EPSG:3857",
            Self::Lv95 => "EPSG:2056",
        }
    }

    /// Converts a point expressed in `self` to WGS84 degrees.
    #[must_use]
    pub fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::Wgs84 => (x, y),
            Self::WebMercator => mercator_to_wgs84(x, y),
            Self::Lv95 => lv95_to_wgs84(x, y),
        }
    }

    /// Converts a WGS84 point (degrees) into `self`.
    #[must_use]
    pub fn from_wgs84(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Self::Wgs84 => (lon, lat),
            Self::WebMercator => wgs84_to_mercator(lon, lat),
            Self::Lv95 => wgs84_to_lv95(lon, lat),
        }
    }

    /// Reprojects a point from `self` into `target`.
    #[must_use]
    pub fn project_point(&self, target: Self, x: f64, y: f64) -> (f64, f64) {
        if *self == target {
            return (x, y);
        }
        let (lon, lat) = self.to_wgs84(x, y);
        target.from_wgs84(lon, lat)
    }

    /// Reprojects an extent from `self` into `target`.
    ///
    /// Samples the four corners and the four edge midpoints and bounds the
    /// result; projections between these systems are not affine, so corners
    /// alone would under-cover curved edges.
    #[must_use]
    pub fn project_extent(&self, target: Self, extent: &Extent) -> Extent {
        if *self == target {
            return *extent;
        }
        let (cx, cy) = extent.center();
        let samples = [
            (extent.min_x(), extent.min_y()),
            (extent.max_x(), extent.min_y()),
            (extent.max_x(), extent.max_y()),
            (extent.min_x(), extent.max_y()),
            (cx, extent.min_y()),
            (cx, extent.max_y()),
            (extent.min_x(), cy),
            (extent.max_x(), cy),
        ];
        let projected = samples.map(|(x, y)| self.project_point(target, x, y));
        Extent::from_points(projected).unwrap_or(*extent)
    }
}

fn wgs84_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

// swisstopo approximate formulas (accuracy ~1 m inside Switzerland).
fn wgs84_to_lv95(lon: f64, lat: f64) -> (f64, f64) {
    let phi = (lat * 3600.0 - 169_028.66) / 10_000.0;
    let lambda = (lon * 3600.0 - 26_782.5) / 10_000.0;
    let east = 2_600_072.37 + 211_455.93 * lambda
        - 10_938.51 * lambda * phi
        - 0.36 * lambda * phi.powi(2)
        - 44.54 * lambda.powi(3);
    let north = 1_200_147.07 + 308_807.95 * phi + 3_745.25 * lambda.powi(2) + 76.63 * phi.powi(2)
        - 194.56 * lambda.powi(2) * phi
        + 119.79 * phi.powi(3);
    (east, north)
}

fn lv95_to_wgs84(east: f64, north: f64) -> (f64, f64) {
    let y = (east - 2_600_000.0) / 1_000_000.0;
    let x = (north - 1_200_000.0) / 1_000_000.0;
    let lambda = 2.677_909_4 + 4.728_982 * y + 0.791_484 * y * x + 0.130_6 * y * x.powi(2)
        - 0.043_6 * y.powi(3);
    let phi = 16.902_389_2 + 3.238_272 * x
        - 0.270_978 * y.powi(2)
        - 0.002_528 * x.powi(2)
        - 0.044_7 * y.powi(2) * x
        - 0.014_0 * x.powi(3);
    (lambda * 100.0 / 36.0, phi * 100.0 / 36.0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    fn close(a: (f64, f64), b: (f64, f64), tol: f64) -> bool {
        (a.0 - b.0).abs() < tol && (a.1 - b.1).abs() < tol
    }

    #[test]
    fn formula_reference_point_maps_to_published_offsets() {
        // At the series origin both polynomials reduce to their constant terms.
        let p = CoordinateSystem::Wgs84.project_point(
            CoordinateSystem::Lv95,
            26_782.5 / 3600.0,
            169_028.66 / 3600.0,
        );
        assert!(close(p, (2_600_072.37, 1_200_147.07), 1e-3), "{p:?}");
    }

    #[test]
    fn lv95_roundtrip_is_within_a_metre() {
        let (e, n) = CoordinateSystem::Wgs84.project_point(CoordinateSystem::Lv95, 8.54, 47.37);
        let (lon, lat) = CoordinateSystem::Lv95.project_point(CoordinateSystem::Wgs84, e, n);
        assert!(close((lon, lat), (8.54, 47.37), 1e-4), "{lon} {lat}");
    }

    #[test]
    fn mercator_origin_is_null_island() {
        let p = CoordinateSystem::Wgs84.project_point(CoordinateSystem::WebMercator, 0.0, 0.0);
        assert!(close(p, (0.0, 0.0), 1e-6));
    }

    #[test]
    fn epsg_codes_match_serde_names() {
        for crs in [
            CoordinateSystem::Wgs84,
            CoordinateSystem::WebMercator,
            CoordinateSystem::Lv95,
        ] {
            let json = serde_json::to_string(&crs).unwrap();
            assert_eq!(json, format!("\"{}\"", crs.epsg()));
        }
    }
}
