// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integration tests for extent reprojection.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mapstate_geom::{CoordinateSystem, Extent};
use proptest::prelude::*;

const SWISS_LV95: [f64; 4] = [2_420_000.0, 1_030_000.0, 2_900_000.0, 1_350_000.0];

#[test]
fn zurich_extent_lands_inside_swiss_bounds() {
    let zurich = Extent::new(8.50, 47.35, 8.60, 47.40);
    let projected = CoordinateSystem::Wgs84.project_extent(CoordinateSystem::Lv95, &zurich);
    let swiss = Extent::from(SWISS_LV95);
    assert!(projected.intersects(&swiss));
    assert!(projected.min_x() > 2_670_000.0);
    assert!(projected.max_x() < 2_700_000.0);
}

#[test]
fn paris_extent_misses_swiss_bounds() {
    let paris = Extent::new(2.25, 48.80, 2.42, 48.90);
    let projected = CoordinateSystem::Wgs84.project_extent(CoordinateSystem::Lv95, &paris);
    assert!(!projected.intersects(&Extent::from(SWISS_LV95)));
}

#[test]
fn identity_projection_returns_same_extent() {
    let e = Extent::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(
        CoordinateSystem::WebMercator.project_extent(CoordinateSystem::WebMercator, &e),
        e
    );
}

#[test]
fn extent_serializes_as_flat_array() {
    let e = Extent::new(3.0, 4.0, 1.0, 2.0);
    let json = serde_json::to_string(&e).unwrap();
    assert_eq!(json, "[1.0,2.0,3.0,4.0]");
    let back: Extent = serde_json::from_str("[5.0, 6.0, 0.0, 1.0]").unwrap();
    assert_eq!(back.to_array(), [0.0, 1.0, 5.0, 6.0]);
}

proptest! {
    #[test]
    fn mercator_roundtrip_stays_close(lon in -179.0f64..179.0, lat in -80.0f64..80.0) {
        let (wgs84, mercator) = (CoordinateSystem::Wgs84, CoordinateSystem::WebMercator);
        let (x, y) = wgs84.project_point(mercator, lon, lat);
        let (lon2, lat2) = mercator.project_point(wgs84, x, y);
        prop_assert!((lon - lon2).abs() < 1e-7);
        prop_assert!((lat - lat2).abs() < 1e-7);
    }

    #[test]
    fn projected_extent_contains_projected_corners(
        lon in 6.0f64..10.0, lat in 45.9f64..47.7, w in 0.01f64..0.5, h in 0.01f64..0.3,
    ) {
        let e = Extent::new(lon, lat, lon + w, lat + h);
        let p = CoordinateSystem::Wgs84.project_extent(CoordinateSystem::Lv95, &e);
        for (x, y) in e.corners() {
            let (px, py) = CoordinateSystem::Wgs84.project_point(CoordinateSystem::Lv95, x, y);
            prop_assert!(p.contains(px, py));
        }
    }
}
