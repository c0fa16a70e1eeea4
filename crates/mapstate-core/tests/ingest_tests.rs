// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! File and capabilities ingestion onto active layers.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mapstate_core::{
    AddOptions, ErrorKind, ExternalCapabilities, ExternalSubLayer, FileFormat, FileMetadata,
    IdentityFilter, Layer,
};
use mapstate_dry_tests::fixtures::{
    GPX_LAUSANNE, KML_BERN, KML_EMPTY, KML_MALFORMED, KML_PARIS, NATIONAL_MAP, WATER_PROTECTION,
};
use mapstate_dry_tests::{build_engine, fixtures, FakeWorld};
use mapstate_geom::Extent;

const URL: &str = "https://public.example/api/kml/files/abc";

#[test]
fn file_errors_are_recomputed_on_every_load() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let kml = fixtures::kml_layer(URL);
    engine.add(&kml, AddOptions::default()).unwrap();

    assert_eq!(engine.apply_file_data(URL, KML_EMPTY.into(), None), 1);
    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::FileEmpty));
    assert!(!layer.is_loading);

    assert_eq!(engine.apply_file_data(URL, KML_BERN.into(), None), 1);
    let layer = &engine.active_layers()[0];
    assert!(layer.errors.is_empty());
    assert_eq!(layer.name, "Bern walk");
    assert!(layer.file_payload().unwrap().extent.is_some());
}

#[test]
fn geometry_outside_the_working_region_is_out_of_bounds() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let kml = fixtures::kml_layer(URL);
    engine.add(&kml, AddOptions::default()).unwrap();
    engine.apply_file_data(URL, KML_PARIS.into(), None);
    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::OutOfBounds));
    assert!(!layer.has_error(&ErrorKind::FileEmpty));
    // No name in the file: falls back to the source URL.
    assert_eq!(layer.name, URL);
}

#[test]
fn unnamed_local_file_gets_the_format_label() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let local = Layer::file("local.kml", FileFormat::Kml, None);
    engine.add(&local, AddOptions::default()).unwrap();
    engine.apply_file_data("local.kml", KML_PARIS.into(), None);
    assert_eq!(engine.active_layers()[0].name, "KML");
}

#[test]
fn data_and_metadata_reach_every_duplicate() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let layer = fixtures::gpx_layer(URL);
    engine.add(&layer, AddOptions::default()).unwrap();
    engine.add(&layer, AddOptions::default()).unwrap();
    let metadata = FileMetadata {
        file_id: Some("abc".into()),
        ..FileMetadata::default()
    };
    let data = GPX_LAUSANNE.to_owned();
    let applied = engine.apply_file_data(URL, data, Some(metadata.clone()));
    assert_eq!(applied, 2);
    for layer in engine.active_layers() {
        let payload = layer.file_payload().unwrap();
        assert_eq!(payload.data.as_deref(), Some(GPX_LAUSANNE));
        assert_eq!(payload.metadata.as_ref(), Some(&metadata));
        assert_eq!(layer.name, "Lakeside run");
        assert!(layer.errors.is_empty());
    }
}

#[test]
fn unmatched_file_data_is_reported_and_changes_nothing() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    let before = engine.active_layers().to_vec();
    let bern = || KML_BERN.to_owned();
    assert_eq!(engine.apply_file_data(WATER_PROTECTION, bern(), None), 0);
    assert_eq!(engine.apply_file_data("nope", bern(), None), 0);
    assert_eq!(engine.active_layers(), before.as_slice());
    assert_eq!(world.errors().len(), 2);
}

#[test]
fn malformed_file_is_invalid_until_a_good_load() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let kml = fixtures::kml_layer(URL);
    engine.add(&kml, AddOptions::default()).unwrap();
    engine.apply_file_data(URL, KML_MALFORMED.into(), None);
    assert!(engine.active_layers()[0].has_error(&ErrorKind::InvalidFile));
    engine.apply_file_data(URL, KML_BERN.into(), None);
    assert!(engine.active_layers()[0].errors.is_empty());
}

#[test]
fn load_failure_becomes_a_data_error() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let kml = fixtures::kml_layer(URL);
    engine.add(&kml, AddOptions::default()).unwrap();
    assert_eq!(engine.apply_file_load_error(URL, ErrorKind::LoadFailed), 1);
    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::LoadFailed));
    assert!(!layer.is_loading);
    engine.apply_file_data(URL, KML_BERN.into(), None);
    assert!(engine.active_layers()[0].errors.is_empty());
    assert_eq!(
        engine.apply_file_load_error("nope", ErrorKind::LoadFailed),
        0
    );
}

#[test]
fn capabilities_fill_external_layers_of_one_origin() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let roads_a = fixtures::external_wms("roads", "https://a.example/wms");
    engine.add(&roads_a, AddOptions::default());
    let roads_b = fixtures::external_wms("roads", "https://b.example/wms");
    engine.add(&roads_b, AddOptions::default());
    let filter = IdentityFilter::external("https://a.example/wms");
    let capabilities = ExternalCapabilities {
        sub_layers: vec![ExternalSubLayer {
            id: "roads:main".into(),
            name: "Main roads".into(),
        }],
        extent: Some(Extent::new(6.0, 46.0, 7.0, 47.0)),
    };
    assert_eq!(
        engine.apply_external_capabilities("roads", Some(&filter), capabilities),
        1
    );
    let a = &engine.active_layers()[0];
    assert!(!a.is_loading);
    assert_eq!(a.external_payload().unwrap().sub_layers.len(), 1);
    assert_eq!(a.fit_extent(), Some(Extent::new(6.0, 46.0, 7.0, 47.0)));
    assert!(engine.active_layers()[1].is_loading);
}

#[test]
fn external_errors_follow_the_latest_outcome() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let roads_a = fixtures::external_wms("roads", "https://a.example/wms");
    engine.add(&roads_a, AddOptions::default());
    assert_eq!(engine.apply_external_load_error("roads", None), 1);
    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::ExternalUnreachable));

    engine.apply_external_capabilities("roads", None, ExternalCapabilities::default());
    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::ExternalInvalid));
    assert!(!layer.has_error(&ErrorKind::ExternalUnreachable));

    assert_eq!(engine.apply_external_load_error(NATIONAL_MAP, None), 0);
}

#[test]
fn load_error_replaces_an_invalid_capabilities_outcome() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let roads = fixtures::external_wms("roads", "https://a.example/wms");
    engine.add(&roads, AddOptions::default());
    engine.apply_external_capabilities("roads", None, ExternalCapabilities::default());
    let invalid = &engine.active_layers()[0];
    assert!(invalid.has_error(&ErrorKind::ExternalInvalid));

    assert_eq!(engine.apply_external_load_error("roads", None), 1);

    let layer = &engine.active_layers()[0];
    assert!(layer.has_error(&ErrorKind::ExternalUnreachable));
    assert!(!layer.has_error(&ErrorKind::ExternalInvalid));
    assert_eq!(layer.errors.len(), 1);
}
