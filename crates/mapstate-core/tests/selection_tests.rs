// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Feature selection invalidation after layer mutations.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mapstate_core::{
    AddOptions, FeatureRef, Invalidation, InvalidationContext, Layer, RasterProtocol,
};
use mapstate_dry_tests::fixtures::{NATIONAL_MAP, TIME_SERIES, WATER_PROTECTION};
use mapstate_dry_tests::{build_engine, build_engine_with_catalog, FakeWorld};

fn hit(layer_id: &str) -> Vec<FeatureRef> {
    vec![FeatureRef {
        layer_id: layer_id.to_owned(),
        feature_id: "f1".to_owned(),
    }]
}

#[test]
fn no_click_context_means_no_identify() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let i = engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    engine.toggle_visibility(i);
    engine.remove(WATER_PROTECTION);
    engine.clear_layers();
    assert!(world.identify_requests().is_empty());
    assert_eq!(
        engine.invalidate_selection(InvalidationContext::all()),
        Invalidation::NoClickContext
    );
}

#[test]
fn clearing_the_list_drops_the_selection_without_a_query() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    world.click((0.0, 0.0), hit(WATER_PROTECTION));
    world.select_feature_of(WATER_PROTECTION);

    engine.clear_layers();

    assert!(engine.active_layers().is_empty());
    assert!(world.identify_requests().is_empty());
    assert!(world.selected_layers().is_empty());
    assert_eq!(world.selection_clears(), 1);
    assert_eq!(
        engine.invalidate_selection(InvalidationContext::all()),
        Invalidation::ClearedSelection
    );
}

#[test]
fn removing_a_selected_layer_clears_instead_of_reidentifying() {
    let world = FakeWorld::new();
    let catalog = vec![Layer::raster("A", "A", RasterProtocol::Wms).with_tooltip()];
    let mut engine = build_engine_with_catalog(&world, catalog);
    engine.add("A", AddOptions::default()).unwrap();
    world.click((2_600_000.0, 1_200_000.0), hit("A"));
    world.select_feature_of("A");

    assert_eq!(engine.remove("A"), 1);

    assert!(engine.active_layers().is_empty());
    assert_eq!(world.cleared_layers(), vec!["A".to_owned()]);
    assert!(world.identify_requests().is_empty());
}

#[test]
fn adding_with_a_click_reidentifies_visible_tooltip_layers() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    engine.add(NATIONAL_MAP, AddOptions::default()).unwrap();
    world.click((1.0, 2.0), hit(WATER_PROTECTION));
    engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();

    let requests = world.identify_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].coordinate, (1.0, 2.0));
    let ids: Vec<_> = requests[0].layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, [WATER_PROTECTION]);
    assert_eq!(requests[0].hit_features, hit(WATER_PROTECTION));
}

#[test]
fn identify_failure_does_not_undo_the_mutation() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    world.click((0.0, 0.0), Vec::new());
    world.set_fail_identify(true);
    assert_eq!(engine.add(WATER_PROTECTION, AddOptions::default()), Some(0));
    assert_eq!(engine.active_layers().len(), 1);
    assert_eq!(world.identify_requests().len(), 1);
    assert!(world.errors().is_empty());
    assert_eq!(
        engine.invalidate_selection(InvalidationContext::all()),
        Invalidation::ReidentifyFailed
    );
}

#[test]
fn hiding_a_layer_only_touches_its_own_selection() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    let water = engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    let series = engine.add(TIME_SERIES, AddOptions::default()).unwrap();
    world.click((0.0, 0.0), hit(WATER_PROTECTION));
    world.select_feature_of(WATER_PROTECTION);

    engine.set_visibility(series, false);
    assert!(world.cleared_layers().is_empty());
    assert!(world.identify_requests().is_empty());

    engine.set_visibility(water, false);
    assert_eq!(world.cleared_layers(), vec![WATER_PROTECTION.to_owned()]);
    assert!(world.selected_layers().is_empty());
}

#[test]
fn selected_layer_still_visible_is_reidentified() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    engine.add(WATER_PROTECTION, AddOptions::default()).unwrap();
    world.click((0.0, 0.0), hit(WATER_PROTECTION));
    world.select_feature_of(WATER_PROTECTION);
    let ctx = InvalidationContext::for_layer(WATER_PROTECTION);
    let outcome = engine.invalidate_selection(ctx);
    assert_eq!(outcome, Invalidation::Reidentified { candidates: 2 });
}

#[test]
fn removal_keeps_overlay_tool_flags() {
    let world = FakeWorld::new();
    let mut engine = build_engine(&world);
    engine.add(TIME_SERIES, AddOptions::default()).unwrap();
    engine.set_compare_slider_active(true);
    engine.set_time_slider_active(true);
    assert!(engine.compare_slider_shown());
    assert!(engine.time_slider_shown());

    engine.remove(TIME_SERIES);

    assert!(!engine.compare_slider_shown());
    assert!(!engine.time_slider_shown());
    assert!(engine.tools().compare_slider_active);
    assert!(engine.tools().time_slider_active);
}
