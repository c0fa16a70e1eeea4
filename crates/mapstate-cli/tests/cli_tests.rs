// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end tests of the `mapstate` binary.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const CATALOG: &str = r#"{
  "layers": [
    {"id": "ch.swisstopo.pixelkarte-farbe", "name": "National Map", "is_background": true,
     "kind": {"type": "raster", "protocol": "wmts"}},
    {"id": "ch.bafu.gewaesserschutz", "name": "Water protection", "has_tooltip": true,
     "kind": {"type": "raster", "protocol": "wms"}},
    {"id": "ch.swisstopo.zeitreihen", "name": "Journey through time",
     "kind": {"type": "time-enabled", "protocol": "wmts"},
     "time_config": {"entries": [{"timestamp": "20211231"}, {"timestamp": "18641231"}],
                     "current": "20211231"}}
  ],
  "topics": [{"id": "ech"}]
}"#;

const PARIS_KML: &str = r#"<kml><Document><name>Paris</name>
  <Placemark><Point><coordinates>2.35,48.85</coordinates></Point></Placemark>
</Document></kml>"#;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn run(dir: &Path, script: &str) -> assert_cmd::assert::Assert {
    let catalog = write(dir, "catalog.json", CATALOG);
    let script = write(dir, "script.json", script);
    let config = dir.join("engine.json");
    Command::cargo_bin("mapstate")
        .unwrap()
        .arg("run")
        .arg("--catalog")
        .arg(catalog)
        .arg("--script")
        .arg(script)
        .arg("--config")
        .arg(config)
        .assert()
}

fn report(assert: &assert_cmd::assert::Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

#[test]
fn run_prints_active_layers_and_reported_errors() {
    let dir = tempfile::tempdir().unwrap();
    let assert = run(
        dir.path(),
        r#"[
          {"op": "add", "id": "ch.swisstopo.pixelkarte-farbe"},
          {"op": "add", "id": "ch.bafu.gewaesserschutz"},
          {"op": "set_opacity", "index": 1, "value": 0.25},
          {"op": "move", "from": 1, "to": 0},
          {"op": "add", "id": "ch.unknown"},
          {"op": "toggle_visibility", "index": 7}
        ]"#,
    )
    .success();
    let report = report(&assert);
    let active = report["active"].as_array().unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0]["id"], "ch.bafu.gewaesserschutz");
    assert_eq!(active[0]["opacity"], 0.25);
    assert_eq!(report["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn apply_file_reports_out_of_bounds_data() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "paris.kml", PARIS_KML);
    let assert = run(
        dir.path(),
        r#"[
          {"op": "add", "layer": {"id": "paris.kml", "is_loading": true,
                                  "kind": {"type": "file", "format": "kml"}}},
          {"op": "apply_file", "layer_id": "paris.kml", "path": "paris.kml"}
        ]"#,
    )
    .success();
    let layer = &report(&assert)["active"][0];
    assert_eq!(layer["name"], "Paris");
    assert_eq!(layer["is_loading"], false);
    assert_eq!(layer["errors"][0]["kind"], "out-of-bounds");
}

#[test]
fn set_year_misuse_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    run(
        dir.path(),
        r#"[
          {"op": "add", "id": "ch.swisstopo.pixelkarte-farbe"},
          {"op": "set_year", "index": 0, "year": 1864}
        ]"#,
    )
    .failure()
    .stderr(predicate::str::contains("no time configuration"));
}

#[test]
fn set_year_picks_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let assert = run(
        dir.path(),
        r#"[
          {"op": "add", "id": "ch.swisstopo.zeitreihen"},
          {"op": "set_year", "index": 0, "year": 1864}
        ]"#,
    )
    .success();
    assert_eq!(
        report(&assert)["active"][0]["time_config"]["current"],
        "18641231"
    );
}

#[test]
fn config_file_changes_file_labels() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "engine.json", r#"{"file_labels": {"kml": "Zeichnung"}}"#);
    let assert = run(
        dir.path(),
        r#"[
          {"op": "add", "layer": {"id": "x.kml", "kind": {"type": "file", "format": "kml"}}},
          {"op": "apply_file", "layer_id": "x.kml", "data": "<kml><Document/></kml>"}
        ]"#,
    )
    .success();
    let layer = &report(&assert)["active"][0];
    assert_eq!(layer["name"], "Zeichnung");
    assert_eq!(layer["errors"][0]["kind"], "file-empty");
}

#[test]
fn check_catalog_counts_layers() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write(dir.path(), "catalog.json", CATALOG);
    Command::cargo_bin("mapstate")
        .unwrap()
        .arg("check-catalog")
        .arg("--catalog")
        .arg(catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("layers: 3"))
        .stdout(predicate::str::contains("time-enabled: 1"))
        .stdout(predicate::str::contains("background: 1"));
}

#[test]
fn check_catalog_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write(dir.path(), "catalog.json", "{\"layers\": 3}");
    Command::cargo_bin("mapstate")
        .unwrap()
        .arg("check-catalog")
        .arg("--catalog")
        .arg(catalog)
        .assert()
        .failure();
}
