// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine config persistence through `ConfigService`.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mapstate_core::{ConfigError, ConfigService, EngineConfig, CONFIG_KEY};
use mapstate_dry_tests::{RecordingConfigStore, StoreCall, StoreOp};
use mapstate_geom::CoordinateSystem;

#[test]
fn missing_config_yields_defaults() {
    let store = RecordingConfigStore::new();
    let service = ConfigService::new(store.clone());
    let config = service.load_engine_config().unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(store.calls(), vec![StoreCall::Load(CONFIG_KEY.to_owned())]);
}

#[test]
fn empty_blob_counts_as_missing() {
    let service = ConfigService::new(RecordingConfigStore::seeded(CONFIG_KEY, ""));
    let config = service.load_engine_config().unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn partial_config_fills_in_defaults() {
    let body = r#"{"lang": "de", "file_labels": {"kml": "Zeichnung"}}"#;
    let service = ConfigService::new(RecordingConfigStore::seeded(CONFIG_KEY, body));
    let config = service.load_engine_config().unwrap();
    assert_eq!(config.lang, "de");
    assert_eq!(config.file_labels.kml, "Zeichnung");
    assert_eq!(config.file_labels.gpx, "GPX");
    assert_eq!(config.working_projection, CoordinateSystem::Lv95);
}

#[test]
fn saved_config_reads_back_unchanged() {
    let store = RecordingConfigStore::new();
    let service = ConfigService::new(store.clone());
    let config = EngineConfig {
        lang: "it".into(),
        background_links: Vec::new(),
        ..EngineConfig::default()
    };

    service.save(CONFIG_KEY, &config).unwrap();

    assert_eq!(service.load_engine_config().unwrap(), config);
    let stored = store.stored(CONFIG_KEY).unwrap();
    assert!(stored.contains("\"lang\": \"it\""));
    let key = CONFIG_KEY.to_owned();
    assert_eq!(
        store.calls(),
        vec![StoreCall::Save(key.clone()), StoreCall::Load(key)]
    );
}

#[test]
fn load_failure_is_not_papered_over_with_defaults() {
    let store = RecordingConfigStore::seeded(CONFIG_KEY, r#"{"lang": "fr"}"#);
    store.refuse(Some(StoreOp::Load));
    let service = ConfigService::new(store.clone());
    let loaded = service.load_engine_config();
    assert!(matches!(loaded, Err(ConfigError::Other(_))));

    store.refuse(None);
    assert_eq!(service.load_engine_config().unwrap().lang, "fr");
}

#[test]
fn refused_save_stores_nothing() {
    let store = RecordingConfigStore::new();
    store.refuse(Some(StoreOp::Save));
    let service = ConfigService::new(store.clone());
    let saved = service.save(CONFIG_KEY, &EngineConfig::default());
    assert!(matches!(saved, Err(ConfigError::Other(_))));
    assert_eq!(store.stored(CONFIG_KEY), None);
}

#[test]
fn malformed_blob_is_a_serde_error() {
    let store = RecordingConfigStore::seeded(CONFIG_KEY, "{not json");
    let service = ConfigService::new(store);
    let loaded = service.load_engine_config();
    assert!(matches!(loaded, Err(ConfigError::Serde(_))));
}
