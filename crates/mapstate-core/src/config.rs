// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration, plus the storage port it is persisted through.

use mapstate_geom::{CoordinateSystem, Extent};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Store key under which [`EngineConfig`] is persisted.
pub const CONFIG_KEY: &str = "mapstate";

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Loads the engine config, falling back to defaults when none is stored.
    pub fn load_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(self.load(CONFIG_KEY)?.unwrap_or_default())
    }
}

/// Pair of catalog layers that must be linked as 2D/3D twins after every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundLink {
    /// Layer that receives the link.
    pub layer_id: String,
    /// Its alternate-dimension counterpart.
    pub alternate_id: String,
}

/// Fallback display names for file layers whose data carries no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLabels {
    /// Label for KML layers.
    pub kml: String,
    /// Label for GPX layers.
    pub gpx: String,
}

impl Default for FileLabels {
    fn default() -> Self {
        Self {
            kml: "KML".into(),
            gpx: "GPX".into(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Language the catalog is fetched in.
    pub lang: String,
    /// Dual background pairs linked on every catalog load.
    pub background_links: Vec<BackgroundLink>,
    /// Fallback file layer names.
    pub file_labels: FileLabels,
    /// Region file data must intersect, in `working_projection`.
    pub working_region: Extent,
    /// Coordinate system of `working_region`.
    pub working_projection: CoordinateSystem,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lang: "en".into(),
            background_links: vec![BackgroundLink {
                layer_id: "ch.swisstopo.swissimage".into(),
                alternate_id: "ch.swisstopo.swissimage_3d".into(),
            }],
            file_labels: FileLabels::default(),
            working_region: Extent::new(2_420_000.0, 1_030_000.0, 2_900_000.0, 1_350_000.0),
            working_projection: CoordinateSystem::Lv95,
        }
    }
}
