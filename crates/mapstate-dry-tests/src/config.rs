// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config store fake that keeps blobs in memory and records every access.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mapstate_core::config::{ConfigError, ConfigStore};

/// One access made through [`ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `load_raw(key)`.
    Load(String),
    /// `save_raw(key, ..)`.
    Save(String),
}

/// Operation a [`RecordingConfigStore`] can be told to refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Reads fail with [`ConfigError::Other`].
    Load,
    /// Writes fail with [`ConfigError::Other`] and store nothing.
    Save,
}

/// In-memory [`ConfigStore`].
///
/// Clones share state: hand one to a
/// [`ConfigService`](mapstate_core::ConfigService) and inspect the other.
///
/// ```
/// use mapstate_core::{ConfigService, CONFIG_KEY};
/// use mapstate_dry_tests::{RecordingConfigStore, StoreCall};
///
/// let store = RecordingConfigStore::seeded(CONFIG_KEY, r#"{"lang": "fr"}"#);
/// let service = ConfigService::new(store.clone());
///
/// assert_eq!(service.load_engine_config().unwrap().lang, "fr");
/// assert_eq!(store.calls(), vec![StoreCall::Load(CONFIG_KEY.to_owned())]);
/// ```
#[derive(Clone, Default)]
pub struct RecordingConfigStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    blobs: BTreeMap<String, Vec<u8>>,
    calls: Vec<StoreCall>,
    refused: Option<StoreOp>,
}

impl RecordingConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `body` under `key`.
    pub fn seeded(key: &str, body: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        store.lock().blobs.insert(key.to_owned(), body.into());
        store
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes `op` fail from now on; `None` restores normal behaviour.
    pub fn refuse(&self, op: Option<StoreOp>) {
        self.lock().refused = op;
    }

    /// Every access so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Text stored under `key`, if any.
    pub fn stored(&self, key: &str) -> Option<String> {
        let state = self.lock();
        let blob = state.blobs.get(key)?;
        Some(String::from_utf8_lossy(blob).into_owned())
    }
}

impl ConfigStore for RecordingConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Load(key.to_owned()));
        if state.refused == Some(StoreOp::Load) {
            return Err(ConfigError::Other(format!("refused to load {key}")));
        }
        state.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Save(key.to_owned()));
        if state.refused == Some(StoreOp::Save) {
            return Err(ConfigError::Other(format!("refused to save {key}")));
        }
        state.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}
