// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::engine::LayerEngine;
use crate::error::EngineError;
use crate::layer::Layer;

/// One timestamped snapshot of a time-enabled dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Timestamp as published by the backend (e.g. `"20210101"`).
    pub timestamp: String,
    /// Opaque reference to the data behind this snapshot (tile dimension, URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ref: Option<String>,
}

impl TimeEntry {
    /// Entry without a data reference.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            data_ref: None,
        }
    }

    /// Calendar year, read from the first four digits of the timestamp.
    ///
    /// Returns `None` for symbolic timestamps such as `"current"`.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        let digits = self.timestamp.get(..4)?;
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }
}

/// Time configuration of a layer.
///
/// Invariant: the current entry, when set, is a member of `entries`. It is
/// stored as a position so it can never dangle; lookups go by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TimeConfigRepr", into = "TimeConfigRepr")]
pub struct TimeConfig {
    entries: Vec<TimeEntry>,
    current: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct TimeConfigRepr {
    #[serde(default)]
    entries: Vec<TimeEntry>,
    #[serde(default)]
    current: Option<String>,
}

impl From<TimeConfigRepr> for TimeConfig {
    fn from(repr: TimeConfigRepr) -> Self {
        Self::new(repr.entries, repr.current.as_deref())
    }
}

impl From<TimeConfig> for TimeConfigRepr {
    fn from(config: TimeConfig) -> Self {
        let current = config.current().map(|e| e.timestamp.clone());
        Self {
            entries: config.entries,
            current,
        }
    }
}

impl TimeConfig {
    /// Builds a configuration; a `current` timestamp absent from `entries` is dropped.
    #[must_use]
    pub fn new(entries: Vec<TimeEntry>, current: Option<&str>) -> Self {
        let mut config = Self {
            entries,
            current: None,
        };
        config.set_current_timestamp(current);
        config
    }

    /// Builds a configuration whose current entry is the first (most recent) one.
    #[must_use]
    pub fn latest(entries: Vec<TimeEntry>) -> Self {
        let current = if entries.is_empty() { None } else { Some(0) };
        Self { entries, current }
    }

    /// All entries, in backend order.
    #[must_use]
    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    /// The current entry, if any.
    #[must_use]
    pub fn current(&self) -> Option<&TimeEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Timestamp of the current entry, if any.
    #[must_use]
    pub fn current_timestamp(&self) -> Option<&str> {
        self.current().map(|e| e.timestamp.as_str())
    }

    /// Looks an entry up by exact timestamp.
    #[must_use]
    pub fn entry_for_timestamp(&self, timestamp: &str) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.timestamp == timestamp)
    }

    /// First entry falling in `year`.
    #[must_use]
    pub fn entry_for_year(&self, year: i32) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.year() == Some(year))
    }

    /// Distinct years covered by the entries, in entry order.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut out = Vec::new();
        for year in self.entries.iter().filter_map(TimeEntry::year) {
            if !out.contains(&year) {
                out.push(year);
            }
        }
        out
    }

    /// Selects the entry with `timestamp`; unknown timestamps (and `None`) unset it.
    ///
    /// Returns the resolved entry.
    pub fn set_current_timestamp(&mut self, timestamp: Option<&str>) -> Option<&TimeEntry> {
        self.current = timestamp.and_then(|ts| self.position_of(ts));
        self.current()
    }

    /// Selects the first entry of `year`; no matching year (and `None`) unsets it.
    pub fn set_current_year(&mut self, year: Option<i32>) -> Option<&TimeEntry> {
        self.current = year.and_then(|y| self.position_of_year(y));
        self.current()
    }

    fn position_of(&self, timestamp: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.timestamp == timestamp)
    }

    fn position_of_year(&self, year: i32) -> Option<usize> {
        self.entries.iter().position(|e| e.year() == Some(year))
    }
}

impl LayerEngine {
    /// Selects the time entry `timestamp` of the layer at `index`.
    ///
    /// An unknown timestamp unsets the current entry. The resolved entry is
    /// mirrored onto the catalog entry of the layer's alternate-dimension
    /// counterpart. Returns `false` (reported) for a bad index or a layer
    /// without time configuration.
    pub fn set_current_time_entry(&mut self, index: usize, timestamp: Option<&str>) -> bool {
        let title = "Cannot set layer time entry";
        if !self.check_index(title, index) {
            return false;
        }
        if !self.active.get(index).is_some_and(Layer::is_time_enabled) {
            self.report(
                title,
                vec![json!(index), json!("layer has no time configuration")],
            );
            return false;
        }
        self.replace_with(index, |layer| {
            if let Some(time) = layer.time_config.as_mut() {
                time.set_current_timestamp(timestamp);
            }
        });
        self.mirror_time_of(index);
        true
    }

    /// Selects the first entry of `year` on the layer at `index`.
    ///
    /// A year without entries unsets the current entry and is not an error.
    /// A bad index or a layer without time configuration is a programming
    /// error and fails fast.
    pub fn set_current_year(
        &mut self,
        index: usize,
        year: Option<i32>,
    ) -> Result<Option<TimeEntry>, EngineError> {
        let len = self.active.len();
        let Some(layer) = self.active.get(index) else {
            error!(index, len, "set_current_year on a missing layer");
            return Err(EngineError::IndexOutOfRange { index, len });
        };
        if !layer.is_time_enabled() {
            error!(id = %layer.id, "set_current_year on a layer without time");
            return Err(EngineError::NotTimeEnabled {
                id: layer.id.clone(),
            });
        }
        let mut resolved = None;
        self.replace_with(index, |layer| {
            if let Some(time) = layer.time_config.as_mut() {
                resolved = time.set_current_year(year).cloned();
            }
        });
        self.mirror_time_of(index);
        Ok(resolved)
    }

    /// Copies the current timestamp of the active layer at `index` onto the
    /// catalog entry of its alternate-dimension counterpart.
    pub(crate) fn mirror_time_of(&mut self, index: usize) {
        let Some(layer) = self.active.get(index) else {
            return;
        };
        let Some(alt) = layer.id_in_alternate_dimension.clone() else {
            return;
        };
        let timestamp = layer.current_timestamp().map(str::to_owned);
        if self.catalog.set_current_timestamp(&alt, timestamp.as_deref()) {
            debug!(%alt, ?timestamp, "mirrored time onto counterpart");
        } else {
            debug!(%alt, "counterpart missing from catalog or not time-enabled");
        }
    }
}
