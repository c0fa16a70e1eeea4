// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BackgroundLink;
use crate::layer::Layer;

/// Immutable list of layer templates, keyed by id.
///
/// Replaced wholesale on reload. Snapshots handed out by [`Catalog::snapshot`]
/// never change: the one engine-side edit (time mirroring) copies on write.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    layers: Arc<Vec<Layer>>,
    index: Arc<FxHashMap<String, usize>>,
}

impl Catalog {
    /// Builds a catalog. When ids repeat, lookups resolve to the first entry.
    #[must_use]
    pub fn new(layers: Vec<Layer>) -> Self {
        let mut index = FxHashMap::default();
        for (i, layer) in layers.iter().enumerate() {
            if index.contains_key(&layer.id) {
                warn!(id = %layer.id, "duplicate catalog id, keeping first entry");
                continue;
            }
            index.insert(layer.id.clone(), i);
        }
        Self {
            layers: Arc::new(layers),
            index: Arc::new(index),
        }
    }

    /// Entry with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.index.get(id).and_then(|&i| self.layers.get(i))
    }

    /// All entries in backend order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Cheap read-only snapshot for rendering and menus.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Layer>> {
        Arc::clone(&self.layers)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the catalog holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Entries that can serve as background.
    pub fn background_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_background)
    }

    /// Sets the current time entry of the entry `id` by timestamp.
    ///
    /// Copy-on-write: outstanding snapshots keep the previous value. Returns
    /// `false` when `id` is unknown or not time-enabled.
    pub(crate) fn set_current_timestamp(&mut self, id: &str, timestamp: Option<&str>) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let layers = Arc::make_mut(&mut self.layers);
        match layers.get_mut(i).and_then(|l| l.time_config.as_mut()) {
            Some(time) => {
                time.set_current_timestamp(timestamp);
                true
            }
            None => false,
        }
    }
}

/// Applies the dual-background links to a freshly fetched catalog.
///
/// Pure: consumes the raw list and returns the fixed one. Links naming an
/// absent layer are skipped.
#[must_use]
pub fn link_background_pairs(mut raw: Vec<Layer>, links: &[BackgroundLink]) -> Vec<Layer> {
    for link in links {
        let has_counterpart = raw.iter().any(|l| l.id == link.alternate_id);
        match raw.iter_mut().find(|l| l.id == link.layer_id) {
            Some(layer) if has_counterpart => {
                debug!(layer = %link.layer_id, alternate = %link.alternate_id, "linking pair");
                layer.id_in_alternate_dimension = Some(link.alternate_id.clone());
            }
            _ => debug!(layer = %link.layer_id, "background pair incomplete, not linked"),
        }
    }
    raw
}

/// Topic definition, forwarded to the topic collaborator uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier.
    pub id: String,
    /// Background layer ids offered by the topic.
    #[serde(default)]
    pub background_layers: Vec<String>,
    /// Background selected when the topic opens.
    #[serde(default)]
    pub default_background: Option<String>,
    /// Layers activated when the topic opens.
    #[serde(default)]
    pub activated_layers: Vec<String>,
    /// Layers pre-selected in the topic tree.
    #[serde(default)]
    pub selected_layers: Vec<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::layer::RasterProtocol;
    use crate::time::{TimeConfig, TimeEntry};

    fn timed(id: &str) -> Layer {
        Layer::time_enabled(
            id,
            id,
            RasterProtocol::Wmts,
            TimeConfig::latest(vec![TimeEntry::new("2020"), TimeEntry::new("2010")]),
        )
    }

    #[test]
    fn mirroring_leaves_snapshots_untouched() {
        let mut catalog = Catalog::new(vec![timed("b")]);
        let before = catalog.snapshot();
        assert!(catalog.set_current_timestamp("b", Some("2010")));
        assert_eq!(before[0].current_timestamp(), Some("2020"));
        let mirrored = catalog.get("b").and_then(Layer::current_timestamp);
        assert_eq!(mirrored, Some("2010"));
    }

    #[test]
    fn first_duplicate_wins_lookup() {
        let catalog = Catalog::new(vec![
            Layer::raster("a", "first", RasterProtocol::Wms),
            Layer::raster("a", "second", RasterProtocol::Wms),
        ]);
        assert_eq!(catalog.get("a").map(|l| l.name.as_str()), Some("first"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn background_link_needs_both_sides() {
        let links = [BackgroundLink {
            layer_id: "2d".into(),
            alternate_id: "3d".into(),
        }];
        let linked = link_background_pairs(
            vec![
                Layer::raster("2d", "", RasterProtocol::Wmts),
                Layer::raster("3d", "", RasterProtocol::Wmts),
            ],
            &links,
        );
        assert_eq!(linked[0].id_in_alternate_dimension.as_deref(), Some("3d"));
        let only_2d = vec![Layer::raster("2d", "", RasterProtocol::Wmts)];
        let lonely = link_background_pairs(only_2d, &links);
        assert_eq!(lonely[0].id_in_alternate_dimension, None);
    }
}
