// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::engine::LayerEngine;
use crate::layer::{Layer, LayerSource};

/// Activation flags of the ephemeral overlay tools.
///
/// A tool is *shown* when it is active and has something to act on. Layer
/// removal only changes what is shown, never the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayTools {
    /// Compare (swipe) slider requested.
    pub compare_slider_active: bool,
    /// Time slider requested.
    pub time_slider_active: bool,
}

impl OverlayTools {
    /// Compare slider is active and at least one layer is visible.
    #[must_use]
    pub fn compare_slider_shown(&self, layers: &[Layer]) -> bool {
        self.compare_slider_active && layers.iter().any(|l| l.visible)
    }

    /// Time slider is active and at least one time-enabled layer is visible.
    #[must_use]
    pub fn time_slider_shown(&self, layers: &[Layer]) -> bool {
        self.time_slider_active && layers.iter().any(|l| l.visible && l.is_time_enabled())
    }
}

impl LayerEngine {
    /// Puts a clone of `source` in the preview slot, forced visible.
    pub fn set_preview<'a>(&mut self, source: impl Into<LayerSource<'a>>) -> bool {
        let layer = match source.into() {
            LayerSource::CatalogId(id) => {
                let Some(layer) = self.catalog.get(id).cloned() else {
                    self.report("Preview layer not found in catalog", vec![json!(id)]);
                    return false;
                };
                layer
            }
            LayerSource::Layer(layer) => layer.clone(),
        };
        self.preview = Some(layer.with_visible(true));
        true
    }

    /// Empties the preview slot.
    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    /// Appends an application-owned layer above the active list.
    pub fn add_system_layer(&mut self, layer: Layer) {
        self.system.push(layer);
    }

    /// Removes every system layer with `id`.
    pub fn remove_system_layer(&mut self, id: &str) -> usize {
        let before = self.system.len();
        self.system.retain(|l| l.id != id);
        before - self.system.len()
    }

    /// Replaces the system layer sharing `layer`'s id.
    pub fn update_system_layer(&mut self, layer: Layer) -> bool {
        match self.system.iter_mut().find(|l| l.id == layer.id) {
            Some(slot) => {
                *slot = layer;
                true
            }
            None => {
                self.report("System layer to update not found", vec![json!(layer.id)]);
                false
            }
        }
    }

    /// Activates or deactivates the compare slider.
    pub fn set_compare_slider_active(&mut self, active: bool) {
        self.tools.compare_slider_active = active;
    }

    /// Activates or deactivates the time slider.
    pub fn set_time_slider_active(&mut self, active: bool) {
        self.tools.time_slider_active = active;
    }

    /// See [`OverlayTools::compare_slider_shown`].
    #[must_use]
    pub fn compare_slider_shown(&self) -> bool {
        self.tools.compare_slider_shown(&self.active)
    }

    /// See [`OverlayTools::time_slider_shown`].
    #[must_use]
    pub fn time_slider_shown(&self) -> bool {
        self.tools.time_slider_shown(&self.active)
    }

    /// Sets the time slider year.
    ///
    /// With a year, every active time-enabled layer that has entries in that
    /// year switches to it. Returns the number of switched layers.
    pub fn set_preview_year(&mut self, year: Option<i32>) -> usize {
        self.preview_year = year;
        let Some(year) = year else {
            return 0;
        };
        let targets: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, l)| {
                l.time_config
                    .as_ref()
                    .is_some_and(|t| t.entry_for_year(year).is_some())
            })
            .map(|(i, _)| i)
            .collect();
        for &i in &targets {
            self.replace_with(i, |layer| {
                if let Some(time) = layer.time_config.as_mut() {
                    time.set_current_year(Some(year));
                }
            });
            self.mirror_time_of(i);
        }
        debug!(year, switched = targets.len(), "preview year applied");
        targets.len()
    }
}
