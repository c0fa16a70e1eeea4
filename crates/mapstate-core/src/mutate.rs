// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use mapstate_geom::CoordinateSystem;
use serde_json::json;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::engine::LayerEngine;
use crate::error::ErrorMessage;
use crate::ident::{self, LayerRef};
use crate::layer::{Layer, LayerSource, Opacity};
use crate::patch::{LayerChanges, LayerUpdate};
use crate::selection::InvalidationContext;

/// Options of [`LayerEngine::add`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOptions {
    /// Fit the viewport to the layer extent, when it has one.
    pub zoom_to_extent: bool,
    /// Fields overlaid onto the fresh clone before it is appended.
    pub initial_values: LayerChanges,
}

impl AddOptions {
    /// Requests a viewport fit.
    #[must_use]
    pub fn zoom(mut self) -> Self {
        self.zoom_to_extent = true;
        self
    }

    /// Sets the initial values.
    #[must_use]
    pub fn with_values(mut self, values: LayerChanges) -> Self {
        self.initial_values = values;
        self
    }
}

/// Outcome of [`LayerEngine::update_many`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Number of layer slots replaced.
    pub updated: usize,
    /// Ids of the updates that matched nothing (reported and skipped).
    pub unmatched: Vec<String>,
}

/// Carries the user-editable fields of `old` over to the fresh catalog clone.
fn carry_user_fields(mut fresh: Layer, old: &Layer) -> Layer {
    fresh.visible = old.visible;
    fresh.opacity = old.opacity;
    fresh.custom_attributes.clone_from(&old.custom_attributes);
    if let (Some(time), Some(old_time)) = (fresh.time_config.as_mut(), old.time_config.as_ref()) {
        time.set_current_timestamp(old_time.current_timestamp());
    }
    fresh
}

impl LayerEngine {
    /// Appends a clone of `source` on top of the active list.
    ///
    /// Returns the new layer's index, or `None` (reported) when a catalog id
    /// does not resolve.
    pub fn add<'a>(
        &mut self,
        source: impl Into<LayerSource<'a>>,
        options: AddOptions,
    ) -> Option<usize> {
        let source = source.into();
        let found = match source {
            LayerSource::CatalogId(id) => self.catalog.get(id).cloned(),
            LayerSource::Layer(layer) => Some(layer.clone()),
        };
        let Some(mut layer) = found else {
            if let LayerSource::CatalogId(id) = source {
                self.report("Layer not found in catalog", vec![json!(id)]);
            }
            return None;
        };
        options.initial_values.apply_to(&mut layer);
        self.ports.indexer.index_layer(&layer);
        if options.zoom_to_extent {
            self.fit_to(&layer);
        }
        debug!(id = %layer.id, "layer added");
        self.active.push(layer);
        self.invalidate_selection(InvalidationContext::all());
        Some(self.active.len() - 1)
    }

    fn fit_to(&mut self, layer: &Layer) {
        let Some(extent) = layer.fit_extent() else {
            debug!(id = %layer.id, "no rectangular extent, viewport left alone");
            return;
        };
        let target = self.ports.map.projection();
        let projected = CoordinateSystem::Wgs84.project_extent(target, &extent);
        self.ports.viewport.fit_extent(&projected);
    }

    /// Removes the layer at an index, or every layer matching an id-based reference.
    ///
    /// Returns the number of removed layers.
    pub fn remove<'a>(&mut self, reference: impl Into<LayerRef<'a>>) -> usize {
        let reference = reference.into();
        let Some(hits) = self.resolve_some("Cannot remove layer", &reference) else {
            return 0;
        };
        let mut removed_ids: Vec<String> = Vec::new();
        for &i in hits.iter().rev() {
            let layer = self.active.remove(i);
            if !removed_ids.contains(&layer.id) {
                removed_ids.push(layer.id);
            }
        }
        debug!(count = hits.len(), %reference, "layers removed");
        for id in removed_ids {
            self.invalidate_selection(InvalidationContext::for_layer(id));
        }
        hits.len()
    }

    /// Empties the active list.
    ///
    /// With a pending click the selection is dropped outright, since no layer
    /// is left to identify against.
    pub fn clear_layers(&mut self) {
        self.active.clear();
        self.invalidate_selection(InvalidationContext {
            layer_id: None,
            update_features: Some(true),
        });
    }

    /// Swaps in a new catalog, rebasing active layers onto their fresh entries.
    ///
    /// Active internal layers with a catalog counterpart are re-cloned from it
    /// and keep their visibility, opacity, custom attributes and (by
    /// timestamp) current time entry. Layers without a counterpart, and
    /// external layers, are kept unchanged.
    pub fn set_config(&mut self, layers: Vec<Layer>) {
        let catalog = Catalog::new(layers);
        let previous = std::mem::take(&mut self.active);
        let mut rebased = 0usize;
        self.active = previous
            .into_iter()
            .map(|old| {
                if old.is_external {
                    return old;
                }
                match catalog.get(&old.id) {
                    Some(fresh) => {
                        rebased += 1;
                        carry_user_fields(fresh.clone(), &old)
                    }
                    None => old,
                }
            })
            .collect();
        info!(layers = catalog.len(), rebased, "catalog replaced");
        self.catalog = catalog;
    }

    /// Replaces the active list wholesale.
    ///
    /// Every layer goes through the post-add hook; selection invalidation runs once.
    pub fn set_all(&mut self, layers: Vec<Layer>) {
        for layer in &layers {
            self.ports.indexer.index_layer(layer);
        }
        self.active = layers;
        self.invalidate_selection(InvalidationContext::all());
    }

    /// Overlays `changes` onto the first layer matching `reference`.
    ///
    /// Clone-then-replace, like [`update_many`](Self::update_many). Returns
    /// `false` (reported) when nothing matches.
    pub fn update_one<'a>(
        &mut self,
        reference: impl Into<LayerRef<'a>>,
        changes: &LayerChanges,
    ) -> bool {
        let reference = reference.into();
        let index = match ident::resolve_first(&self.active, &reference) {
            Ok(index) => index,
            Err(err) => {
                self.report(
                    "Cannot update layer",
                    vec![json!(reference.to_string()), json!(err.to_string())],
                );
                return false;
            }
        };
        self.replace_with(index, |layer| changes.apply_to(layer));
        if changes.time.is_some() {
            self.mirror_time_of(index);
        }
        true
    }

    /// Applies each update to every layer it matches.
    ///
    /// Unmatched updates are reported and skipped; the batch never aborts.
    pub fn update_many(&mut self, updates: &[LayerUpdate]) -> UpdateReport {
        let mut report = UpdateReport::default();
        for update in updates {
            let hits = ident::resolve(&self.active, &update.reference())
                .unwrap_or_default();
            if hits.is_empty() {
                self.report(
                    "Layer to update not found",
                    vec![json!(update.id), json!(update.filter)],
                );
                report.unmatched.push(update.id.clone());
                continue;
            }
            for &i in &hits {
                self.replace_with(i, |layer| update.changes.apply_to(layer));
                if update.changes.time.is_some() {
                    self.mirror_time_of(i);
                }
            }
            report.updated += hits.len();
        }
        report
    }

    /// Sets the opacity (clamped) of the layer at `index`.
    pub fn set_opacity(&mut self, index: usize, opacity: f64) -> bool {
        if !self.check_index("Cannot set layer opacity", index) {
            return false;
        }
        self.replace_with(index, |layer| layer.opacity = Opacity::new(opacity));
        true
    }

    /// Shows or hides the layer at `index`.
    pub fn set_visibility(&mut self, index: usize, visible: bool) -> bool {
        if !self.check_index("Cannot set layer visibility", index) {
            return false;
        }
        self.replace_with(index, |layer| layer.visible = visible);
        self.after_visibility_change(index);
        true
    }

    /// Flips the visibility of the layer at `index`.
    pub fn toggle_visibility(&mut self, index: usize) -> bool {
        if !self.check_index("Cannot toggle layer visibility", index) {
            return false;
        }
        self.replace_with(index, |layer| layer.visible = !layer.visible);
        self.after_visibility_change(index);
        true
    }

    fn after_visibility_change(&mut self, index: usize) {
        let ctx = match self.active.get(index) {
            Some(layer) if !layer.visible => InvalidationContext::for_layer(layer.id.clone()),
            _ => InvalidationContext::all(),
        };
        self.invalidate_selection(ctx);
    }

    /// Moves the layer at `from` to position `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if !self.check_index("Cannot move layer", from)
            || !self.check_index("Cannot move layer", to)
        {
            return false;
        }
        let layer = self.active.remove(from);
        self.active.insert(to, layer);
        true
    }

    /// Sets the loading flag of every matching layer.
    pub fn set_loading<'a>(&mut self, reference: impl Into<LayerRef<'a>>, loading: bool) -> usize {
        let title = "Cannot set layer loading state";
        self.patch_matches(title, &reference.into(), |layer| layer.is_loading = loading)
    }

    /// Attaches `error` to every matching layer.
    pub fn add_layer_error<'a>(
        &mut self,
        reference: impl Into<LayerRef<'a>>,
        error: ErrorMessage,
    ) -> usize {
        let title = "Cannot add layer error";
        self.patch_matches(title, &reference.into(), |layer| {
            layer.errors.insert(error.clone());
        })
    }

    /// Detaches `error` from every matching layer.
    pub fn remove_layer_error<'a>(
        &mut self,
        reference: impl Into<LayerRef<'a>>,
        error: &ErrorMessage,
    ) -> usize {
        let title = "Cannot remove layer error";
        self.patch_matches(title, &reference.into(), |layer| {
            layer.errors.remove(error);
        })
    }

    /// Selects the background; `None` is the void background.
    ///
    /// The id must name a background-capable catalog entry.
    pub fn set_background(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if !self.catalog.get(id).is_some_and(|l| l.is_background) {
                self.report("Unknown background layer", vec![json!(id)]);
                return false;
            }
        }
        self.background = id.map(str::to_owned);
        true
    }

    /// Clones the layer at `index`, edits the clone and swaps it in.
    pub(crate) fn replace_with(&mut self, index: usize, edit: impl FnOnce(&mut Layer)) {
        if let Some(slot) = self.active.get_mut(index) {
            let mut next = slot.clone();
            edit(&mut next);
            *slot = next;
        }
    }

    fn patch_matches(
        &mut self,
        title: &str,
        reference: &LayerRef<'_>,
        edit: impl Fn(&mut Layer),
    ) -> usize {
        let Some(hits) = self.resolve_some(title, reference) else {
            return 0;
        };
        for &i in &hits {
            self.replace_with(i, &edit);
        }
        hits.len()
    }
}
