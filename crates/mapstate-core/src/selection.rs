// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decides, after a layer mutation, whether the feature selection is stale.
//!
//! The protocol only acts when a click context is pending. A mutation can
//! name the layer it concerns; if the selection holds features of that layer
//! and the layer is no longer visible, its features are dropped without a new
//! query. Otherwise the selection is re-identified against every visible,
//! tooltip-enabled layer; with no such layer the selection is dropped
//! without a query. Identification failures are logged and swallowed: the
//! mutation that triggered them has already succeeded.

use tracing::{debug, warn};

use crate::engine::LayerEngine;
use crate::ports::IdentifyRequest;

/// What a mutation tells the invalidation protocol about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationContext {
    /// Layer the mutation concerns, if a single one.
    pub layer_id: Option<String>,
    /// Whether re-identification is relevant; defaults to `true`.
    pub update_features: Option<bool>,
}

impl InvalidationContext {
    /// Context concerning the whole layer set.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Context concerning the layer `id`.
    pub fn for_layer(id: impl Into<String>) -> Self {
        Self {
            layer_id: Some(id.into()),
            update_features: None,
        }
    }
}

/// Outcome of one invalidation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// No pending click; nothing to re-identify against.
    NoClickContext,
    /// The selection is unaffected by the mutation.
    Skipped,
    /// The features of this (now hidden or removed) layer were dropped.
    ClearedLayer(String),
    /// No layer could be identified against; the whole selection was dropped.
    ClearedSelection,
    /// Identification ran against this many candidate layers.
    Reidentified {
        /// Visible, tooltip-enabled layers queried.
        candidates: usize,
    },
    /// Identification was attempted and failed; the failure was logged.
    ReidentifyFailed,
}

impl LayerEngine {
    /// Runs the invalidation protocol for a mutation described by `ctx`.
    ///
    /// Regular mutations call this themselves; it is public for operations
    /// driven from outside the engine (e.g. a feature store reset).
    pub fn invalidate_selection(&mut self, ctx: InvalidationContext) -> Invalidation {
        let Some(click) = self.ports.map.click_context() else {
            debug!("no click context, selection left alone");
            return Invalidation::NoClickContext;
        };
        let mut update = ctx.update_features.unwrap_or(true);
        if let Some(layer_id) = ctx.layer_id {
            update = self.ports.features.has_selected_feature_from(&layer_id);
            if !update {
                return Invalidation::Skipped;
            }
            let still_visible = self.active.iter().any(|l| l.id == layer_id && l.visible);
            if !still_visible {
                debug!(%layer_id, "layer hidden, clearing its selected features");
                self.ports.features.clear_features_of_layer(&layer_id);
                return Invalidation::ClearedLayer(layer_id);
            }
        }
        if !update {
            return Invalidation::Skipped;
        }
        let layers: Vec<_> = self
            .active
            .iter()
            .filter(|l| l.visible && l.has_tooltip)
            .cloned()
            .collect();
        let candidates = layers.len();
        if candidates == 0 {
            debug!("no identifiable layer left, clearing the selection");
            self.ports.features.clear_selection();
            return Invalidation::ClearedSelection;
        }
        let request = IdentifyRequest {
            layers,
            coordinate: click.coordinate,
            hit_features: click.hit_features,
        };
        match self.ports.features.identify(request) {
            Ok(()) => Invalidation::Reidentified { candidates },
            Err(err) => {
                warn!(%err, "feature re-identification failed");
                Invalidation::ReidentifyFailed
            }
        }
    }
}
