// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port traits for the collaborators the engine talks to.
//!
//! The engine never reaches into a global store: everything it needs from the
//! map, the viewport, the feature store, the logging channel and the search
//! index is handed over at construction as an [`EnginePorts`] bundle.

use std::future::Future;

use mapstate_geom::{CoordinateSystem, Extent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Topic;
use crate::error::{ErrorEvent, FetchError, IdentifyError};
use crate::layer::Layer;

/// Reference to a feature hit by a map click.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureRef {
    /// Layer the feature belongs to.
    pub layer_id: String,
    /// Feature identifier within that layer.
    pub feature_id: String,
}

/// Last map click: where it happened and what it hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickContext {
    /// Click coordinate in the map projection.
    pub coordinate: (f64, f64),
    /// Features hit by the click.
    #[serde(default)]
    pub hit_features: Vec<FeatureRef>,
}

/// Feature identification request issued by selection invalidation.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyRequest {
    /// Visible, tooltip-enabled layers to query.
    pub layers: Vec<Layer>,
    /// Coordinate of the pending click.
    pub coordinate: (f64, f64),
    /// Features hit by that click.
    pub hit_features: Vec<FeatureRef>,
}

/// Read access to the map view.
pub trait MapPort {
    /// Pending click context, if the user clicked the map.
    fn click_context(&self) -> Option<ClickContext>;
    /// Projection the map is currently displayed in.
    fn projection(&self) -> CoordinateSystem;
}

/// Viewport control.
pub trait ViewportPort {
    /// Zooms/pans so `extent` (in the map projection) is fully visible.
    fn fit_extent(&mut self, extent: &Extent);
}

/// Feature selection store.
pub trait FeaturePort {
    /// Whether the current selection holds a feature of `layer_id`.
    fn has_selected_feature_from(&self, layer_id: &str) -> bool;
    /// Drops the selected features of `layer_id`.
    fn clear_features_of_layer(&mut self, layer_id: &str);
    /// Drops the whole selection.
    fn clear_selection(&mut self);
    /// Re-runs feature identification; the result replaces the selection.
    fn identify(&mut self, request: IdentifyRequest) -> Result<(), IdentifyError>;
}

/// Structured logging channel for caller errors.
pub trait ErrorSink {
    /// Emits one event.
    fn report(&mut self, event: ErrorEvent);
}

/// Hook run for every layer entering the active list (e.g. search indexing).
pub trait LayerIndexPort {
    /// Indexes `layer`.
    fn index_layer(&mut self, layer: &Layer);
}

/// Receiver of the topic definitions fetched with the catalog.
pub trait TopicSink {
    /// Replaces the known topics.
    fn set_topics(&mut self, topics: Vec<Topic>);
}

/// Backend the catalog and the topics are fetched from.
pub trait CatalogSource {
    /// Fetches the layer catalog in `lang`.
    fn fetch_catalog(
        &self,
        lang: &str,
    ) -> impl Future<Output = Result<Vec<Layer>, FetchError>> + Send;
    /// Fetches the topic definitions.
    fn fetch_topics(&self) -> impl Future<Output = Result<Vec<Topic>, FetchError>> + Send;
}

/// Collaborator handles injected into [`LayerEngine`](crate::LayerEngine).
pub struct EnginePorts {
    /// Map view.
    pub map: Box<dyn MapPort + Send>,
    /// Viewport control.
    pub viewport: Box<dyn ViewportPort + Send>,
    /// Feature selection.
    pub features: Box<dyn FeaturePort + Send>,
    /// Error channel.
    pub errors: Box<dyn ErrorSink + Send>,
    /// Post-add hook.
    pub indexer: Box<dyn LayerIndexPort + Send>,
}

impl EnginePorts {
    /// Ports that do nothing beyond tracing: no click context, no selection.
    ///
    /// Useful for headless tools where only the layer state matters.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            map: Box::new(Detached),
            viewport: Box::new(Detached),
            features: Box::new(Detached),
            errors: Box::new(Detached),
            indexer: Box::new(Detached),
        }
    }
}

impl core::fmt::Debug for EnginePorts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnginePorts").finish_non_exhaustive()
    }
}

struct Detached;

impl MapPort for Detached {
    fn click_context(&self) -> Option<ClickContext> {
        None
    }

    fn projection(&self) -> CoordinateSystem {
        CoordinateSystem::WebMercator
    }
}

impl ViewportPort for Detached {
    fn fit_extent(&mut self, extent: &Extent) {
        debug!(?extent, "viewport fit (detached)");
    }
}

impl FeaturePort for Detached {
    fn has_selected_feature_from(&self, _layer_id: &str) -> bool {
        false
    }

    fn clear_features_of_layer(&mut self, _layer_id: &str) {}

    fn clear_selection(&mut self) {}

    fn identify(&mut self, request: IdentifyRequest) -> Result<(), IdentifyError> {
        debug!(candidates = request.layers.len(), "identify (detached)");
        Ok(())
    }
}

impl ErrorSink for Detached {
    fn report(&mut self, event: ErrorEvent) {
        warn!(title = %event.title, messages = ?event.messages, "engine error");
    }
}

impl LayerIndexPort for Detached {
    fn index_layer(&mut self, _layer: &Layer) {}
}
