// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recording fake standing in for every collaborator of the engine.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use mapstate_core::{
    ClickContext, EnginePorts, ErrorEvent, ErrorSink, FeaturePort, FeatureRef, IdentifyError,
    IdentifyRequest, Layer, LayerIndexPort, MapPort, Topic, TopicSink, ViewportPort,
};
use mapstate_geom::{CoordinateSystem, Extent};

/// Map, viewport, feature store, error sink, indexer and topic sink in one.
///
/// Every clone shares the same state. Hand [`FakeWorld::ports`] to the engine
/// and keep a clone to script the click context and inspect the calls.
#[derive(Clone, Default)]
pub struct FakeWorld {
    inner: Arc<Mutex<WorldInner>>,
}

#[derive(Default)]
struct WorldInner {
    click: Option<ClickContext>,
    projection: Option<CoordinateSystem>,
    selected: BTreeSet<String>,
    fail_identify: bool,
    fits: Vec<Extent>,
    identify_requests: Vec<IdentifyRequest>,
    cleared: Vec<String>,
    selection_clears: usize,
    errors: Vec<ErrorEvent>,
    indexed: Vec<String>,
    topics: Option<Vec<Topic>>,
}

impl FakeWorld {
    /// Fresh world: no click, Web Mercator map, empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WorldInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Port bundle backed by this world.
    pub fn ports(&self) -> EnginePorts {
        EnginePorts {
            map: Box::new(self.clone()),
            viewport: Box::new(self.clone()),
            features: Box::new(self.clone()),
            errors: Box::new(self.clone()),
            indexer: Box::new(self.clone()),
        }
    }

    /// Simulates a map click at `coordinate` hitting `hits`.
    pub fn click(&self, coordinate: (f64, f64), hits: Vec<FeatureRef>) {
        self.lock().click = Some(ClickContext {
            coordinate,
            hit_features: hits,
        });
    }

    /// Forgets the pending click.
    pub fn clear_click(&self) {
        self.lock().click = None;
    }

    /// Sets the map projection reported to the engine.
    pub fn set_projection(&self, projection: CoordinateSystem) {
        self.lock().projection = Some(projection);
    }

    /// Marks a feature of `layer_id` as selected.
    pub fn select_feature_of(&self, layer_id: &str) {
        self.lock().selected.insert(layer_id.to_owned());
    }

    /// Makes subsequent identify requests fail.
    pub fn set_fail_identify(&self, fail: bool) {
        self.lock().fail_identify = fail;
    }

    /// Extents passed to `fit_extent`.
    pub fn fits(&self) -> Vec<Extent> {
        self.lock().fits.clone()
    }

    /// Identify requests received, including failed ones.
    pub fn identify_requests(&self) -> Vec<IdentifyRequest> {
        self.lock().identify_requests.clone()
    }

    /// Layers whose selected features were cleared.
    pub fn cleared_layers(&self) -> Vec<String> {
        self.lock().cleared.clone()
    }

    /// Number of whole-selection clears.
    pub fn selection_clears(&self) -> usize {
        self.lock().selection_clears
    }

    /// Layers still holding a selected feature.
    pub fn selected_layers(&self) -> Vec<String> {
        self.lock().selected.iter().cloned().collect()
    }

    /// Error events reported so far.
    pub fn errors(&self) -> Vec<ErrorEvent> {
        self.lock().errors.clone()
    }

    /// Ids passed to the post-add hook, in call order.
    pub fn indexed(&self) -> Vec<String> {
        self.lock().indexed.clone()
    }

    /// Topics last handed over, if any.
    pub fn topics(&self) -> Option<Vec<Topic>> {
        self.lock().topics.clone()
    }
}

impl MapPort for FakeWorld {
    fn click_context(&self) -> Option<ClickContext> {
        self.lock().click.clone()
    }

    fn projection(&self) -> CoordinateSystem {
        self.lock()
            .projection
            .unwrap_or(CoordinateSystem::WebMercator)
    }
}

impl ViewportPort for FakeWorld {
    fn fit_extent(&mut self, extent: &Extent) {
        self.lock().fits.push(*extent);
    }
}

impl FeaturePort for FakeWorld {
    fn has_selected_feature_from(&self, layer_id: &str) -> bool {
        self.lock().selected.contains(layer_id)
    }

    fn clear_features_of_layer(&mut self, layer_id: &str) {
        let mut inner = self.lock();
        inner.selected.remove(layer_id);
        inner.cleared.push(layer_id.to_owned());
    }

    fn clear_selection(&mut self) {
        let mut inner = self.lock();
        inner.selected.clear();
        inner.selection_clears += 1;
    }

    fn identify(&mut self, request: IdentifyRequest) -> Result<(), IdentifyError> {
        let mut inner = self.lock();
        inner.identify_requests.push(request);
        if inner.fail_identify {
            return Err(IdentifyError("simulated identify failure".into()));
        }
        Ok(())
    }
}

impl ErrorSink for FakeWorld {
    fn report(&mut self, event: ErrorEvent) {
        self.lock().errors.push(event);
    }
}

impl LayerIndexPort for FakeWorld {
    fn index_layer(&mut self, layer: &Layer) {
        self.lock().indexed.push(layer.id.clone());
    }
}

impl TopicSink for FakeWorld {
    fn set_topics(&mut self, topics: Vec<Topic>) {
        self.lock().topics = Some(topics);
    }
}
