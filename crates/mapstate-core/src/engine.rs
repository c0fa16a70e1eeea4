// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::ErrorEvent;
use crate::ident::{self, LayerRef};
use crate::layer::Layer;
use crate::overlay::OverlayTools;
use crate::ports::EnginePorts;

/// Authoritative layer state of one map view.
///
/// Every operation runs to completion before the next one starts; the only
/// suspending operation is
/// [`load_catalog_and_topics`](Self::load_catalog_and_topics), which mutates
/// nothing until both of its fetches settle.
#[derive(Debug)]
pub struct LayerEngine {
    pub(crate) config: EngineConfig,
    pub(crate) catalog: Catalog,
    pub(crate) active: Vec<Layer>,
    pub(crate) preview: Option<Layer>,
    pub(crate) system: Vec<Layer>,
    pub(crate) background: Option<String>,
    pub(crate) preview_year: Option<i32>,
    pub(crate) tools: OverlayTools,
    pub(crate) ports: EnginePorts,
}

impl LayerEngine {
    /// Empty engine: no catalog, no active layer.
    #[must_use]
    pub fn new(config: EngineConfig, ports: EnginePorts) -> Self {
        Self {
            config,
            catalog: Catalog::default(),
            active: Vec::new(),
            preview: None,
            system: Vec::new(),
            background: None,
            preview_year: None,
            tools: OverlayTools::default(),
            ports,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active layers, bottom first (last is drawn on top).
    #[must_use]
    pub fn active_layers(&self) -> &[Layer] {
        &self.active
    }

    /// Current catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Read-only catalog snapshot.
    #[must_use]
    pub fn catalog_snapshot(&self) -> Arc<Vec<Layer>> {
        self.catalog.snapshot()
    }

    /// Visible active layers, bottom first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.active.iter().filter(|l| l.visible)
    }

    /// Top-most visible active layer.
    #[must_use]
    pub fn visible_layer_on_top(&self) -> Option<&Layer> {
        self.active.iter().rev().find(|l| l.visible)
    }

    /// Active layers matched by `reference`. Out-of-range indices yield nothing.
    #[must_use]
    pub fn layers_by_ref(&self, reference: LayerRef<'_>) -> Vec<&Layer> {
        ident::resolve(&self.active, &reference)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|i| self.active.get(i))
            .collect()
    }

    /// Whether any active layer matches `reference`.
    #[must_use]
    pub fn is_active(&self, reference: LayerRef<'_>) -> bool {
        !self.layers_by_ref(reference).is_empty()
    }

    /// Active layers with a time configuration.
    pub fn time_enabled_layers(&self) -> impl Iterator<Item = &Layer> {
        self.active.iter().filter(|l| l.is_time_enabled())
    }

    /// Catalog entries that can serve as background.
    pub fn background_layers(&self) -> impl Iterator<Item = &Layer> {
        self.catalog.background_layers()
    }

    /// Current background layer id; `None` is the void background.
    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Preview slot.
    #[must_use]
    pub fn preview(&self) -> Option<&Layer> {
        self.preview.as_ref()
    }

    /// Application-owned layers drawn above the active list.
    #[must_use]
    pub fn system_layers(&self) -> &[Layer] {
        &self.system
    }

    /// Overlay tool state.
    #[must_use]
    pub fn tools(&self) -> &OverlayTools {
        &self.tools
    }

    /// Year selected in the time slider.
    #[must_use]
    pub fn preview_year(&self) -> Option<i32> {
        self.preview_year
    }

    /// Emits a caller error on the error channel.
    pub(crate) fn report(&mut self, title: &str, messages: Vec<serde_json::Value>) {
        warn!(%title, ?messages, "caller error");
        self.ports.errors.report(ErrorEvent::new(title, messages));
    }

    /// Resolves `reference`, reporting an out-of-range index under `title`.
    pub(crate) fn resolve_or_report(
        &mut self,
        title: &str,
        reference: &LayerRef<'_>,
    ) -> Option<Vec<usize>> {
        match ident::resolve(&self.active, reference) {
            Ok(hits) => Some(hits),
            Err(err) => {
                self.report(
                    title,
                    vec![json!(reference.to_string()), json!(err.to_string())],
                );
                None
            }
        }
    }

    /// Resolves `reference` to at least one layer; nothing found is reported.
    pub(crate) fn resolve_some(
        &mut self,
        title: &str,
        reference: &LayerRef<'_>,
    ) -> Option<Vec<usize>> {
        let hits = self.resolve_or_report(title, reference)?;
        if hits.is_empty() {
            self.report(
                title,
                vec![json!(reference.to_string()), json!("no matching layer")],
            );
            return None;
        }
        Some(hits)
    }

    /// Validates a positional reference, reporting out-of-range indices.
    pub(crate) fn check_index(&mut self, title: &str, index: usize) -> bool {
        self.resolve_or_report(title, &LayerRef::Index(index)).is_some()
    }
}
