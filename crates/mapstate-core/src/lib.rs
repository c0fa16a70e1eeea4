// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Layer state engine for map viewers.
//!
//! Owns the authoritative model of what the map currently shows (active
//! layers, their visibility, opacity, time selection and loading/error
//! status) and keeps it consistent with:
//! - a read-only [`Catalog`] of layer templates, replaced wholesale on reload;
//! - asynchronously fetched file and capabilities data (see [`LayerEngine::apply_file_data`]);
//! - the feature selection held by a collaborator, which is invalidated after
//!   every mutation that can change what is visible.
//!
//! # Design Principles
//!
//! - **Values, not references**: every active layer is an independent clone;
//!   mutations build a new value and replace the slot.
//! - **Ports at the seams**: the map, viewport, feature store, error channel
//!   and search index are injected as [`EnginePorts`]; the engine never reaches
//!   into a global.
//! - **Caller errors are reported, not raised**: unresolved references go to
//!   the [`ErrorSink`] and the operation becomes a no-op. Only
//!   [`LayerEngine::set_current_year`] fails fast with an [`EngineError`].

/// Catalog of layer templates and the topic definitions that ship with it.
pub mod catalog;
/// Engine configuration and its storage port.
pub mod config;
/// Engine state, read-only queries and shared helpers.
pub mod engine;
/// Caller, collaborator and data error types.
pub mod error;
/// KML/GPX display name and extent extraction.
pub mod file_parse;
/// Identity matching of layer references against a layer list.
pub mod ident;
/// Application of fetched file and capabilities data.
mod ingest;
/// Layer value model.
pub mod layer;
/// Catalog and topic load sequencing.
mod loader;
/// Active list mutation operations.
mod mutate;
/// Preview slot, system layers and overlay tools.
pub mod overlay;
/// Partial layer updates.
pub mod patch;
/// Collaborator ports.
pub mod ports;
/// Feature selection invalidation protocol.
pub mod selection;
/// Time entries, time configuration and alternate-dimension mirroring.
pub mod time;

pub use catalog::{link_background_pairs, Catalog, Topic};
pub use config::{
    BackgroundLink, ConfigError, ConfigService, ConfigStore, EngineConfig, FileLabels, CONFIG_KEY,
};
pub use engine::LayerEngine;
pub use error::{
    EngineError, ErrorEvent, ErrorKind, ErrorMessage, FetchError, IdentifyError, LoadError,
};
pub use ident::{IdentityFilter, LayerRef};
pub use ingest::ExternalCapabilities;
pub use layer::{
    ExternalPayload, ExternalSubLayer, FileFormat, FileMetadata, FilePayload, GroupPayload, Layer,
    LayerKind, LayerSource, Opacity, RasterProtocol, RasterSource,
};
pub use mutate::{AddOptions, UpdateReport};
pub use overlay::OverlayTools;
pub use patch::{LayerChanges, LayerUpdate, TimeSelection};
pub use ports::{
    CatalogSource, ClickContext, EnginePorts, ErrorSink, FeaturePort, FeatureRef, IdentifyRequest,
    LayerIndexPort, MapPort, TopicSink, ViewportPort,
};
pub use selection::{Invalidation, InvalidationContext};
pub use time::{TimeConfig, TimeEntry};
