// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use mapstate_geom::Extent;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ErrorMessage};
use crate::ident::IdentityFilter;
use crate::time::TimeConfig;

/// Layer opacity, clamped to `[0, 1]` on every construction path.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Opacity(f64);

impl Opacity {
    /// Fully opaque.
    pub const OPAQUE: Self = Self(1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self(0.0);

    /// Clamps `value` into `[0, 1]`; NaN maps to opaque.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::OPAQUE
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The clamped value.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl From<f64> for Opacity {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Opacity> for f64 {
    fn from(o: Opacity) -> Self {
        o.0
    }
}

/// Tiled or single-image raster protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterProtocol {
    /// OGC Web Map Service.
    Wms,
    /// OGC Web Map Tile Service.
    Wmts,
}

/// Raster source description shared by plain and time-enabled layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSource {
    /// Serving protocol.
    pub protocol: RasterProtocol,
    /// Image format (`"png"`, `"jpeg"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RasterSource {
    /// Source with the protocol's default format.
    #[must_use]
    pub fn new(protocol: RasterProtocol) -> Self {
        Self {
            protocol,
            format: None,
        }
    }
}

/// One sub-layer advertised by an external service's capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSubLayer {
    /// Identifier inside the capabilities document.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Payload of a layer coming from an external WMS/WMTS provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPayload {
    /// Serving protocol.
    pub protocol: RasterProtocol,
    /// Sub-layers derived from the capabilities, empty until they load.
    #[serde(default)]
    pub sub_layers: Vec<ExternalSubLayer>,
    /// Extent advertised by the capabilities (WGS84).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities_extent: Option<Extent>,
}

/// File formats the viewer can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Keyhole Markup Language.
    Kml,
    /// GPS Exchange Format.
    Gpx,
}

/// Metadata delivered alongside a file body (e.g. by a drawing service).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Public file identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Administrative (edit) identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Authoring application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Any further fields, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload of a file-based (KML/GPX) layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePayload {
    /// File format.
    pub format: FileFormat,
    /// URL the file is fetched from, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Raw file text, `None` until loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Metadata delivered with the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
    /// Bounding extent of the file geometry (WGS84).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
}

/// Payload of a group layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPayload {
    /// Ids of the catalog layers the group aggregates.
    #[serde(default)]
    pub children: Vec<String>,
}

/// Variant-specific part of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerKind {
    /// WMS/WMTS-like raster.
    Raster(RasterSource),
    /// Raster with a time dimension; the layer carries a [`TimeConfig`].
    TimeEnabled(RasterSource),
    /// Layer from an external provider.
    External(ExternalPayload),
    /// KML/GPX file.
    File(FilePayload),
    /// Aggregate of other layers.
    Group(GroupPayload),
}

/// A single layer instance: catalog template, active entry, or preview.
///
/// Identity is the `(id, is_external, base_url)` triple; ids alone are not
/// unique among active layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Variant tag and payload.
    pub kind: LayerKind,
    /// Whether the layer comes from outside the catalog.
    #[serde(default)]
    pub is_external: bool,
    /// Base URL of the serving endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Whether the layer is drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Drawing opacity.
    #[serde(default)]
    pub opacity: Opacity,
    /// Whether data for the layer is still being fetched.
    #[serde(default)]
    pub is_loading: bool,
    /// Structured data errors, deduplicated.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub errors: BTreeSet<ErrorMessage>,
    /// Time configuration, for time-enabled layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_config: Option<TimeConfig>,
    /// Id of the sibling layer (e.g. a 3D twin) that mirrors this layer's time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_in_alternate_dimension: Option<String>,
    /// Free-form per-instance overrides (e.g. custom WMS parameters).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
    /// Whether clicking the layer can identify features.
    #[serde(default)]
    pub has_tooltip: bool,
    /// Whether the layer can serve as map background.
    #[serde(default)]
    pub is_background: bool,
    /// Declared extent (WGS84), used to fit the viewport on add.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
}

fn default_visible() -> bool {
    true
}

impl Layer {
    /// Bare layer of the given kind; visible, opaque, no time.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            is_external: false,
            base_url: None,
            visible: true,
            opacity: Opacity::OPAQUE,
            is_loading: false,
            errors: BTreeSet::new(),
            time_config: None,
            id_in_alternate_dimension: None,
            custom_attributes: BTreeMap::new(),
            has_tooltip: false,
            is_background: false,
            extent: None,
        }
    }

    /// Catalog raster layer.
    pub fn raster(
        id: impl Into<String>,
        name: impl Into<String>,
        protocol: RasterProtocol,
    ) -> Self {
        Self::new(id, name, LayerKind::Raster(RasterSource::new(protocol)))
    }

    /// Time-enabled raster layer.
    pub fn time_enabled(
        id: impl Into<String>,
        name: impl Into<String>,
        protocol: RasterProtocol,
        time: TimeConfig,
    ) -> Self {
        let kind = LayerKind::TimeEnabled(RasterSource::new(protocol));
        let mut layer = Self::new(id, name, kind);
        layer.time_config = Some(time);
        layer
    }

    /// External layer served from `base_url`. Starts in the loading state.
    pub fn external(
        id: impl Into<String>,
        name: impl Into<String>,
        base_url: impl Into<String>,
        protocol: RasterProtocol,
    ) -> Self {
        let mut layer = Self::new(
            id,
            name,
            LayerKind::External(ExternalPayload {
                protocol,
                sub_layers: Vec::new(),
                capabilities_extent: None,
            }),
        );
        layer.is_external = true;
        layer.base_url = Some(base_url.into());
        layer.is_loading = true;
        layer
    }

    /// File layer without data yet. Starts in the loading state.
    ///
    /// Layers with a `source_url` are external (they live outside the catalog).
    pub fn file(id: impl Into<String>, format: FileFormat, source_url: Option<String>) -> Self {
        let mut layer = Self::new(
            id,
            "",
            LayerKind::File(FilePayload {
                format,
                source_url: source_url.clone(),
                data: None,
                metadata: None,
                extent: None,
            }),
        );
        layer.is_external = source_url.is_some();
        layer.base_url = source_url;
        layer.is_loading = true;
        layer
    }

    /// Group layer aggregating `children`.
    pub fn group(id: impl Into<String>, name: impl Into<String>, children: Vec<String>) -> Self {
        Self::new(id, name, LayerKind::Group(GroupPayload { children }))
    }

    /// Composite-identity filter built from this layer's own origin fields.
    #[must_use]
    pub fn identity_filter(&self) -> IdentityFilter {
        IdentityFilter {
            is_external: self.is_external,
            base_url: self.base_url.clone(),
        }
    }

    /// Returns `true` when `other` has the same composite identity.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
            && self.is_external == other.is_external
            && self.base_url == other.base_url
    }

    /// Whether the layer has a time configuration.
    #[must_use]
    pub fn is_time_enabled(&self) -> bool {
        self.time_config.is_some()
    }

    /// Timestamp of the current time entry, for time-enabled layers.
    #[must_use]
    pub fn current_timestamp(&self) -> Option<&str> {
        self.time_config.as_ref()?.current_timestamp()
    }

    /// File payload, for file-based layers.
    #[must_use]
    pub fn file_payload(&self) -> Option<&FilePayload> {
        match &self.kind {
            LayerKind::File(payload) => Some(payload),
            _ => None,
        }
    }

    /// Mutable file payload, for file-based layers.
    pub fn file_payload_mut(&mut self) -> Option<&mut FilePayload> {
        match &mut self.kind {
            LayerKind::File(payload) => Some(payload),
            _ => None,
        }
    }

    /// External payload, for external provider layers.
    #[must_use]
    pub fn external_payload(&self) -> Option<&ExternalPayload> {
        match &self.kind {
            LayerKind::External(payload) => Some(payload),
            _ => None,
        }
    }

    /// Mutable external payload, for external provider layers.
    pub fn external_payload_mut(&mut self) -> Option<&mut ExternalPayload> {
        match &mut self.kind {
            LayerKind::External(payload) => Some(payload),
            _ => None,
        }
    }

    /// Whether any error of `kind` is attached.
    #[must_use]
    pub fn has_error(&self, kind: &ErrorKind) -> bool {
        self.errors.iter().any(|e| &e.kind == kind)
    }

    /// Rectangular extent suitable for fitting the viewport, in WGS84.
    ///
    /// File layers use the extent computed from their data; others the
    /// declared or capabilities extent.
    #[must_use]
    pub fn fit_extent(&self) -> Option<Extent> {
        let extent = match &self.kind {
            LayerKind::File(payload) => payload.extent,
            LayerKind::External(payload) => self.extent.or(payload.capabilities_extent),
            _ => self.extent,
        }?;
        (!extent.is_degenerate()).then_some(extent)
    }

    /// Sets visibility, returning `self` for builder-style construction.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets opacity (clamped), returning `self`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Opacity::new(opacity);
        self
    }

    /// Sets the declared extent, returning `self`.
    #[must_use]
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Enables feature identification, returning `self`.
    #[must_use]
    pub fn with_tooltip(mut self) -> Self {
        self.has_tooltip = true;
        self
    }

    /// Marks the layer as background-capable, returning `self`.
    #[must_use]
    pub fn with_background(mut self) -> Self {
        self.is_background = true;
        self
    }

    /// Links an alternate-dimension sibling, returning `self`.
    #[must_use]
    pub fn with_alternate(mut self, id: impl Into<String>) -> Self {
        self.id_in_alternate_dimension = Some(id.into());
        self
    }
}

/// Where [`LayerEngine::add`](crate::LayerEngine::add) takes a layer from.
#[derive(Debug, Clone, Copy)]
pub enum LayerSource<'a> {
    /// Clone the catalog entry with this id.
    CatalogId(&'a str),
    /// Clone the given layer (external, file, or a copy of an active layer).
    Layer(&'a Layer),
}

impl<'a> From<&'a str> for LayerSource<'a> {
    fn from(id: &'a str) -> Self {
        Self::CatalogId(id)
    }
}

impl<'a> From<&'a String> for LayerSource<'a> {
    fn from(id: &'a String) -> Self {
        Self::CatalogId(id)
    }
}

impl<'a> From<&'a Layer> for LayerSource<'a> {
    fn from(layer: &'a Layer) -> Self {
        Self::Layer(layer)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn opacity_is_clamped() {
        assert!((Opacity::new(1.7).get() - 1.0).abs() < f64::EPSILON);
        assert!(Opacity::new(-0.2).get().abs() < f64::EPSILON);
        assert!((Opacity::new(f64::NAN).get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn opacity_deserializes_through_clamp() {
        let json = r#"{"id":"a","kind":{"type":"raster","protocol":"wms"},"opacity":3.5}"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.id, "a");
        assert!((layer.opacity.get() - 1.0).abs() < f64::EPSILON);
        assert!(layer.visible);
    }

    #[test]
    fn file_layers_from_url_are_external() {
        let layer = Layer::file("kml-1", FileFormat::Kml, Some("https://x/a.kml".into()));
        assert!(layer.is_external);
        assert!(layer.is_loading);
        assert_eq!(layer.base_url.as_deref(), Some("https://x/a.kml"));
        let local = Layer::file("kml-2", FileFormat::Kml, None);
        assert!(!local.is_external);
    }

    #[test]
    fn degenerate_extent_is_not_fit() {
        let pt = Layer::raster("p", "", RasterProtocol::Wms)
            .with_extent(Extent::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(pt.fit_extent(), None);
    }
}
