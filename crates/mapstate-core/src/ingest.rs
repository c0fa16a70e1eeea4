// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use mapstate_geom::{CoordinateSystem, Extent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::engine::LayerEngine;
use crate::error::{ErrorKind, ErrorMessage};
use crate::file_parse;
use crate::ident::{IdentityFilter, LayerRef};
use crate::layer::{ExternalSubLayer, FileFormat, FileMetadata, Layer};

/// Result of a capabilities fetch for an external layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalCapabilities {
    /// Sub-layers advertised by the provider.
    #[serde(default)]
    pub sub_layers: Vec<ExternalSubLayer>,
    /// Advertised extent (WGS84).
    #[serde(default)]
    pub extent: Option<Extent>,
}

/// Error kinds describing the last file load; replaced on every load.
fn describes_file_load(kind: &ErrorKind) -> bool {
    kind.is_derived_from_file() || matches!(kind, ErrorKind::LoadFailed | ErrorKind::InvalidFile)
}

/// Error kinds describing the last capabilities fetch; replaced on every fetch.
fn describes_external_load(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ExternalInvalid | ErrorKind::ExternalUnreachable
    )
}

/// What a file body says about the layer it is applied to.
struct Derived {
    name: Option<String>,
    extent: Option<Extent>,
    error: Option<ErrorKind>,
}

impl LayerEngine {
    fn file_targets(&mut self, title: &str, layer_id: &str) -> Option<Vec<usize>> {
        let hits: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, l)| l.id == layer_id && l.file_payload().is_some())
            .map(|(i, _)| i)
            .collect();
        if hits.is_empty() {
            self.report(
                title,
                vec![json!(layer_id), json!("no active file layer with this id")],
            );
            return None;
        }
        Some(hits)
    }

    fn derive(&self, format: FileFormat, data: &str) -> Derived {
        let name = file_parse::parse_name(format, data);
        match file_parse::parse_extent(format, data) {
            Ok(None) => Derived {
                name,
                extent: None,
                error: Some(ErrorKind::FileEmpty),
            },
            Ok(Some(extent)) => {
                let target = self.config.working_projection;
                let projected = CoordinateSystem::Wgs84.project_extent(target, &extent);
                let inside = projected.intersects(&self.config.working_region);
                Derived {
                    name,
                    extent: Some(extent),
                    error: (!inside).then_some(ErrorKind::OutOfBounds),
                }
            }
            Err(err) => {
                warn!(%err, "file body is not well-formed");
                Derived {
                    name,
                    extent: None,
                    error: Some(ErrorKind::InvalidFile),
                }
            }
        }
    }

    /// Applies a fetched KML/GPX body to every active file layer with `layer_id`.
    ///
    /// Each matching slot is replaced by a fully derived value: data and
    /// metadata attached, display name resolved, loading cleared and the
    /// file-derived errors recomputed from scratch. With no matching file
    /// layer the call is reported and changes nothing. Returns the number of
    /// updated layers.
    pub fn apply_file_data(
        &mut self,
        layer_id: &str,
        data: String,
        metadata: Option<FileMetadata>,
    ) -> usize {
        let Some(targets) = self.file_targets("File layer not found", layer_id) else {
            return 0;
        };
        for &i in &targets {
            let payload = self.active.get(i).and_then(Layer::file_payload);
            let Some(format) = payload.map(|p| p.format) else {
                continue;
            };
            let derived = self.derive(format, &data);
            let label = match format {
                FileFormat::Kml => self.config.file_labels.kml.clone(),
                FileFormat::Gpx => self.config.file_labels.gpx.clone(),
            };
            self.replace_with(i, |layer| {
                let mut source_url = None;
                if let Some(payload) = layer.file_payload_mut() {
                    payload.data = Some(data.clone());
                    payload.metadata.clone_from(&metadata);
                    payload.extent = derived.extent;
                    source_url.clone_from(&payload.source_url);
                }
                layer.name = derived.name.clone().or(source_url).unwrap_or(label);
                layer.is_loading = false;
                layer.errors.retain(|e| !describes_file_load(&e.kind));
                if let Some(kind) = derived.error.clone() {
                    layer.errors.insert(ErrorMessage::new(kind));
                }
            });
            debug!(%layer_id, index = i, error = ?derived.error, "file data applied");
        }
        targets.len()
    }

    /// Records a failed fetch or parse on every active file layer with `layer_id`.
    ///
    /// All-or-error like [`apply_file_data`](Self::apply_file_data).
    pub fn apply_file_load_error(&mut self, layer_id: &str, kind: ErrorKind) -> usize {
        let Some(targets) = self.file_targets("File layer not found", layer_id) else {
            return 0;
        };
        let message = ErrorMessage::new(kind).with_param("layer", layer_id);
        for &i in &targets {
            self.replace_with(i, |layer| {
                layer.is_loading = false;
                layer.errors.retain(|e| !describes_file_load(&e.kind));
                layer.errors.insert(message.clone());
            });
        }
        targets.len()
    }

    fn external_targets(
        &mut self,
        title: &str,
        id: &str,
        filter: Option<&IdentityFilter>,
    ) -> Option<Vec<usize>> {
        let reference = LayerRef::id(id, filter);
        let hits: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, l)| reference.matches(l) && l.external_payload().is_some())
            .map(|(i, _)| i)
            .collect();
        if hits.is_empty() {
            self.report(title, vec![json!(reference.to_string())]);
            return None;
        }
        Some(hits)
    }

    /// Applies fetched capabilities to the matching external layers.
    ///
    /// An empty sub-layer list marks the layers `external-invalid`.
    pub fn apply_external_capabilities(
        &mut self,
        id: &str,
        filter: Option<&IdentityFilter>,
        capabilities: ExternalCapabilities,
    ) -> usize {
        let Some(targets) = self.external_targets("External layer not found", id, filter) else {
            return 0;
        };
        let invalid = capabilities.sub_layers.is_empty();
        let invalid_message = ErrorMessage::new(ErrorKind::ExternalInvalid);
        for &i in &targets {
            self.replace_with(i, |layer| {
                if let Some(payload) = layer.external_payload_mut() {
                    payload.sub_layers.clone_from(&capabilities.sub_layers);
                    payload.capabilities_extent = capabilities.extent;
                }
                layer.is_loading = false;
                layer.errors.retain(|e| !describes_external_load(&e.kind));
                if invalid {
                    layer.errors.insert(invalid_message.clone());
                }
            });
        }
        debug!(%id, layers = targets.len(), invalid, "capabilities applied");
        targets.len()
    }

    /// Marks the matching external layers `external-unreachable`.
    ///
    /// Replaces whatever the previous capabilities fetch recorded.
    pub fn apply_external_load_error(
        &mut self,
        id: &str,
        filter: Option<&IdentityFilter>,
    ) -> usize {
        let Some(targets) = self.external_targets("External layer not found", id, filter) else {
            return 0;
        };
        let unreachable = ErrorMessage::new(ErrorKind::ExternalUnreachable);
        for &i in &targets {
            self.replace_with(i, |layer| {
                layer.is_loading = false;
                layer.errors.retain(|e| !describes_external_load(&e.kind));
                layer.errors.insert(unreachable.clone());
            });
        }
        targets.len()
    }
}
