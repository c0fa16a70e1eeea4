// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ErrorMessage;
use crate::ident::{IdentityFilter, LayerRef};
use crate::layer::{Layer, Opacity};

/// Time selection carried by a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSelection {
    /// Select the entry with this timestamp (unknown timestamps unset).
    Timestamp(String),
    /// Select the first entry of this year (no match unsets).
    Year(i32),
    /// Clear the current entry.
    Unset,
}

/// Shallow overlay of user-editable layer fields; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerChanges {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New opacity, clamped on deserialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Opacity>,
    /// New loading flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    /// Replacement custom attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<BTreeMap<String, serde_json::Value>>,
    /// New time selection; ignored on layers without time configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSelection>,
    /// Replacement error set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeSet<ErrorMessage>>,
    /// New alternate-dimension link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_in_alternate_dimension: Option<String>,
    /// New tooltip flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_tooltip: Option<bool>,
}

impl LayerChanges {
    /// Sets `visible`.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Sets `opacity` (clamped).
    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(Opacity::new(opacity));
        self
    }

    /// Sets `name`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the time selection.
    #[must_use]
    pub fn time(mut self, time: TimeSelection) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets one custom attribute, keeping the others from the patch.
    #[must_use]
    pub fn custom_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom_attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays the set fields onto `layer`.
    pub fn apply_to(&self, layer: &mut Layer) {
        if let Some(name) = &self.name {
            layer.name.clone_from(name);
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity;
        }
        if let Some(is_loading) = self.is_loading {
            layer.is_loading = is_loading;
        }
        if let Some(attrs) = &self.custom_attributes {
            layer.custom_attributes.clone_from(attrs);
        }
        if let Some(errors) = &self.errors {
            layer.errors.clone_from(errors);
        }
        if let Some(alt) = &self.id_in_alternate_dimension {
            layer.id_in_alternate_dimension = Some(alt.clone());
        }
        if let Some(has_tooltip) = self.has_tooltip {
            layer.has_tooltip = has_tooltip;
        }
        if let Some(selection) = &self.time {
            match layer.time_config.as_mut() {
                Some(time) => {
                    match selection {
                        TimeSelection::Timestamp(ts) => time.set_current_timestamp(Some(ts)),
                        TimeSelection::Year(year) => time.set_current_year(Some(*year)),
                        TimeSelection::Unset => time.set_current_timestamp(None),
                    };
                }
                None => debug!(id = %layer.id, "time selection ignored on layer without time"),
            }
        }
    }
}

/// One entry of a bulk update: which layers, and what to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerUpdate {
    /// Catalog id of the target layers.
    pub id: String,
    /// Origin filter; without one, every layer with `id` matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<IdentityFilter>,
    /// Fields to overlay.
    #[serde(flatten)]
    pub changes: LayerChanges,
}

impl LayerUpdate {
    /// Update for every layer with `id`.
    pub fn new(id: impl Into<String>, changes: LayerChanges) -> Self {
        Self {
            id: id.into(),
            filter: None,
            changes,
        }
    }

    /// Narrows the update to layers of the given origin.
    #[must_use]
    pub fn with_filter(mut self, filter: IdentityFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Reference resolving the targets of this update.
    #[must_use]
    pub fn reference(&self) -> LayerRef<'_> {
        LayerRef::id(&self.id, self.filter.as_ref())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::layer::RasterProtocol;
    use crate::time::{TimeConfig, TimeEntry};

    #[test]
    fn unset_fields_leave_layer_alone() {
        let mut layer = Layer::raster("a", "Alpha", RasterProtocol::Wms).with_opacity(0.3);
        LayerChanges::default().visible(false).apply_to(&mut layer);
        assert!(!layer.visible);
        assert_eq!(layer.name, "Alpha");
        assert!((layer.opacity.get() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn time_selection_by_year() {
        let mut layer = Layer::time_enabled(
            "t",
            "",
            RasterProtocol::Wmts,
            TimeConfig::latest(vec![TimeEntry::new("20200101"), TimeEntry::new("20100101")]),
        );
        LayerChanges::default()
            .time(TimeSelection::Year(2010))
            .apply_to(&mut layer);
        assert_eq!(layer.current_timestamp(), Some("20100101"));
    }

    #[test]
    fn update_deserializes_flattened_changes() {
        let json = r#"{
            "id": "a",
            "filter": {"is_external": true, "base_url": "https://x"},
            "opacity": 3.0,
            "visible": false
        }"#;
        let update: LayerUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.id, "a");
        assert_eq!(update.filter, Some(IdentityFilter::external("https://x")));
        assert_eq!(update.changes.opacity, Some(Opacity::OPAQUE));
        assert_eq!(update.changes.visible, Some(false));
    }
}
