// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::layer::Layer;

/// Origin half of the composite identity: `(is_external, base_url)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityFilter {
    /// Whether the layer comes from outside the catalog.
    #[serde(default)]
    pub is_external: bool,
    /// Base URL of the serving endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl IdentityFilter {
    /// Filter for an external layer served from `base_url`.
    pub fn external(base_url: impl Into<String>) -> Self {
        Self {
            is_external: true,
            base_url: Some(base_url.into()),
        }
    }

    /// Filter for a catalog (internal) layer.
    #[must_use]
    pub fn internal() -> Self {
        Self::default()
    }

    /// Whether `layer`'s origin fields equal this filter.
    #[must_use]
    pub fn accepts(&self, layer: &Layer) -> bool {
        layer.is_external == self.is_external && layer.base_url == self.base_url
    }
}

/// Reference to one or more layers of a list.
///
/// Resolved once by [`resolve`]; call sites never branch on the reference shape.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    /// Position in the list. Out of range is an error.
    Index(usize),
    /// Every layer with this id, whatever its origin.
    Id(&'a str),
    /// Layers whose id and origin fields all match.
    Filtered {
        /// Catalog id.
        id: &'a str,
        /// Origin fields to match.
        filter: &'a IdentityFilter,
    },
    /// Layers sharing this layer's composite identity (never pointer equality).
    Layer(&'a Layer),
}

impl<'a> LayerRef<'a> {
    /// Id reference, narrowed by `filter` when one is given.
    #[must_use]
    pub fn id(id: &'a str, filter: Option<&'a IdentityFilter>) -> Self {
        match filter {
            Some(filter) => Self::Filtered { id, filter },
            None => Self::Id(id),
        }
    }

    /// Whether `layer` matches this reference. Index references never match here.
    #[must_use]
    pub fn matches(&self, layer: &Layer) -> bool {
        match self {
            Self::Index(_) => false,
            Self::Id(id) => layer.id == *id,
            Self::Filtered { id, filter } => layer.id == *id && filter.accepts(layer),
            Self::Layer(other) => layer.same_identity(other),
        }
    }

    /// Id this reference names, if it names one.
    #[must_use]
    pub fn layer_id(&self) -> Option<&'a str> {
        match *self {
            Self::Index(_) => None,
            Self::Id(id) | Self::Filtered { id, .. } => Some(id),
            Self::Layer(layer) => Some(layer.id.as_str()),
        }
    }
}

impl From<usize> for LayerRef<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a str> for LayerRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a String> for LayerRef<'a> {
    fn from(id: &'a String) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a Layer> for LayerRef<'a> {
    fn from(layer: &'a Layer) -> Self {
        Self::Layer(layer)
    }
}

impl fmt::Display for LayerRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {i}"),
            Self::Id(id) => write!(f, "id {id}"),
            Self::Filtered { id, filter } => write!(
                f,
                "id {id} (external: {}, base url: {})",
                filter.is_external,
                filter.base_url.as_deref().unwrap_or("none")
            ),
            Self::Layer(layer) => write!(
                f,
                "layer {} (external: {}, base url: {})",
                layer.id,
                layer.is_external,
                layer.base_url.as_deref().unwrap_or("none")
            ),
        }
    }
}

/// Positions in `layers` matched by `reference`, in list order.
///
/// An empty result is a valid outcome for id-based references; an index past
/// the end is an [`EngineError::IndexOutOfRange`].
pub fn resolve(layers: &[Layer], reference: &LayerRef<'_>) -> Result<Vec<usize>, EngineError> {
    if let LayerRef::Index(index) = reference {
        return if *index < layers.len() {
            Ok(vec![*index])
        } else {
            Err(EngineError::IndexOutOfRange {
                index: *index,
                len: layers.len(),
            })
        };
    }
    Ok(layers
        .iter()
        .enumerate()
        .filter(|(_, layer)| reference.matches(layer))
        .map(|(i, _)| i)
        .collect())
}

/// First position matched by `reference`.
///
/// Unlike [`resolve`], "no match" is an [`EngineError::LayerNotFound`].
pub fn resolve_first(layers: &[Layer], reference: &LayerRef<'_>) -> Result<usize, EngineError> {
    resolve(layers, reference)?
        .first()
        .copied()
        .ok_or_else(|| EngineError::LayerNotFound {
            reference: reference.to_string(),
        })
}
