// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller error: the request itself cannot be honoured.
///
/// Regular mutations report these through the [`ErrorSink`](crate::ErrorSink)
/// and no-op; fail-fast operations return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A positional reference points past the end of the active list.
    #[error("layer index {index} out of range (active list holds {len} layers)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the active list at the time of the call.
        len: usize,
    },
    /// No layer matched the reference.
    #[error("no layer matches {reference}")]
    LayerNotFound {
        /// Display form of the unresolved reference.
        reference: String,
    },
    /// A time operation targeted a layer without time configuration.
    #[error("layer {id} has no time configuration")]
    NotTimeEnabled {
        /// Id of the offending layer.
        id: String,
    },
}

/// Failure reported by a fetching collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure (unreachable host, timeout, HTTP status).
    #[error("network error: {0}")]
    Network(String),
    /// The response arrived but could not be understood.
    #[error("invalid response: {0}")]
    Invalid(String),
    /// The fetch was cancelled or superseded before it settled.
    #[error("cancelled")]
    Cancelled,
}

/// Failure of [`load_catalog_and_topics`](crate::LayerEngine::load_catalog_and_topics).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The layer catalog fetch failed.
    #[error("layer catalog load failed: {0}")]
    Catalog(FetchError),
    /// The topic definitions fetch failed.
    #[error("topics load failed: {0}")]
    Topics(FetchError),
}

/// Failure of a feature-identification request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature identification failed: {0}")]
pub struct IdentifyError(pub String);

/// Classification of a data error attached to a layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The file parsed but yielded no geometry.
    FileEmpty,
    /// The file geometry lies entirely outside the working region.
    OutOfBounds,
    /// The file could not be fetched.
    LoadFailed,
    /// The file content is not valid KML/GPX.
    InvalidFile,
    /// The external service did not answer.
    ExternalUnreachable,
    /// The external service answered with unusable capabilities.
    ExternalInvalid,
    /// Application-defined error key.
    Custom(String),
}

impl ErrorKind {
    /// Stable translation key for the UI.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::FileEmpty => "file-empty",
            Self::OutOfBounds => "out-of-bounds",
            Self::LoadFailed => "load-failed",
            Self::InvalidFile => "invalid-file",
            Self::ExternalUnreachable => "external-unreachable",
            Self::ExternalInvalid => "external-invalid",
            Self::Custom(key) => key,
        }
    }

    /// Kinds derived from file content; recomputed on every successful load.
    #[must_use]
    pub fn is_derived_from_file(&self) -> bool {
        matches!(self, Self::FileEmpty | Self::OutOfBounds)
    }
}

/// Structured data error: a kind plus translation arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Arguments interpolated into the translated message.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl ErrorMessage {
    /// Message without arguments.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    /// Adds a translation argument.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl From<ErrorKind> for ErrorMessage {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Structured event for the logging collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Short human-readable title.
    pub title: String,
    /// Context values (references, indices, underlying errors).
    pub messages: Vec<serde_json::Value>,
}

impl ErrorEvent {
    /// Builds an event from a title and its context values.
    pub fn new(title: impl Into<String>, messages: Vec<serde_json::Value>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }
}
