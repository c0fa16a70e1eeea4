// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Catalog read from a local JSON file.

use std::future::Future;
use std::path::PathBuf;

use mapstate_core::{CatalogSource, FetchError, Layer, Topic};
use serde::Deserialize;

/// On-disk catalog: either a bare layer array or `{ "layers": [...], "topics": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogFile {
    /// Layers only.
    Layers(Vec<Layer>),
    /// Layers plus topics.
    Full {
        /// Catalog layers.
        layers: Vec<Layer>,
        /// Topic definitions.
        #[serde(default)]
        topics: Vec<Topic>,
    },
}

impl CatalogFile {
    /// Parses a catalog document.
    pub fn parse(bytes: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(bytes).map_err(|e| FetchError::Invalid(e.to_string()))
    }

    /// Catalog layers.
    pub fn layers(&self) -> &[Layer] {
        match self {
            Self::Layers(layers) | Self::Full { layers, .. } => layers,
        }
    }

    /// Splits into layers and topics.
    pub fn into_parts(self) -> (Vec<Layer>, Vec<Topic>) {
        match self {
            Self::Layers(layers) => (layers, Vec::new()),
            Self::Full { layers, topics } => (layers, topics),
        }
    }
}

/// [`CatalogSource`] reading a [`CatalogFile`] with `tokio::fs`.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    /// Source backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read(path: PathBuf) -> Result<CatalogFile, FetchError> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::Network(format!("{}: {e}", path.display())))?;
        CatalogFile::parse(&bytes)
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch_catalog(
        &self,
        _lang: &str,
    ) -> impl Future<Output = Result<Vec<Layer>, FetchError>> + Send {
        let path = self.path.clone();
        async move { Ok(Self::read(path).await?.into_parts().0) }
    }

    fn fetch_topics(&self) -> impl Future<Output = Result<Vec<Topic>, FetchError>> + Send {
        let path = self.path.clone();
        async move { Ok(Self::read(path).await?.into_parts().1) }
    }
}
