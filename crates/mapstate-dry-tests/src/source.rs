// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Catalog source answering with canned results.

use std::future::{ready, Future};
use std::sync::{Arc, Mutex};

use mapstate_core::{CatalogSource, FetchError, Layer, Topic};

/// [`CatalogSource`] returning fixed results and recording requested languages.
#[derive(Clone)]
pub struct StaticCatalogSource {
    catalog: Result<Vec<Layer>, FetchError>,
    topics: Result<Vec<Topic>, FetchError>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StaticCatalogSource {
    /// Source that succeeds with `catalog` and `topics`.
    pub fn new(catalog: Vec<Layer>, topics: Vec<Topic>) -> Self {
        Self {
            catalog: Ok(catalog),
            topics: Ok(topics),
            requested: Arc::default(),
        }
    }

    /// Replaces the catalog result with `err`.
    #[must_use]
    pub fn failing_catalog(mut self, err: FetchError) -> Self {
        self.catalog = Err(err);
        self
    }

    /// Replaces the topics result with `err`.
    #[must_use]
    pub fn failing_topics(mut self, err: FetchError) -> Self {
        self.topics = Err(err);
        self
    }

    /// Languages the catalog was requested in, in call order.
    pub fn requested_langs(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CatalogSource for StaticCatalogSource {
    fn fetch_catalog(
        &self,
        lang: &str,
    ) -> impl Future<Output = Result<Vec<Layer>, FetchError>> + Send {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(lang.to_owned());
        ready(self.catalog.clone())
    }

    fn fetch_topics(&self) -> impl Future<Output = Result<Vec<Topic>, FetchError>> + Send {
        ready(self.topics.clone())
    }
}
