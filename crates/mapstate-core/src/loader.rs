// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde_json::json;
use tracing::{info, instrument};

use crate::catalog::link_background_pairs;
use crate::engine::LayerEngine;
use crate::error::LoadError;
use crate::ports::{CatalogSource, TopicSink};

impl LayerEngine {
    /// Fetches the catalog and the topics concurrently, then installs both.
    ///
    /// Nothing changes until both fetches have settled. On failure of either
    /// the error is reported and returned, and the previous catalog and
    /// topics stay in place.
    #[instrument(skip_all, fields(lang = %self.config.lang))]
    pub async fn load_catalog_and_topics<S, T>(
        &mut self,
        source: &S,
        topics: &mut T,
    ) -> Result<(), LoadError>
    where
        S: CatalogSource,
        T: TopicSink,
    {
        let lang = self.config.lang.clone();
        let (layers, fetched_topics) =
            tokio::join!(source.fetch_catalog(&lang), source.fetch_topics());
        let (layers, fetched_topics) = match (layers, fetched_topics) {
            (Ok(layers), Ok(fetched_topics)) => (layers, fetched_topics),
            (Err(err), _) => return Err(self.load_failed(LoadError::Catalog(err))),
            (_, Err(err)) => return Err(self.load_failed(LoadError::Topics(err))),
        };
        info!(
            layers = layers.len(),
            topics = fetched_topics.len(),
            "catalog and topics fetched"
        );
        let fixed = link_background_pairs(layers, &self.config.background_links);
        self.set_config(fixed);
        topics.set_topics(fetched_topics);
        Ok(())
    }

    fn load_failed(&mut self, err: LoadError) -> LoadError {
        self.report("Catalog load failed", vec![json!(err.to_string())]);
        err
    }

    /// Switches the catalog language and reloads.
    pub async fn change_lang<S, T>(
        &mut self,
        lang: &str,
        source: &S,
        topics: &mut T,
    ) -> Result<(), LoadError>
    where
        S: CatalogSource,
        T: TopicSink,
    {
        let previous = std::mem::replace(&mut self.config.lang, lang.to_owned());
        let result = self.load_catalog_and_topics(source, topics).await;
        if result.is_err() {
            self.config.lang = previous;
        }
        result
    }
}
