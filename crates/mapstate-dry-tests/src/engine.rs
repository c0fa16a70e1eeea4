// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine builders wired to a [`FakeWorld`].

use mapstate_core::{EngineConfig, Layer, LayerEngine};

use crate::fixtures;
use crate::world::FakeWorld;

/// Engine with the default config and the sample catalog installed.
pub fn build_engine(world: &FakeWorld) -> LayerEngine {
    build_engine_with_catalog(world, fixtures::catalog())
}

/// Engine with the default config and `catalog` installed.
pub fn build_engine_with_catalog(world: &FakeWorld, catalog: Vec<Layer>) -> LayerEngine {
    let mut engine = LayerEngine::new(EngineConfig::default(), world.ports());
    engine.set_config(catalog);
    engine
}
