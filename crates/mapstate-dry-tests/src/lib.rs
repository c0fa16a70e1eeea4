// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for mapstate crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store that records every access
//! - [`world`] - Recording fake for every engine port, inspectable from tests
//! - [`source`] - Static catalog source with canned results
//! - [`fixtures`] - Sample catalog layers and KML/GPX bodies
//! - [`engine`] - Engine builders wired to a [`FakeWorld`]

pub mod config;
pub mod engine;
pub mod fixtures;
pub mod source;
pub mod world;

pub use config::{RecordingConfigStore, StoreCall, StoreOp};
pub use engine::{build_engine, build_engine_with_catalog};
pub use source::StaticCatalogSource;
pub use world::FakeWorld;
