// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! mapstate developer CLI.
//!
//! `mapstate run` loads a catalog, replays a JSON script of layer mutations
//! and prints the resulting active list plus every reported caller error.
//! `mapstate check-catalog` validates a catalog file.

mod script;
mod source;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mapstate_config_fs::FsConfigStore;
use mapstate_core::{
    Catalog, ConfigService, EngineConfig, EnginePorts, ErrorEvent, ErrorSink, LayerEngine, Topic,
    TopicSink,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::source::{CatalogFile, FileCatalogSource};

#[derive(Parser, Debug)]
#[command(name = "mapstate", version, about = "Replay layer scripts against a catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a catalog, apply a script and print the resulting state as JSON
    Run {
        /// Catalog JSON (layer array or `{layers, topics}` document)
        #[arg(long)]
        catalog: PathBuf,
        /// Script JSON (array of commands)
        #[arg(long)]
        script: PathBuf,
        /// Engine config JSON; defaults to the user config directory
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a catalog file and print layer counts
    CheckCatalog {
        /// Catalog JSON
        #[arg(long)]
        catalog: PathBuf,
    },
}

/// Error sink collecting events for the final report.
#[derive(Clone, Default)]
struct CollectedErrors(Arc<Mutex<Vec<ErrorEvent>>>);

impl CollectedErrors {
    fn take(&self) -> Vec<ErrorEvent> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ErrorSink for CollectedErrors {
    fn report(&mut self, event: ErrorEvent) {
        warn!(title = %event.title, "caller error");
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

struct LoggedTopics;

impl TopicSink for LoggedTopics {
    fn set_topics(&mut self, topics: Vec<Topic>) {
        info!(count = topics.len(), "topics loaded");
    }
}

#[derive(Serialize)]
struct Report<'a> {
    active: &'a [mapstate_core::Layer],
    errors: Vec<ErrorEvent>,
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let (store, key) = match path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("config path has no file name")?;
            (FsConfigStore::at(dir)?, key.to_owned())
        }
        None => (FsConfigStore::new()?, mapstate_core::CONFIG_KEY.to_owned()),
    };
    let service = ConfigService::new(store);
    Ok(service.load(&key)?.unwrap_or_default())
}

async fn run(catalog: PathBuf, script_path: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config).context("loading engine config")?;
    let bytes = std::fs::read(script_path)
        .with_context(|| format!("reading {}", script_path.display()))?;
    let commands = script::parse(&bytes)?;

    let errors = CollectedErrors::default();
    let ports = EnginePorts {
        errors: Box::new(errors.clone()),
        ..EnginePorts::detached()
    };
    let mut engine = LayerEngine::new(config, ports);
    engine
        .load_catalog_and_topics(&FileCatalogSource::new(catalog), &mut LoggedTopics)
        .await?;

    let base_dir = script_path.parent().unwrap_or_else(|| Path::new("."));
    for command in commands {
        script::apply(&mut engine, command, base_dir)?;
    }

    let report = Report {
        active: engine.active_layers(),
        errors: errors.take(),
    };
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn check_catalog(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file = CatalogFile::parse(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    let layers = file.layers().to_vec();
    let time_enabled = layers.iter().filter(|l| l.is_time_enabled()).count();
    let catalog = Catalog::new(layers);
    let mut out = std::io::stdout().lock();
    writeln!(out, "layers: {}", catalog.len())?;
    writeln!(out, "time-enabled: {time_enabled}")?;
    writeln!(out, "background: {}", catalog.background_layers().count())?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            catalog,
            script,
            config,
        } => run(catalog, &script, config.as_deref()).await,
        Commands::CheckCatalog { catalog } => check_catalog(&catalog),
    }
}
