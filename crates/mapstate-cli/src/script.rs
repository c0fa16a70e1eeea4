// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON mutation scripts replayed against an engine.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mapstate_core::{
    AddOptions, FileMetadata, IdentityFilter, Layer, LayerChanges, LayerEngine, LayerRef,
    LayerUpdate,
};
use serde::Deserialize;
use tracing::debug;

/// One script step, tagged by `op`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Add a catalog layer by `id`, or an inline `layer`.
    Add {
        /// Catalog id.
        #[serde(default)]
        id: Option<String>,
        /// Inline layer (external, file).
        #[serde(default)]
        layer: Option<Layer>,
        /// Fit the viewport to the layer.
        #[serde(default)]
        zoom: bool,
        /// Initial values.
        #[serde(default)]
        values: LayerChanges,
    },
    /// Remove by `index`, or by `id` (+ optional `filter`).
    Remove {
        /// Position in the active list.
        #[serde(default)]
        index: Option<usize>,
        /// Layer id.
        #[serde(default)]
        id: Option<String>,
        /// Origin filter for `id`.
        #[serde(default)]
        filter: Option<IdentityFilter>,
    },
    /// Set opacity at an index.
    SetOpacity {
        /// Position in the active list.
        index: usize,
        /// New opacity, clamped.
        value: f64,
    },
    /// Set visibility at an index.
    SetVisibility {
        /// Position in the active list.
        index: usize,
        /// New visibility.
        visible: bool,
    },
    /// Flip visibility at an index.
    ToggleVisibility {
        /// Position in the active list.
        index: usize,
    },
    /// Reorder the active list.
    Move {
        /// Source position.
        from: usize,
        /// Target position.
        to: usize,
    },
    /// Select a year on a time-enabled layer; misuse aborts the script.
    SetYear {
        /// Position in the active list.
        index: usize,
        /// Year, or `null` to unset.
        year: Option<i32>,
    },
    /// Select a timestamp on a time-enabled layer.
    SetTime {
        /// Position in the active list.
        index: usize,
        /// Timestamp, or `null` to unset.
        timestamp: Option<String>,
    },
    /// Bulk update.
    Update {
        /// Updates to apply.
        updates: Vec<LayerUpdate>,
    },
    /// Feed a KML/GPX body to the file layers with `layer_id`.
    ApplyFile {
        /// Target layer id.
        layer_id: String,
        /// Inline body.
        #[serde(default)]
        data: Option<String>,
        /// Body file, relative to the script.
        #[serde(default)]
        path: Option<PathBuf>,
        /// Metadata delivered with the body.
        #[serde(default)]
        metadata: Option<FileMetadata>,
    },
}

/// Parses a script document (a JSON array of commands).
pub fn parse(bytes: &[u8]) -> Result<Vec<Command>> {
    serde_json::from_slice(bytes).context("invalid script")
}

/// Applies `command`; relative file paths resolve against `base_dir`.
pub fn apply(engine: &mut LayerEngine, command: Command, base_dir: &Path) -> Result<()> {
    debug!(?command, "applying");
    match command {
        Command::Add {
            id,
            layer,
            zoom,
            values,
        } => {
            let mut options = AddOptions::default().with_values(values);
            options.zoom_to_extent = zoom;
            match (id, layer) {
                (Some(id), _) => {
                    engine.add(id.as_str(), options);
                }
                (None, Some(layer)) => {
                    engine.add(&layer, options);
                }
                (None, None) => bail!("add needs `id` or `layer`"),
            }
        }
        Command::Remove { index, id, filter } => match (index, id) {
            (Some(index), _) => {
                engine.remove(LayerRef::Index(index));
            }
            (None, Some(id)) => {
                engine.remove(LayerRef::id(&id, filter.as_ref()));
            }
            (None, None) => bail!("remove needs `index` or `id`"),
        },
        Command::SetOpacity { index, value } => {
            engine.set_opacity(index, value);
        }
        Command::SetVisibility { index, visible } => {
            engine.set_visibility(index, visible);
        }
        Command::ToggleVisibility { index } => {
            engine.toggle_visibility(index);
        }
        Command::Move { from, to } => {
            engine.move_layer(from, to);
        }
        Command::SetYear { index, year } => {
            engine
                .set_current_year(index, year)
                .with_context(|| format!("set_year on layer {index}"))?;
        }
        Command::SetTime { index, timestamp } => {
            engine.set_current_time_entry(index, timestamp.as_deref());
        }
        Command::Update { updates } => {
            engine.update_many(&updates);
        }
        Command::ApplyFile {
            layer_id,
            data,
            path,
            metadata,
        } => {
            let data = match (data, path) {
                (Some(data), _) => data,
                (None, Some(path)) => {
                    let path = base_dir.join(path);
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?
                }
                (None, None) => bail!("apply_file needs `data` or `path`"),
            };
            engine.apply_file_data(&layer_id, data, metadata);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn script_commands_deserialize() {
        let script = br#"[
            {"op": "add", "id": "a", "zoom": true, "values": {"opacity": 0.5}},
            {"op": "remove", "id": "ext", "filter": {"is_external": true, "base_url": "https://x"}},
            {"op": "set_year", "index": 0, "year": null},
            {"op": "update", "updates": [{"id": "a", "visible": false}]}
        ]"#;
        let commands = parse(script).unwrap();
        assert_eq!(commands.len(), 4);
        assert!(matches!(&commands[0], Command::Add { zoom: true, .. }));
        assert!(matches!(&commands[2], Command::SetYear { year: None, .. }));
    }

    #[test]
    fn unknown_op_is_rejected() {
        assert!(parse(br#"[{"op": "explode"}]"#).is_err());
    }
}
