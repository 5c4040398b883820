//! Resolution pipeline: reads level files, validates them, builds level
//! descriptors.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by the level loading entry points.

use crate::schema::LevelData;
use railyard_core::entry_point::ScheduledTrain;
use railyard_core::fixed::f64_to_fixed64;
use railyard_core::id::{EntryPointId, TrainId};
use railyard_core::level::{EntryPointSpec, LevelDescriptor};
use railyard_core::scoring::Benchmarks;
use railyard_grid::{GridModel, GridPosition};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during level loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file parsed but does not describe a playable level.
    #[error("invalid level '{level}': {detail}")]
    InvalidLevel { level: String, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn invalid(level: &LevelData, detail: impl Into<String>) -> DataLoadError {
    DataLoadError::InvalidLevel {
        level: level.name.clone(),
        detail: detail.into(),
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in `format`. `origin` names the source in errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Validate level data and turn it into a core descriptor.
pub fn resolve_level(data: LevelData) -> Result<LevelDescriptor, DataLoadError> {
    if data.terrain.len() != data.rows {
        return Err(invalid(
            &data,
            format!("expected {} terrain rows, found {}", data.rows, data.terrain.len()),
        ));
    }
    if let Some((x, row)) = data
        .terrain
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != data.columns)
    {
        return Err(invalid(
            &data,
            format!("row {x} has {} columns, expected {}", row.len(), data.columns),
        ));
    }
    // Catches unknown terrain codes and empty boards.
    let grid = GridModel::from_terrain(&data.terrain).map_err(|e| invalid(&data, e.to_string()))?;

    let mut ids = BTreeSet::new();
    for ep in &data.entry_points {
        if !ids.insert(ep.id) {
            return Err(invalid(&data, format!("entry point {} is defined twice", ep.id)));
        }
        let origin = GridPosition::new(ep.row, ep.column);
        let depot = origin.step(ep.exit.reverse());
        if !grid.contains(origin) || !grid.contains(depot) {
            return Err(invalid(
                &data,
                format!("entry point {} at {origin} does not fit on the board", ep.id),
            ));
        }
    }
    let mut train_ids = BTreeSet::new();
    for ep in &data.entry_points {
        for train in &ep.trains {
            if !ids.contains(&train.destination) {
                return Err(invalid(
                    &data,
                    format!(
                        "train {} is bound for unknown entry point {}",
                        train.id, train.destination
                    ),
                ));
            }
            if train.cars == 0 {
                return Err(invalid(&data, format!("train {} has no cars", train.id)));
            }
            if !train_ids.insert(train.id) {
                log::warn!("level '{}' reuses train id {}", data.name, train.id);
            }
        }
    }

    let bench = &data.benchmarks;
    let benchmarks = Benchmarks {
        construction: bench.construction,
        time_seconds: bench.time,
        derail_penalty: f64_to_fixed64(bench.derail_penalty),
        misdirect_penalty: f64_to_fixed64(bench.misdirect_penalty),
        score_requirement: f64_to_fixed64(bench.score_requirement),
    };

    let entry_points = data
        .entry_points
        .iter()
        .map(|ep| EntryPointSpec {
            id: EntryPointId(ep.id),
            origin: GridPosition::new(ep.row, ep.column),
            exit: ep.exit,
            schedule: ep
                .trains
                .iter()
                .map(|t| ScheduledTrain {
                    train: TrainId(t.id),
                    cars: t.cars,
                    destination: EntryPointId(t.destination),
                })
                .collect(),
        })
        .collect();

    log::debug!(
        "resolved level '{}' ({}x{}, {} entry points)",
        data.name,
        data.rows,
        data.columns,
        data.entry_points.len()
    );
    Ok(LevelDescriptor {
        name: data.name,
        terrain: data.terrain,
        entry_points,
        benchmarks,
    })
}

/// Load and resolve a single level file.
pub fn load_level(path: &Path) -> Result<LevelDescriptor, DataLoadError> {
    let data: LevelData = deserialize_file(path)?;
    resolve_level(data)
}

/// Load every `level_<n>` file in `dir`, ordered by `n`.
pub fn load_level_dir(dir: &Path) -> Result<Vec<LevelDescriptor>, DataLoadError> {
    let mut numbered = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(n) = stem
            .strip_prefix("level_")
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        if detect_format(&path).is_err() {
            continue;
        }
        numbered.push((n, stem.to_string()));
    }
    numbered.sort();
    numbered.dedup();

    let mut levels = Vec::with_capacity(numbered.len());
    for (_, stem) in numbered {
        if let Some(path) = find_data_file(dir, &stem)? {
            levels.push(load_level(&path)?);
        }
    }
    Ok(levels)
}

// ===========================================================================
// Tests
// ===========================================================================
