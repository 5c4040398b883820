//! Serde data file structs for level definitions.
//!
//! These structs define the on-disk format for levels. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into
//! core level descriptors by the loader.

use railyard_grid::Rotation;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Levels
// ===========================================================================

/// A level definition in a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    #[serde(default = "default_size")]
    pub rows: usize,
    #[serde(default = "default_size")]
    pub columns: usize,
    /// Terrain codes row by row: 0 empty, 1 forest, 2 water, 3 rock.
    pub terrain: Vec<Vec<u8>>,
    pub entry_points: Vec<EntryPointData>,
    #[serde(default)]
    pub benchmarks: BenchmarkData,
}

fn default_size() -> usize {
    19
}

// ===========================================================================
// Entry points and schedules
// ===========================================================================

/// An entry point and the trains it sends, in spawn order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPointData {
    pub id: u32,
    pub row: i32,
    pub column: i32,
    /// Direction departing trains travel in.
    pub exit: Rotation,
    #[serde(default)]
    pub trains: Vec<TrainData>,
}

/// A scheduled train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainData {
    pub id: u32,
    pub cars: u32,
    /// Entry point id the train should arrive at.
    pub destination: u32,
}

// ===========================================================================
// Benchmarks
// ===========================================================================

/// Scoring targets. Penalties and the requirement are written as decimals
/// and converted to fixed point on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkData {
    /// Expected construction spend, in dollars.
    pub construction: i64,
    /// Expected simulation time, in seconds.
    pub time: u32,
    pub derail_penalty: f64,
    pub misdirect_penalty: f64,
    /// Star rating needed to pass (0 to 3).
    pub score_requirement: f64,
}

impl Default for BenchmarkData {
    fn default() -> Self {
        Self {
            construction: 2500,
            time: 40,
            derail_penalty: 0.4,
            misdirect_penalty: 0.25,
            score_requirement: 1.0,
        }
    }
}
