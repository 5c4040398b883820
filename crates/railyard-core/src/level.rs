//! Level descriptors: everything needed to set up a board.
//!
//! Descriptors are plain data. `railyard-data` produces them from level
//! files; tests build them directly.

use crate::entry_point::ScheduledTrain;
use crate::id::{EntryPointId, TrainId};
use crate::scoring::Benchmarks;
use railyard_grid::{GridError, GridModel, GridPosition, Rotation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPointSpec {
    pub id: EntryPointId,
    pub origin: GridPosition,
    /// Direction departing trains travel in.
    pub exit: Rotation,
    #[serde(default)]
    pub schedule: Vec<ScheduledTrain>,
}

impl EntryPointSpec {
    pub fn new(id: u32, origin: GridPosition, exit: Rotation) -> Self {
        Self {
            id: EntryPointId(id),
            origin,
            exit,
            schedule: Vec::new(),
        }
    }

    /// Append a train of `cars` cars bound for entry point `destination`.
    pub fn train(mut self, train: u32, cars: u32, destination: u32) -> Self {
        self.schedule.push(ScheduledTrain {
            train: TrainId(train),
            cars,
            destination: EntryPointId(destination),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    /// Terrain codes, one row per grid row.
    pub terrain: Vec<Vec<u8>>,
    pub entry_points: Vec<EntryPointSpec>,
    #[serde(default)]
    pub benchmarks: Benchmarks,
}

impl LevelDescriptor {
    /// A board of empty land without entry points.
    pub fn open(name: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            name: name.into(),
            terrain: vec![vec![0; columns]; rows],
            entry_points: Vec::new(),
            benchmarks: Benchmarks::default(),
        }
    }

    pub fn with_entry_point(mut self, spec: EntryPointSpec) -> Self {
        self.entry_points.push(spec);
        self
    }

    pub fn with_benchmarks(mut self, benchmarks: Benchmarks) -> Self {
        self.benchmarks = benchmarks;
        self
    }

    pub fn rows(&self) -> usize {
        self.terrain.len()
    }

    pub fn columns(&self) -> usize {
        self.terrain.first().map_or(0, Vec::len)
    }

    /// Trains scheduled across every entry point.
    pub fn total_trains(&self) -> usize {
        self.entry_points.iter().map(|ep| ep.schedule.len()).sum()
    }

    pub fn build_grid(&self) -> Result<GridModel, GridError> {
        GridModel::from_terrain(&self.terrain)
    }
}
