//! The track network: every registered path plus the sparse map of
//! junctions keyed by tile.
//!
//! Junctions are created on the first path registered at a tile and
//! dropped when their tile is cleared. Path records are owned by a slotmap
//! arena so trains can hold a stable [`PathId`] while the player toggles
//! signals.

use crate::id::PathId;
use crate::junction::Junction;
use crate::path::{Path, Signal};
use railyard_grid::{GridModel, GridPosition, Rotation, Terrain};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("no junction at {0}")]
    NoJunction(GridPosition),
    #[error("junction at {0} has no paths")]
    EmptyJunction(GridPosition),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackNetwork {
    paths: SlotMap<PathId, Path>,
    junctions: BTreeMap<GridPosition, Junction>,
}

impl TrackNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id)
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn junction(&self, pos: GridPosition) -> Option<&Junction> {
        self.junctions.get(&pos)
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// Junctions in row-major order.
    pub fn junctions(&self) -> impl Iterator<Item = (GridPosition, &Junction)> {
        self.junctions.iter().map(|(pos, j)| (*pos, j))
    }

    /// Paths registered at `pos`, in registration order.
    pub fn paths_at(&self, pos: GridPosition) -> impl Iterator<Item = (PathId, &Path)> {
        self.junctions
            .get(&pos)
            .into_iter()
            .flat_map(|j| j.paths().iter())
            .filter_map(|id| self.paths.get(*id).map(|p| (*id, p)))
    }

    /// Current gate of a path. Paths that no longer exist read as Go.
    pub fn signal_of(&self, id: PathId) -> Signal {
        self.paths.get(id).map_or(Signal::Go, |p| p.signal)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a throughput path at its origin tile.
    pub fn add_path_straight(&mut self, path: Path) -> PathId {
        let origin = path.origin;
        let junction = self.junctions.entry(origin).or_default();
        let mut path = path;
        path.signal = junction.stop_signal();
        let id = self.paths.insert(path);
        junction.add_path_straight(id);
        id
    }

    /// Register a switchable branch at its origin tile. Branches are only
    /// expected on cleared land; other terrain is logged and tolerated.
    pub fn add_path(&mut self, path: Path, terrain: Option<Terrain>) -> PathId {
        if terrain != Some(Terrain::Empty) {
            log::warn!(
                "branch path registered at {} on {:?} terrain",
                path.origin,
                terrain
            );
        }
        let origin = path.origin;
        let entry = path.entry;
        let junction = self.junctions.entry(origin).or_default();
        let mut path = path;
        path.signal = junction.stop_signal();
        let id = self.paths.insert(path);
        junction.add_path(id, entry);
        id
    }

    /// Drop the junction at `pos` together with all its paths. Returns the
    /// number of paths removed.
    pub fn remove_junction(&mut self, pos: GridPosition) -> usize {
        let Some(junction) = self.junctions.remove(&pos) else {
            return 0;
        };
        for id in junction.paths() {
            self.paths.remove(*id);
        }
        junction.paths().len()
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    /// Ask the junction at `pos` for the path a train facing `rotation`
    /// continues on. A tile without a junction is a dead end.
    pub fn resolve(
        &mut self,
        grid: &GridModel,
        pos: GridPosition,
        rotation: Rotation,
    ) -> Option<PathId> {
        let straight = grid.tile(pos).is_ok_and(|t| t.is_straight_track());
        let Some(junction) = self.junctions.get_mut(&pos) else {
            log::debug!("no junction at {pos}, train facing {rotation:?} derails");
            return None;
        };
        junction.resolve_path(&self.paths, rotation, straight)
    }

    pub fn toggle_signal(&mut self, pos: GridPosition) -> Result<Signal, NetworkError> {
        let junction = self
            .junctions
            .get_mut(&pos)
            .ok_or(NetworkError::NoJunction(pos))?;
        Ok(junction.toggle_signal(&mut self.paths))
    }

    pub fn toggle_direction(&mut self, pos: GridPosition) -> Result<usize, NetworkError> {
        let junction = self
            .junctions
            .get_mut(&pos)
            .ok_or(NetworkError::NoJunction(pos))?;
        junction
            .toggle_direction()
            .ok_or(NetworkError::EmptyJunction(pos))
    }
}
