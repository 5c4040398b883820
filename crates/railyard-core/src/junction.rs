//! Junctions: the routing state attached to a tile.
//!
//! A junction holds the ordered list of paths registered at its tile, the
//! player-selected active branch (`signal_direction`), and a Go/Stop gate
//! shared by every path in the list. Path records themselves live in the
//! [`crate::network::TrackNetwork`] arena; junctions only hold their keys.

use crate::id::PathId;
use crate::path::{Path, Signal};
use railyard_grid::Rotation;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junction {
    paths: Vec<PathId>,
    signal_direction: usize,
    stop_signal: Signal,
    /// Orientation of the signal arrow, set by the first branch path.
    arrow: Option<Rotation>,
}

impl Junction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[PathId] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn signal_direction(&self) -> usize {
        self.signal_direction
    }

    pub fn stop_signal(&self) -> Signal {
        self.stop_signal
    }

    pub fn arrow(&self) -> Option<Rotation> {
        self.arrow
    }

    /// The path the switch currently points at.
    pub fn active_path(&self) -> Option<PathId> {
        self.paths.get(self.signal_direction).copied()
    }

    /// Append a throughput path.
    pub fn add_path_straight(&mut self, id: PathId) {
        self.paths.push(id);
    }

    /// Append a switchable branch. The first branch fixes the arrow
    /// orientation from its entry direction.
    pub fn add_path(&mut self, id: PathId, entry: Rotation) {
        if self.arrow.is_none() {
            self.arrow = Some(entry.rotate_cw());
        }
        self.paths.push(id);
    }

    /// Pick the path a train facing `rotation` continues on.
    ///
    /// On straight track either end may be entered regardless of the
    /// switch; elsewhere only the active branch is considered and it must
    /// accept the train's heading. `None` means the train derails.
    pub fn resolve_path(
        &mut self,
        arena: &SlotMap<PathId, Path>,
        rotation: Rotation,
        straight: bool,
    ) -> Option<PathId> {
        if self.signal_direction >= self.paths.len() {
            log::debug!(
                "junction has no path at index {} of {}",
                self.signal_direction,
                self.paths.len()
            );
            self.signal_direction = 0;
            return None;
        }

        if straight {
            return self
                .paths
                .iter()
                .take(2)
                .copied()
                .find(|id| arena.get(*id).is_some_and(|p| p.entry == rotation));
        }

        let id = self.paths[self.signal_direction];
        match arena.get(id) {
            Some(path) if path.entry == rotation => Some(id),
            Some(path) => {
                log::debug!(
                    "improper train rotation {rotation:?}, active branch expects {:?}",
                    path.entry
                );
                None
            }
            None => None,
        }
    }

    /// Advance the switch to the next branch. Returns the new index, or
    /// `None` for a junction without paths.
    pub fn toggle_direction(&mut self) -> Option<usize> {
        if self.paths.is_empty() {
            log::error!("toggle_direction on a junction without paths");
            return None;
        }
        self.signal_direction = (self.signal_direction + 1) % self.paths.len();
        Some(self.signal_direction)
    }

    /// Flip the shared gate and write it to every path.
    pub fn toggle_signal(&mut self, arena: &mut SlotMap<PathId, Path>) -> Signal {
        self.stop_signal = self.stop_signal.toggled();
        for id in &self.paths {
            if let Some(path) = arena.get_mut(*id) {
                path.signal = self.stop_signal;
            }
        }
        self.stop_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railyard_grid::GridPosition;

    fn arena_with(entries: &[Rotation]) -> (SlotMap<PathId, Path>, Vec<PathId>) {
        let mut arena = SlotMap::with_key();
        let origin = GridPosition::new(5, 5);
        let ids = entries
            .iter()
            .map(|&e| arena.insert(Path::routed(origin, e, origin.step(e), e)))
            .collect();
        (arena, ids)
    }

    // -----------------------------------------------------------------------
    // Test 1: straight junctions resolve by entry direction only
    // -----------------------------------------------------------------------
    #[test]
    fn straight_resolves_both_ends() {
        let (arena, ids) = arena_with(&[Rotation::Left, Rotation::Right]);
        let mut j = Junction::new();
        for id in &ids {
            j.add_path_straight(*id);
        }
        assert_eq!(j.resolve_path(&arena, Rotation::Left, true), Some(ids[0]));
        assert_eq!(j.resolve_path(&arena, Rotation::Right, true), Some(ids[1]));
        assert_eq!(j.resolve_path(&arena, Rotation::Up, true), None);
        assert_eq!(j.resolve_path(&arena, Rotation::Down, true), None);

        // The switch position does not matter on straight track.
        j.toggle_direction();
        assert_eq!(j.resolve_path(&arena, Rotation::Left, true), Some(ids[0]));
    }

    // -----------------------------------------------------------------------
    // Test 2: branch junctions only offer the active path
    // -----------------------------------------------------------------------
    #[test]
    fn branch_uses_active_path() {
        let (arena, ids) = arena_with(&[Rotation::Left, Rotation::Left, Rotation::Up]);
        let mut j = Junction::new();
        for id in &ids {
            j.add_path(*id, arena[*id].entry);
        }
        assert_eq!(j.arrow(), Some(Rotation::Up));
        assert_eq!(j.resolve_path(&arena, Rotation::Left, false), Some(ids[0]));
        j.toggle_direction();
        assert_eq!(j.resolve_path(&arena, Rotation::Left, false), Some(ids[1]));
        j.toggle_direction();
        // Active branch expects Up; a train facing Left derails.
        assert_eq!(j.resolve_path(&arena, Rotation::Left, false), None);
        assert_eq!(j.resolve_path(&arena, Rotation::Up, false), Some(ids[2]));
    }

    // -----------------------------------------------------------------------
    // Test 3: toggling N times cycles back
    // -----------------------------------------------------------------------
    #[test]
    fn toggle_direction_cycles() {
        let (_arena, ids) = arena_with(&[Rotation::Left, Rotation::Up, Rotation::Down]);
        let mut j = Junction::new();
        for id in &ids {
            j.add_path_straight(*id);
        }
        let start = j.signal_direction();
        for _ in 0..ids.len() {
            j.toggle_direction();
        }
        assert_eq!(j.signal_direction(), start);
    }

    // -----------------------------------------------------------------------
    // Test 4: the gate propagates to every path
    // -----------------------------------------------------------------------
    #[test]
    fn toggle_signal_writes_all_paths() {
        let (mut arena, ids) = arena_with(&[Rotation::Left, Rotation::Right]);
        let mut j = Junction::new();
        for id in &ids {
            j.add_path_straight(*id);
        }
        assert_eq!(j.toggle_signal(&mut arena), Signal::Stop);
        assert!(ids.iter().all(|id| arena[*id].signal == Signal::Stop));
        j.toggle_signal(&mut arena);
        assert!(ids.iter().all(|id| arena[*id].signal == Signal::Go));
    }

    // -----------------------------------------------------------------------
    // Test 5: empty junctions fail safely
    // -----------------------------------------------------------------------
    #[test]
    fn empty_junction_never_resolves() {
        let arena: SlotMap<PathId, Path> = SlotMap::with_key();
        let mut j = Junction::new();
        assert_eq!(j.toggle_direction(), None);
        assert_eq!(j.resolve_path(&arena, Rotation::Up, false), None);
        assert_eq!(j.signal_direction(), 0);
    }
}
