//! Placement, removal and demolition of track pieces.
//!
//! Placement is all-or-nothing: every claimed cell is checked against the
//! grid before the first write, so a rejected placement leaves the grid and
//! the network untouched. Removal replays the same [`Layout`] in reverse.

use crate::catalog::{Claim, Layout, PieceKind, Registration};
use crate::context::SelectionMode;
use crate::id::{PathId, PieceId};
use crate::network::TrackNetwork;
use crate::path::Path;
use railyard_grid::{GridError, GridModel, GridPosition, Rotation, Terrain};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

/// Cost of clearing a forest or rock tile.
pub const TERRAIN_CLEAR_COST: i64 = 50;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Construction obstructed.")]
    Obstructed(GridPosition),
    #[error("Edge tiles are not interactable")]
    NotInteractable(GridPosition),
    #[error("No interactions with water tiles")]
    Water(GridPosition),
    #[error("nothing to demolish at {0}")]
    NothingToDemolish(GridPosition),
    #[error("construction is not available in {0:?} mode")]
    WrongMode(SelectionMode),
    #[error("no track piece selected")]
    NoPieceSelected,
    #[error(transparent)]
    Grid(#[from] GridError),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A piece on the board, recorded so it can be removed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub anchor: GridPosition,
}

impl PlacedPiece {
    pub fn layout(&self) -> Layout {
        Layout::resolve(self.kind, self.rotation, self.anchor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub piece: PieceId,
    pub cost: i64,
    pub paths: Vec<PathId>,
}

/// Outcome of dragging a run of straight track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StraightRun {
    pub laid: Vec<GridPosition>,
    pub cost: i64,
    /// First filled tile on the run, where laying stopped.
    pub obstructed_at: Option<GridPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demolition {
    Piece(PlacedPiece),
    Terrain { cleared: Terrain, cost: i64 },
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructionValidator {
    pieces: SlotMap<PieceId, PlacedPiece>,
    /// Tiles claimed whole, mapped to the piece that owns them.
    owners: BTreeMap<GridPosition, PieceId>,
}

impl ConstructionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn piece(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.pieces.get(id)
    }

    pub fn piece_at(&self, pos: GridPosition) -> Option<(PieceId, &PlacedPiece)> {
        let id = *self.owners.get(&pos)?;
        self.pieces.get(id).map(|p| (id, p))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &PlacedPiece)> {
        self.pieces.iter()
    }

    /// Validate a placement without touching anything.
    pub fn check(
        &self,
        grid: &GridModel,
        kind: PieceKind,
        rotation: Rotation,
        anchor: GridPosition,
    ) -> Result<Layout, ConstructionError> {
        check_anchor(grid, anchor)?;
        if grid.is_filled(anchor) {
            return Err(ConstructionError::Obstructed(anchor));
        }
        let layout = Layout::resolve(kind, rotation, anchor);
        for (pos, claim) in &layout.cells {
            let blocked = match claim {
                Claim::Full => grid.is_filled(*pos),
                Claim::Corner(corner) => grid.corner_filled(*pos, *corner),
            };
            if blocked {
                log::debug!("{kind:?} at {anchor} facing {rotation:?} blocked at {pos}");
                return Err(ConstructionError::Obstructed(*pos));
            }
        }
        Ok(layout)
    }

    /// Place `kind` at `anchor`. On rejection nothing is written.
    pub fn try_place(
        &mut self,
        grid: &mut GridModel,
        network: &mut TrackNetwork,
        kind: PieceKind,
        rotation: Rotation,
        anchor: GridPosition,
    ) -> Result<Placement, ConstructionError> {
        let layout = self.check(grid, kind, rotation, anchor)?;
        let paths = apply(grid, network, &layout)?;

        let piece = PlacedPiece {
            kind,
            rotation: kind.canonical_rotation(rotation),
            anchor,
        };
        let id = self.pieces.insert(piece);
        for pos in layout.full_tiles() {
            self.owners.insert(pos, id);
        }
        log::debug!("placed {kind:?} at {anchor} facing {:?}", piece.rotation);
        Ok(Placement {
            piece: id,
            cost: kind.cost(),
            paths,
        })
    }

    /// Remove a piece, clearing exactly what its placement wrote.
    pub fn remove(
        &mut self,
        grid: &mut GridModel,
        network: &mut TrackNetwork,
        id: PieceId,
    ) -> Result<Option<PlacedPiece>, ConstructionError> {
        let Some(piece) = self.pieces.remove(id) else {
            return Ok(None);
        };
        let layout = piece.layout();
        for (pos, claim) in &layout.cells {
            match claim {
                Claim::Full => grid.set_empty(*pos)?,
                Claim::Corner(corner) => grid.set_empty_corner(*pos, *corner)?,
            }
        }
        if layout.straight {
            grid.set_straight_track(piece.anchor, false)?;
        }
        let origins: BTreeSet<GridPosition> = layout.paths.iter().map(|p| p.origin).collect();
        for origin in origins {
            network.remove_junction(origin);
        }
        for pos in layout.full_tiles() {
            self.owners.remove(&pos);
        }
        Ok(Some(piece))
    }

    /// Clear whatever occupies `pos`: a piece is removed whole, forest and
    /// rock are cleared for a fee.
    pub fn demolish(
        &mut self,
        grid: &mut GridModel,
        network: &mut TrackNetwork,
        pos: GridPosition,
    ) -> Result<Demolition, ConstructionError> {
        check_anchor(grid, pos)?;
        let owner = self.owners.get(&pos).copied();
        if let Some(id) = owner
            && let Some(piece) = self.remove(grid, network, id)?
        {
            return Ok(Demolition::Piece(piece));
        }
        match grid.terrain(pos) {
            Some(terrain) if terrain.is_clearable() => {
                grid.set_terrain(pos, Terrain::Empty)?;
                Ok(Demolition::Terrain {
                    cleared: terrain,
                    cost: TERRAIN_CLEAR_COST,
                })
            }
            _ => Err(ConstructionError::NothingToDemolish(pos)),
        }
    }

    /// Lay straight track from `from` to `to`: along the row of `to` when
    /// `horizontal`, along its column otherwise. Stops at the first filled
    /// tile.
    pub fn lay_straight(
        &mut self,
        grid: &mut GridModel,
        network: &mut TrackNetwork,
        from: GridPosition,
        to: GridPosition,
        horizontal: bool,
    ) -> Result<StraightRun, ConstructionError> {
        check_anchor(grid, from)?;
        check_anchor(grid, to)?;

        let (kind, tiles): (PieceKind, Vec<GridPosition>) = if horizontal {
            let (lo, hi) = (from.y.min(to.y), from.y.max(to.y));
            (
                PieceKind::StraightHorizontal,
                (lo..=hi).map(|y| GridPosition::new(to.x, y)).collect(),
            )
        } else {
            let (lo, hi) = (from.x.min(to.x), from.x.max(to.x));
            (
                PieceKind::StraightVertical,
                (lo..=hi).map(|x| GridPosition::new(x, to.y)).collect(),
            )
        };

        let mut run = StraightRun::default();
        for pos in tiles {
            if grid.is_filled(pos) {
                run.obstructed_at = Some(pos);
                break;
            }
            let placement = self.try_place(grid, network, kind, Rotation::Up, pos)?;
            run.cost += placement.cost;
            run.laid.push(pos);
        }
        Ok(run)
    }
}

/// Player interaction is refused on edge tiles and water.
fn check_anchor(grid: &GridModel, pos: GridPosition) -> Result<(), ConstructionError> {
    if !grid.is_interactable(pos) {
        return Err(ConstructionError::NotInteractable(pos));
    }
    if grid.terrain(pos) == Some(Terrain::Water) {
        return Err(ConstructionError::Water(pos));
    }
    Ok(())
}

fn apply(
    grid: &mut GridModel,
    network: &mut TrackNetwork,
    layout: &Layout,
) -> Result<Vec<PathId>, ConstructionError> {
    for (pos, claim) in &layout.cells {
        match claim {
            Claim::Full => grid.set_filled(*pos)?,
            Claim::Corner(corner) => grid.set_corner(*pos, *corner)?,
        }
    }
    if let Some((anchor, _)) = layout.cells.first()
        && layout.straight
    {
        grid.set_straight_track(*anchor, true)?;
    }

    let ids = layout
        .paths
        .iter()
        .map(|planned| {
            let path = Path::routed(
                planned.origin,
                planned.entry,
                planned.destination,
                planned.exit,
            );
            match planned.registration {
                Registration::Through => network.add_path_straight(path),
                Registration::Branch => network.add_path(path, grid.terrain(planned.origin)),
            }
        })
        .collect();
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// The piece the player is about to place and its orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionCursor {
    kind: Option<PieceKind>,
    rotation: Rotation,
}

impl ConstructionCursor {
    pub fn kind(&self) -> Option<PieceKind> {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn select(&mut self, kind: PieceKind) {
        self.kind = Some(kind);
        self.rotation = kind.canonical_rotation(Rotation::Up);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Straight pieces flip between horizontal and vertical; the four-way
    /// junction is symmetric and does not turn.
    pub fn rotate(&mut self) {
        match self.kind {
            Some(PieceKind::StraightHorizontal) => self.select(PieceKind::StraightVertical),
            Some(PieceKind::StraightVertical) => self.select(PieceKind::StraightHorizontal),
            Some(PieceKind::FourWay) | None => {}
            Some(_) => self.rotation = self.rotation.rotate_cw(),
        }
    }
}
