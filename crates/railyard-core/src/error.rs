use crate::construction::ConstructionError;
use crate::context::SelectionMode;
use crate::entry_point::SpawnError;
use crate::id::EntryPointId;
use crate::network::NetworkError;
use railyard_grid::GridError;

/// Any failure surfaced by [`crate::context::SimulationContext`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RailError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("entry point {0} is defined twice")]
    DuplicateEntryPoint(EntryPointId),
    #[error("not available in {0:?} mode")]
    WrongMode(SelectionMode),
}
