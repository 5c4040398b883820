use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a path record in the track network.
    pub struct PathId;

    /// Identifies a placed track piece.
    pub struct PieceId;
}

/// Identifies a scheduled train. Assigned by level data, so two trains from
/// different schedules may share an id; runtime bookkeeping uses the
/// spawn-order [`TrainHandle`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrainId(pub u32);

/// Identifies an entry point. Doubles as the destination number printed on
/// trains heading there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryPointId(pub u32);

/// Unique, monotonically increasing handle of a live train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrainHandle(pub u64);

impl fmt::Display for EntryPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
