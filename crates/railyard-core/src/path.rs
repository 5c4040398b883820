//! Path records: one traversable route through a junction tile.

use crate::geometry::{Waypoint, heading, route_waypoints, tile_center};
use railyard_grid::{GridPosition, Rotation};
use serde::{Deserialize, Serialize};

/// Go/Stop gate shared by every path of a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    #[default]
    Go,
    Stop,
}

impl Signal {
    pub fn toggled(self) -> Self {
        match self {
            Signal::Go => Signal::Stop,
            Signal::Stop => Signal::Go,
        }
    }
}

/// Which arrow icon a junction shows while this path is active. Display
/// only; routing never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowHint {
    Left,
    Straight,
    Right,
}

impl ArrowHint {
    /// Icon index used by renderers: 0 left, 1 straight, 2 right.
    pub fn index(self) -> u8 {
        match self {
            ArrowHint::Left => 0,
            ArrowHint::Straight => 1,
            ArrowHint::Right => 2,
        }
    }

    /// Classify a route by how its exit heading relates to its entry
    /// heading. Parallel routes that shift sideways (S-bends) count as a
    /// turn toward the side they shift to.
    pub fn classify(
        origin: GridPosition,
        entry: Rotation,
        destination: GridPosition,
        exit: Rotation,
    ) -> Self {
        if exit == entry.rotate_cw() {
            ArrowHint::Right
        } else if exit == entry.rotate_ccw() {
            ArrowHint::Left
        } else {
            let side = heading(entry).cross(tile_center(destination) - tile_center(origin));
            if side > 0.0 {
                ArrowHint::Left
            } else if side < 0.0 {
                ArrowHint::Right
            } else {
                ArrowHint::Straight
            }
        }
    }
}

/// A route segment registered at the junction of its `origin` tile.
///
/// A train facing `entry` at the origin tile may take this path; after the
/// last waypoint it faces `exit` and asks the junction at `destination` for
/// the next path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub origin: GridPosition,
    pub destination: GridPosition,
    pub entry: Rotation,
    pub exit: Rotation,
    pub signal: Signal,
    pub arrow: ArrowHint,
    pub waypoints: Vec<Waypoint>,
}

impl Path {
    /// A path with waypoints sampled along the standard tile-edge curve.
    pub fn routed(
        origin: GridPosition,
        entry: Rotation,
        destination: GridPosition,
        exit: Rotation,
    ) -> Self {
        Self {
            origin,
            destination,
            entry,
            exit,
            signal: Signal::Go,
            arrow: ArrowHint::classify(origin, entry, destination, exit),
            waypoints: route_waypoints(origin, entry, destination, exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    #[test]
    fn signal_toggle_twice_is_identity() {
        assert_eq!(Signal::Go.toggled(), Signal::Stop);
        assert_eq!(Signal::Go.toggled().toggled(), Signal::Go);
    }

    #[test]
    fn arrow_for_quarter_turns() {
        // Heading left, turning to heading up, is a right turn.
        assert_eq!(
            ArrowHint::classify(p(5, 5), Rotation::Left, p(3, 4), Rotation::Up),
            ArrowHint::Right
        );
        assert_eq!(
            ArrowHint::classify(p(5, 5), Rotation::Left, p(7, 4), Rotation::Down),
            ArrowHint::Left
        );
    }

    #[test]
    fn arrow_for_parallel_routes() {
        assert_eq!(
            ArrowHint::classify(p(5, 5), Rotation::Right, p(5, 6), Rotation::Right),
            ArrowHint::Straight
        );
        // Heading left while drifting down the screen bends left.
        assert_eq!(
            ArrowHint::classify(p(5, 5), Rotation::Left, p(6, 3), Rotation::Left),
            ArrowHint::Left
        );
        assert_eq!(ArrowHint::Right.index(), 2);
    }

    #[test]
    fn routed_path_defaults_to_go() {
        let path = Path::routed(p(6, 4), Rotation::Right, p(6, 5), Rotation::Right);
        assert_eq!(path.signal, Signal::Go);
        assert_eq!(path.arrow, ArrowHint::Straight);
        assert!(!path.waypoints.is_empty());
    }
}
