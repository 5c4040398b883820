//! World-space geometry: a small 2D vector, tile/world conversion, and the
//! waypoint curves trains follow.
//!
//! World axes follow the grid: `x` grows with the row index, `y` with the
//! column index. Tile `(r, c)` is centred on `(r * TILE_SIZE, c * TILE_SIZE)`.

use railyard_grid::{GridPosition, Rotation};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Width of one tile in world units.
pub const TILE_SIZE: f32 = 5.0;

/// Half a tile: the distance from a tile centre to any of its edges.
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// Maximum spacing between consecutive waypoints of a path.
pub const WAYPOINT_STEP: f32 = 1.25;

/// Bezier handle length as a fraction of the chord. Approximates a circular
/// arc for quarter turns and is invisible on straight runs.
const HANDLE_FRACTION: f32 = 0.39;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A point or displacement in world space.
///
/// Used for bogie positions, headings (kept at unit length) and smoke
/// offsets. Arithmetic is plain `f32`; nothing here feeds scoring, so
/// rounding drift only moves trains by fractions of a world unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Along the row axis: grows downward with the row index.
    pub x: f32,
    /// Along the column axis: grows rightward with the column index.
    pub y: f32,
}

impl Vec2 {
    /// The origin, also the null displacement.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Create a vector from its row and column components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product. For two unit headings this is the cosine of the angle
    /// between them.
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar cross product. Positive when `other` lies to the left of
    /// `self` in grid orientation.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `fallback` for a zero vector.
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            fallback
        }
    }

    /// Linear interpolation: `self` at `t == 0`, `to` at `t == 1`. `t` is
    /// not clamped.
    pub fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        self + (to - self) * t
    }

    /// Normalized linear interpolation between two unit headings. Stands in
    /// for a slerp at the small per-tick angles trains turn through.
    pub fn nlerp(self, to: Vec2, t: f32) -> Vec2 {
        self.lerp(to, t).normalize_or(to)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Tile <-> world
// ---------------------------------------------------------------------------

/// World position of the centre of `pos`.
pub fn tile_center(pos: GridPosition) -> Vec2 {
    Vec2::new(pos.x as f32 * TILE_SIZE, pos.y as f32 * TILE_SIZE)
}

/// The tile whose square contains `p`. Points on a shared edge round away
/// from zero.
pub fn tile_of(p: Vec2) -> GridPosition {
    GridPosition::new(
        (p.x / TILE_SIZE).round() as i32,
        (p.y / TILE_SIZE).round() as i32,
    )
}

/// Closed-square containment test.
pub fn tile_contains(pos: GridPosition, p: Vec2) -> bool {
    let c = tile_center(pos);
    (p.x - c.x).abs() <= HALF_TILE && (p.y - c.y).abs() <= HALF_TILE
}

/// Unit heading of a travel direction.
pub fn heading(rotation: Rotation) -> Vec2 {
    let (dx, dy) = rotation.offset();
    Vec2::new(dx as f32, dy as f32)
}

/// Midpoint of the edge through which a train travelling in `rotation`
/// enters `pos`.
pub fn entry_edge(pos: GridPosition, rotation: Rotation) -> Vec2 {
    tile_center(pos) - heading(rotation) * HALF_TILE
}

// ---------------------------------------------------------------------------
// Waypoints
// ---------------------------------------------------------------------------

/// A point on a path plus the heading a bogie should face on reaching it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec2,
    pub heading: Vec2,
}

/// Sample the curve a train follows from the entry edge of `origin`
/// (travelling `entry`) to the entry edge of `destination` (travelling
/// `exit`). The start point itself is not included; the last sample sits
/// exactly on the destination edge.
pub fn route_waypoints(
    origin: GridPosition,
    entry: Rotation,
    destination: GridPosition,
    exit: Rotation,
) -> Vec<Waypoint> {
    let h_in = heading(entry);
    let h_out = heading(exit);
    let p0 = entry_edge(origin, entry);
    let p3 = entry_edge(destination, exit);
    let chord = p0.distance(p3);
    let handle = chord * HANDLE_FRACTION;
    let p1 = p0 + h_in * handle;
    let p2 = p3 - h_out * handle;

    let n = ((chord / WAYPOINT_STEP).ceil() as usize).max(2);
    (1..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let u = 1.0 - t;
            let position = p0 * (u * u * u)
                + p1 * (3.0 * u * u * t)
                + p2 * (3.0 * u * t * t)
                + p3 * (t * t * t);
            let derivative =
                (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t);
            Waypoint {
                position: if i == n { p3 } else { position },
                heading: derivative.normalize_or(h_out),
            }
        })
        .collect()
}
