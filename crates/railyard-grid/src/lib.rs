//! Tile grid for the rail network: positions, rotations, terrain, and
//! per-tile corner occupancy.
//!
//! Every tile carries four corner flags. A tile counts as filled when any
//! corner is set or when its terrain is not [`Terrain::Empty`]. Track pieces
//! claim whole tiles or single corners; the construction validator in
//! `railyard-core` reads and writes these flags through [`GridModel`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Positions and rotations
// ---------------------------------------------------------------------------

/// A tile coordinate. `x` is the row (growing downward), `y` the column
/// (growing rightward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position shifted by a raw `(rows, columns)` offset.
    pub fn translated(self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The adjacent tile one step in `rotation`'s direction.
    pub fn step(self, rotation: Rotation) -> Self {
        self.translated(rotation.offset())
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal orientations. Used both for piece rotation and
/// for travel direction along a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Rotation {
    /// All four rotation values, in clockwise order starting at `Up`.
    pub fn all() -> [Rotation; 4] {
        [Rotation::Up, Rotation::Right, Rotation::Down, Rotation::Left]
    }

    /// Number of clockwise quarter turns from `Up`.
    pub fn index(self) -> usize {
        match self {
            Rotation::Up => 0,
            Rotation::Right => 1,
            Rotation::Down => 2,
            Rotation::Left => 3,
        }
    }

    /// Inverse of [`Rotation::index`], taken modulo four.
    pub fn from_index(index: usize) -> Self {
        Self::all()[index % 4]
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// The opposite direction.
    pub fn reverse(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Compose two rotations: `self` followed by `other` quarter turns.
    pub fn rotated_by(self, other: Rotation) -> Self {
        Self::from_index(self.index() + other.index())
    }

    /// Unit step in grid coordinates.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Rotation::Up => (-1, 0),
            Rotation::Right => (0, 1),
            Rotation::Down => (1, 0),
            Rotation::Left => (0, -1),
        }
    }

    /// Rotate a `(rows, columns)` offset expressed relative to `Up` into
    /// this rotation's frame. One clockwise quarter turn maps `(a, b)` to
    /// `(b, -a)`.
    pub fn rotate_offset(self, (a, b): (i32, i32)) -> (i32, i32) {
        let mut v = (a, b);
        for _ in 0..self.index() {
            v = (v.1, -v.0);
        }
        v
    }
}

/// A quadrant of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    UpRight,
    BottomRight,
    BottomLeft,
    UpLeft,
}

impl Corner {
    pub fn all() -> [Corner; 4] {
        [
            Corner::UpRight,
            Corner::BottomRight,
            Corner::BottomLeft,
            Corner::UpLeft,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            Corner::UpRight => 0,
            Corner::BottomRight => 1,
            Corner::BottomLeft => 2,
            Corner::UpLeft => 3,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::all()[index % 4]
    }

    /// The corner occupying the same quadrant after the tile is turned by
    /// `rotation`.
    pub fn rotated(self, rotation: Rotation) -> Self {
        Self::from_index(self.index() + rotation.index())
    }
}

// ---------------------------------------------------------------------------
// Terrain and tiles
// ---------------------------------------------------------------------------

/// Static ground cover. Anything other than `Empty` blocks construction;
/// forest and rock can be cleared for a fee, water cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Empty,
    Forest,
    Water,
    Rock,
}

impl Terrain {
    /// Decode the integer codes used by level tile maps.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Terrain::Empty),
            1 => Some(Terrain::Forest),
            2 => Some(Terrain::Water),
            3 => Some(Terrain::Rock),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Terrain::Empty => 0,
            Terrain::Forest => 1,
            Terrain::Water => 2,
            Terrain::Rock => 3,
        }
    }

    pub fn is_clearable(self) -> bool {
        matches!(self, Terrain::Forest | Terrain::Rock)
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    terrain: Terrain,
    corners: [bool; 4],
    straight_track: bool,
    interactable: bool,
}

impl Tile {
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    /// Whether `corner` is blocked, either by track or by terrain.
    pub fn corner(&self, corner: Corner) -> bool {
        self.corners[corner.index()] || self.terrain != Terrain::Empty
    }

    /// Whether any part of the tile is blocked.
    pub fn is_filled(&self) -> bool {
        self.corners.iter().any(|&c| c) || self.terrain != Terrain::Empty
    }

    /// True when no corner flag is set, ignoring terrain.
    pub fn has_no_track(&self) -> bool {
        !self.corners.iter().any(|&c| c)
    }

    pub fn set_filled(&mut self) {
        self.corners = [true; 4];
    }

    pub fn set_empty(&mut self) {
        self.corners = [false; 4];
    }

    pub fn set_corner(&mut self, corner: Corner) {
        self.corners[corner.index()] = true;
    }

    pub fn clear_corner(&mut self, corner: Corner) {
        self.corners[corner.index()] = false;
    }

    /// Set when a plain straight piece owns this tile. Straight pieces allow
    /// a junction to resolve by entry direction alone.
    pub fn is_straight_track(&self) -> bool {
        self.straight_track
    }

    pub fn set_straight_track(&mut self, straight: bool) {
        self.straight_track = straight;
    }

    /// Tiles within two of the border reject all player interaction.
    pub fn is_interactable(&self) -> bool {
        self.interactable
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(GridPosition),
    #[error("terrain map row {row} has {found} columns, expected {expected}")]
    RaggedTerrain {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown terrain code {code} at {position}")]
    UnknownTerrain { code: u8, position: GridPosition },
    #[error("grid must be at least 1x1")]
    Empty,
}

// ---------------------------------------------------------------------------
// GridModel
// ---------------------------------------------------------------------------

/// Row-major tile storage with occupancy accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridModel {
    rows: i32,
    columns: i32,
    tiles: Vec<Tile>,
}

/// Width of the non-interactable border band, in tiles.
pub const BORDER: i32 = 2;

impl GridModel {
    /// An all-empty grid.
    pub fn new(rows: i32, columns: i32) -> Result<Self, GridError> {
        if rows <= 0 || columns <= 0 {
            return Err(GridError::Empty);
        }
        let mut tiles = Vec::with_capacity((rows * columns) as usize);
        for x in 0..rows {
            for y in 0..columns {
                tiles.push(Tile {
                    interactable: !(x < BORDER
                        || y < BORDER
                        || x >= rows - BORDER
                        || y >= columns - BORDER),
                    ..Tile::default()
                });
            }
        }
        Ok(Self {
            rows,
            columns,
            tiles,
        })
    }

    /// Build a grid from a rectangular terrain code map (rows of columns).
    pub fn from_terrain(codes: &[Vec<u8>]) -> Result<Self, GridError> {
        let rows = codes.len();
        let columns = codes.first().map_or(0, Vec::len);
        let mut grid = Self::new(rows as i32, columns as i32)?;
        for (x, row) in codes.iter().enumerate() {
            if row.len() != columns {
                return Err(GridError::RaggedTerrain {
                    row: x,
                    expected: columns,
                    found: row.len(),
                });
            }
            for (y, &code) in row.iter().enumerate() {
                let position = GridPosition::new(x as i32, y as i32);
                let terrain =
                    Terrain::from_code(code).ok_or(GridError::UnknownTerrain { code, position })?;
                grid.tile_mut(position)?.set_terrain(terrain);
            }
        }
        Ok(grid)
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.rows && pos.y < self.columns
    }

    fn index(&self, pos: GridPosition) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok((pos.x * self.columns + pos.y) as usize)
        } else {
            Err(GridError::OutOfBounds(pos))
        }
    }

    pub fn tile(&self, pos: GridPosition) -> Result<&Tile, GridError> {
        let i = self.index(pos)?;
        Ok(&self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: GridPosition) -> Result<&mut Tile, GridError> {
        let i = self.index(pos)?;
        Ok(&mut self.tiles[i])
    }

    /// Out-of-bounds positions read as filled so that placement rules near
    /// the edge fail closed.
    pub fn is_filled(&self, pos: GridPosition) -> bool {
        self.tile(pos).map_or(true, Tile::is_filled)
    }

    /// Out-of-bounds corners read as blocked.
    pub fn corner_filled(&self, pos: GridPosition, corner: Corner) -> bool {
        self.tile(pos).map_or(true, |t| t.corner(corner))
    }

    pub fn is_interactable(&self, pos: GridPosition) -> bool {
        self.tile(pos).is_ok_and(Tile::is_interactable)
    }

    pub fn terrain(&self, pos: GridPosition) -> Option<Terrain> {
        self.tile(pos).ok().map(Tile::terrain)
    }

    pub fn set_filled(&mut self, pos: GridPosition) -> Result<(), GridError> {
        self.write(pos, Tile::set_filled)
    }

    pub fn set_empty(&mut self, pos: GridPosition) -> Result<(), GridError> {
        self.write(pos, Tile::set_empty)
    }

    pub fn set_corner(&mut self, pos: GridPosition, corner: Corner) -> Result<(), GridError> {
        self.write(pos, |t| t.set_corner(corner))
    }

    pub fn set_empty_corner(&mut self, pos: GridPosition, corner: Corner) -> Result<(), GridError> {
        self.write(pos, |t| t.clear_corner(corner))
    }

    pub fn set_straight_track(&mut self, pos: GridPosition, straight: bool) -> Result<(), GridError> {
        self.write(pos, |t| t.set_straight_track(straight))
    }

    pub fn set_terrain(&mut self, pos: GridPosition, terrain: Terrain) -> Result<(), GridError> {
        self.write(pos, |t| t.set_terrain(terrain))
    }

    fn write(&mut self, pos: GridPosition, f: impl FnOnce(&mut Tile)) -> Result<(), GridError> {
        match self.tile_mut(pos) {
            Ok(tile) => {
                f(tile);
                Ok(())
            }
            Err(e) => {
                log::error!("grid write rejected: {e}");
                Err(e)
            }
        }
    }

    /// Iterate every tile with its position, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, &Tile)> {
        let columns = self.columns;
        self.tiles.iter().enumerate().map(move |(i, t)| {
            let i = i as i32;
            (GridPosition::new(i / columns, i % columns), t)
        })
    }

    /// Number of tiles with at least one track corner set.
    pub fn track_tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.has_no_track()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // Rotation and corner tests
    // -----------------------------------------------------------------------

    #[test]
    fn rotation_cw_ccw_roundtrip() {
        for r in Rotation::all() {
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
            assert_eq!(r.rotate_cw().rotate_cw(), r.reverse());
        }
    }

    #[test]
    fn rotation_offsets_are_unit_steps() {
        assert_eq!(Rotation::Up.offset(), (-1, 0));
        assert_eq!(Rotation::Right.offset(), (0, 1));
        assert_eq!(Rotation::Down.offset(), (1, 0));
        assert_eq!(Rotation::Left.offset(), (0, -1));
    }

    #[test]
    fn rotate_offset_matches_heading_rotation() {
        // Turning the Up heading by r must give r's own heading.
        for r in Rotation::all() {
            assert_eq!(r.rotate_offset(Rotation::Up.offset()), r.offset());
        }
        assert_eq!(Rotation::Right.rotate_offset((0, -1)), (-1, 0));
    }

    #[test]
    fn corner_rotation_cycles_clockwise() {
        assert_eq!(Corner::UpRight.rotated(Rotation::Right), Corner::BottomRight);
        assert_eq!(Corner::UpLeft.rotated(Rotation::Right), Corner::UpRight);
        assert_eq!(Corner::BottomLeft.rotated(Rotation::Down), Corner::UpRight);
    }

    #[test]
    fn grid_position_step() {
        let p = GridPosition::new(5, 5);
        assert_eq!(p.step(Rotation::Up), GridPosition::new(4, 5));
        assert_eq!(p.step(Rotation::Left), GridPosition::new(5, 4));
    }

    // -----------------------------------------------------------------------
    // Tile tests
    // -----------------------------------------------------------------------

    #[test]
    fn terrain_fills_every_corner() {
        let mut tile = Tile::default();
        assert!(!tile.is_filled());
        tile.set_terrain(Terrain::Forest);
        assert!(tile.is_filled());
        for c in Corner::all() {
            assert!(tile.corner(c));
        }
        assert!(tile.has_no_track());
    }

    #[test]
    fn single_corner_fills_tile() {
        let mut tile = Tile::default();
        tile.set_corner(Corner::BottomLeft);
        assert!(tile.is_filled());
        assert!(tile.corner(Corner::BottomLeft));
        assert!(!tile.corner(Corner::UpRight));
        tile.clear_corner(Corner::BottomLeft);
        assert!(!tile.is_filled());
    }

    #[test]
    fn terrain_codes_roundtrip() {
        for code in 0..4u8 {
            assert_eq!(Terrain::from_code(code).map(Terrain::code), Some(code));
        }
        assert_eq!(Terrain::from_code(4), None);
        assert!(Terrain::Rock.is_clearable());
        assert!(!Terrain::Water.is_clearable());
    }

    // -----------------------------------------------------------------------
    // GridModel tests
    // -----------------------------------------------------------------------

    #[test]
    fn border_band_is_not_interactable() {
        let grid = GridModel::new(19, 19).unwrap();
        assert!(!grid.is_interactable(GridPosition::new(0, 5)));
        assert!(!grid.is_interactable(GridPosition::new(1, 5)));
        assert!(grid.is_interactable(GridPosition::new(2, 2)));
        assert!(grid.is_interactable(GridPosition::new(16, 16)));
        assert!(!grid.is_interactable(GridPosition::new(17, 5)));
        assert!(!grid.is_interactable(GridPosition::new(5, 17)));
        assert!(!grid.is_interactable(GridPosition::new(-1, 5)));
    }

    #[test]
    fn out_of_bounds_reads_filled_and_writes_fail() {
        let mut grid = GridModel::new(5, 5).unwrap();
        let outside = GridPosition::new(5, 0);
        assert!(grid.is_filled(outside));
        assert!(grid.corner_filled(outside, Corner::UpLeft));
        assert_eq!(grid.set_filled(outside), Err(GridError::OutOfBounds(outside)));
    }

    #[test]
    fn from_terrain_reads_codes() {
        let grid = GridModel::from_terrain(&[vec![0, 1, 2], vec![3, 0, 0]]).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.terrain(GridPosition::new(0, 2)), Some(Terrain::Water));
        assert_eq!(grid.terrain(GridPosition::new(1, 0)), Some(Terrain::Rock));
        assert!(!grid.is_filled(GridPosition::new(1, 1)));
    }

    #[test]
    fn from_terrain_rejects_ragged_and_unknown() {
        assert!(matches!(
            GridModel::from_terrain(&[vec![0, 0], vec![0]]),
            Err(GridError::RaggedTerrain { row: 1, .. })
        ));
        assert!(matches!(
            GridModel::from_terrain(&[vec![9]]),
            Err(GridError::UnknownTerrain { code: 9, .. })
        ));
        assert_eq!(GridModel::from_terrain(&[]), Err(GridError::Empty));
    }

    #[test]
    fn iter_yields_row_major_positions() {
        let grid = GridModel::new(2, 3).unwrap();
        let positions: Vec<_> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(positions[0], GridPosition::new(0, 0));
        assert_eq!(positions[4], GridPosition::new(1, 1));
        assert_eq!(positions.len(), 6);
    }

    #[test]
    fn grid_serializes_to_json() {
        let mut grid = GridModel::new(4, 4).unwrap();
        grid.set_corner(GridPosition::new(1, 1), Corner::UpLeft).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: GridModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    // -----------------------------------------------------------------------
    // Property tests
    // -----------------------------------------------------------------------

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn filled_iff_some_corner(flags in proptest::array::uniform4(any::<bool>())) {
            let mut grid = GridModel::new(6, 6).unwrap();
            let pos = GridPosition::new(3, 3);
            for (i, &f) in flags.iter().enumerate() {
                if f {
                    grid.set_corner(pos, Corner::from_index(i)).unwrap();
                }
            }
            prop_assert_eq!(grid.is_filled(pos), flags.iter().any(|&f| f));
            grid.set_empty(pos).unwrap();
            prop_assert!(!grid.is_filled(pos));
        }

        #[test]
        fn rotate_offset_four_times_is_identity(a in -3i32..=3, b in -3i32..=3) {
            let mut v = (a, b);
            for _ in 0..4 {
                v = Rotation::Right.rotate_offset(v);
            }
            prop_assert_eq!(v, (a, b));
        }
    }
}
