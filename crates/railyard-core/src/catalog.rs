//! Track piece catalog.
//!
//! Every piece kind is described once, at rotation `Up`, by a template:
//! the neighbouring cells it claims (whole tiles or single corners) and the
//! paths it registers. The other three rotations are derived by turning
//! every offset, corner, and travel direction by the placed rotation, so
//! the four orientations cannot drift apart.
//!
//! The anchor tile is always claimed whole and is not listed in templates.

use railyard_grid::{Corner, GridPosition, Rotation};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Piece kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    StraightHorizontal,
    StraightVertical,
    DoubleStraight,
    Curve,
    SBendLeft,
    SBendRight,
    SBendLeftJunction,
    SBendRightJunction,
    ThreeWay,
    FourWay,
}

impl PieceKind {
    pub fn all() -> [PieceKind; 10] {
        [
            PieceKind::StraightHorizontal,
            PieceKind::StraightVertical,
            PieceKind::DoubleStraight,
            PieceKind::Curve,
            PieceKind::SBendLeft,
            PieceKind::SBendRight,
            PieceKind::SBendLeftJunction,
            PieceKind::SBendRightJunction,
            PieceKind::ThreeWay,
            PieceKind::FourWay,
        ]
    }

    /// Construction cost charged on placement.
    pub fn cost(self) -> i64 {
        match self {
            PieceKind::StraightHorizontal | PieceKind::StraightVertical => 100,
            PieceKind::Curve => 200,
            PieceKind::SBendLeft | PieceKind::SBendRight | PieceKind::DoubleStraight => 250,
            PieceKind::SBendLeftJunction | PieceKind::SBendRightJunction => 350,
            PieceKind::ThreeWay => 450,
            PieceKind::FourWay => 600,
        }
    }

    pub fn is_straight(self) -> bool {
        matches!(
            self,
            PieceKind::StraightHorizontal | PieceKind::StraightVertical
        )
    }

    /// Straight pieces carry their orientation in the kind itself: a
    /// horizontal straight always sits at `Up`, a vertical one at `Right`.
    pub fn canonical_rotation(self, rotation: Rotation) -> Rotation {
        match self {
            PieceKind::StraightHorizontal => Rotation::Up,
            PieceKind::StraightVertical => Rotation::Right,
            _ => rotation,
        }
    }

    pub fn template(self) -> &'static PieceTemplate {
        match self {
            PieceKind::StraightHorizontal | PieceKind::StraightVertical => &STRAIGHT,
            PieceKind::DoubleStraight => &DOUBLE_STRAIGHT,
            PieceKind::Curve => &CURVE,
            PieceKind::SBendLeft => &S_BEND_LEFT,
            PieceKind::SBendRight => &S_BEND_RIGHT,
            PieceKind::SBendLeftJunction => &S_BEND_LEFT_JUNCTION,
            PieceKind::SBendRightJunction => &S_BEND_RIGHT_JUNCTION,
            PieceKind::ThreeWay => &THREE_WAY,
            PieceKind::FourWay => &FOUR_WAY,
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// How much of a tile a piece claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Claim {
    Full,
    Corner(Corner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRule {
    pub offset: (i32, i32),
    pub claim: Claim,
}

/// How a path joins its junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Registration {
    /// Throughput route; no signal arrow.
    Through,
    /// A switchable branch; the first one creates the junction's arrow.
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTemplate {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub entry: Rotation,
    pub exit: Rotation,
    pub registration: Registration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTemplate {
    pub cells: &'static [CellRule],
    pub paths: &'static [PathTemplate],
    /// Marks the anchor tile as straight track (bidirectional resolution).
    pub straight: bool,
}

const fn full(x: i32, y: i32) -> CellRule {
    CellRule {
        offset: (x, y),
        claim: Claim::Full,
    }
}

const fn corner(x: i32, y: i32, c: Corner) -> CellRule {
    CellRule {
        offset: (x, y),
        claim: Claim::Corner(c),
    }
}

const fn through(from: (i32, i32), to: (i32, i32), entry: Rotation, exit: Rotation) -> PathTemplate {
    PathTemplate {
        from,
        to,
        entry,
        exit,
        registration: Registration::Through,
    }
}

const fn branch(from: (i32, i32), to: (i32, i32), entry: Rotation, exit: Rotation) -> PathTemplate {
    PathTemplate {
        from,
        to,
        entry,
        exit,
        registration: Registration::Branch,
    }
}

use Corner::{BottomLeft, BottomRight, UpLeft, UpRight};
use Rotation::{Down, Left, Right, Up};

static STRAIGHT: PieceTemplate = PieceTemplate {
    cells: &[],
    paths: &[
        through((0, 0), (0, -1), Left, Left),
        through((0, 0), (0, 1), Right, Right),
    ],
    straight: true,
};

static DOUBLE_STRAIGHT: PieceTemplate = PieceTemplate {
    cells: &[full(0, 1)],
    paths: &[
        through((0, 0), (0, 2), Right, Right),
        branch((0, 1), (0, -1), Left, Left),
    ],
    straight: false,
};

static CURVE: PieceTemplate = PieceTemplate {
    cells: &[
        full(-1, -1),
        corner(0, -1, UpRight),
        corner(-1, 0, BottomLeft),
    ],
    paths: &[
        through((0, 0), (-2, -1), Left, Up),
        through((-1, -1), (0, 1), Down, Right),
    ],
    straight: false,
};

static S_BEND_LEFT: PieceTemplate = PieceTemplate {
    cells: &[
        corner(0, -1, BottomRight),
        corner(1, 0, UpLeft),
        full(1, -1),
    ],
    paths: &[
        through((0, 0), (1, -2), Left, Left),
        through((1, -1), (0, 1), Right, Right),
    ],
    straight: false,
};

static S_BEND_RIGHT: PieceTemplate = PieceTemplate {
    cells: &[
        corner(0, -1, UpRight),
        corner(-1, 0, BottomLeft),
        full(-1, -1),
    ],
    paths: &[
        through((0, 0), (-1, -2), Left, Left),
        through((-1, -1), (0, 1), Right, Right),
    ],
    straight: false,
};

static S_BEND_LEFT_JUNCTION: PieceTemplate = PieceTemplate {
    cells: &[corner(0, -1, BottomRight), full(1, 0), full(1, -1)],
    paths: &[
        branch((0, 0), (1, -2), Left, Left),
        branch((1, -1), (0, 1), Right, Right),
        branch((1, 0), (1, -2), Left, Left),
        branch((1, -1), (1, 1), Right, Right),
    ],
    straight: false,
};

static S_BEND_RIGHT_JUNCTION: PieceTemplate = PieceTemplate {
    cells: &[corner(0, -1, UpRight), full(-1, 0), full(-1, -1)],
    paths: &[
        branch((0, 0), (-1, -2), Left, Left),
        branch((-1, -1), (0, 1), Right, Right),
        branch((-1, 0), (-1, -2), Left, Left),
        branch((-1, -1), (-1, 1), Right, Right),
    ],
    straight: false,
};

static THREE_WAY: PieceTemplate = PieceTemplate {
    cells: &[
        full(0, -1),
        full(-1, -1),
        full(1, -1),
        corner(-1, 0, BottomLeft),
        corner(1, 0, UpLeft),
    ],
    paths: &[
        branch((0, 0), (-2, -1), Left, Up),
        branch((-1, -1), (0, 1), Down, Right),
        branch((0, 0), (2, -1), Left, Down),
        branch((1, -1), (0, 1), Up, Right),
        branch((1, -1), (-2, -1), Up, Up),
        branch((-1, -1), (2, -1), Down, Down),
    ],
    straight: false,
};

static FOUR_WAY: PieceTemplate = PieceTemplate {
    cells: &[
        full(0, -1),
        full(-1, -1),
        full(1, -1),
        corner(-1, 0, BottomLeft),
        corner(1, 0, UpLeft),
        full(0, -2),
        corner(-1, -2, BottomRight),
        corner(1, -2, UpRight),
    ],
    paths: &[
        branch((0, 0), (-2, -1), Left, Up),
        branch((-1, -1), (0, 1), Down, Right),
        branch((0, 0), (2, -1), Left, Down),
        branch((1, -1), (0, 1), Up, Right),
        branch((1, -1), (-2, -1), Up, Up),
        branch((-1, -1), (2, -1), Down, Down),
        branch((0, 0), (0, -3), Left, Left),
        branch((0, -2), (0, 1), Right, Right),
        branch((0, -2), (2, -1), Right, Down),
        branch((1, -1), (0, -3), Up, Left),
        branch((-1, -1), (0, -3), Down, Left),
        branch((0, -2), (-2, -1), Right, Up),
    ],
    straight: false,
};

// ---------------------------------------------------------------------------
// Layouts (templates resolved at an anchor)
// ---------------------------------------------------------------------------

/// A path descriptor with absolute coordinates and rotated directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPath {
    pub origin: GridPosition,
    pub destination: GridPosition,
    pub entry: Rotation,
    pub exit: Rotation,
    pub registration: Registration,
}

/// Everything a placement touches, in absolute terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Claimed cells. The anchor comes first.
    pub cells: Vec<(GridPosition, Claim)>,
    pub paths: Vec<PlannedPath>,
    pub straight: bool,
}

impl Layout {
    /// Resolve `kind` placed at `anchor`. Straight kinds ignore `rotation`.
    pub fn resolve(kind: PieceKind, rotation: Rotation, anchor: GridPosition) -> Self {
        let rotation = kind.canonical_rotation(rotation);
        let template = kind.template();
        let at = |offset: (i32, i32)| anchor.translated(rotation.rotate_offset(offset));

        let mut cells = Vec::with_capacity(template.cells.len() + 1);
        cells.push((anchor, Claim::Full));
        cells.extend(template.cells.iter().map(|rule| {
            let claim = match rule.claim {
                Claim::Full => Claim::Full,
                Claim::Corner(c) => Claim::Corner(c.rotated(rotation)),
            };
            (at(rule.offset), claim)
        }));

        let paths = template
            .paths
            .iter()
            .map(|p| PlannedPath {
                origin: at(p.from),
                destination: at(p.to),
                entry: p.entry.rotated_by(rotation),
                exit: p.exit.rotated_by(rotation),
                registration: p.registration,
            })
            .collect();

        Self {
            cells,
            paths,
            straight: template.straight,
        }
    }

    /// Tiles claimed whole. These are the tiles a piece owns outright.
    pub fn full_tiles(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.cells
            .iter()
            .filter(|(_, claim)| *claim == Claim::Full)
            .map(|(pos, _)| *pos)
    }
}
