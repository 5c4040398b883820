//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::PieceKind;
use crate::context::{SelectionMode, SimulationContext};
use crate::error::RailError;
use crate::level::{EntryPointSpec, LevelDescriptor};
use crate::scoring::{Benchmarks, ScoringSink};
use crate::sim::SimConfig;
use railyard_grid::{GridPosition, Rotation};

pub fn p(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

// ===========================================================================
// Levels
// ===========================================================================

/// Two facing entry points on row 6 of an open 19x19 board, one 4-car
/// train each, bound for the other.
pub fn two_gate_level() -> LevelDescriptor {
    LevelDescriptor::open("two gates", 19, 19)
        .with_entry_point(EntryPointSpec::new(1, p(6, 1), Rotation::Right).train(1, 4, 2))
        .with_entry_point(EntryPointSpec::new(2, p(6, 17), Rotation::Left).train(2, 4, 1))
}

/// Entry points at (6,1) and (2,17) on an open board.
pub fn offset_gate_level() -> LevelDescriptor {
    LevelDescriptor::open("offset gates", 19, 19)
        .with_entry_point(EntryPointSpec::new(1, p(6, 1), Rotation::Right).train(1, 4, 2))
        .with_entry_point(EntryPointSpec::new(2, p(2, 17), Rotation::Left).train(2, 4, 1))
}

/// Terrain of the first campaign level.
pub const FIRST_LEVEL_TERRAIN: [[u8; 19]; 19] = [
    [0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 3, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0],
    [0, 0, 3, 1, 3, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 2, 0, 0, 0],
    [0, 0, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 0, 0, 0],
    [0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0],
    [0, 0, 2, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 3, 0, 0, 1, 0, 0],
    [0, 0, 2, 2, 2, 2, 2, 2, 2, 2, 0, 0, 3, 3, 3, 0, 1, 0, 0],
    [0, 0, 0, 1, 2, 2, 2, 2, 2, 2, 0, 0, 0, 3, 3, 0, 1, 0, 0],
    [0, 0, 0, 1, 0, 2, 2, 2, 2, 2, 0, 0, 0, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 1, 0, 2, 2, 2, 2, 2, 2, 0, 3, 3, 1, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 2, 2, 2, 2, 2, 0, 0, 0, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 1, 0, 2, 2, 2, 2, 2, 2, 0, 3, 3, 1, 0, 0, 0, 0],
];

/// The first campaign level: offset gates over forest, rock and water.
pub fn first_level() -> LevelDescriptor {
    let mut level = offset_gate_level().with_benchmarks(Benchmarks::default());
    level.name = "first level".into();
    level.terrain = FIRST_LEVEL_TERRAIN.iter().map(|row| row.to_vec()).collect();
    level
}

pub fn context(level: &LevelDescriptor) -> SimulationContext {
    SimulationContext::new(level, SimConfig::default()).expect("test level loads")
}

// ===========================================================================
// Recording sink
// ===========================================================================

/// Counts every report it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub derailed: u32,
    pub misguided: u32,
    pub completed: u32,
    pub cost: i64,
}

impl ScoringSink for RecordingSink {
    fn report_derailed(&mut self) {
        self.derailed += 1;
    }

    fn report_misguided(&mut self) {
        self.misguided += 1;
    }

    fn report_completed(&mut self) {
        self.completed += 1;
    }

    fn report_construction_cost(&mut self, delta: i64) {
        self.cost += delta;
    }
}

// ===========================================================================
// Construction helpers
// ===========================================================================

/// Place `kind` facing `rotation` at `anchor`, switching into Build first.
pub fn build<S: ScoringSink>(
    ctx: &mut SimulationContext<S>,
    kind: PieceKind,
    rotation: Rotation,
    anchor: GridPosition,
) -> Result<(), RailError> {
    ctx.set_mode(SelectionMode::Build);
    ctx.select_piece(kind)?;
    // Rotating a straight swaps its kind.
    if !kind.is_straight() {
        for _ in 0..4 {
            if ctx.cursor().rotation() == rotation {
                break;
            }
            ctx.rotate_cursor();
        }
    }
    ctx.place(anchor)?;
    Ok(())
}

/// Lay horizontal straights along `row` from column `from` to `to`.
pub fn straight_row<S: ScoringSink>(
    ctx: &mut SimulationContext<S>,
    row: i32,
    from: i32,
    to: i32,
) -> Result<(), RailError> {
    ctx.set_mode(SelectionMode::Build);
    ctx.select_piece(PieceKind::StraightHorizontal)?;
    ctx.lay_straight(p(row, from), p(row, to))?;
    Ok(())
}

/// Clear forest or rock at each of `tiles`.
pub fn clear<S: ScoringSink>(
    ctx: &mut SimulationContext<S>,
    tiles: &[GridPosition],
) -> Result<(), RailError> {
    ctx.set_mode(SelectionMode::Demolish);
    for &pos in tiles {
        ctx.demolish(pos)?;
    }
    Ok(())
}

/// Track from (6,1) east to column 9, up to row 2, then east to (2,17).
/// Costs 1700 on open land.
pub fn offset_route<S: ScoringSink>(ctx: &mut SimulationContext<S>) -> Result<(), RailError> {
    straight_row(ctx, 6, 2, 7)?;
    build(ctx, PieceKind::Curve, Rotation::Left, p(5, 9))?;
    build(ctx, PieceKind::StraightVertical, Rotation::Up, p(4, 9))?;
    build(ctx, PieceKind::Curve, Rotation::Right, p(3, 9))?;
    straight_row(ctx, 2, 11, 16)
}

/// Forest in the way of [`offset_route`] on the first level.
pub const FIRST_LEVEL_ROUTE_FOREST: [(i32, i32); 3] = [(6, 4), (6, 8), (6, 9)];

// ===========================================================================
// Running
// ===========================================================================

/// Step until `done` holds or `max_steps` run out. Returns the steps taken
/// when `done` was met.
pub fn run_until<S: ScoringSink>(
    ctx: &mut SimulationContext<S>,
    max_steps: u64,
    mut done: impl FnMut(&SimulationContext<S>) -> bool,
) -> Option<u64> {
    for step in 0..max_steps {
        if done(ctx) {
            return Some(step);
        }
        ctx.step();
    }
    done(ctx).then_some(max_steps)
}

/// Step until no train is left on the board.
pub fn run_until_clear<S: ScoringSink>(
    ctx: &mut SimulationContext<S>,
    max_steps: u64,
) -> Option<u64> {
    run_until(ctx, max_steps, |c| c.trains().is_empty())
}
