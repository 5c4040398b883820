//! Property-based tests for the railyard core.
//!
//! Uses proptest to generate random placements, construction sequences and
//! run schedules, then verify structural invariants hold.

use railyard_core::catalog::PieceKind;
use railyard_core::construction::ConstructionValidator;
use railyard_core::context::SelectionMode;
use railyard_core::fixed::Fixed64;
use railyard_core::id::EntryPointId;
use railyard_core::network::TrackNetwork;
use railyard_core::scoring::{Benchmarks, Scoreboard, ScoringSink};
use railyard_core::test_utils::*;
use railyard_grid::{GridModel, GridPosition, Rotation};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_kind() -> impl Strategy<Value = PieceKind> {
    (0..10usize).prop_map(|i| PieceKind::all()[i])
}

fn arb_rotation() -> impl Strategy<Value = Rotation> {
    (0..4usize).prop_map(Rotation::from_index)
}

/// Anchors anywhere on a 19x19 board, edges included.
fn arb_anchor() -> impl Strategy<Value = GridPosition> {
    (0..19i32, 0..19i32).prop_map(|(x, y)| GridPosition::new(x, y))
}

#[derive(Debug, Clone)]
enum BuildOp {
    Place(PieceKind, Rotation, GridPosition),
    Demolish(GridPosition),
}

fn arb_build_sequence(max_ops: usize) -> impl Strategy<Value = Vec<BuildOp>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (arb_kind(), arb_rotation(), arb_anchor())
                .prop_map(|(k, r, a)| BuildOp::Place(k, r, a)),
            1 => arb_anchor().prop_map(BuildOp::Demolish),
        ],
        1..=max_ops,
    )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Placing then removing a piece restores the board exactly; a rejected
    /// placement writes nothing.
    #[test]
    fn place_then_remove_is_identity(
        kind in arb_kind(),
        rotation in arb_rotation(),
        anchor in arb_anchor(),
    ) {
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        let mut validator = ConstructionValidator::new();
        let before = grid.clone();

        match validator.try_place(&mut grid, &mut net, kind, rotation, anchor) {
            Ok(placement) => {
                prop_assert_eq!(placement.cost, kind.cost());
                prop_assert!(grid.is_filled(anchor));
                let removed = validator.remove(&mut grid, &mut net, placement.piece).unwrap();
                prop_assert!(removed.is_some());
                prop_assert_eq!(&grid, &before);
                prop_assert_eq!(net.path_count(), 0);
                prop_assert_eq!(net.junction_count(), 0);
            }
            Err(_) => {
                prop_assert_eq!(&grid, &before);
                prop_assert_eq!(net.path_count(), 0);
                prop_assert_eq!(validator.piece_count(), 0);
            }
        }
    }

    /// Whatever the build order, no tile is owned by two pieces and every
    /// piece's anchor stays filled.
    #[test]
    fn pieces_never_overlap(ops in arb_build_sequence(40)) {
        let mut ctx = context(&two_gate_level());
        let mut spent = 0i64;
        for op in ops {
            match op {
                BuildOp::Place(kind, rotation, anchor) => {
                    if build(&mut ctx, kind, rotation, anchor).is_ok() {
                        spent += kind.cost();
                    }
                }
                BuildOp::Demolish(at) => {
                    ctx.set_mode(SelectionMode::Demolish);
                    let _ = ctx.demolish(at);
                }
            }
        }

        prop_assert_eq!(ctx.scoreboard().construction_cost, spent);
        let mut owned = BTreeSet::new();
        for (_, piece) in ctx.validator().pieces() {
            prop_assert!(ctx.grid().is_filled(piece.anchor));
            for tile in piece.layout().full_tiles() {
                prop_assert!(owned.insert(tile), "tile {} owned twice", tile);
            }
        }
    }

    /// The rating total always lands in [0, 3] and each component in its band.
    #[test]
    fn rating_is_bounded(
        completed in 0u32..10,
        misguided in 0u32..10,
        plain_derails in 0u32..10,
        cost in 0i64..20_000,
        ticks in 0u64..20_000,
    ) {
        let trains = (completed + misguided + plain_derails).max(1) as usize;
        let mut board = Scoreboard::new();
        board.start_level(trains);
        board.report_construction_cost(cost);
        for _ in 0..completed {
            board.report_completed();
        }
        for _ in 0..misguided {
            board.report_misguided();
        }
        for _ in 0..plain_derails {
            board.report_derailed();
        }

        let elapsed = Fixed64::from_num(ticks) / Fixed64::from_num(20);
        let rating = board.rate(&Benchmarks::default(), elapsed);
        prop_assert!(rating.total >= Fixed64::ZERO && rating.total <= Fixed64::from_num(3));
        prop_assert!(rating.cost <= Fixed64::from_num(0.75));
        prop_assert!(rating.complete >= Fixed64::from_num(-0.5));
        prop_assert!(rating.complete <= Fixed64::from_num(1.5));
        prop_assert!(rating.derailed <= Fixed64::ZERO);
        prop_assert!(rating.misguide <= Fixed64::ZERO);
        prop_assert!(rating.time <= Fixed64::ONE);
    }

    /// Two contexts fed the same seed and inputs stay in lockstep.
    #[test]
    fn deterministic_runs(seed in 0u64..1_000, spawn_gap in 0u64..300) {
        let run = |seed: u64| {
            let mut cfg = railyard_core::sim::SimConfig::default();
            cfg.seed = seed;
            let mut ctx = railyard_core::context::SimulationContext::new(&two_gate_level(), cfg)
                .unwrap();
            straight_row(&mut ctx, 6, 2, 16).unwrap();
            ctx.set_mode(SelectionMode::Simulate);
            ctx.spawn_train(EntryPointId(1)).unwrap();
            ctx.advance(spawn_gap);
            let _ = ctx.spawn_train(EntryPointId(2));
            ctx.advance(200);
            ctx.state_hash()
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
