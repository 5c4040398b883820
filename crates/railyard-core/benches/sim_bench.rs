//! Criterion benchmarks for the railyard simulation.
//!
//! Three benchmark groups:
//! - `trains`: stepping a board with trains in motion
//! - `construction`: placing and removing every piece kind
//! - `hashing`: the per-step state hash on a busy board

use criterion::{Criterion, criterion_group, criterion_main};
use railyard_core::catalog::PieceKind;
use railyard_core::construction::ConstructionValidator;
use railyard_core::context::{SelectionMode, SimulationContext};
use railyard_core::id::EntryPointId;
use railyard_core::level::{EntryPointSpec, LevelDescriptor};
use railyard_core::network::TrackNetwork;
use railyard_core::sim::SimConfig;
use railyard_core::test_utils::*;
use railyard_grid::{GridModel, GridPosition, Rotation};

// ===========================================================================
// Board builders
// ===========================================================================

/// Eight parallel rows on a 40x40 board, each with a long train ready to go.
fn build_busy_board() -> SimulationContext {
    let mut level = LevelDescriptor::open("busy", 40, 40);
    for i in 0..8u32 {
        let row = 4 + 4 * i as i32;
        level = level
            .with_entry_point(
                EntryPointSpec::new(2 * i + 1, p(row, 1), Rotation::Right).train(i, 8, 2 * i + 2),
            )
            .with_entry_point(EntryPointSpec::new(2 * i + 2, p(row, 38), Rotation::Left));
    }
    let mut ctx = SimulationContext::new(&level, SimConfig::default()).expect("bench level");
    for i in 0..8 {
        straight_row(&mut ctx, 4 + 4 * i, 2, 37).expect("row builds");
    }
    ctx.set_mode(SelectionMode::Simulate);
    for i in 0..8u32 {
        ctx.spawn_train(EntryPointId(2 * i + 1)).expect("spawn");
    }
    ctx
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_trains(c: &mut Criterion) {
    let mut group = c.benchmark_group("trains");

    group.bench_function("step_8_trains", |b| {
        b.iter_batched(
            build_busy_board,
            |mut ctx| {
                ctx.advance(100);
                ctx
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function("full_run_two_gates", |b| {
        b.iter_batched(
            || {
                let mut ctx = context(&two_gate_level());
                straight_row(&mut ctx, 6, 2, 16).expect("row builds");
                ctx.set_mode(SelectionMode::Simulate);
                ctx
            },
            |mut ctx| {
                ctx.spawn_train(EntryPointId(1)).expect("spawn");
                run_until_clear(&mut ctx, 5_000);
                ctx
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("place_remove_all_kinds", |b| {
        let mut grid = GridModel::new(19, 19).expect("grid");
        let mut net = TrackNetwork::new();
        let mut validator = ConstructionValidator::new();
        let anchor = GridPosition::new(9, 9);
        b.iter(|| {
            for kind in PieceKind::all() {
                for rotation in Rotation::all() {
                    if let Ok(placed) =
                        validator.try_place(&mut grid, &mut net, kind, rotation, anchor)
                    {
                        let _ = validator.remove(&mut grid, &mut net, placed.piece);
                    }
                }
            }
        });
    });

    group.bench_function("lay_long_rows", |b| {
        b.iter_batched(
            || context(&LevelDescriptor::open("rows", 40, 40)),
            |mut ctx| {
                for row in 2..38 {
                    let _ = straight_row(&mut ctx, row, 2, 37);
                }
                ctx
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");
    let mut ctx = build_busy_board();
    ctx.advance(50);

    group.bench_function("idle_step_busy_board", |b| {
        ctx.set_mode(SelectionMode::Menu);
        b.iter(|| ctx.step());
    });

    group.finish();
}

criterion_group!(benches, bench_trains, bench_construction, bench_hashing);
criterion_main!(benches);
