//! Headless level example: build a route, run both trains and print the
//! rating.
//!
//! Lays a straight line between two facing entry points, spawns the first
//! train, spawns the return train as soon as the first retires, and prints
//! every event along the way.
//!
//! Run with: `RUST_LOG=info cargo run -p railyard-core --example headless_level`

use railyard_core::catalog::PieceKind;
use railyard_core::command_queue::Command;
use railyard_core::context::{SelectionMode, SimulationContext};
use railyard_core::event::{Event, EventKind};
use railyard_core::id::EntryPointId;
use railyard_core::level::{EntryPointSpec, LevelDescriptor};
use railyard_core::sim::SimConfig;
use railyard_grid::{GridPosition, Rotation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let level = LevelDescriptor::open("headless", 19, 19)
        .with_entry_point(
            EntryPointSpec::new(1, GridPosition::new(6, 1), Rotation::Right).train(1, 4, 2),
        )
        .with_entry_point(
            EntryPointSpec::new(2, GridPosition::new(6, 17), Rotation::Left).train(2, 3, 1),
        );
    let mut ctx = SimulationContext::new(&level, SimConfig::default())?;

    // --- Step 1: Construction ---

    ctx.select_piece(PieceKind::StraightHorizontal)?;
    let run = ctx.lay_straight(GridPosition::new(6, 2), GridPosition::new(6, 16))?;
    println!("laid {} straights for ${}", run.laid.len(), run.cost);

    // --- Step 2: Listeners ---

    for kind in [
        EventKind::TrainSpawned,
        EventKind::TrainCompleted,
        EventKind::TrainMisguided,
        EventKind::TrainDerailed,
        EventKind::TrainRetired,
        EventKind::LevelEnded,
    ] {
        ctx.on_passive(
            kind,
            Box::new(|event: &Event| println!("[tick {:>5}] {event:?}", event.tick())),
        );
    }
    ctx.on_reactive(
        EventKind::TrainRetired,
        Box::new(|_| {
            vec![Command::SpawnTrain {
                entry_point: EntryPointId(2),
            }]
        }),
    );

    // --- Step 3: Simulation ---

    ctx.set_mode(SelectionMode::Simulate);
    ctx.spawn_train(EntryPointId(1))?;
    while !ctx.level_ended() && ctx.state().tick < 20_000 {
        ctx.step();
        for note in ctx.drain_notifications() {
            println!("  > {}", note.message);
        }
    }

    let board = ctx.scoreboard();
    println!(
        "\ncompleted {} / derailed {} / misguided {} in {:.1}s",
        board.completed,
        board.derailed,
        board.misguided,
        ctx.elapsed().to_num::<f64>()
    );
    if let Some(rating) = ctx.last_rating() {
        println!(
            "rating {:.2} stars ({})",
            rating.total.to_num::<f64>(),
            if board.success { "passed" } else { "failed" }
        );
    }
    Ok(())
}
