//! Entry points: the termini where trains spawn and arrive.
//!
//! An entry point claims its origin tile and the depot tile behind it. A
//! single exit path leads from the origin into the depot, so trains
//! arriving from the network pull in and stop there. The two tiles together
//! form the trigger zone used for arrival detection and occupancy.

use crate::context::SelectionMode;
use crate::geometry::{HALF_TILE, Vec2, Waypoint, heading, tile_center, tile_contains};
use crate::id::{EntryPointId, PathId, TrainHandle, TrainId};
use crate::network::TrackNetwork;
use crate::path::{ArrowHint, Path, Signal};
use crate::rng::SimRng;
use crate::sim::SimConfig;
use crate::train::{Car, Livery, Segment, Train};
use railyard_grid::{GridError, GridModel, GridPosition, Rotation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("You can only spawn trains in Simulation Mode")]
    WrongMode(SelectionMode),
    #[error("A train is already occupying the entry point!")]
    Occupied(EntryPointId),
    #[error("no entry point {0}")]
    UnknownEntryPoint(EntryPointId),
    #[error("entry point {0} has no trains left to spawn")]
    ScheduleExhausted(EntryPointId),
}

/// One train waiting in an entry point's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTrain {
    pub train: TrainId,
    pub cars: u32,
    pub destination: EntryPointId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPoint {
    id: EntryPointId,
    origin: GridPosition,
    exit: Rotation,
    schedule: Vec<ScheduledTrain>,
    cursor: usize,
    occupancy: u32,
    exit_path: PathId,
}

impl EntryPoint {
    /// Claim the origin and depot tiles and register the exit path.
    pub fn install(
        grid: &mut GridModel,
        network: &mut TrackNetwork,
        id: EntryPointId,
        origin: GridPosition,
        exit: Rotation,
        schedule: Vec<ScheduledTrain>,
    ) -> Result<Self, GridError> {
        let depot = origin.step(exit.reverse());
        grid.tile(origin)?;
        grid.tile(depot)?;
        grid.set_filled(origin)?;
        grid.set_filled(depot)?;

        let entry = exit.reverse();
        let exit_path = network.add_path_straight(Path {
            origin,
            destination: depot,
            entry,
            exit,
            signal: Signal::Go,
            arrow: ArrowHint::Straight,
            waypoints: vec![Waypoint {
                position: tile_center(depot),
                heading: heading(entry),
            }],
        });

        Ok(Self {
            id,
            origin,
            exit,
            schedule,
            cursor: 0,
            occupancy: 0,
            exit_path,
        })
    }

    pub fn id(&self) -> EntryPointId {
        self.id
    }

    pub fn origin(&self) -> GridPosition {
        self.origin
    }

    /// Direction departing trains travel in.
    pub fn exit_rotation(&self) -> Rotation {
        self.exit
    }

    /// The tile behind the origin that arriving trains pull into.
    pub fn depot(&self) -> GridPosition {
        self.origin.step(self.exit.reverse())
    }

    pub fn exit_path(&self) -> PathId {
        self.exit_path
    }

    pub fn zone_contains(&self, p: Vec2) -> bool {
        tile_contains(self.origin, p) || tile_contains(self.depot(), p)
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    pub fn is_occupied(&self) -> bool {
        self.occupancy > 0
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    pub fn enter(&mut self) {
        self.occupancy += 1;
    }

    pub fn exit(&mut self) {
        self.occupancy = self.occupancy.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Schedule
    // -----------------------------------------------------------------------

    pub fn schedule(&self) -> &[ScheduledTrain] {
        &self.schedule
    }

    /// Trains still waiting to spawn.
    pub fn remaining(&self) -> usize {
        self.schedule.len().saturating_sub(self.cursor)
    }

    pub fn peek(&self) -> Option<&ScheduledTrain> {
        self.schedule.get(self.cursor)
    }

    pub fn next_train(&mut self) -> Option<ScheduledTrain> {
        let Some(next) = self.schedule.get(self.cursor).copied() else {
            log::error!(
                "entry point {} has spawned all {} scheduled trains",
                self.id,
                self.schedule.len()
            );
            return None;
        };
        self.cursor += 1;
        Some(next)
    }

    /// Rewind the schedule and forget whatever was standing in the zone.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.occupancy = 0;
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    /// Build the next scheduled train standing at the origin, facing out.
    pub fn spawn(
        &mut self,
        handle: TrainHandle,
        cfg: &SimConfig,
        rng: &mut SimRng,
    ) -> Result<Train, SpawnError> {
        if self.is_occupied() {
            return Err(SpawnError::Occupied(self.id));
        }
        let scheduled = self
            .next_train()
            .ok_or(SpawnError::ScheduleExhausted(self.id))?;

        let h = heading(self.exit);
        let first = Waypoint {
            position: tile_center(self.origin) + h * HALF_TILE,
            heading: h,
        };
        let mut cars: Vec<Car> = (0..scheduled.cars.max(1))
            .map(|i| {
                let front = first.position - h * (cfg.car_spacing * i as f32);
                Car::new(front, h, cfg.bogie_spacing, first, i == 0)
            })
            .collect();
        // Claim the zone now so a second spawn in the same step is refused.
        for car in &mut cars {
            if self.zone_contains(car.body()) {
                car.zone = Some(self.id);
                self.enter();
            }
        }

        Ok(Train::new(
            handle,
            scheduled.train,
            self.id,
            scheduled.destination,
            Livery::random(rng),
            cars,
            Segment::departure(self.origin, self.exit),
            cfg,
        ))
    }
}
