//! Overlap detection between cars, entry point zones and each other.
//!
//! Runs once per step after every train has moved. Car bodies are points;
//! a body is inside an entry point zone when the zone's tiles contain it,
//! and two bodies collide when they fall in the same tile.

use crate::entry_point::EntryPoint;
use crate::geometry::{Vec2, tile_of};
use crate::id::{EntryPointId, TrainHandle};
use crate::train::Train;
use railyard_grid::GridPosition;
use std::collections::BTreeMap;

/// How a lead car's arrival at an entry point is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Completed {
        train: TrainHandle,
        entry_point: EntryPointId,
    },
    Misguided {
        train: TrainHandle,
        entry_point: EntryPointId,
    },
}

/// A train caught in a car-to-car collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub train: TrainHandle,
    pub at: GridPosition,
    /// False when the train had already reached an entry point.
    pub derailed: bool,
}

fn zone_at(entry_points: &BTreeMap<EntryPointId, EntryPoint>, body: Vec2) -> Option<EntryPointId> {
    entry_points
        .values()
        .find(|ep| ep.zone_contains(body))
        .map(EntryPoint::id)
}

/// Track which zone every car body is in and classify lead-car arrivals.
pub fn update_zones(
    trains: &mut [Train],
    entry_points: &mut BTreeMap<EntryPointId, EntryPoint>,
) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for train in trains.iter_mut() {
        for i in 0..train.cars.len() {
            let body = train.cars[i].body();
            let now = zone_at(entry_points, body);
            let before = train.cars[i].zone;
            if now == before {
                continue;
            }

            if let Some(old) = before {
                if let Some(ep) = entry_points.get_mut(&old) {
                    ep.exit();
                }
                if old == train.origin {
                    train.cars[i].left_origin = true;
                }
            }
            train.cars[i].zone = now;

            let Some(new) = now else {
                continue;
            };
            if let Some(ep) = entry_points.get_mut(&new) {
                ep.enter();
            }

            let car = &mut train.cars[i];
            if !car.left_origin {
                continue;
            }
            let first_arrival = !car.completed;
            car.completed = true;
            let is_lead = car.is_lead;
            train.reached_entry_point = true;

            if is_lead && first_arrival {
                let arrival = if new == train.destination {
                    Arrival::Completed {
                        train: train.handle,
                        entry_point: new,
                    }
                } else {
                    Arrival::Misguided {
                        train: train.handle,
                        entry_point: new,
                    }
                };
                log::info!("train {} arrived at {new}: {arrival:?}", train.id.0);
                arrivals.push(arrival);
            }
        }
    }
    arrivals
}

/// Find trains whose cars share a tile with a car of another train. Each
/// train appears at most once, at the first tile it collided in.
pub fn detect_collisions(trains: &[Train]) -> Vec<Collision> {
    let mut by_tile: BTreeMap<GridPosition, Vec<(usize, bool)>> = BTreeMap::new();
    for (t, train) in trains.iter().enumerate() {
        for car in &train.cars {
            by_tile
                .entry(tile_of(car.body()))
                .or_default()
                .push((t, car.completed));
        }
    }

    let mut hit: BTreeMap<usize, GridPosition> = BTreeMap::new();
    for (tile, cars) in &by_tile {
        for (a, &(ta, done_a)) in cars.iter().enumerate() {
            for &(tb, done_b) in &cars[a + 1..] {
                if ta == tb || done_a || done_b {
                    continue;
                }
                hit.entry(ta).or_insert(*tile);
                hit.entry(tb).or_insert(*tile);
            }
        }
    }

    hit.into_iter()
        .map(|(t, at)| Collision {
            train: trains[t].handle,
            at,
            derailed: !trains[t].reached_entry_point,
        })
        .collect()
}

/// Give back every zone a departing train's cars still hold.
pub fn release_zones(train: &mut Train, entry_points: &mut BTreeMap<EntryPointId, EntryPoint>) {
    for car in &mut train.cars {
        if let Some(zone) = car.zone.take()
            && let Some(ep) = entry_points.get_mut(&zone)
        {
            ep.exit();
        }
    }
}
