//! Trains and cars: the per-tick movement state machine.
//!
//! A train is a chain of cars that all follow the same waypoint stream.
//! Each car has a front and a rear bogie with independent waypoint queues;
//! the body sits between them. Only the lead car asks the network for the
//! next path, when its front queue runs dry.
//!
//! Every waypoint queued for a path carries the serial of the segment it
//! came from, so a train held at a red signal can abandon the segment it
//! was about to enter and re-route once the signal clears.

use crate::geometry::{Vec2, Waypoint};
use crate::id::{EntryPointId, PathId, TrainHandle, TrainId};
use crate::network::TrackNetwork;
use crate::path::Signal;
use crate::rng::SimRng;
use crate::sim::{SimConfig, StateHash};
use railyard_grid::{GridModel, GridPosition, Rotation};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Livery
// ---------------------------------------------------------------------------

/// Cargo style painted on every car of a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Livery {
    Oil,
    Goods,
    Mining,
    Freight,
}

impl Livery {
    pub fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Livery::Oil,
            1 => Livery::Goods,
            2 => Livery::Mining,
            _ => Livery::Freight,
        }
    }

    pub fn random(rng: &mut SimRng) -> Self {
        Self::from_index(rng.below(4))
    }
}

// ---------------------------------------------------------------------------
// Bogies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct QueuedWaypoint {
    waypoint: Waypoint,
    segment: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bogie {
    pub position: Vec2,
    pub heading: Vec2,
    queue: VecDeque<QueuedWaypoint>,
}

impl Bogie {
    fn new(position: Vec2, heading: Vec2) -> Self {
        Self {
            position,
            heading,
            queue: VecDeque::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Move toward the next waypoint by at most `speed`. Returns true when
    /// the waypoint was reached and dropped from the queue.
    fn advance(&mut self, speed: f32) -> bool {
        let Some(next) = self.queue.front() else {
            return false;
        };
        let target = next.waypoint;
        let distance = self.position.distance(target.position);
        let reach = if distance > f32::EPSILON {
            speed / distance
        } else {
            f32::INFINITY
        };
        let t = reach.min(1.0);
        self.position = self.position.lerp(target.position, t);
        self.heading = self.heading.nlerp(target.heading, t);
        if reach > 1.0 {
            self.queue.pop_front();
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Smoke
// ---------------------------------------------------------------------------

/// A cosmetic smoke puff from the lead car. Renderers read these; nothing
/// in the simulation depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmokePuff {
    pub position: Vec2,
    pub height: f32,
    pub scale: [f32; 3],
    /// Seconds left before the puff is culled.
    pub remaining: f32,
}

const SMOKE_RISE_PER_SECOND: f32 = 7.0;

// ---------------------------------------------------------------------------
// Car
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub front: Bogie,
    pub rear: Bogie,
    pub is_lead: bool,
    /// Set once the lead's front bogie passes the first waypoint of the
    /// current segment. Until then a red signal may re-route the train.
    pub completed_first: bool,
    /// Set when the car reaches an entry point after leaving its origin.
    /// Completed cars no longer cause collisions.
    pub completed: bool,
    pub left_origin: bool,
    pub muted: bool,
    /// Entry point trigger zone the body currently overlaps.
    pub(crate) zone: Option<EntryPointId>,
    smoke: Vec<SmokePuff>,
}

impl Car {
    /// A car whose front bogie stands at `front`, facing `heading`, with
    /// the rear bogie `bogie_spacing` behind it. Both bogies start out
    /// queued toward `first`.
    pub fn new(front: Vec2, heading: Vec2, bogie_spacing: f32, first: Waypoint, is_lead: bool) -> Self {
        let mut car = Self {
            front: Bogie::new(front, heading),
            rear: Bogie::new(front - heading * bogie_spacing, heading),
            is_lead,
            completed_first: false,
            completed: false,
            left_origin: false,
            muted: false,
            zone: None,
            smoke: Vec::new(),
        };
        car.queue_waypoints(std::slice::from_ref(&first), 0);
        car
    }

    /// Centre of the car body.
    pub fn body(&self) -> Vec2 {
        self.front.position.lerp(self.rear.position, 0.5)
    }

    /// Direction the body points, from rear to front bogie.
    pub fn facing(&self) -> Vec2 {
        (self.front.position - self.rear.position).normalize_or(self.front.heading)
    }

    pub fn zone(&self) -> Option<EntryPointId> {
        self.zone
    }

    pub fn smoke(&self) -> &[SmokePuff] {
        &self.smoke
    }

    fn queue_waypoints(&mut self, waypoints: &[Waypoint], segment: u64) {
        for &waypoint in waypoints {
            let queued = QueuedWaypoint { waypoint, segment };
            self.front.queue.push_back(queued);
            self.rear.queue.push_back(queued);
        }
    }

    fn drop_segment(&mut self, segment: u64) {
        self.front.queue.retain(|q| q.segment != segment);
        self.rear.queue.retain(|q| q.segment != segment);
    }

    /// Advance both bogies for one tick. The rear bogie runs slightly
    /// faster or slower depending on which side of the guide point it is,
    /// which keeps the body length steady through curves. Returns true if
    /// the lead car emitted smoke.
    pub fn simulate(&mut self, speed: f32, cfg: &SimConfig, rng: &mut SimRng) -> bool {
        if self.front.advance(speed) && self.is_lead {
            self.completed_first = true;
        }

        let back = -self.front.heading;
        let guide = self.front.position + back * cfg.bogie_spacing;
        let lag = (guide - self.rear.position).dot(back);
        let rear_speed = if lag < 0.0 {
            speed + 0.1
        } else if lag > 0.0 {
            speed - 0.1
        } else {
            speed
        };
        self.rear.advance(rear_speed.max(0.0));

        if self.is_lead {
            self.tick_smoke(cfg, rng)
        } else {
            false
        }
    }

    fn tick_smoke(&mut self, cfg: &SimConfig, rng: &mut SimRng) -> bool {
        let emitted = rng.chance(cfg.smoke_chance);
        if emitted {
            self.smoke.push(SmokePuff {
                position: self.front.position,
                height: 0.0,
                scale: [0.5; 3],
                remaining: cfg.smoke_lifetime,
            });
        }
        self.smoke.retain(|puff| puff.remaining >= 0.0);
        for puff in &mut self.smoke {
            puff.remaining -= cfg.tick_seconds;
            puff.height += SMOKE_RISE_PER_SECOND * cfg.tick_seconds;
            puff.scale[0] += rng.range_f32(0.01, 0.15);
            puff.scale[1] += rng.range_f32(0.01, 0.1);
            puff.scale[2] += rng.range_f32(0.01, 0.15);
        }
        emitted
    }

    /// Drop every smoke puff. Called when the train leaves play.
    pub fn release_smoke(&mut self) {
        self.smoke.clear();
    }
}

// ---------------------------------------------------------------------------
// Train
// ---------------------------------------------------------------------------

/// The stretch of track a train is currently committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// `None` for the stretch leading out of the spawning entry point.
    pub path: Option<PathId>,
    pub origin: GridPosition,
    pub destination: GridPosition,
    pub entry: Rotation,
    pub exit: Rotation,
    serial: u64,
}

impl Segment {
    /// The stretch from an entry point onto the first track tile.
    pub fn departure(origin: GridPosition, rotation: Rotation) -> Self {
        Self {
            path: None,
            origin,
            destination: origin.step(rotation),
            entry: rotation,
            exit: rotation,
            serial: 0,
        }
    }
}

/// Result of one train tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStep {
    Moving,
    /// Path resolution failed before the train reached an entry point.
    Derailed,
    /// Path resolution failed after the train reached an entry point; the
    /// train has pulled into the depot.
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainTick {
    pub step: TrainStep,
    pub smoke_emitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub handle: TrainHandle,
    pub id: TrainId,
    pub origin: EntryPointId,
    pub destination: EntryPointId,
    pub livery: Livery,
    pub cars: Vec<Car>,
    pub state: Signal,
    /// Top speed the train ramps toward.
    pub speed: f32,
    pub current_speed: f32,
    pub reached_entry_point: bool,
    current: Segment,
    next_serial: u64,
}

impl Train {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        handle: TrainHandle,
        id: TrainId,
        origin: EntryPointId,
        destination: EntryPointId,
        livery: Livery,
        cars: Vec<Car>,
        departure: Segment,
        cfg: &SimConfig,
    ) -> Self {
        Self {
            handle,
            id,
            origin,
            destination,
            livery,
            cars,
            state: Signal::Go,
            speed: cfg.top_speed,
            current_speed: cfg.initial_speed,
            reached_entry_point: false,
            current: departure,
            next_serial: departure.serial,
        }
    }

    pub fn segment(&self) -> &Segment {
        &self.current
    }

    pub fn lead(&self) -> Option<&Car> {
        self.cars.first()
    }

    fn current_signal(&self, network: &TrackNetwork) -> Signal {
        self.current
            .path
            .map_or(Signal::Go, |id| network.signal_of(id))
    }

    fn dead_end(&self) -> TrainStep {
        if self.reached_entry_point {
            TrainStep::Retired
        } else {
            TrainStep::Derailed
        }
    }

    /// Commit to `id` and queue its waypoints on every car.
    fn enter(&mut self, network: &TrackNetwork, id: PathId) {
        let Some(path) = network.path(id) else {
            log::error!("resolved path {id:?} is not in the network");
            return;
        };
        self.next_serial += 1;
        self.current = Segment {
            path: Some(id),
            origin: path.origin,
            destination: path.destination,
            entry: path.entry,
            exit: path.exit,
            serial: self.next_serial,
        };
        let muted = path.signal == Signal::Stop;
        for car in &mut self.cars {
            car.queue_waypoints(&path.waypoints, self.next_serial);
            if muted {
                car.muted = true;
            }
        }
    }

    /// Advance the train by one tick.
    pub fn tick(
        &mut self,
        grid: &GridModel,
        network: &mut TrackNetwork,
        cfg: &SimConfig,
        rng: &mut SimRng,
    ) -> TrainTick {
        let mut out = TrainTick {
            step: TrainStep::Moving,
            smoke_emitted: false,
        };

        match self.state {
            Signal::Stop if self.current_signal(network) == Signal::Go => {
                self.current_speed = cfg.initial_speed;
                self.state = Signal::Go;
                for car in &mut self.cars {
                    car.muted = false;
                }

                let lead_started = self.cars.first().is_some_and(|c| c.completed_first);
                if !lead_started {
                    let serial = self.current.serial;
                    for car in &mut self.cars {
                        car.drop_segment(serial);
                    }
                    match network.resolve(grid, self.current.origin, self.current.entry) {
                        Some(id) => self.enter(network, id),
                        None => {
                            out.step = self.dead_end();
                            return out;
                        }
                    }
                }
            }
            Signal::Stop => {
                self.current_speed = if self.current_speed * 0.7 < cfg.stop_floor {
                    0.0
                } else {
                    (self.current_speed * cfg.braking).max(0.0)
                };
            }
            Signal::Go => {
                self.current_speed = (self.current_speed * cfg.acceleration).min(self.speed);
            }
        }

        for i in 0..self.cars.len() {
            out.smoke_emitted |= self.cars[i].simulate(self.current_speed, cfg, rng);

            if i == 0 && self.cars[0].front.pending() == 0 {
                match network.resolve(grid, self.current.destination, self.current.exit) {
                    Some(id) => {
                        self.enter(network, id);
                        self.cars[0].completed_first = false;
                        self.state = self.current_signal(network);
                    }
                    None => {
                        out.step = self.dead_end();
                        return out;
                    }
                }
            }
        }
        out
    }

    /// Drop transient resources before the train leaves play.
    pub fn release(&mut self) {
        for car in &mut self.cars {
            car.release_smoke();
        }
    }

    pub fn hash_into(&self, hash: &mut StateHash) {
        hash.write_u64(self.handle.0);
        hash.write_u32(self.id.0);
        hash.write(&[self.state as u8, u8::from(self.reached_entry_point)]);
        hash.write_f32(self.current_speed);
        hash.write_u64(self.current.serial);
        for car in &self.cars {
            hash.write_f32(car.front.position.x);
            hash.write_f32(car.front.position.y);
            hash.write_f32(car.rear.position.x);
            hash.write_f32(car.rear.position.y);
            hash.write(&[u8::from(car.completed), u8::from(car.left_origin)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed64;
    use crate::geometry::{HALF_TILE, heading, tile_center};
    use crate::path::Path;

    fn p(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    /// A straight run along row 6 from column `from` to `to`, heading right.
    fn straight_row(grid: &mut GridModel, net: &mut TrackNetwork, from: i32, to: i32) {
        for y in from..=to {
            let pos = p(6, y);
            net.add_path_straight(Path::routed(pos, Rotation::Left, pos.step(Rotation::Left), Rotation::Left));
            net.add_path_straight(Path::routed(pos, Rotation::Right, pos.step(Rotation::Right), Rotation::Right));
            grid.set_filled(pos).unwrap();
            grid.set_straight_track(pos, true).unwrap();
        }
    }

    fn train_at(origin: GridPosition, cars: usize, cfg: &SimConfig) -> Train {
        let h = heading(Rotation::Right);
        let first = Waypoint {
            position: tile_center(origin) + h * HALF_TILE,
            heading: h,
        };
        let cars = (0..cars)
            .map(|i| {
                let front = first.position - h * (cfg.car_spacing * i as f32);
                Car::new(front, h, cfg.bogie_spacing, first, i == 0)
            })
            .collect();
        Train::new(
            TrainHandle(1),
            TrainId(1),
            EntryPointId(1),
            EntryPointId(2),
            Livery::Oil,
            cars,
            Segment::departure(origin, Rotation::Right),
            cfg,
        )
    }

    fn run(train: &mut Train, grid: &GridModel, net: &mut TrackNetwork, ticks: usize) -> TrainStep {
        let cfg = SimConfig::default();
        let mut rng = SimRng::new(1);
        for _ in 0..ticks {
            let tick = train.tick(grid, net, &cfg, &mut rng);
            if tick.step != TrainStep::Moving {
                return tick.step;
            }
        }
        TrainStep::Moving
    }

    // -----------------------------------------------------------------------
    // Test 1: speed ramps by the acceleration factor and caps at top speed
    // -----------------------------------------------------------------------
    #[test]
    fn speed_ramps_to_top() {
        let cfg = SimConfig::default();
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        straight_row(&mut grid, &mut net, 2, 16);
        let mut train = train_at(p(6, 1), 1, &cfg);

        let mut rng = SimRng::new(1);
        train.tick(&grid, &mut net, &cfg, &mut rng);
        assert!((train.current_speed - 0.07).abs() < 1e-6);
        for _ in 0..20 {
            train.tick(&grid, &mut net, &cfg, &mut rng);
        }
        assert_eq!(train.current_speed, cfg.top_speed);
    }

    // -----------------------------------------------------------------------
    // Test 2: running off the end of the track derails
    // -----------------------------------------------------------------------
    #[test]
    fn dead_end_derails() {
        let cfg = SimConfig::default();
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        straight_row(&mut grid, &mut net, 2, 5);
        let mut train = train_at(p(6, 1), 2, &cfg);
        assert_eq!(run(&mut train, &grid, &mut net, 2_000), TrainStep::Derailed);
        // The lead made it to the far edge of the last tile.
        let lead = train.lead().unwrap();
        assert!(lead.front.position.y > tile_center(p(6, 5)).y);
    }

    // -----------------------------------------------------------------------
    // Test 3: the same dead end after reaching an entry point retires quietly
    // -----------------------------------------------------------------------
    #[test]
    fn dead_end_after_arrival_retires() {
        let cfg = SimConfig::default();
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        straight_row(&mut grid, &mut net, 2, 5);
        let mut train = train_at(p(6, 1), 1, &cfg);
        train.reached_entry_point = true;
        assert_eq!(run(&mut train, &grid, &mut net, 2_000), TrainStep::Retired);
    }

    // -----------------------------------------------------------------------
    // Test 4: a red signal holds the train and green releases it
    // -----------------------------------------------------------------------
    #[test]
    fn red_signal_brakes_then_releases() {
        let cfg = SimConfig::default();
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        straight_row(&mut grid, &mut net, 2, 16);
        net.toggle_signal(p(6, 6)).unwrap();

        let mut train = train_at(p(6, 1), 2, &cfg);
        let mut rng = SimRng::new(1);
        for _ in 0..600 {
            train.tick(&grid, &mut net, &cfg, &mut rng);
        }
        assert_eq!(train.state, Signal::Stop);
        assert_eq!(train.current_speed, 0.0);
        let held = train.lead().unwrap().front.position;
        // Stopped just inside the signalled tile.
        assert!(held.y >= tile_center(p(6, 6)).y - HALF_TILE);
        assert!(held.y < tile_center(p(6, 6)).y);

        net.toggle_signal(p(6, 6)).unwrap();
        train.tick(&grid, &mut net, &cfg, &mut rng);
        assert_eq!(train.state, Signal::Go);
        assert_eq!(train.current_speed, cfg.initial_speed);
        for _ in 0..50 {
            train.tick(&grid, &mut net, &cfg, &mut rng);
        }
        assert!(train.lead().unwrap().front.position.y > held.y + 5.0);
    }

    // -----------------------------------------------------------------------
    // Test 5: the rear bogie keeps its distance on straight track
    // -----------------------------------------------------------------------
    #[test]
    fn bogie_spacing_is_stable() {
        let cfg = SimConfig::default();
        let mut grid = GridModel::new(19, 19).unwrap();
        let mut net = TrackNetwork::new();
        straight_row(&mut grid, &mut net, 2, 16);
        let mut train = train_at(p(6, 1), 3, &cfg);
        let mut rng = SimRng::new(9);
        for _ in 0..150 {
            train.tick(&grid, &mut net, &cfg, &mut rng);
        }
        for car in &train.cars {
            let gap = car.front.position.distance(car.rear.position);
            assert!((gap - cfg.bogie_spacing).abs() < 0.75, "gap {gap}");
            assert!(car.facing().dot(heading(Rotation::Right)) > 0.99);
        }
    }

    // -----------------------------------------------------------------------
    // Test 6: smoke ages out and is released with the train
    // -----------------------------------------------------------------------
    #[test]
    fn smoke_is_culled_and_released() {
        let cfg = SimConfig {
            smoke_chance: Fixed64::ONE,
            ..SimConfig::default()
        };
        let mut car = Car::new(
            Vec2::ZERO,
            heading(Rotation::Right),
            cfg.bogie_spacing,
            Waypoint {
                position: Vec2::new(0.0, 100.0),
                heading: heading(Rotation::Right),
            },
            true,
        );
        let mut rng = SimRng::new(3);
        for _ in 0..200 {
            assert!(car.simulate(0.1, &cfg, &mut rng));
        }
        // Lifetime 4 s at 0.05 s per tick: about 81 puffs alive at once.
        assert!(car.smoke().len() <= 82);
        assert!(car.smoke().iter().all(|p| p.height > 0.0));
        car.release_smoke();
        assert!(car.smoke().is_empty());
    }
}
