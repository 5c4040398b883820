//! Simulation clock, tuning constants, and state hashing.

use crate::fixed::{Fixed64, Ticks};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Clock tracked by the simulation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Steps executed since the context was created.
    pub tick: Ticks,

    /// Steps executed in Simulate mode since the last `go_to_simulation`.
    /// Multiplied by the tick length this is the level clock.
    pub sim_ticks: Ticks,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Simulation tuning. Distances are world units (one tile is
/// [`crate::geometry::TILE_SIZE`] units wide), speeds are units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds of simulated time per tick.
    pub tick_seconds: f32,
    /// Top speed a train ramps toward.
    pub top_speed: f32,
    /// Speed on spawn and when a signal turns green.
    pub initial_speed: f32,
    /// Multiplicative ramp per tick while moving.
    pub acceleration: f32,
    /// Multiplicative decay per tick while held at a red signal.
    pub braking: f32,
    /// Below this (after scaling by 0.7) a braking train snaps to zero.
    pub stop_floor: f32,
    /// Gap between consecutive cars of a train at spawn.
    pub car_spacing: f32,
    /// Distance between the two bogies of one car.
    pub bogie_spacing: f32,
    /// Per-tick probability that the lead car puffs smoke.
    pub smoke_chance: Fixed64,
    /// Seconds a smoke puff lives.
    pub smoke_lifetime: f32,
    /// Executed commands retained for inspection. 0 disables history.
    pub command_history: usize,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.05,
            top_speed: 0.6,
            initial_speed: 0.05,
            acceleration: 1.4,
            braking: 0.5,
            stop_floor: 0.01,
            car_spacing: 13.0,
            bogie_spacing: 4.0,
            smoke_chance: Fixed64::ONE / Fixed64::from_num(9),
            smoke_lifetime: 4.0,
            command_history: 0,
            seed: 0x5EED_7A1C,
        }
    }
}

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// Result of a `SimulationContext::advance()` call.
#[derive(Debug, Default)]
pub struct AdvanceResult {
    /// Number of simulation steps actually executed.
    pub steps_run: u64,
    /// Commands that were rejected, with the rejection text.
    pub rejected: Vec<String>,
    /// True if the level ended during one of the steps.
    pub level_ended: bool,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for replay checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    /// Feed an f32 by its bit pattern. Identical runs produce identical
    /// bits, which is all replay checks need.
    pub fn write_f32(&mut self, v: f32) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
