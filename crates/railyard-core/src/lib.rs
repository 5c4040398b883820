//! Railyard Core -- the simulation engine for the railyard puzzle.
//!
//! The player lays track pieces on a tile grid between entry points, then
//! runs a schedule of trains and steers them with per-junction signals and
//! switches. This crate owns the board, the track network, train motion,
//! overlap detection and scoring; rendering and input live with the host.
//!
//! # Step Pipeline
//!
//! Each call to [`context::SimulationContext::step`] advances the
//! simulation by one fixed tick:
//!
//! 1. **Commands** -- Execute queued player commands.
//! 2. **Trains** -- Move every train along its waypoints, resolving the
//!    next path at each junction.
//! 3. **Overlap** -- Track entry point zones and car-to-car collisions.
//! 4. **Level end** -- Rate the run once every scheduled train is resolved.
//! 5. **Delivery** -- Deliver buffered events to subscribers.
//! 6. **Bookkeeping** -- Increment the tick counter and compute the state hash.
//!
//! # Key Types
//!
//! - [`context::SimulationContext`] -- One level in play; the pipeline
//!   orchestrator and the only mutation entry point for hosts.
//! - [`construction::ConstructionValidator`] -- Placement, removal and
//!   terrain clearing with atomic validation.
//! - [`network::TrackNetwork`] -- Paths and junctions keyed by tile.
//! - [`train::Train`] -- A chain of cars following queued waypoints.
//! - [`scoring::Scoreboard`] -- Outcome counters and the star rating.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for scoring math.
//! - [`event::EventBus`] -- Typed events delivered to subscribers at the end of each step.

pub mod catalog;
pub mod collision;
pub mod command_queue;
pub mod construction;
pub mod context;
pub mod entry_point;
pub mod error;
pub mod event;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod junction;
pub mod level;
pub mod network;
pub mod path;
pub mod rng;
pub mod scoring;
pub mod sim;
pub mod train;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
