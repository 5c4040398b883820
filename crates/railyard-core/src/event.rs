//! Typed simulation events and the bus that delivers them.
//!
//! Events are emitted while a step runs (construction commands, train
//! movement, overlap detection) and delivered in one batch at the end of the
//! step, in the order they were emitted.
//!
//! # Subscriber Types
//!
//! - **Passive listeners**: read-only, used for UI updates, audio, analytics.
//! - **Reactive handlers**: return [`Command`]s to run at the start of the
//!   next step.

use crate::catalog::PieceKind;
use crate::command_queue::Command;
use crate::fixed::{Fixed64, Ticks};
use crate::id::{EntryPointId, PieceId, TrainHandle, TrainId};
use crate::path::Signal;
use railyard_grid::GridPosition;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Trains --
    TrainSpawned {
        train: TrainHandle,
        id: TrainId,
        origin: EntryPointId,
        destination: EntryPointId,
        tick: Ticks,
    },
    TrainCompleted {
        train: TrainHandle,
        entry_point: EntryPointId,
        tick: Ticks,
    },
    TrainMisguided {
        train: TrainHandle,
        entry_point: EntryPointId,
        tick: Ticks,
    },
    /// Reported derailment: a dead end, a wrong-way switch or a collision
    /// before the train reached any entry point.
    TrainDerailed {
        train: TrainHandle,
        at: GridPosition,
        tick: Ticks,
    },
    /// The train left play, for whatever reason.
    TrainDestroyed {
        train: TrainHandle,
        tick: Ticks,
    },
    /// The train pulled into a depot after arriving.
    TrainRetired {
        train: TrainHandle,
        tick: Ticks,
    },
    SmokeEmitted {
        train: TrainHandle,
        tick: Ticks,
    },

    // -- Construction --
    PiecePlaced {
        piece: PieceId,
        kind: PieceKind,
        anchor: GridPosition,
        cost: i64,
        tick: Ticks,
    },
    PieceRemoved {
        piece: PieceId,
        kind: PieceKind,
        anchor: GridPosition,
        tick: Ticks,
    },
    TerrainCleared {
        at: GridPosition,
        cost: i64,
        tick: Ticks,
    },

    // -- Junctions --
    SignalToggled {
        at: GridPosition,
        signal: Signal,
        tick: Ticks,
    },
    DirectionToggled {
        at: GridPosition,
        index: usize,
        tick: Ticks,
    },

    // -- Level --
    LevelEnded {
        rating: Fixed64,
        success: bool,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TrainSpawned,
    TrainCompleted,
    TrainMisguided,
    TrainDerailed,
    TrainDestroyed,
    TrainRetired,
    SmokeEmitted,
    PiecePlaced,
    PieceRemoved,
    TerrainCleared,
    SignalToggled,
    DirectionToggled,
    LevelEnded,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 13;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TrainSpawned { .. } => EventKind::TrainSpawned,
            Event::TrainCompleted { .. } => EventKind::TrainCompleted,
            Event::TrainMisguided { .. } => EventKind::TrainMisguided,
            Event::TrainDerailed { .. } => EventKind::TrainDerailed,
            Event::TrainDestroyed { .. } => EventKind::TrainDestroyed,
            Event::TrainRetired { .. } => EventKind::TrainRetired,
            Event::SmokeEmitted { .. } => EventKind::SmokeEmitted,
            Event::PiecePlaced { .. } => EventKind::PiecePlaced,
            Event::PieceRemoved { .. } => EventKind::PieceRemoved,
            Event::TerrainCleared { .. } => EventKind::TerrainCleared,
            Event::SignalToggled { .. } => EventKind::SignalToggled,
            Event::DirectionToggled { .. } => EventKind::DirectionToggled,
            Event::LevelEnded { .. } => EventKind::LevelEnded,
        }
    }

    pub fn tick(&self) -> Ticks {
        match self {
            Event::TrainSpawned { tick, .. }
            | Event::TrainCompleted { tick, .. }
            | Event::TrainMisguided { tick, .. }
            | Event::TrainDerailed { tick, .. }
            | Event::TrainDestroyed { tick, .. }
            | Event::TrainRetired { tick, .. }
            | Event::SmokeEmitted { tick, .. }
            | Event::PiecePlaced { tick, .. }
            | Event::PieceRemoved { tick, .. }
            | Event::TerrainCleared { tick, .. }
            | Event::SignalToggled { tick, .. }
            | Event::DirectionToggled { tick, .. }
            | Event::LevelEnded { tick, .. } => *tick,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// A reactive handler receives an event and returns zero or more commands
/// to run at the start of the next step.
pub type ReactiveHandler = Box<dyn FnMut(&Event) -> Vec<Command>>;

enum Subscriber {
    Passive(PassiveListener),
    Reactive(ReactiveHandler),
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events of the running step plus per-kind subscriber lists.
#[derive(Default)]
pub struct EventBus {
    /// Emitted since the last delivery, oldest first.
    pending: Vec<Event>,

    /// Per kind, in registration order.
    subscribers: [Vec<Subscriber>; EVENT_KIND_COUNT],

    /// Commands returned by reactive handlers during delivery. The context
    /// drains them into its command queue for the next step.
    pending_commands: Vec<Command>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("pending_commands", &self.pending_commands)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for delivery at the end of the step.
    pub fn emit(&mut self, event: Event) {
        self.pending.push(event);
    }

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.subscribers[kind.index()].push(Subscriber::Passive(listener));
    }

    pub fn on_reactive(&mut self, kind: EventKind, handler: ReactiveHandler) {
        self.subscribers[kind.index()].push(Subscriber::Reactive(handler));
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers[kind.index()].len()
    }

    /// Events waiting for the next delivery.
    pub fn pending(&self) -> &[Event] {
        &self.pending
    }

    /// Hand every queued event to the subscribers of its kind, then forget it.
    ///
    /// Events go out in emission order; each one reaches its subscribers in
    /// registration order.
    pub fn deliver(&mut self) {
        for event in std::mem::take(&mut self.pending) {
            for subscriber in &mut self.subscribers[event.kind().index()] {
                match subscriber {
                    Subscriber::Passive(listener) => listener(&event),
                    Subscriber::Reactive(handler) => {
                        self.pending_commands.extend(handler(&event));
                    }
                }
            }
        }
    }

    /// Take the commands collected from reactive handlers.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending_commands)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
