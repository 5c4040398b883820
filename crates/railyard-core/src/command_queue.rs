//! Player input as queued commands.
//!
//! Commands are queued by the host (UI clicks, scripts, replays, reactive
//! event handlers) and executed at the start of the next step so every run
//! of the same command stream produces the same simulation.

use crate::catalog::PieceKind;
use crate::context::SelectionMode;
use crate::id::EntryPointId;
use railyard_grid::GridPosition;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Pick the piece the construction cursor places.
    SelectPiece { kind: PieceKind },
    /// Rotate the construction cursor.
    Rotate,
    /// Place the selected piece anchored at `anchor`.
    Place { anchor: GridPosition },
    /// Drag-lay the selected straight piece between two tiles.
    LayStraight { from: GridPosition, to: GridPosition },
    /// Remove the piece or clear the terrain at `at`.
    Demolish { at: GridPosition },
    ToggleSignal { at: GridPosition },
    ToggleDirection { at: GridPosition },
    SpawnTrain { entry_point: EntryPointId },
    SetMode { mode: SelectionMode },
    /// Clear all trains and rewind schedules, keeping the built track.
    TryAgain,
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next step boundary, plus an optional bounded
/// history of executed commands.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    /// Executed commands as (tick, command).
    history: Vec<(u64, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue that retains up to `max_history` executed commands.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Drain all pending commands in submission order, recording them in
    /// history under `tick`.
    pub fn drain(&mut self, tick: u64) -> Vec<Command> {
        let commands = std::mem::take(&mut self.pending);

        if self.max_history > 0 {
            self.history
                .extend(commands.iter().map(|cmd| (tick, cmd.clone())));
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
