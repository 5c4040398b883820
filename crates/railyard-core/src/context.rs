//! The simulation context: one level's board, trains and bookkeeping,
//! advanced one fixed step at a time.
//!
//! # Step Pipeline
//!
//! Each call to [`SimulationContext::step`] runs:
//!
//! 1. **Commands** -- Execute queued player commands, including those
//!    returned by reactive event handlers during the previous step.
//! 2. **Trains** -- In Simulate mode, advance every train in spawn order.
//!    Trains that hit a dead end derail (or retire, after arriving).
//! 3. **Overlap** -- Track entry point zones, classify arrivals, and
//!    destroy trains whose cars collided.
//! 4. **Level end** -- Rate the run once no scheduled train is left open.
//! 5. **Delivery** -- Deliver buffered events to subscribers.
//! 6. **Bookkeeping** -- Advance the tick counter and the state hash.
//!
//! Construction and routing changes can also be made directly through the
//! methods below; they take effect immediately.

use crate::catalog::PieceKind;
use crate::collision::{self, Arrival};
use crate::command_queue::{Command, CommandQueue};
use crate::construction::{
    ConstructionCursor, ConstructionError, ConstructionValidator, Demolition, Placement,
    StraightRun,
};
use crate::entry_point::{EntryPoint, SpawnError};
use crate::error::RailError;
use crate::event::{Event, EventBus, EventKind, PassiveListener, ReactiveHandler};
use crate::fixed::{Fixed64, Ticks};
use crate::id::{EntryPointId, TrainHandle};
use crate::level::LevelDescriptor;
use crate::network::TrackNetwork;
use crate::path::Signal;
use crate::rng::SimRng;
use crate::scoring::{Benchmarks, NullSink, Rating, Scoreboard, ScoringSink};
use crate::sim::{AdvanceResult, SimConfig, SimState, StateHash};
use crate::train::{Train, TrainStep};
use railyard_grid::{GridModel, GridPosition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

// ---------------------------------------------------------------------------
// Modes and notifications
// ---------------------------------------------------------------------------

/// What player input currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Construction screen with no tool active.
    #[default]
    Free,
    Build,
    Demolish,
    Simulate,
    /// A menu is open; the board ignores input and trains are held.
    Menu,
}

impl SelectionMode {
    pub fn is_construction(self) -> bool {
        matches!(
            self,
            SelectionMode::Free | SelectionMode::Build | SelectionMode::Demolish
        )
    }
}

/// A short message for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub tick: Ticks,
}

const MSG_SPAWNED: &str = "A new train has spawned!";
const MSG_DERAILED: &str = "Train has derailed!";
const MSG_MISGUIDED: &str = "A train has been misguided to another destination!";
const MSG_COMPLETED: &str = "Train has successfully reached destination!";

/// Why a train left play.
enum Departure {
    Derailed(GridPosition),
    Retired,
    Collided { at: GridPosition, derailed: bool },
}

// ---------------------------------------------------------------------------
// SimulationContext
// ---------------------------------------------------------------------------

/// One level in play. Outcomes go to the built-in [`Scoreboard`] and to the
/// host's sink `S`.
pub struct SimulationContext<S: ScoringSink = NullSink> {
    pub config: SimConfig,
    name: String,
    benchmarks: Benchmarks,

    grid: GridModel,
    network: TrackNetwork,
    validator: ConstructionValidator,
    cursor: ConstructionCursor,
    entry_points: BTreeMap<EntryPointId, EntryPoint>,

    /// Live trains in spawn order.
    trains: Vec<Train>,
    next_handle: u64,

    mode: SelectionMode,
    /// True between entering Simulate and the next reset, so a paused run
    /// resumes rather than restarts.
    run_active: bool,
    level_ended: bool,
    last_rating: Option<Rating>,

    state: SimState,
    rng: SimRng,
    scoreboard: Scoreboard,
    sink: S,
    events: EventBus,
    commands: CommandQueue,
    notifications: VecDeque<Notification>,
    last_hash: u64,
}

impl<S: ScoringSink> std::fmt::Debug for SimulationContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("trains", &self.trains.len())
            .field("scoreboard", &self.scoreboard)
            .finish_non_exhaustive()
    }
}

impl SimulationContext<NullSink> {
    pub fn new(level: &LevelDescriptor, config: SimConfig) -> Result<Self, RailError> {
        Self::with_sink(level, config, NullSink)
    }
}

impl<S: ScoringSink> SimulationContext<S> {
    /// Set up `level` reporting outcomes to `sink` as well.
    pub fn with_sink(
        level: &LevelDescriptor,
        config: SimConfig,
        sink: S,
    ) -> Result<Self, RailError> {
        let mut grid = level.build_grid()?;
        let mut network = TrackNetwork::new();
        let mut entry_points = BTreeMap::new();
        for spec in &level.entry_points {
            if entry_points.contains_key(&spec.id) {
                return Err(RailError::DuplicateEntryPoint(spec.id));
            }
            let ep = EntryPoint::install(
                &mut grid,
                &mut network,
                spec.id,
                spec.origin,
                spec.exit,
                spec.schedule.clone(),
            )?;
            entry_points.insert(spec.id, ep);
        }

        let mut scoreboard = Scoreboard::new();
        scoreboard.start_level(level.total_trains());
        log::info!(
            "loaded level '{}' ({}x{}, {} entry points, {} trains)",
            level.name,
            grid.rows(),
            grid.columns(),
            entry_points.len(),
            level.total_trains()
        );

        Ok(Self {
            name: level.name.clone(),
            benchmarks: level.benchmarks.clone(),
            grid,
            network,
            validator: ConstructionValidator::new(),
            cursor: ConstructionCursor::default(),
            entry_points,
            trains: Vec::new(),
            next_handle: 1,
            mode: SelectionMode::Free,
            run_active: false,
            level_ended: false,
            last_rating: None,
            state: SimState::new(),
            rng: SimRng::new(config.seed),
            scoreboard,
            sink,
            events: EventBus::new(),
            commands: CommandQueue::with_max_history(config.command_history),
            notifications: VecDeque::new(),
            last_hash: 0,
            config,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn benchmarks(&self) -> &Benchmarks {
        &self.benchmarks
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn network(&self) -> &TrackNetwork {
        &self.network
    }

    pub fn validator(&self) -> &ConstructionValidator {
        &self.validator
    }

    pub fn cursor(&self) -> &ConstructionCursor {
        &self.cursor
    }

    pub fn entry_point(&self, id: EntryPointId) -> Option<&EntryPoint> {
        self.entry_points.get(&id)
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entry_points.values()
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn train(&self, handle: TrainHandle) -> Option<&Train> {
        self.trains.iter().find(|t| t.handle == handle)
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Level clock in seconds.
    pub fn elapsed(&self) -> Fixed64 {
        Fixed64::from_num(self.state.sim_ticks) * Fixed64::from_num(self.config.tick_seconds)
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn level_ended(&self) -> bool {
        self.level_ended
    }

    pub fn last_rating(&self) -> Option<&Rating> {
        self.last_rating.as_ref()
    }

    /// Hash computed at the end of the last step.
    pub fn state_hash(&self) -> u64 {
        self.last_hash
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn command_history(&self) -> &[(u64, Command)] {
        self.commands.history()
    }

    // -----------------------------------------------------------------------
    // Event system
    // -----------------------------------------------------------------------

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.events.on_passive(kind, listener);
    }

    pub fn on_reactive(&mut self, kind: EventKind, handler: ReactiveHandler) {
        self.events.on_reactive(kind, handler);
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notification: {message}");
        self.notifications.push_back(Notification {
            message,
            tick: self.state.tick,
        });
    }

    fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }

    fn report_cost(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.scoreboard.report_construction_cost(delta);
        self.sink.report_construction_cost(delta);
    }

    fn report_derailed(&mut self) {
        self.scoreboard.report_derailed();
        self.sink.report_derailed();
        self.notify(MSG_DERAILED);
    }

    fn report_misguided(&mut self) {
        self.scoreboard.report_misguided();
        self.sink.report_misguided();
        self.notify(MSG_MISGUIDED);
    }

    fn report_completed(&mut self) {
        self.scoreboard.report_completed();
        self.sink.report_completed();
        self.notify(MSG_COMPLETED);
    }

    // -----------------------------------------------------------------------
    // Modes
    // -----------------------------------------------------------------------

    /// Switch modes. Entering Simulate starts a fresh run unless a paused
    /// run is being resumed; leaving Simulate for a construction mode
    /// abandons the run as [`Self::try_again`] does.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode == self.mode {
            return;
        }
        match (self.mode, mode) {
            (SelectionMode::Menu, SelectionMode::Simulate) if self.run_active => {
                self.mode = mode;
            }
            (_, SelectionMode::Simulate) => self.go_to_simulation(),
            (SelectionMode::Simulate, SelectionMode::Menu) => self.mode = mode,
            (_, next) if self.run_active && next.is_construction() => self.reset_run(next),
            (_, next) => self.mode = next,
        }
        log::debug!("mode is now {:?}", self.mode);
    }

    /// Start the level clock and clear the run counters.
    pub fn go_to_simulation(&mut self) {
        self.state.sim_ticks = 0;
        self.scoreboard.reset_run();
        self.level_ended = false;
        self.last_rating = None;
        self.run_active = true;
        self.mode = SelectionMode::Simulate;
        log::info!("simulation started on '{}'", self.name);
    }

    /// Destroy every train, rewind every schedule and go back to
    /// construction. Track and construction cost are kept.
    pub fn try_again(&mut self) {
        self.reset_run(SelectionMode::Free);
    }

    fn reset_run(&mut self, mode: SelectionMode) {
        let tick = self.state.tick;
        for mut train in std::mem::take(&mut self.trains) {
            train.release();
            self.events.emit(Event::TrainDestroyed {
                train: train.handle,
                tick,
            });
        }
        for ep in self.entry_points.values_mut() {
            ep.reset();
        }
        let total = self.entry_points.values().map(|ep| ep.schedule().len()).sum();
        self.scoreboard.start_level(total);
        self.state.sim_ticks = 0;
        self.level_ended = false;
        self.run_active = false;
        self.mode = mode;
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Choose the piece to build. Selecting from Free switches to Build.
    pub fn select_piece(&mut self, kind: PieceKind) -> Result<(), RailError> {
        if !self.mode.is_construction() {
            return Err(ConstructionError::WrongMode(self.mode).into());
        }
        self.cursor.select(kind);
        if self.mode == SelectionMode::Free {
            self.mode = SelectionMode::Build;
        }
        Ok(())
    }

    pub fn rotate_cursor(&mut self) {
        self.cursor.rotate();
    }

    fn require_mode(&self, mode: SelectionMode) -> Result<(), ConstructionError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(ConstructionError::WrongMode(self.mode))
        }
    }

    /// Place the cursor's piece anchored at `anchor`.
    pub fn place(&mut self, anchor: GridPosition) -> Result<Placement, RailError> {
        self.require_mode(SelectionMode::Build)?;
        let kind = self.cursor.kind().ok_or(ConstructionError::NoPieceSelected)?;
        let placement = self.validator.try_place(
            &mut self.grid,
            &mut self.network,
            kind,
            self.cursor.rotation(),
            anchor,
        )?;
        self.report_cost(placement.cost);
        self.emit(Event::PiecePlaced {
            piece: placement.piece,
            kind,
            anchor,
            cost: placement.cost,
            tick: self.state.tick,
        });
        Ok(placement)
    }

    /// Drag-lay the cursor's straight piece from `from` to `to`. Any other
    /// piece is placed once at `to`.
    pub fn lay_straight(
        &mut self,
        from: GridPosition,
        to: GridPosition,
    ) -> Result<StraightRun, RailError> {
        self.require_mode(SelectionMode::Build)?;
        let kind = self.cursor.kind().ok_or(ConstructionError::NoPieceSelected)?;
        if !kind.is_straight() {
            let placement = self.place(to)?;
            return Ok(StraightRun {
                laid: vec![to],
                cost: placement.cost,
                obstructed_at: None,
            });
        }

        let horizontal = kind == PieceKind::StraightHorizontal;
        let run = self.validator.lay_straight(
            &mut self.grid,
            &mut self.network,
            from,
            to,
            horizontal,
        )?;
        self.report_cost(run.cost);
        for &pos in &run.laid {
            if let Some((piece, _)) = self.validator.piece_at(pos) {
                self.events.emit(Event::PiecePlaced {
                    piece,
                    kind,
                    anchor: pos,
                    cost: kind.cost(),
                    tick: self.state.tick,
                });
            }
        }
        if let Some(pos) = run.obstructed_at {
            self.notify(ConstructionError::Obstructed(pos).to_string());
        }
        Ok(run)
    }

    /// Remove the piece covering `at`, or clear its forest or rock.
    pub fn demolish(&mut self, at: GridPosition) -> Result<Demolition, RailError> {
        self.require_mode(SelectionMode::Demolish)?;
        let owner = self.validator.piece_at(at).map(|(id, _)| id);
        let demolition = self
            .validator
            .demolish(&mut self.grid, &mut self.network, at)?;
        match &demolition {
            Demolition::Piece(piece) => {
                if let Some(id) = owner {
                    self.emit(Event::PieceRemoved {
                        piece: id,
                        kind: piece.kind,
                        anchor: piece.anchor,
                        tick: self.state.tick,
                    });
                }
            }
            Demolition::Terrain { cost, .. } => {
                self.report_cost(*cost);
                self.emit(Event::TerrainCleared {
                    at,
                    cost: *cost,
                    tick: self.state.tick,
                });
            }
        }
        Ok(demolition)
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    pub fn toggle_signal(&mut self, at: GridPosition) -> Result<Signal, RailError> {
        if self.mode == SelectionMode::Menu {
            return Err(RailError::WrongMode(self.mode));
        }
        let signal = self.network.toggle_signal(at)?;
        self.emit(Event::SignalToggled {
            at,
            signal,
            tick: self.state.tick,
        });
        Ok(signal)
    }

    pub fn toggle_direction(&mut self, at: GridPosition) -> Result<usize, RailError> {
        if self.mode == SelectionMode::Menu {
            return Err(RailError::WrongMode(self.mode));
        }
        let index = self.network.toggle_direction(at)?;
        self.emit(Event::DirectionToggled {
            at,
            index,
            tick: self.state.tick,
        });
        Ok(index)
    }

    // -----------------------------------------------------------------------
    // Trains
    // -----------------------------------------------------------------------

    /// Spawn the next scheduled train of `entry_point`.
    pub fn spawn_train(&mut self, entry_point: EntryPointId) -> Result<TrainHandle, RailError> {
        if self.mode != SelectionMode::Simulate {
            return Err(SpawnError::WrongMode(self.mode).into());
        }
        let ep = self
            .entry_points
            .get_mut(&entry_point)
            .ok_or(SpawnError::UnknownEntryPoint(entry_point))?;
        let handle = TrainHandle(self.next_handle);
        let train = ep.spawn(handle, &self.config, &mut self.rng)?;
        self.next_handle += 1;

        log::info!(
            "train {} spawned at {} bound for {} with {} cars",
            train.id.0,
            entry_point,
            train.destination,
            train.cars.len()
        );
        self.scoreboard.record_spawn();
        self.emit(Event::TrainSpawned {
            train: handle,
            id: train.id,
            origin: entry_point,
            destination: train.destination,
            tick: self.state.tick,
        });
        self.notify(MSG_SPAWNED);
        self.trains.push(train);
        Ok(handle)
    }

    fn depart(&mut self, mut train: Train, departure: Departure) {
        train.release();
        collision::release_zones(&mut train, &mut self.entry_points);
        let tick = self.state.tick;
        match departure {
            Departure::Derailed(at) | Departure::Collided { at, derailed: true } => {
                log::info!("train {} derailed at {at}", train.id.0);
                self.report_derailed();
                self.emit(Event::TrainDerailed {
                    train: train.handle,
                    at,
                    tick,
                });
            }
            Departure::Collided { derailed: false, .. } => {}
            Departure::Retired => {
                self.emit(Event::TrainRetired {
                    train: train.handle,
                    tick,
                });
            }
        }
        self.emit(Event::TrainDestroyed {
            train: train.handle,
            tick,
        });
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the start of the next step.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.push_batch(commands);
    }

    /// Run a command now.
    pub fn execute(&mut self, command: Command) -> Result<(), RailError> {
        match command {
            Command::SelectPiece { kind } => self.select_piece(kind)?,
            Command::Rotate => self.rotate_cursor(),
            Command::Place { anchor } => {
                self.place(anchor)?;
            }
            Command::LayStraight { from, to } => {
                self.lay_straight(from, to)?;
            }
            Command::Demolish { at } => {
                self.demolish(at)?;
            }
            Command::ToggleSignal { at } => {
                self.toggle_signal(at)?;
            }
            Command::ToggleDirection { at } => {
                self.toggle_direction(at)?;
            }
            Command::SpawnTrain { entry_point } => {
                self.spawn_train(entry_point)?;
            }
            Command::SetMode { mode } => self.set_mode(mode),
            Command::TryAgain => self.try_again(),
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run `steps` simulation steps.
    pub fn advance(&mut self, steps: u64) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        for _ in 0..steps {
            self.step_internal(&mut result);
        }
        result
    }

    /// Run a single simulation step.
    pub fn step(&mut self) -> AdvanceResult {
        self.advance(1)
    }

    fn step_internal(&mut self, result: &mut AdvanceResult) {
        self.phase_commands(result);
        let mut outcomes = 0;
        if self.mode == SelectionMode::Simulate {
            if !self.level_ended {
                self.state.sim_ticks += 1;
            }
            outcomes += self.phase_trains();
            outcomes += self.phase_overlap();
        }
        if outcomes > 0 {
            self.check_level_end(result);
        }
        self.phase_delivery();
        self.phase_bookkeeping();
        result.steps_run += 1;
    }

    // -----------------------------------------------------------------------
    // Phase 1: Commands
    // -----------------------------------------------------------------------

    fn phase_commands(&mut self, result: &mut AdvanceResult) {
        for command in self.commands.drain(self.state.tick) {
            if let Err(err) = self.execute(command.clone()) {
                log::debug!("command {command:?} rejected: {err}");
                let message = err.to_string();
                self.notify(message.clone());
                result.rejected.push(message);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase 2: Trains
    // -----------------------------------------------------------------------

    /// Returns the number of reported outcomes.
    fn phase_trains(&mut self) -> usize {
        let mut gone = Vec::new();
        for i in 0..self.trains.len() {
            let train = &mut self.trains[i];
            let tick = train.tick(&self.grid, &mut self.network, &self.config, &mut self.rng);
            if tick.smoke_emitted {
                self.events.emit(Event::SmokeEmitted {
                    train: train.handle,
                    tick: self.state.tick,
                });
            }
            match tick.step {
                TrainStep::Moving => {}
                TrainStep::Derailed => {
                    gone.push((i, Departure::Derailed(train.segment().destination)));
                }
                TrainStep::Retired => gone.push((i, Departure::Retired)),
            }
        }

        let mut removed = Vec::with_capacity(gone.len());
        for (i, departure) in gone.into_iter().rev() {
            removed.push((self.trains.remove(i), departure));
        }

        let mut outcomes = 0;
        for (train, departure) in removed.into_iter().rev() {
            if matches!(departure, Departure::Derailed(_)) {
                outcomes += 1;
            }
            self.depart(train, departure);
        }
        outcomes
    }

    // -----------------------------------------------------------------------
    // Phase 3: Overlap
    // -----------------------------------------------------------------------

    fn phase_overlap(&mut self) -> usize {
        let mut outcomes = 0;
        let tick = self.state.tick;

        for arrival in collision::update_zones(&mut self.trains, &mut self.entry_points) {
            outcomes += 1;
            match arrival {
                Arrival::Completed { train, entry_point } => {
                    self.report_completed();
                    self.emit(Event::TrainCompleted {
                        train,
                        entry_point,
                        tick,
                    });
                }
                Arrival::Misguided { train, entry_point } => {
                    self.report_misguided();
                    self.emit(Event::TrainMisguided {
                        train,
                        entry_point,
                        tick,
                    });
                }
            }
        }

        for hit in collision::detect_collisions(&self.trains) {
            let Some(i) = self.trains.iter().position(|t| t.handle == hit.train) else {
                continue;
            };
            if hit.derailed {
                outcomes += 1;
            }
            let train = self.trains.remove(i);
            self.depart(
                train,
                Departure::Collided {
                    at: hit.at,
                    derailed: hit.derailed,
                },
            );
        }
        outcomes
    }

    // -----------------------------------------------------------------------
    // Phase 4: Level end
    // -----------------------------------------------------------------------

    fn check_level_end(&mut self, result: &mut AdvanceResult) {
        if self.level_ended || !self.scoreboard.level_over() {
            return;
        }
        let rating = self.scoreboard.rate(&self.benchmarks, self.elapsed());
        self.level_ended = true;
        self.last_rating = Some(rating);
        result.level_ended = true;
        log::info!(
            "level '{}' ended after {} ticks, rating {:.2}",
            self.name,
            self.state.sim_ticks,
            rating.total.to_num::<f64>()
        );
        self.emit(Event::LevelEnded {
            rating: rating.total,
            success: self.scoreboard.success,
            tick: self.state.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Phase 5: Delivery
    // -----------------------------------------------------------------------

    fn phase_delivery(&mut self) {
        self.events.deliver();
        let reactions = self.events.drain_commands();
        self.commands.push_batch(reactions);
    }

    // -----------------------------------------------------------------------
    // Phase 6: Bookkeeping
    // -----------------------------------------------------------------------

    fn phase_bookkeeping(&mut self) {
        self.state.tick += 1;
        self.last_hash = self.compute_state_hash();
    }

    fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.state.tick);
        hasher.write_u64(self.state.sim_ticks);
        hasher.write_u64(self.rng.state());

        for train in &self.trains {
            train.hash_into(&mut hasher);
        }

        for (pos, junction) in self.network.junctions() {
            hasher.write_i32(pos.x);
            hasher.write_i32(pos.y);
            hasher.write_u32(junction.signal_direction() as u32);
            hasher.write(&[junction.stop_signal() as u8]);
        }

        for ep in self.entry_points.values() {
            hasher.write_u32(ep.id().0);
            hasher.write_u32(ep.occupancy());
            hasher.write_u32(ep.remaining() as u32);
        }

        let board = &self.scoreboard;
        hasher.write_u32(board.derailed);
        hasher.write_u32(board.misguided);
        hasher.write_u32(board.completed);
        hasher.write_u64(board.construction_cost as u64);
        hasher.finish()
    }
}
