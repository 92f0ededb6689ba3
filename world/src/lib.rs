#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Grinch Smasher.
//!
//! The world owns the grid, the despawn timers, the score ledger, the session
//! clock and the game phase. Every mutation goes through [`apply`], which
//! processes one [`Command`] to completion before returning, so timer expiry,
//! taps and phase signals can never interleave.

pub mod clock;
pub mod grid;
pub mod score;
pub mod timers;

use std::time::Duration;

use grinch_smasher_core::{
    CellIndex, Command, Event, ItemKind, Phase, PhotoRef, Signal, SpawnError, CLOCK_INTERVAL,
    DESPAWN_WINDOW, GRID_SIZE, SESSION_DURATION_SECS,
};
use tracing::{debug, error, info};

pub use clock::SessionClock;
pub use grid::{Cell, Grid, GridError};
pub use score::ScoreLedger;
pub use timers::{DespawnTimers, TimerError};

/// Tuning parameters applied by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    grid_size: usize,
    session_duration_secs: u32,
    clock_interval: Duration,
    despawn_window: Duration,
}

impl Config {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub const fn new(
        grid_size: usize,
        session_duration_secs: u32,
        clock_interval: Duration,
        despawn_window: Duration,
    ) -> Self {
        Self {
            grid_size,
            session_duration_secs,
            clock_interval,
            despawn_window,
        }
    }

    /// Number of cells on the board.
    #[must_use]
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Seconds on the clock when a session starts.
    #[must_use]
    pub const fn session_duration_secs(&self) -> u32 {
        self.session_duration_secs
    }

    /// Time an untapped item stays on the board.
    #[must_use]
    pub const fn despawn_window(&self) -> Duration {
        self.despawn_window
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            GRID_SIZE,
            SESSION_DURATION_SECS,
            CLOCK_INTERVAL,
            DESPAWN_WINDOW,
        )
    }
}

/// Represents the authoritative Grinch Smasher session state.
#[derive(Debug)]
pub struct World {
    config: Config,
    phase: Phase,
    photo: Option<PhotoRef>,
    grid: Grid,
    despawn: DespawnTimers,
    score: ScoreLedger,
    clock: SessionClock,
    now: Duration,
}

impl World {
    /// Creates a new world waiting for a photo capture.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new world using the provided tuning.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            grid: Grid::new(config.grid_size),
            config,
            phase: Phase::Capturing,
            photo: None,
            despawn: DespawnTimers::new(),
            score: ScoreLedger::new(),
            clock: SessionClock::new(),
            now: Duration::ZERO,
        }
    }

    fn transition(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = to;
        info!(?from, ?to, "phase changed");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn ignore(&self, signal: Signal, out_events: &mut Vec<Event>) {
        debug!(?signal, phase = ?self.phase, "ignoring stale signal");
        out_events.push(Event::SignalIgnored {
            signal,
            phase: self.phase,
        });
    }

    fn capture_photo(&mut self, photo: PhotoRef, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Capturing {
            self.ignore(Signal::CapturePhoto, out_events);
            return;
        }

        self.photo = Some(photo.clone());
        out_events.push(Event::PhotoStored { photo });
        self.transition(Phase::Ready, out_events);
    }

    fn start_session(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Ready {
            self.ignore(Signal::StartSession, out_events);
            return;
        }

        self.score.reset();
        self.halt_timers();
        self.clock.start(
            self.config.session_duration_secs,
            self.now,
            self.config.clock_interval,
        );
        self.transition(Phase::Active, out_events);
        out_events.push(Event::SessionStarted {
            duration_secs: self.config.session_duration_secs,
        });

        // An active session always has a pending clock deadline.
        if !self.clock.is_running() {
            debug!(
                duration_secs = self.config.session_duration_secs,
                interval = ?self.config.clock_interval,
                "session clock cannot run, ending immediately"
            );
            self.end_session(out_events);
        }
    }

    fn replay(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Ended {
            self.ignore(Signal::Replay, out_events);
            return;
        }

        self.transition(Phase::Ready, out_events);
    }

    fn new_capture(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Capturing {
            self.ignore(Signal::NewCapture, out_events);
            return;
        }

        self.halt_timers();
        if self.photo.take().is_some() {
            out_events.push(Event::PhotoDiscarded);
        }
        self.transition(Phase::Capturing, out_events);
    }

    fn tap(&mut self, cell: CellIndex, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Active {
            self.ignore(Signal::TapCell, out_events);
            return;
        }

        let Some(kind) = self.grid.clear(cell) else {
            debug!(%cell, "tap on empty cell");
            return;
        };

        if !self.despawn.cancel(cell) {
            error!(%cell, "tapped item had no pending despawn timer");
        }
        let score = self.score.apply_tap(kind);
        debug!(%cell, ?kind, score, "item tapped");
        out_events.push(Event::CellTapped { cell, kind, score });
    }

    fn spawn(&mut self, cell: CellIndex, kind: ItemKind, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Active {
            debug!(%cell, ?kind, phase = ?self.phase, "spawn outside active session");
            out_events.push(Event::SpawnRejected {
                cell,
                kind,
                reason: SpawnError::InvalidPhase,
            });
            return;
        }

        if let Err(err) = self.grid.occupy(cell, kind) {
            error!(%err, "spawn violated grid invariant");
            let reason = match err {
                GridError::InvalidIndex(_) => SpawnError::InvalidIndex,
                GridError::Occupied(_) => SpawnError::Occupied,
            };
            out_events.push(Event::SpawnRejected { cell, kind, reason });
            return;
        }

        if let Err(err) = self
            .despawn
            .schedule(cell, self.now, self.config.despawn_window)
        {
            error!(%err, "spawn violated timer invariant");
            let _ = self.grid.clear(cell);
            out_events.push(Event::SpawnRejected {
                cell,
                kind,
                reason: SpawnError::DuplicateTimer,
            });
            return;
        }

        debug!(%cell, ?kind, at = ?self.now, "item spawned");
        out_events.push(Event::ItemSpawned { cell, kind });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        let target = self.now.saturating_add(dt);

        while let Some(at) = self.next_deadline() {
            if at > target {
                break;
            }
            self.now = at;
            self.fire_due(out_events);
        }

        self.now = target;
    }

    fn fire_due(&mut self, out_events: &mut Vec<Event>) {
        for cell in self.despawn.drain_due(self.now) {
            match self.grid.clear(cell) {
                Some(kind) => {
                    debug!(%cell, ?kind, "item despawned");
                    out_events.push(Event::ItemDespawned { cell, kind });
                }
                None => error!(%cell, "despawn timer fired for an empty cell"),
            }
        }

        if self.clock.next_deadline() == Some(self.now) {
            self.clock.tick();
            out_events.push(Event::ClockTicked {
                remaining_secs: self.clock.remaining_secs(),
            });
            if self.clock.is_expired() {
                self.end_session(out_events);
            }
        }
    }

    fn end_session(&mut self, out_events: &mut Vec<Event>) {
        self.halt_timers();
        let final_score = self.score.value();
        self.transition(Phase::Ended, out_events);
        info!(final_score, "session ended");
        out_events.push(Event::SessionEnded { final_score });
    }

    fn halt_timers(&mut self) {
        self.clock.stop();
        let cancelled = self.despawn.cancel_all();
        self.grid.clear_all();
        if cancelled > 0 {
            debug!(cancelled, "cancelled pending despawn timers");
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        match (self.despawn.next_deadline(), self.clock.next_deadline()) {
            (Some(despawn), Some(clock)) => Some(despawn.min(clock)),
            (despawn, clock) => despawn.or(clock),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::CapturePhoto { photo } => world.capture_photo(photo, out_events),
        Command::StartSession => world.start_session(out_events),
        Command::Replay => world.replay(out_events),
        Command::NewCapture => world.new_capture(out_events),
        Command::TapCell { cell } => world.tap(cell, out_events),
        Command::SpawnItem { cell, kind } => world.spawn(cell, kind, out_events),
        Command::Tick { dt } => world.advance(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use grinch_smasher_core::{GridView, Phase, PhotoRef};

    use super::{DespawnTimers, Grid, SessionClock, World};

    /// Current phase of the game flow.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score.value()
    }

    /// Seconds left on the session clock.
    ///
    /// Before a session starts this reports the full session duration, which is
    /// what the next session will begin with.
    #[must_use]
    pub fn time_remaining_secs(world: &World) -> u32 {
        match world.phase {
            Phase::Active | Phase::Ended => world.clock.remaining_secs(),
            Phase::Capturing | Phase::Ready => world.config.session_duration_secs(),
        }
    }

    /// Captures a read-only view of every cell in index order.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView {
        world.grid.view()
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Photo reference stored by the last capture, if any.
    #[must_use]
    pub fn photo(world: &World) -> Option<&PhotoRef> {
        world.photo.as_ref()
    }

    /// Virtual time elapsed since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Virtual time of the next despawn or clock deadline.
    #[must_use]
    pub fn next_deadline(world: &World) -> Option<Duration> {
        world.next_deadline()
    }

    /// Provides read-only access to the pending despawn timers.
    #[must_use]
    pub fn despawn_timers(world: &World) -> &DespawnTimers {
        &world.despawn
    }

    /// Provides read-only access to the session clock.
    #[must_use]
    pub fn clock(world: &World) -> &SessionClock {
        &world.clock
    }
}
