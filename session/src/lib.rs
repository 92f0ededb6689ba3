#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session driver that connects the presentation layer to the world.
//!
//! Every inbound signal becomes a [`Command`] on a single-consumer queue. The
//! queue is drained to completion before a signal handler returns, and the
//! events produced by each command are fed to the spawning system before the
//! next command is taken, so spawn ticks, despawn expiry, clock ticks and taps
//! are strictly serialized.
//!
//! Time is virtual. [`Session::advance`] splits the requested duration at every
//! despawn, clock and spawn deadline, so each timer fires at its exact instant
//! regardless of how coarse the host's frame timing is.
//!
//! Hosts normally follow state through [`SessionObserver`]. Recording the raw
//! event stream is opt-in through [`Session::with_event_journal`]; a journaling
//! host must drain it with [`Session::take_events`].

use std::{collections::VecDeque, time::Duration};

use grinch_smasher_core::{CellIndex, Command, Event, GridView, Phase, PhotoRef};
use grinch_smasher_system_spawning::{Config as SpawnConfig, Spawning};
use grinch_smasher_world::{self as world, query, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Read-only state pushed to the presentation layer after every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current phase of the game flow.
    pub phase: Phase,
    /// Current score.
    pub score: u32,
    /// Seconds left on the clock.
    pub time_remaining_secs: u32,
    /// Every cell in index order.
    pub grid: GridView,
    /// Photo stored by the last capture, if any.
    pub photo: Option<PhotoRef>,
}

/// Receives state updates and session results from a [`Session`].
pub trait SessionObserver {
    /// Called after every processed command with the resulting state.
    fn on_state_changed(&mut self, _snapshot: &SessionSnapshot) {}

    /// Called once per session when the clock runs out.
    ///
    /// High-score comparison and persistence belong to the implementor.
    fn on_session_ended(&mut self, _final_score: u32) {}
}

impl SessionObserver for () {}

/// Serializing driver around the world and the spawning system.
#[derive(Debug)]
pub struct Session<O, R = ChaCha8Rng> {
    world: World,
    spawning: Spawning<R>,
    observer: O,
    queue: VecDeque<Command>,
    journal: Option<Vec<Event>>,
}

impl<O: SessionObserver> Session<O, ChaCha8Rng> {
    /// Creates a session with a default world and a seeded spawning system.
    #[must_use]
    pub fn new(spawn_config: SpawnConfig, observer: O) -> Self {
        Self::from_parts(World::new(), Spawning::new(spawn_config), observer)
    }
}

impl<O: SessionObserver, R: Rng> Session<O, R> {
    /// Assembles a session from an existing world and spawning system.
    #[must_use]
    pub fn from_parts(world: World, spawning: Spawning<R>, observer: O) -> Self {
        Self {
            world,
            spawning,
            observer,
            queue: VecDeque::new(),
            journal: None,
        }
    }

    /// Records every event produced from now on until drained by
    /// [`Session::take_events`].
    #[must_use]
    pub fn with_event_journal(mut self) -> Self {
        self.journal = Some(Vec::new());
        self
    }

    /// The capture collaborator produced a photo.
    pub fn on_photo_captured(&mut self, photo: PhotoRef) {
        self.submit(Command::CapturePhoto { photo });
    }

    /// The player asked to start a session.
    pub fn on_start_requested(&mut self) {
        self.submit(Command::StartSession);
    }

    /// The player asked to play again with the same photo.
    pub fn on_replay_requested(&mut self) {
        self.submit(Command::Replay);
    }

    /// The player asked to retake the photo.
    pub fn on_new_capture_requested(&mut self) {
        self.submit(Command::NewCapture);
    }

    /// The player tapped a cell.
    pub fn on_cell_tapped(&mut self, cell: CellIndex) {
        self.submit(Command::TapCell { cell });
    }

    /// Lets `dt` of virtual time pass.
    pub fn advance(&mut self, dt: Duration) {
        let mut remaining = dt;
        while !remaining.is_zero() {
            let step = self.next_step(remaining);
            self.submit(Command::Tick { dt: step });
            remaining = remaining.saturating_sub(step);
        }
    }

    /// Current phase of the game flow.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Seconds left on the clock.
    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        query::time_remaining_secs(&self.world)
    }

    /// Ordered cell states.
    #[must_use]
    pub fn grid(&self) -> GridView {
        query::grid_view(&self.world)
    }

    /// Photo stored by the last capture, if any.
    #[must_use]
    pub fn photo(&self) -> Option<&PhotoRef> {
        query::photo(&self.world)
    }

    /// Captures the full presentation state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            score: self.score(),
            time_remaining_secs: self.time_remaining_secs(),
            grid: self.grid(),
            photo: self.photo().cloned(),
        }
    }

    /// Provides read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Borrows the observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrows the observer.
    #[must_use]
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Drains the events recorded since the previous call.
    ///
    /// Always empty unless the journal was enabled.
    #[must_use]
    pub fn take_events(&mut self) -> Vec<Event> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn next_step(&self, remaining: Duration) -> Duration {
        let now = query::now(&self.world);
        let deadlines = [
            query::next_deadline(&self.world).map(|deadline| deadline.saturating_sub(now)),
            self.spawning.time_until_next_spawn(self.phase()),
        ];

        deadlines
            .into_iter()
            .flatten()
            .filter(|until| !until.is_zero())
            .fold(remaining, Duration::min)
    }

    fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
        while let Some(command) = self.queue.pop_front() {
            trace!(?command, "processing command");
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            self.dispatch(events);
        }
    }

    fn dispatch(&mut self, events: Vec<Event>) {
        let mut commands = Vec::new();
        self.spawning.handle(
            &events,
            self.phase(),
            &query::grid_view(&self.world),
            &mut commands,
        );
        // Spawns belong to the current instant and run before later signals.
        for command in commands.into_iter().rev() {
            self.queue.push_front(command);
        }

        for event in &events {
            if let Event::SessionEnded { final_score } = event {
                self.observer.on_session_ended(*final_score);
            }
        }
        if let Some(journal) = self.journal.as_mut() {
            journal.extend(events);
        }

        let snapshot = self.snapshot();
        self.observer.on_state_changed(&snapshot);
    }
}
