#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Grinch Smasher headlessly.
//!
//! A simulated player taps the board while virtual time advances frame by
//! frame. The best score is kept in a TOML file between runs.

mod autoplay;
mod board;
mod config;
mod store;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use grinch_smasher_core::{Event, ItemKind, Phase, PhotoRef, SPAWN_INTERVAL};
use grinch_smasher_session::{Session, SessionObserver, SessionSnapshot};
use grinch_smasher_system_high_score::{HighScore, KeyValueStore, SessionResult};
use grinch_smasher_system_spawning::Config as SpawnConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    autoplay::AutoPlayer,
    config::{Args, Settings},
    store::FileStore,
};

const PLAYER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Entry point for the Grinch Smasher command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    let settings = Settings::resolve(&args)?;
    run(&settings)
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

fn run(settings: &Settings) -> Result<()> {
    let mut store = FileStore::open(&settings.high_score_file).with_context(|| {
        format!(
            "failed to open high score file {}",
            settings.high_score_file.display()
        )
    })?;
    let mut high_score = HighScore::load(&store).context("failed to load the high score")?;
    info!(
        best = high_score.best(),
        path = %store.path().display(),
        "loaded high score"
    );

    let mut session = Session::new(
        SpawnConfig::new(SPAWN_INTERVAL, settings.seed),
        Console::default(),
    )
    .with_event_journal();
    let mut player = AutoPlayer::new(
        settings.reaction,
        settings.accuracy,
        ChaCha8Rng::seed_from_u64(settings.seed ^ PLAYER_SEED_SALT),
    );

    session.on_photo_captured(PhotoRef::new(settings.photo.clone()));
    for round in 1..=settings.sessions {
        if round > 1 {
            session.on_replay_requested();
        }
        let stats = play_session(
            &mut session,
            &mut player,
            settings.frame,
            &mut high_score,
            &mut store,
        );
        let final_score = session.score();
        let (best, new_record) = stats
            .result
            .map_or((high_score.best(), false), |result| {
                (result.best, result.is_new_record)
            });

        println!("{}", board::render(&session.snapshot(), best));
        println!(
            "session {round}: score {final_score}{} | {} spawned, {} grinches smashed, {} presents hit, {} escaped",
            if new_record { " (new record)" } else { "" },
            stats.spawned,
            stats.grinches_hit,
            stats.presents_hit,
            stats.escaped,
        );
    }

    Ok(())
}

fn play_session<R: Rng, S: KeyValueStore>(
    session: &mut Session<Console>,
    player: &mut AutoPlayer<R>,
    frame: Duration,
    high_score: &mut HighScore,
    store: &mut S,
) -> SessionStats {
    player.reset();
    session.on_start_requested();

    let mut stats = SessionStats::default();
    let mut elapsed = Duration::ZERO;
    loop {
        let events = session.take_events();
        stats.record(&events);
        match high_score.handle(&events, store) {
            Ok(results) => stats.result = results.last().copied().or(stats.result),
            Err(err) => warn!(%err, "failed to persist the high score"),
        }
        if session.phase() != Phase::Active {
            break;
        }

        session.advance(frame);
        elapsed += frame;
        for cell in player.plan_taps(&session.grid(), elapsed) {
            session.on_cell_tapped(cell);
        }
    }
    stats
}

/// Tallies of what happened during one session.
#[derive(Debug, Default)]
struct SessionStats {
    spawned: usize,
    grinches_hit: usize,
    presents_hit: usize,
    escaped: usize,
    result: Option<SessionResult>,
}

impl SessionStats {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ItemSpawned { .. } => self.spawned += 1,
                Event::CellTapped {
                    kind: ItemKind::Grinch,
                    ..
                } => self.grinches_hit += 1,
                Event::CellTapped {
                    kind: ItemKind::Present,
                    ..
                } => self.presents_hit += 1,
                Event::ItemDespawned { .. } => self.escaped += 1,
                _ => {}
            }
        }
    }
}

/// Observer that traces every state change.
#[derive(Debug, Default)]
struct Console {
    updates: usize,
}

impl SessionObserver for Console {
    fn on_state_changed(&mut self, snapshot: &SessionSnapshot) {
        self.updates += 1;
        trace!(
            phase = ?snapshot.phase,
            score = snapshot.score,
            remaining = snapshot.time_remaining_secs,
            "state changed"
        );
    }

    fn on_session_ended(&mut self, final_score: u32) {
        info!(final_score, updates = self.updates, "session over");
    }
}
