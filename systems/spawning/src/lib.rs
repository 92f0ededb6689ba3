#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting item spawn commands.
//!
//! The system accumulates virtual time while a session is active and makes
//! one spawn attempt per elapsed interval. Each attempt picks an empty cell
//! uniformly at random and a kind from a biased coin. The random source is
//! injected, so replays with the same seed produce the same spawns.

use std::time::Duration;

use grinch_smasher_core::{
    CellIndex, Command, Event, GridView, ItemKind, Phase, PRESENT_PROBABILITY, SPAWN_INTERVAL,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 0x4d59_5df4_d0f3_3173;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    present_probability: f64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            present_probability: PRESENT_PROBABILITY,
        }
    }

    /// Overrides the probability that a spawned item is a present.
    ///
    /// Values outside `0.0..=1.0` are clamped.
    #[must_use]
    pub fn with_present_probability(mut self, probability: f64) -> Self {
        self.present_probability = if probability.is_nan() {
            PRESENT_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Seed used to construct the default random source.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SPAWN_INTERVAL, DEFAULT_SEED)
    }
}

/// Pure system that emits spawn commands while a session is active.
#[derive(Debug)]
pub struct Spawning<R = ChaCha8Rng> {
    spawn_interval: Duration,
    present_probability: f64,
    accumulator: Duration,
    rng: R,
}

impl Spawning<ChaCha8Rng> {
    /// Creates a new spawning system seeded from the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.rng_seed))
    }
}

impl<R: Rng> Spawning<R> {
    /// Creates a new spawning system drawing randomness from `rng`.
    ///
    /// The seed stored in `config` is ignored.
    #[must_use]
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            present_probability: config.present_probability,
            accumulator: Duration::ZERO,
            rng,
        }
    }

    /// Consumes events and the current grid to emit spawn commands.
    ///
    /// The cadence restarts whenever a session starts and stays reset while no
    /// session is active, so a halted scheduler never carries time into the
    /// next session.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        grid: &GridView,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Active {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::SessionStarted { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();
        if spawn_attempts == 0 {
            return;
        }

        let mut empty_cells = grid.empty_cells();
        for _ in 0..spawn_attempts {
            let Some(cell) = self.select_cell(&mut empty_cells) else {
                break;
            };
            let kind = self.select_kind();
            out.push(Command::SpawnItem { cell, kind });
        }
    }

    /// Virtual time left until the next spawn attempt, if a session is active.
    #[must_use]
    pub fn time_until_next_spawn(&self, phase: Phase) -> Option<Duration> {
        if phase != Phase::Active || self.spawn_interval.is_zero() {
            return None;
        }
        Some(self.spawn_interval.saturating_sub(self.accumulator))
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_cell(&mut self, empty_cells: &mut Vec<CellIndex>) -> Option<CellIndex> {
        if empty_cells.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..empty_cells.len());
        Some(empty_cells.swap_remove(index))
    }

    fn select_kind(&mut self) -> ItemKind {
        if self.rng.gen_bool(self.present_probability) {
            ItemKind::Present
        } else {
            ItemKind::Grinch
        }
    }
}
