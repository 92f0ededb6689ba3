#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! High-score bookkeeping on top of an external key-value store.
//!
//! The best score is read once when the system is created and written only
//! when a finished session beats it. The store itself is provided by the host
//! through [`KeyValueStore`].

use std::collections::HashMap;

use grinch_smasher_core::Event;
use thiserror::Error;

/// Name under which the best score is persisted.
pub const HIGH_SCORE_KEY: &str = "grinch_smasher_highscore";

/// Failures reported while reading or writing the high score.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("high score store unavailable: {0}")]
    Unavailable(String),
    /// The stored value is not a valid score.
    #[error("stored high score `{0}` is not a valid score")]
    Corrupt(String),
}

/// Single named value storage provided by the host.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory store used by tests and hosts without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Outcome of comparing a finished session against the best score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionResult {
    /// Score frozen at the end of the session.
    pub final_score: u32,
    /// Best score before this session.
    pub previous_best: u32,
    /// Best score after this session.
    pub best: u32,
    /// Whether the session set a new record.
    pub is_new_record: bool,
}

/// Pure system that tracks the best score across sessions.
#[derive(Debug)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    /// Reads the persisted best score, treating a missing value as zero.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let best = match store.get(HIGH_SCORE_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| StoreError::Corrupt(raw.clone()))?,
            None => 0,
        };
        Ok(Self { best })
    }

    /// Best score known to the system.
    #[must_use]
    pub const fn best(&self) -> u32 {
        self.best
    }

    /// Compares a final score against the best one, persisting it when beaten.
    pub fn record<S: KeyValueStore + ?Sized>(
        &mut self,
        final_score: u32,
        store: &mut S,
    ) -> Result<SessionResult, StoreError> {
        let previous_best = self.best;
        let is_new_record = final_score > previous_best;
        if is_new_record {
            store.set(HIGH_SCORE_KEY, final_score.to_string())?;
            self.best = final_score;
        }

        Ok(SessionResult {
            final_score,
            previous_best,
            best: self.best,
            is_new_record,
        })
    }

    /// Records every session end found in `events`.
    pub fn handle<S: KeyValueStore + ?Sized>(
        &mut self,
        events: &[Event],
        store: &mut S,
    ) -> Result<Vec<SessionResult>, StoreError> {
        let mut results = Vec::new();
        for event in events {
            if let Event::SessionEnded { final_score } = event {
                results.push(self.record(*final_score, store)?);
            }
        }
        Ok(results)
    }
}
