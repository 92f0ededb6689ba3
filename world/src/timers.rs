//! Per-cell despawn deadlines.

use std::{collections::BTreeMap, time::Duration};

use grinch_smasher_core::CellIndex;
use thiserror::Error;

/// Precondition violations raised while scheduling despawn timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A timer is already pending for the cell.
    #[error("a despawn timer is already pending for cell {0}")]
    DuplicateTimer(CellIndex),
}

/// Sole owner of every pending despawn deadline.
///
/// Deadlines are expressed on the world's virtual timeline. A cancelled entry
/// is removed from the map immediately, so it can never be returned by
/// [`DespawnTimers::drain_due`] afterwards.
#[derive(Clone, Debug, Default)]
pub struct DespawnTimers {
    deadlines: BTreeMap<CellIndex, Duration>,
}

impl DespawnTimers {
    /// Creates an empty timer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a timer for `cell` that expires `window` after `now`.
    pub fn schedule(
        &mut self,
        cell: CellIndex,
        now: Duration,
        window: Duration,
    ) -> Result<(), TimerError> {
        if self.deadlines.contains_key(&cell) {
            return Err(TimerError::DuplicateTimer(cell));
        }
        let _ = self.deadlines.insert(cell, now.saturating_add(window));
        Ok(())
    }

    /// Cancels the timer pending for `cell`, returning whether one existed.
    pub fn cancel(&mut self, cell: CellIndex) -> bool {
        self.deadlines.remove(&cell).is_some()
    }

    /// Cancels every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.deadlines.len();
        self.deadlines.clear();
        cancelled
    }

    /// Reports whether a timer is pending for `cell`.
    #[must_use]
    pub fn is_pending(&self, cell: CellIndex) -> bool {
        self.deadlines.contains_key(&cell)
    }

    /// Deadline registered for `cell`, if any.
    #[must_use]
    pub fn deadline(&self, cell: CellIndex) -> Option<Duration> {
        self.deadlines.get(&cell).copied()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Reports whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every timer whose deadline is at or before `now`.
    ///
    /// Expired cells are ordered by deadline, then by cell index.
    pub fn drain_due(&mut self, now: Duration) -> Vec<CellIndex> {
        let mut due: Vec<(Duration, CellIndex)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(cell, deadline)| (*deadline, *cell))
            .collect();
        due.sort_unstable();

        for (_, cell) in &due {
            let _ = self.deadlines.remove(cell);
        }

        due.into_iter().map(|(_, cell)| cell).collect()
    }
}
