//! Score ledger floored at zero.

use grinch_smasher_core::ItemKind;

/// Running score of the current session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    score: u32,
}

impl ScoreLedger {
    /// Creates a ledger starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { score: 0 }
    }

    /// Creates a ledger starting at an arbitrary score.
    #[must_use]
    pub const fn starting_at(score: u32) -> Self {
        Self { score }
    }

    /// Current score.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.score
    }

    /// Applies the score adjustment for tapping an item of `kind`.
    ///
    /// Returns the updated score.
    pub fn apply_tap(&mut self, kind: ItemKind) -> u32 {
        let adjusted = i64::from(self.score).saturating_add(kind.score_delta());
        self.score = u32::try_from(adjusted.max(0)).unwrap_or(u32::MAX);
        self.score
    }

    /// Sets the score back to zero.
    pub fn reset(&mut self) {
        self.score = 0;
    }
}
