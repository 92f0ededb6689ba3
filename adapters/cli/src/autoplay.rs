//! Simulated player driving headless sessions.

use std::{collections::HashMap, time::Duration};

use grinch_smasher_core::{CellIndex, GridView, ItemKind};
use rand::Rng;

#[derive(Clone, Copy, Debug)]
struct Sighting {
    kind: ItemKind,
    since: Duration,
    decided: bool,
}

/// Player that taps grinches once it has noticed them.
///
/// Every item is judged once, after the reaction delay has passed since it
/// was first seen. Grinches are always tapped; presents are tapped by mistake
/// with probability `1 - accuracy`.
#[derive(Debug)]
pub(crate) struct AutoPlayer<R> {
    reaction: Duration,
    accuracy: f64,
    sightings: HashMap<CellIndex, Sighting>,
    rng: R,
}

impl<R: Rng> AutoPlayer<R> {
    /// Creates a player. `accuracy` must lie within `0.0..=1.0`.
    pub(crate) fn new(reaction: Duration, accuracy: f64, rng: R) -> Self {
        Self {
            reaction,
            accuracy,
            sightings: HashMap::new(),
            rng,
        }
    }

    /// Forgets every item seen so far.
    pub(crate) fn reset(&mut self) {
        self.sightings.clear();
    }

    /// Looks at the board at time `now` and returns the cells to tap.
    pub(crate) fn plan_taps(&mut self, grid: &GridView, now: Duration) -> Vec<CellIndex> {
        self.sightings.retain(|cell, sighting| {
            grid.cell(*cell).and_then(|snapshot| snapshot.item) == Some(sighting.kind)
        });

        let mut taps = Vec::new();
        for snapshot in grid.iter() {
            let Some(kind) = snapshot.item else {
                continue;
            };
            let sighting = self.sightings.entry(snapshot.index).or_insert(Sighting {
                kind,
                since: now,
                decided: false,
            });
            if sighting.decided || now.saturating_sub(sighting.since) < self.reaction {
                continue;
            }
            sighting.decided = true;

            let tap = match kind {
                ItemKind::Grinch => true,
                ItemKind::Present => self.rng.gen_bool(1.0 - self.accuracy),
            };
            if tap {
                taps.push(snapshot.index);
            }
        }
        taps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grinch_smasher_core::CellSnapshot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn board(items: &[(u32, ItemKind)]) -> GridView {
        GridView::from_snapshots(
            (0..9)
                .map(|index| CellSnapshot {
                    index: CellIndex::new(index),
                    item: items
                        .iter()
                        .find(|(cell, _)| *cell == index)
                        .map(|(_, kind)| *kind),
                })
                .collect(),
        )
    }

    #[test]
    fn waits_for_the_reaction_delay() {
        let mut player = AutoPlayer::new(
            Duration::from_millis(300),
            1.0,
            ChaCha8Rng::seed_from_u64(1),
        );
        let grid = board(&[(4, ItemKind::Grinch)]);

        assert!(player.plan_taps(&grid, Duration::from_millis(100)).is_empty());
        assert!(player.plan_taps(&grid, Duration::from_millis(300)).is_empty());
        assert_eq!(
            player.plan_taps(&grid, Duration::from_millis(400)),
            vec![CellIndex::new(4)]
        );
        assert!(
            player.plan_taps(&grid, Duration::from_millis(500)).is_empty(),
            "an item is judged once"
        );
    }

    #[test]
    fn perfect_accuracy_never_taps_presents() {
        let mut player = AutoPlayer::new(Duration::ZERO, 1.0, ChaCha8Rng::seed_from_u64(2));
        let grid = board(&[(0, ItemKind::Present), (8, ItemKind::Grinch)]);

        assert_eq!(
            player.plan_taps(&grid, Duration::ZERO),
            vec![CellIndex::new(8)]
        );
    }

    #[test]
    fn zero_accuracy_taps_every_present() {
        let mut player = AutoPlayer::new(Duration::ZERO, 0.0, ChaCha8Rng::seed_from_u64(3));
        let grid = board(&[(0, ItemKind::Present), (2, ItemKind::Present)]);

        assert_eq!(
            player.plan_taps(&grid, Duration::ZERO),
            vec![CellIndex::new(0), CellIndex::new(2)]
        );
    }

    #[test]
    fn replaced_items_are_judged_again() {
        let mut player = AutoPlayer::new(Duration::ZERO, 1.0, ChaCha8Rng::seed_from_u64(4));

        assert!(player
            .plan_taps(&board(&[(5, ItemKind::Present)]), Duration::ZERO)
            .is_empty());
        assert_eq!(
            player.plan_taps(&board(&[(5, ItemKind::Grinch)]), Duration::from_millis(100)),
            vec![CellIndex::new(5)]
        );

        player.reset();
        assert!(player.sightings.is_empty());
    }
}
