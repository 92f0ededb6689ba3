//! Text rendering of the board for terminal output.

use std::fmt::Write as _;

use grinch_smasher_core::{CellSnapshot, ItemKind, Phase};
use grinch_smasher_session::SessionSnapshot;

const COLUMNS: usize = 3;

/// Renders the grid row by row followed by a status line.
pub(crate) fn render(snapshot: &SessionSnapshot, best: u32) -> String {
    let cells: Vec<&CellSnapshot> = snapshot.grid.iter().collect();
    let mut out = String::new();
    for (row, chunk) in cells.chunks(COLUMNS).enumerate() {
        if row > 0 {
            out.push_str(&vec!["---"; chunk.len()].join("+"));
            out.push('\n');
        }
        let line: Vec<String> = chunk
            .iter()
            .map(|cell| format!(" {} ", glyph(cell)))
            .collect();
        out.push_str(&line.join("|"));
        out.push('\n');
    }

    let _ = write!(
        out,
        "{} | score {} | time {}s | best {}",
        phase_label(snapshot.phase),
        snapshot.score,
        snapshot.time_remaining_secs,
        best
    );
    out
}

fn glyph(cell: &CellSnapshot) -> char {
    match cell.item {
        Some(ItemKind::Grinch) => 'G',
        Some(ItemKind::Present) => 'P',
        None => '.',
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Capturing => "capturing",
        Phase::Ready => "ready",
        Phase::Active => "active",
        Phase::Ended => "ended",
    }
}
