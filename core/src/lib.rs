#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grinch Smasher engine.
//!
//! This crate defines the message surface that connects the session driver,
//! the authoritative world, and pure systems. The driver submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`GridView`], and respond exclusively with new commands.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Number of cells on the playing field. The 3×3 layout is a presentation detail.
pub const GRID_SIZE: usize = 9;

/// Length of a single session measured in whole seconds.
pub const SESSION_DURATION_SECS: u32 = 60;

/// Cadence at which the spawn scheduler attempts to populate an empty cell.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(800);

/// Cadence at which the session clock loses one second.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Time an untapped item stays visible before it despawns.
pub const DESPAWN_WINDOW: Duration = Duration::from_millis(1500);

/// Probability that a spawned item is a present rather than a grinch.
pub const PRESENT_PROBABILITY: f64 = 0.3;

/// Points awarded for tapping a grinch.
pub const GRINCH_POINTS: u32 = 10;

/// Points deducted for tapping a present. The score never drops below zero.
pub const PRESENT_PENALTY: u32 = 5;

/// Coarse-grained state of the overall game flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the capture collaborator to deliver a photo.
    Capturing,
    /// Photo stored, waiting for the player to start a session.
    Ready,
    /// Session in progress: the clock counts down and items spawn.
    Active,
    /// Session finished; final state is frozen for reporting.
    Ended,
}

/// Kinds of items that may pop up inside a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Target the player should tap.
    Grinch,
    /// Decoy the player should avoid.
    Present,
}

impl ItemKind {
    /// Signed score adjustment applied when an item of this kind is tapped.
    ///
    /// The ledger clamps the result at zero, so the adjustment actually applied
    /// to a low score may be smaller than the value reported here.
    #[must_use]
    pub const fn score_delta(self) -> i64 {
        match self {
            Self::Grinch => GRINCH_POINTS as i64,
            Self::Present => -(PRESENT_PENALTY as i64),
        }
    }
}

/// Stable identity of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Converts the index into a slice offset.
    #[must_use]
    pub fn as_usize(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a captured photo.
///
/// The engine never interprets the value; it only stores it and hands it back
/// to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(String);

impl PhotoRef {
    /// Wraps the provided reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Borrows the raw reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reports that the capture collaborator produced a photo.
    CapturePhoto {
        /// Reference handed back by the capture collaborator.
        photo: PhotoRef,
    },
    /// Requests that a new session begins.
    StartSession,
    /// Requests a return to the ready screen after a session ended.
    Replay,
    /// Requests a fresh capture, discarding the stored photo.
    NewCapture,
    /// Reports that the player tapped a cell.
    TapCell {
        /// Cell that received the tap.
        cell: CellIndex,
    },
    /// Requests that an item appears in an empty cell.
    SpawnItem {
        /// Cell that should receive the item.
        cell: CellIndex,
        /// Kind of item to place.
        kind: ItemKind,
    },
    /// Advances the virtual clock by the provided delta time.
    Tick {
        /// Duration of virtual time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Inbound phase signals, used to report which signal was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Photo captured.
    CapturePhoto,
    /// Start requested.
    StartSession,
    /// Replay requested.
    Replay,
    /// New capture requested.
    NewCapture,
    /// Cell tapped.
    TapCell,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the virtual clock advanced.
    TimeAdvanced {
        /// Duration of virtual time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the game flow entered a new phase.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: Phase,
        /// Phase that became active.
        to: Phase,
    },
    /// Confirms that a photo reference was stored.
    PhotoStored {
        /// Reference now held by the world.
        photo: PhotoRef,
    },
    /// Confirms that the stored photo reference was dropped.
    PhotoDiscarded,
    /// Announces that a session started with a fresh board and score.
    SessionStarted {
        /// Seconds on the clock at the start of the session.
        duration_secs: u32,
    },
    /// Reports that the session clock lost one second.
    ClockTicked {
        /// Seconds left after the decrement.
        remaining_secs: u32,
    },
    /// Confirms that an item appeared in a cell.
    ItemSpawned {
        /// Cell holding the new item.
        cell: CellIndex,
        /// Kind of the new item.
        kind: ItemKind,
    },
    /// Reports that an untapped item expired.
    ItemDespawned {
        /// Cell that was cleared.
        cell: CellIndex,
        /// Kind of item that expired.
        kind: ItemKind,
    },
    /// Confirms that a tap hit an item.
    CellTapped {
        /// Cell that was tapped and cleared.
        cell: CellIndex,
        /// Kind of item that was hit.
        kind: ItemKind,
        /// Score after applying the tap.
        score: u32,
    },
    /// Reports the end of a session once the clock ran out.
    SessionEnded {
        /// Score frozen at the end of the session.
        final_score: u32,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Cell named in the request.
        cell: CellIndex,
        /// Kind named in the request.
        kind: ItemKind,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports that a phase signal did not match a valid transition.
    SignalIgnored {
        /// Signal that was dropped.
        signal: Signal,
        /// Phase that was active when the signal arrived.
        phase: Phase,
    },
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// No session is active, so the spawn scheduler is halted.
    InvalidPhase,
    /// The requested cell lies outside the grid.
    InvalidIndex,
    /// The requested cell already holds an item.
    Occupied,
    /// A despawn timer is already pending for the requested cell.
    DuplicateTimer,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellSnapshot {
    /// Identity of the cell.
    pub index: CellIndex,
    /// Item currently shown in the cell, if any.
    pub item: Option<ItemKind>,
}

impl CellSnapshot {
    /// Reports whether the cell holds an item.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.item.is_some()
    }

    /// Reports whether the presentation layer should draw an item in the cell.
    ///
    /// Visibility always mirrors occupancy.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.is_occupied()
    }
}

/// Read-only snapshot describing every cell in index order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridView {
    cells: Vec<CellSnapshot>,
}

impl GridView {
    /// Creates a new grid view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut cells: Vec<CellSnapshot>) -> Self {
        cells.sort_by_key(|cell| cell.index);
        Self { cells }
    }

    /// Iterator over the captured cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.cells.iter()
    }

    /// Number of cells captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the view captured no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the snapshot for the provided cell, if it exists.
    #[must_use]
    pub fn cell(&self, index: CellIndex) -> Option<&CellSnapshot> {
        self.cells.get(index.as_usize())
    }

    /// Indices of all cells that currently hold no item.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<CellIndex> {
        self.cells
            .iter()
            .filter(|cell| !cell.is_occupied())
            .map(|cell| cell.index)
            .collect()
    }

    /// Number of cells that currently hold an item.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellSnapshot> {
        self.cells
    }
}
