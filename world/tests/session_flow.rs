use std::time::Duration;

use grinch_smasher_core::{
    CellIndex, Command, Event, ItemKind, Phase, PhotoRef, Signal, SpawnError, CLOCK_INTERVAL,
    DESPAWN_WINDOW, GRID_SIZE, SESSION_DURATION_SECS,
};
use grinch_smasher_world::{self as world, query, Config, World};

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

fn spawn(world: &mut World, cell: u32, kind: ItemKind) -> Vec<Event> {
    run(
        world,
        Command::SpawnItem {
            cell: CellIndex::new(cell),
            kind,
        },
    )
}

fn tap(world: &mut World, cell: u32) -> Vec<Event> {
    run(
        world,
        Command::TapCell {
            cell: CellIndex::new(cell),
        },
    )
}

fn started_world() -> World {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::CapturePhoto {
            photo: PhotoRef::new("selfie.jpg"),
        },
    );
    let _ = run(&mut world, Command::StartSession);
    assert_eq!(query::phase(&world), Phase::Active);
    world
}

#[test]
fn capture_then_start_walks_through_phases() {
    let mut world = World::new();

    let events = run(
        &mut world,
        Command::CapturePhoto {
            photo: PhotoRef::new("selfie.jpg"),
        },
    );
    assert_eq!(
        events,
        vec![
            Event::PhotoStored {
                photo: PhotoRef::new("selfie.jpg"),
            },
            Event::PhaseChanged {
                from: Phase::Capturing,
                to: Phase::Ready,
            },
        ]
    );
    assert_eq!(
        query::photo(&world).map(PhotoRef::as_str),
        Some("selfie.jpg")
    );

    let events = run(&mut world, Command::StartSession);
    assert_eq!(
        events,
        vec![
            Event::PhaseChanged {
                from: Phase::Ready,
                to: Phase::Active,
            },
            Event::SessionStarted {
                duration_secs: SESSION_DURATION_SECS,
            },
        ]
    );
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::time_remaining_secs(&world), SESSION_DURATION_SECS);
    assert!(query::clock(&world).is_running());
}

#[test]
fn tapping_grinch_scores_and_cancels_its_timer() {
    let mut world = started_world();
    let events = spawn(&mut world, 3, ItemKind::Grinch);
    assert_eq!(
        events,
        vec![Event::ItemSpawned {
            cell: CellIndex::new(3),
            kind: ItemKind::Grinch,
        }]
    );
    assert!(query::despawn_timers(&world).is_pending(CellIndex::new(3)));

    let events = tap(&mut world, 3);
    assert_eq!(
        events,
        vec![Event::CellTapped {
            cell: CellIndex::new(3),
            kind: ItemKind::Grinch,
            score: 10,
        }]
    );
    assert_eq!(query::score(&world), 10);
    assert!(!query::despawn_timers(&world).is_pending(CellIndex::new(3)));
    assert!(query::grid_view(&world)
        .cell(CellIndex::new(3))
        .is_some_and(|cell| !cell.is_occupied()));
}

#[test]
fn cancelled_timer_never_clears_the_cell_again() {
    let mut world = started_world();
    let _ = spawn(&mut world, 3, ItemKind::Grinch);
    let _ = tap(&mut world, 3);

    let _ = tick(&mut world, 500);
    let _ = spawn(&mut world, 3, ItemKind::Present);

    // The first item's deadline (1500 ms) passes while the second is showing.
    let events = tick(&mut world, 1100);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ItemDespawned { .. })));
    assert_eq!(
        query::grid_view(&world)
            .cell(CellIndex::new(3))
            .and_then(|cell| cell.item),
        Some(ItemKind::Present)
    );

    let events = tick(&mut world, 400);
    assert!(events.contains(&Event::ItemDespawned {
        cell: CellIndex::new(3),
        kind: ItemKind::Present,
    }));
}

#[test]
fn untapped_item_despawns_after_display_window() {
    let mut world = started_world();
    let _ = spawn(&mut world, 0, ItemKind::Grinch);

    let events = tick(&mut world, 1499);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ItemDespawned { .. })));
    assert_eq!(query::grid(&world).occupied_count(), 1);

    let events = tick(&mut world, 1);
    assert!(events.contains(&Event::ItemDespawned {
        cell: CellIndex::new(0),
        kind: ItemKind::Grinch,
    }));
    assert_eq!(query::grid(&world).occupied_count(), 0);
    assert!(query::despawn_timers(&world).is_empty());
    assert_eq!(query::score(&world), 0);
}

#[test]
fn tapping_empty_cell_changes_nothing() {
    let mut world = started_world();
    let _ = spawn(&mut world, 1, ItemKind::Grinch);
    let _ = tap(&mut world, 1);

    assert!(tap(&mut world, 1).is_empty());
    assert!(tap(&mut world, 4).is_empty());
    assert!(tap(&mut world, 99).is_empty());
    assert_eq!(query::score(&world), 10);
}

#[test]
fn spawn_into_occupied_cell_is_rejected() {
    let mut world = started_world();
    for cell in 0..GRID_SIZE as u32 {
        let _ = spawn(&mut world, cell, ItemKind::Grinch);
    }
    let before = query::grid_view(&world);
    assert_eq!(before.occupied_count(), GRID_SIZE);

    let events = spawn(&mut world, 4, ItemKind::Present);
    assert_eq!(
        events,
        vec![Event::SpawnRejected {
            cell: CellIndex::new(4),
            kind: ItemKind::Present,
            reason: SpawnError::Occupied,
        }]
    );
    assert_eq!(query::grid_view(&world), before);
    assert_eq!(query::despawn_timers(&world).len(), GRID_SIZE);

    let events = spawn(&mut world, GRID_SIZE as u32, ItemKind::Grinch);
    assert_eq!(
        events,
        vec![Event::SpawnRejected {
            cell: CellIndex::new(GRID_SIZE as u32),
            kind: ItemKind::Grinch,
            reason: SpawnError::InvalidIndex,
        }]
    );
}

#[test]
fn spawn_outside_active_session_is_rejected() {
    let mut world = World::new();
    let events = spawn(&mut world, 0, ItemKind::Grinch);
    assert_eq!(
        events,
        vec![Event::SpawnRejected {
            cell: CellIndex::new(0),
            kind: ItemKind::Grinch,
            reason: SpawnError::InvalidPhase,
        }]
    );
    assert_eq!(query::grid(&world).occupied_count(), 0);
}

#[test]
fn clock_runs_out_without_taps() {
    let mut world = started_world();
    let mut events = Vec::new();
    for _ in 0..SESSION_DURATION_SECS {
        events.extend(tick(&mut world, 1000));
    }

    let ticks = events
        .iter()
        .filter(|event| matches!(event, Event::ClockTicked { .. }))
        .count();
    assert_eq!(ticks, SESSION_DURATION_SECS as usize);
    assert!(events.contains(&Event::ClockTicked { remaining_secs: 0 }));
    assert!(events.contains(&Event::SessionEnded { final_score: 0 }));
    assert_eq!(query::phase(&world), Phase::Ended);
    assert_eq!(query::time_remaining_secs(&world), 0);
    assert!(!query::clock(&world).is_running());
}

#[test]
fn zero_length_session_ends_as_soon_as_it_starts() {
    let mut world = World::with_config(Config::new(GRID_SIZE, 0, CLOCK_INTERVAL, DESPAWN_WINDOW));
    let _ = run(
        &mut world,
        Command::CapturePhoto {
            photo: PhotoRef::new("selfie.jpg"),
        },
    );

    let events = run(&mut world, Command::StartSession);
    assert_eq!(
        events,
        vec![
            Event::PhaseChanged {
                from: Phase::Ready,
                to: Phase::Active,
            },
            Event::SessionStarted { duration_secs: 0 },
            Event::PhaseChanged {
                from: Phase::Active,
                to: Phase::Ended,
            },
            Event::SessionEnded { final_score: 0 },
        ]
    );
    assert_eq!(query::phase(&world), Phase::Ended);

    let _ = tick(&mut world, 600_000);
    assert_eq!(query::phase(&world), Phase::Ended);
}

#[test]
fn stalled_clock_never_leaves_the_session_active() {
    let mut world = World::with_config(Config::new(
        GRID_SIZE,
        SESSION_DURATION_SECS,
        Duration::ZERO,
        DESPAWN_WINDOW,
    ));
    let _ = run(
        &mut world,
        Command::CapturePhoto {
            photo: PhotoRef::new("selfie.jpg"),
        },
    );

    let events = run(&mut world, Command::StartSession);
    assert!(events.contains(&Event::SessionEnded { final_score: 0 }));
    assert_eq!(query::phase(&world), Phase::Ended);
    assert_eq!(query::next_deadline(&world), None);
}

#[test]
fn single_large_tick_fires_every_deadline_in_order() {
    let mut world = started_world();
    let _ = spawn(&mut world, 2, ItemKind::Present);

    let events = tick(&mut world, 2000);
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced {
                dt: Duration::from_millis(2000),
            },
            Event::ClockTicked {
                remaining_secs: SESSION_DURATION_SECS - 1,
            },
            Event::ItemDespawned {
                cell: CellIndex::new(2),
                kind: ItemKind::Present,
            },
            Event::ClockTicked {
                remaining_secs: SESSION_DURATION_SECS - 2,
            },
        ]
    );
}

#[test]
fn session_end_halts_pending_timers_in_the_same_step() {
    let mut world = started_world();
    let _ = tick(&mut world, 59_000);
    let _ = spawn(&mut world, 6, ItemKind::Grinch);
    let _ = tap(&mut world, 6);
    let _ = tick(&mut world, 500);
    let _ = spawn(&mut world, 7, ItemKind::Grinch);

    let events = tick(&mut world, 500);
    let ended_at = events
        .iter()
        .position(|event| matches!(event, Event::SessionEnded { .. }))
        .expect("session ends when the clock hits zero");
    assert_eq!(events[ended_at], Event::SessionEnded { final_score: 10 });
    assert_eq!(query::phase(&world), Phase::Ended);
    assert!(query::despawn_timers(&world).is_empty());
    assert_eq!(query::grid(&world).occupied_count(), 0);
    assert_eq!(query::next_deadline(&world), None);

    let events = tick(&mut world, 5_000);
    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(5_000),
        }]
    );
    assert_eq!(query::score(&world), 10);
}

#[test]
fn replay_round_trip_resets_score_and_grid() {
    let mut world = started_world();
    let _ = spawn(&mut world, 0, ItemKind::Grinch);
    let _ = tap(&mut world, 0);
    let _ = spawn(&mut world, 8, ItemKind::Grinch);
    let _ = tick(&mut world, u64::from(SESSION_DURATION_SECS) * 1000);
    assert_eq!(query::phase(&world), Phase::Ended);
    assert_eq!(query::score(&world), 10);

    let events = run(&mut world, Command::Replay);
    assert_eq!(
        events,
        vec![Event::PhaseChanged {
            from: Phase::Ended,
            to: Phase::Ready,
        }]
    );
    assert_eq!(
        query::photo(&world).map(PhotoRef::as_str),
        Some("selfie.jpg")
    );

    let _ = run(&mut world, Command::StartSession);
    assert_eq!(query::phase(&world), Phase::Active);
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::grid(&world).occupied_count(), 0);
    assert!(query::despawn_timers(&world).is_empty());
    assert_eq!(query::time_remaining_secs(&world), SESSION_DURATION_SECS);
}

#[test]
fn out_of_order_signals_are_ignored() {
    let mut world = World::new();

    assert_eq!(
        run(&mut world, Command::StartSession),
        vec![Event::SignalIgnored {
            signal: Signal::StartSession,
            phase: Phase::Capturing,
        }]
    );
    assert_eq!(
        run(&mut world, Command::Replay),
        vec![Event::SignalIgnored {
            signal: Signal::Replay,
            phase: Phase::Capturing,
        }]
    );
    assert_eq!(
        tap(&mut world, 0),
        vec![Event::SignalIgnored {
            signal: Signal::TapCell,
            phase: Phase::Capturing,
        }]
    );
    assert_eq!(query::phase(&world), Phase::Capturing);

    let mut world = started_world();
    assert_eq!(
        run(
            &mut world,
            Command::CapturePhoto {
                photo: PhotoRef::new("other.jpg"),
            },
        ),
        vec![Event::SignalIgnored {
            signal: Signal::CapturePhoto,
            phase: Phase::Active,
        }]
    );
    assert_eq!(
        run(&mut world, Command::StartSession),
        vec![Event::SignalIgnored {
            signal: Signal::StartSession,
            phase: Phase::Active,
        }]
    );
    assert_eq!(query::phase(&world), Phase::Active);
    assert_eq!(
        query::photo(&world).map(PhotoRef::as_str),
        Some("selfie.jpg")
    );
}

#[test]
fn new_capture_tears_down_an_active_session() {
    let mut world = started_world();
    let _ = spawn(&mut world, 4, ItemKind::Grinch);

    let events = run(&mut world, Command::NewCapture);
    assert_eq!(
        events,
        vec![
            Event::PhotoDiscarded,
            Event::PhaseChanged {
                from: Phase::Active,
                to: Phase::Capturing,
            },
        ]
    );
    assert_eq!(query::photo(&world), None);
    assert!(query::despawn_timers(&world).is_empty());
    assert!(!query::clock(&world).is_running());
    assert_eq!(query::grid(&world).occupied_count(), 0);

    let events = tick(&mut world, 120_000);
    assert_eq!(events.len(), 1, "no timer may leak past the teardown");
}
