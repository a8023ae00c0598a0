//! Scheduling behaviour of the engine, run on tokio's paused clock so the
//! one-second cadence is deterministic.

use std::time::Duration;
use tokio::time::sleep;
use wheelclock::prelude::*;

fn engine(players: usize, initial: u64, increment: u64) -> WheelClockEngine {
    WheelClockEngine::with_configuration(
        TimerConfiguration {
            player_count: players,
            initial_time_seconds: initial,
            increment_seconds: increment,
        },
        Duration::from_secs(1),
    )
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn stopped_engine_never_ticks() {
    let engine = engine(2, 5, 0);
    sleep(ms(10_000)).await;
    assert_eq!(engine.snapshot().remaining, vec![5, 5]);
    assert!(!engine.is_ticking().await);
}

#[tokio::test(start_paused = true)]
async fn running_clock_loses_one_second_per_tick() {
    let engine = engine(2, 5, 0);
    assert_eq!(engine.advance_turn().await, Transition::Started);
    assert!(engine.is_ticking().await);

    sleep(ms(999)).await;
    assert_eq!(engine.snapshot().remaining, vec![5, 5]);

    sleep(ms(1501)).await;
    assert_eq!(engine.snapshot().remaining, vec![3, 5]);
}

#[tokio::test(start_paused = true)]
async fn expiry_pauses_and_cancels_the_ticker() {
    let engine = engine(2, 5, 0);
    let mut events = engine.subscribe_clock_events();
    engine.advance_turn().await;

    sleep(ms(8_000)).await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.remaining, vec![0, 5]);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.active_player, PlayerIndex(0));
    assert!(!engine.is_ticking().await);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.first(), Some(&ClockEvent::Started));
    assert_eq!(
        seen.last(),
        Some(&ClockEvent::Expired {
            player: PlayerIndex(0)
        })
    );
    assert_eq!(seen.len(), 1 + 4 + 1);

    // Tapping an expired clock does nothing.
    assert_eq!(engine.advance_turn().await, Transition::Ignored);
    sleep(ms(3_000)).await;
    assert_eq!(engine.snapshot().remaining, vec![0, 5]);
}

#[tokio::test(start_paused = true)]
async fn pausing_stops_the_countdown() {
    let engine = engine(2, 10, 0);
    engine.advance_turn().await;
    sleep(ms(1_500)).await;
    assert_eq!(engine.set_running(false).await, Transition::Paused);
    assert!(!engine.is_ticking().await);

    sleep(ms(5_000)).await;
    assert_eq!(engine.snapshot().remaining, vec![9, 10]);
}

#[tokio::test(start_paused = true)]
async fn passing_the_turn_gives_the_next_player_a_full_second() {
    let engine = engine(3, 5, 0);
    engine.advance_turn().await;
    sleep(ms(1_500)).await;
    assert!(matches!(
        engine.advance_turn().await,
        Transition::TurnPassed { .. }
    ));

    sleep(ms(900)).await;
    assert_eq!(engine.snapshot().remaining, vec![4, 5, 5]);

    sleep(ms(200)).await;
    assert_eq!(engine.snapshot().remaining, vec![4, 4, 5]);
    assert_eq!(engine.snapshot().active_player, PlayerIndex(1));
}

#[tokio::test(start_paused = true)]
async fn reconfiguration_discards_the_pending_tick() {
    let engine = engine(2, 5, 0);
    engine.advance_turn().await;
    sleep(ms(999)).await;

    assert!(matches!(
        engine.set_initial_time(60).await,
        Transition::Reconfigured { .. }
    ));
    assert!(!engine.is_ticking().await);
    sleep(ms(5_000)).await;
    assert_eq!(engine.snapshot().remaining, vec![60, 60]);

    engine.advance_turn().await;
    sleep(ms(999)).await;
    assert_eq!(engine.snapshot().remaining, vec![60, 60]);
    sleep(ms(2)).await;
    assert_eq!(engine.snapshot().remaining, vec![59, 60]);
}

#[tokio::test(start_paused = true)]
async fn player_count_change_resets_a_running_game() {
    let engine = engine(4, 30, 5);
    engine.advance_turn().await;
    engine.advance_turn().await;
    sleep(ms(2_500)).await;

    engine.set_player_count(6).await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.remaining, vec![30; 6]);
    assert_eq!(snapshot.active_player, PlayerIndex(0));
    assert!(!snapshot.is_running);
    assert!(engine.history().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn settings_overlay_pauses_and_resumes() {
    let engine = engine(4, 300, 0);
    engine.advance_turn().await;
    sleep(ms(1_500)).await;

    assert_eq!(
        engine.open_settings().await,
        Transition::SettingsOpened { was_running: true }
    );
    let snapshot = engine.snapshot();
    assert!(snapshot.settings_open);
    assert!(snapshot.was_running_before_settings);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.control_action(), ControlAction::Resume);

    sleep(ms(10_000)).await;
    assert_eq!(engine.snapshot().remaining[0], 299);

    assert_eq!(
        engine.primary_tap().await,
        Transition::SettingsClosed { resumed: true }
    );
    let snapshot = engine.snapshot();
    assert!(snapshot.is_running);
    assert!(!snapshot.was_running_before_settings);

    sleep(ms(1_100)).await;
    assert_eq!(engine.snapshot().remaining[0], 298);
}

#[tokio::test(start_paused = true)]
async fn reset_inside_overlay_resumes_the_fresh_game_on_close() {
    let engine = engine(3, 30, 0);
    engine.advance_turn().await;
    engine.advance_turn().await;
    sleep(ms(2_500)).await;

    engine.open_settings().await;
    engine.set_running(false).await;
    engine.reset().await;
    assert_eq!(engine.snapshot().control_action(), ControlAction::Resume);
    assert!(!engine.is_ticking().await);

    assert_eq!(
        engine.close_settings().await,
        Transition::SettingsClosed { resumed: true }
    );
    assert!(engine.is_ticking().await);
    sleep(ms(1_100)).await;
    assert_eq!(engine.snapshot().remaining, vec![29, 30, 30]);
}

#[tokio::test(start_paused = true)]
async fn increments_are_credited_and_logged() {
    let engine = engine(4, 300, 10);
    engine.advance_turn().await;
    engine.advance_turn().await;
    assert_eq!(engine.snapshot().remaining, vec![310, 300, 300, 300]);

    let history = engine.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from, PlayerIndex(0));
    assert_eq!(history[0].to, PlayerIndex(1));
    assert_eq!(history[0].credited, 10);
    assert_eq!(history[0].remaining_after, 310);

    engine.reset().await;
    assert!(engine.history().await.is_empty());
    assert_eq!(engine.snapshot().remaining, vec![300; 4]);
}

#[tokio::test(start_paused = true)]
async fn snapshot_subscribers_see_every_change() {
    let engine = engine(2, 5, 0);
    let mut snapshots = engine.subscribe_snapshots();
    let initial = snapshots.borrow_and_update().revision;

    engine.advance_turn().await;
    snapshots.changed().await.unwrap();
    assert!(snapshots.borrow_and_update().is_running);

    snapshots.changed().await.unwrap();
    let ticked = snapshots.borrow_and_update().clone();
    assert_eq!(ticked.remaining, vec![4, 5]);
    assert!(ticked.revision > initial);

    // Ignored operations publish nothing.
    engine.set_player_count(2).await;
    assert!(!snapshots.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn ticker_lifecycle_is_reported() {
    let engine = engine(2, 5, 0);
    let mut system = engine.subscribe_system_events();

    engine.advance_turn().await;
    assert!(matches!(
        system.try_recv(),
        Ok(SystemEvent::TickerArmed { .. })
    ));
    engine.set_running(false).await;
    assert_eq!(system.try_recv(), Ok(SystemEvent::TickerDisarmed));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_engine_cancels_the_ticker() {
    let engine = engine(2, 5, 0);
    let mut snapshots = engine.subscribe_snapshots();
    engine.advance_turn().await;
    snapshots.borrow_and_update();
    drop(engine);

    sleep(ms(3_000)).await;
    assert!(snapshots.changed().await.is_err());
    assert_eq!(snapshots.borrow().remaining, vec![5, 5]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_scheduling_for_good() {
    let engine = engine(2, 5, 0);
    let mut system = engine.subscribe_system_events();
    engine.advance_turn().await;
    engine.shutdown().await;

    let mut saw_shutdown = false;
    while let Ok(event) = system.try_recv() {
        saw_shutdown |= event == SystemEvent::EngineShutdown;
    }
    assert!(saw_shutdown);

    engine.set_running(false).await;
    engine.advance_turn().await;
    assert!(engine.snapshot().is_running);
    assert!(!engine.is_ticking().await);
    sleep(ms(3_000)).await;
    assert_eq!(engine.snapshot().remaining, vec![5, 5]);
}

#[tokio::test(start_paused = true)]
async fn manual_tick_applies_immediately() {
    let engine = engine(2, 2, 0);
    assert_eq!(engine.tick().await, Transition::Ignored);
    engine.advance_turn().await;
    assert_eq!(
        engine.tick().await,
        Transition::Ticked {
            player: PlayerIndex(0),
            remaining: 1
        }
    );
    assert_eq!(
        engine.tick().await,
        Transition::Expired {
            player: PlayerIndex(0)
        }
    );
    assert!(!engine.is_ticking().await);
}
