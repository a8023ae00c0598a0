use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wheelclock::prelude::*;

/// Ticks the script lets the last player burn before it pauses the game.
const MAX_FINAL_TICKS: u32 = 20;

/// Plays a short scripted game with the loaded configuration and logs every
/// event. `WHEELCLOCK_TICK_INTERVAL_MS=100` makes it quick.
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load the configuration.
    let config_path = env::var_os("WHEELCLOCK_CONFIG").map(PathBuf::from);
    let config = WheelClockConfig::load(config_path.as_deref())?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_target(false)
        .init();

    // 3. Create the engine from the configuration.
    info!(?config, "Starting demo game");
    let engine = WheelClockEngine::new(config.clone());

    // 4. Log what happens.
    spawn_event_listeners(&engine);

    // 5. Drive the game.
    play_script(&engine, config.tick_interval()).await;

    // 6. Done.
    engine.shutdown().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

/// Spawns tasks that log the clock and system event streams.
fn spawn_event_listeners(engine: &WheelClockEngine) {
    let mut clock_rx = engine.subscribe_clock_events();
    tokio::spawn(async move {
        while let Some(event) = next_event(&mut clock_rx).await {
            match event {
                ClockEvent::Ticked { .. } => {}
                other => info!("[CLOCK] => {:?}", other),
            }
        }
    });

    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Some(event) = next_event(&mut system_rx).await {
            info!("[SYSTEM] => {:?}", event);
        }
    });
}

async fn play_script(engine: &WheelClockEngine, tick: Duration) {
    // Three and a half ticks per turn.
    let turn = tick * 7 / 2;

    engine.advance_turn().await;
    for _ in 0..4 {
        tokio::time::sleep(turn).await;
        engine.advance_turn().await;
    }

    engine.open_settings().await;
    info!("Paused in settings: {:?}", engine.snapshot().remaining);
    tokio::time::sleep(turn).await;
    engine.close_settings().await;

    // Let the active player run out, or give up after a while.
    let mut snapshots = engine.subscribe_snapshots();
    let expiry = async {
        while snapshots.changed().await.is_ok() {
            if !snapshots.borrow_and_update().is_running {
                return true;
            }
        }
        false
    };
    let expired = tokio::time::timeout(tick * MAX_FINAL_TICKS, expiry)
        .await
        .unwrap_or(false);
    if !expired {
        engine.set_running(false).await;
    }
    let snapshot = engine.snapshot();
    info!(
        "Game over for {} (expired: {}): {:?}",
        snapshot.active_player,
        snapshot.is_expired(),
        snapshot.remaining
    );

    for record in engine.history().await {
        info!(
            "{} -> {} (+{}s, {}s left) at {}",
            record.from,
            record.to,
            record.credited,
            record.remaining_after,
            record.at.format("%H:%M:%S%.3f")
        );
    }
}
