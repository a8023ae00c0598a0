//! The cancellable one-second repeating task.
//!
//! A ticker is armed for one session epoch. The engine re-arms it whenever the
//! epoch moves while the game is running and disarms it when the game stops.
//! The tick callback decides, under the session lock, whether its epoch is
//! still current; a stale ticker never touches the session.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Runs `on_tick` every `period`, starting one full period from now.
///
/// Stops as soon as `on_tick` resolves to `false`.
pub async fn run_ticker<F, Fut>(period: Duration, mut on_tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if !on_tick().await {
            trace!("Ticker finished");
            break;
        }
    }
}

struct ArmedTicker {
    epoch: u64,
    handle: JoinHandle<()>,
}

/// Owns at most one running ticker task.
///
/// Dropping the slot aborts the task, so a discarded engine leaves no timer
/// behind.
#[derive(Default)]
pub struct TickSlot {
    armed: Option<ArmedTicker>,
}

impl TickSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The epoch the current task was armed for, if any.
    pub fn armed_epoch(&self) -> Option<u64> {
        self.armed
            .as_ref()
            .filter(|armed| !armed.handle.is_finished())
            .map(|armed| armed.epoch)
    }

    pub fn is_armed(&self) -> bool {
        self.armed_epoch().is_some()
    }

    /// Installs a freshly spawned task, aborting the previous one.
    pub fn arm(&mut self, epoch: u64, handle: JoinHandle<()>) {
        if let Some(previous) = self.armed.replace(ArmedTicker { epoch, handle }) {
            previous.handle.abort();
        }
    }

    /// Aborts the current task. Returns `true` if one was armed.
    pub fn disarm(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TickSlot {
    fn drop(&mut self) {
        self.disarm();
    }
}
