//! Defines all public event types broadcast by the Wheelclock engine.
//!
//! The presentation layer redraws from the snapshot channel; these events are
//! for everything that wants to react to *what happened* (announcing an
//! expired clock, keeping a move log, debugging the scheduler).

use crate::common::PlayerIndex;
use crate::config::TimerConfiguration;
use crate::session::Transition;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// One completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub from: PlayerIndex,
    pub to: PlayerIndex,
    /// Increment credited to `from` when the turn ended.
    pub credited: u64,
    /// `from`'s clock after the credit.
    pub remaining_after: u64,
    pub at: DateTime<Utc>,
}

/// Game-level events, one per effective session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    Started,
    Paused,
    Ticked { player: PlayerIndex, remaining: u64 },
    /// A clock reached zero and the game paused itself.
    Expired { player: PlayerIndex },
    TurnPassed(TurnRecord),
    Reset,
    Reconfigured { config: TimerConfiguration },
    IncrementChanged { seconds: u64 },
    SettingsOpened { was_running: bool },
    SettingsClosed { resumed: bool },
}

impl ClockEvent {
    /// Converts a session transition, stamping turn records with `at`.
    /// Returns `None` for [`Transition::Ignored`].
    pub fn from_transition(transition: Transition, at: DateTime<Utc>) -> Option<Self> {
        let event = match transition {
            Transition::Ignored => return None,
            Transition::Started => ClockEvent::Started,
            Transition::Paused => ClockEvent::Paused,
            Transition::Ticked { player, remaining } => ClockEvent::Ticked { player, remaining },
            Transition::Expired { player } => ClockEvent::Expired { player },
            Transition::TurnPassed {
                from,
                to,
                credited,
                remaining_after,
            } => ClockEvent::TurnPassed(TurnRecord {
                from,
                to,
                credited,
                remaining_after,
                at,
            }),
            Transition::Reset => ClockEvent::Reset,
            Transition::Reconfigured { config } => ClockEvent::Reconfigured { config },
            Transition::IncrementChanged { seconds } => ClockEvent::IncrementChanged { seconds },
            Transition::SettingsOpened { was_running } => {
                ClockEvent::SettingsOpened { was_running }
            }
            Transition::SettingsClosed { resumed } => ClockEvent::SettingsClosed { resumed },
        };
        Some(event)
    }
}

/// Events about the engine's own machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// A tick task was spawned for the given session epoch.
    TickerArmed { epoch: u64 },
    /// The tick task was cancelled.
    TickerDisarmed,
    /// Fired once by `shutdown`.
    EngineShutdown,
}

/// Waits for the next event, skipping over a lag. Returns `None` once the
/// engine is gone.
pub async fn next_event<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Event listener fell behind, skipping");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
