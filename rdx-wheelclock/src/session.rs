//! The turn/timer state machine.
//!
//! `Session` is synchronous and owns nothing but data. Every operation either
//! commits a complete, valid state or leaves the session untouched and reports
//! [`Transition::Ignored`]. Scheduling lives in the engine, which reads the
//! session's `epoch` to decide when the tick task has to be re-armed.

use crate::common::{PlayerIndex, MAX_PLAYERS, MIN_PLAYERS};
use crate::config::TimerConfiguration;
use serde::Serialize;
use std::collections::VecDeque;
use std::mem;
use tracing::{debug, info, trace};

/// The mutable runtime state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockState {
    /// Seconds left per player; one entry per seat, never negative.
    pub remaining: Vec<u64>,
    pub active_player: PlayerIndex,
    /// True only while the active player's clock is counting down.
    pub is_running: bool,
    /// Run flag captured when the settings overlay opened.
    pub was_running_before_settings: bool,
}

impl ClockState {
    /// A stopped game with every clock at the initial time and seat 0 active.
    pub fn fresh(config: &TimerConfiguration) -> Self {
        Self {
            remaining: vec![config.initial_time_seconds; config.player_count],
            active_player: PlayerIndex(0),
            is_running: false,
            was_running_before_settings: false,
        }
    }

    /// Puts every clock back to the initial time, seat 0 active, stopped.
    /// The overlay capture is left as it is.
    fn rewind(&mut self, config: &TimerConfiguration) {
        self.remaining.clear();
        self.remaining
            .resize(config.player_count, config.initial_time_seconds);
        self.active_player = PlayerIndex(0);
        self.is_running = false;
    }
}

/// Transitions kept for [`Session::drain_transitions`]; older ones are dropped
/// first.
pub const OUTBOX_CAPACITY: usize = 1024;

/// What an operation did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The operation was refused or changed nothing.
    Ignored,
    Started,
    Paused,
    Ticked {
        player: PlayerIndex,
        remaining: u64,
    },
    /// The active player's clock reached zero; the session paused itself.
    Expired {
        player: PlayerIndex,
    },
    TurnPassed {
        from: PlayerIndex,
        to: PlayerIndex,
        credited: u64,
        remaining_after: u64,
    },
    Reset,
    Reconfigured {
        config: TimerConfiguration,
    },
    IncrementChanged {
        seconds: u64,
    },
    SettingsOpened {
        was_running: bool,
    },
    SettingsClosed {
        resumed: bool,
    },
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }
}

/// Which run control the settings overlay offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlAction {
    /// The game was running when the overlay opened.
    Resume,
    Start,
    Pause,
}

/// An immutable copy of everything the presentation layer may show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub config: TimerConfiguration,
    pub remaining: Vec<u64>,
    pub active_player: PlayerIndex,
    pub is_running: bool,
    pub was_running_before_settings: bool,
    pub settings_open: bool,
    /// Bumped by every operation that changed something.
    pub revision: u64,
}

impl ClockSnapshot {
    pub fn active_remaining(&self) -> u64 {
        self.remaining[self.active_player.0]
    }

    /// The active player has run out of time.
    pub fn is_expired(&self) -> bool {
        self.active_remaining() == 0
    }

    pub fn control_action(&self) -> ControlAction {
        if self.was_running_before_settings {
            ControlAction::Resume
        } else if !self.is_running {
            ControlAction::Start
        } else {
            ControlAction::Pause
        }
    }

    pub fn can_remove_player(&self) -> bool {
        self.config.player_count > MIN_PLAYERS
    }

    pub fn can_add_player(&self) -> bool {
        self.config.player_count < MAX_PLAYERS
    }
}

/// A single game session: configuration, clocks and overlay state.
///
/// Every effective operation is also queued as a [`Transition`]. Callers that
/// drive a session by hand should call [`Session::drain_transitions`] now and
/// then; past [`OUTBOX_CAPACITY`] the oldest entries are discarded.
#[derive(Debug, Clone)]
pub struct Session {
    config: TimerConfiguration,
    state: ClockState,
    settings_open: bool,
    epoch: u64,
    revision: u64,
    outbox: VecDeque<Transition>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TimerConfiguration::default())
    }
}

impl Session {
    /// Starts a stopped session. Out-of-range values in `config` are pulled
    /// back inside the invariants first.
    pub fn new(config: TimerConfiguration) -> Self {
        let config = TimerConfiguration {
            player_count: config.player_count.clamp(MIN_PLAYERS, MAX_PLAYERS),
            initial_time_seconds: config.initial_time_seconds.max(1),
            increment_seconds: config.increment_seconds,
        };
        Self {
            state: ClockState::fresh(&config),
            config,
            settings_open: false,
            epoch: 0,
            revision: 0,
            outbox: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &TimerConfiguration {
        &self.config
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// Scheduling generation. Changes whenever the run flag, the active player
    /// or the identity of the clocks changes; a plain tick leaves it alone.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn active_player(&self) -> PlayerIndex {
        self.state.active_player
    }

    pub fn active_remaining(&self) -> u64 {
        self.state.remaining[self.state.active_player.0]
    }

    pub fn is_expired(&self) -> bool {
        self.active_remaining() == 0
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            config: self.config,
            remaining: self.state.remaining.clone(),
            active_player: self.state.active_player,
            is_running: self.state.is_running,
            was_running_before_settings: self.state.was_running_before_settings,
            settings_open: self.settings_open,
            revision: self.revision,
        }
    }

    /// Takes every transition recorded since the last call.
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        self.outbox.drain(..).collect()
    }

    fn record(&mut self, transition: Transition) -> Transition {
        if !transition.is_ignored() {
            self.revision += 1;
            if self.outbox.len() == OUTBOX_CAPACITY {
                self.outbox.pop_front();
            }
            self.outbox.push_back(transition.clone());
        }
        transition
    }

    fn set_running_flag(&mut self, running: bool) -> bool {
        if self.state.is_running == running {
            return false;
        }
        self.state.is_running = running;
        self.epoch += 1;
        true
    }

    fn replace_clocks(&mut self) {
        self.state.rewind(&self.config);
        self.epoch += 1;
    }

    /// Applies one second of game time to the active player.
    pub fn tick(&mut self) -> Transition {
        if !self.state.is_running {
            return Transition::Ignored;
        }
        let player = self.state.active_player;
        let slot = &mut self.state.remaining[player.0];
        if *slot == 0 {
            return Transition::Ignored;
        }
        *slot -= 1;
        let remaining = *slot;
        trace!(%player, remaining, "tick");

        if remaining == 0 {
            self.set_running_flag(false);
            info!(%player, "Clock expired, pausing");
            self.record(Transition::Expired { player })
        } else {
            self.record(Transition::Ticked { player, remaining })
        }
    }

    /// The "tap to advance" gesture.
    ///
    /// Does nothing on an expired clock. On a stopped clock it only arms the
    /// active player's countdown. Otherwise the increment is credited to the
    /// player who just finished and the turn moves to the next seat.
    pub fn advance_turn(&mut self) -> Transition {
        if self.is_expired() {
            debug!("Tap ignored, active clock has expired");
            return Transition::Ignored;
        }
        if !self.state.is_running {
            self.set_running_flag(true);
            info!(player = %self.state.active_player, "Clock started");
            return self.record(Transition::Started);
        }

        let from = self.state.active_player;
        let credited = self.config.increment_seconds;
        let slot = &mut self.state.remaining[from.0];
        *slot = slot.saturating_add(credited);
        let remaining_after = *slot;

        let to = from.next(self.config.player_count);
        self.state.active_player = to;
        self.epoch += 1;
        debug!(%from, %to, credited, remaining_after, "Turn passed");
        self.record(Transition::TurnPassed {
            from,
            to,
            credited,
            remaining_after,
        })
    }

    /// Restores every clock to the initial time, seat 0 active, stopped.
    pub fn reset(&mut self) -> Transition {
        self.replace_clocks();
        info!(
            players = self.config.player_count,
            initial = self.config.initial_time_seconds,
            "Clocks reset"
        );
        self.record(Transition::Reset)
    }

    /// Seats `requested` players, clamped into `[2, 12]`. A real change resets
    /// the whole game.
    pub fn set_player_count(&mut self, requested: usize) -> Transition {
        let player_count = requested.clamp(MIN_PLAYERS, MAX_PLAYERS);
        if player_count == self.config.player_count {
            return Transition::Ignored;
        }
        self.config.player_count = player_count;
        self.reconfigured()
    }

    /// The +/- stepper of the settings overlay.
    pub fn adjust_player_count(&mut self, up: bool) -> Transition {
        let current = self.config.player_count;
        let requested = if up {
            current + 1
        } else {
            current.saturating_sub(1)
        };
        self.set_player_count(requested)
    }

    /// Sets the starting time per player. Zero is refused; a real change
    /// resets the whole game.
    pub fn set_initial_time(&mut self, seconds: u64) -> Transition {
        if seconds == 0 {
            debug!("Refusing a zero initial time");
            return Transition::Ignored;
        }
        if seconds == self.config.initial_time_seconds {
            return Transition::Ignored;
        }
        self.config.initial_time_seconds = seconds;
        self.reconfigured()
    }

    fn reconfigured(&mut self) -> Transition {
        self.replace_clocks();
        info!(config = ?self.config, "Configuration changed, clocks reset");
        self.record(Transition::Reconfigured {
            config: self.config,
        })
    }

    /// Changes the per-turn bonus. Applies from the next completed turn on.
    pub fn set_increment(&mut self, seconds: u64) -> Transition {
        if seconds == self.config.increment_seconds {
            return Transition::Ignored;
        }
        self.config.increment_seconds = seconds;
        info!(seconds, "Increment changed");
        self.record(Transition::IncrementChanged { seconds })
    }

    /// Explicit start/pause. Touches only the run flag; starting an expired
    /// clock is refused.
    pub fn set_running(&mut self, running: bool) -> Transition {
        if running && self.is_expired() {
            debug!("Refusing to start an expired clock");
            return Transition::Ignored;
        }
        if !self.set_running_flag(running) {
            return Transition::Ignored;
        }
        if running {
            info!(player = %self.state.active_player, "Clock started");
            self.record(Transition::Started)
        } else {
            info!(player = %self.state.active_player, "Clock paused");
            self.record(Transition::Paused)
        }
    }

    /// Opens the overlay, remembering whether the game was running and
    /// pausing it.
    pub fn open_settings(&mut self) -> Transition {
        if self.settings_open {
            return Transition::Ignored;
        }
        let was_running = self.state.is_running;
        self.settings_open = true;
        self.state.was_running_before_settings = was_running;
        self.set_running_flag(false);
        debug!(was_running, "Settings opened");
        self.record(Transition::SettingsOpened { was_running })
    }

    /// Closes the overlay, resuming the game if it was running when the
    /// overlay opened.
    pub fn close_settings(&mut self) -> Transition {
        if !self.settings_open {
            return Transition::Ignored;
        }
        self.settings_open = false;
        let resumed = mem::take(&mut self.state.was_running_before_settings)
            && !self.is_expired()
            && self.set_running_flag(true);
        debug!(resumed, "Settings closed");
        self.record(Transition::SettingsClosed { resumed })
    }

    pub fn toggle_settings(&mut self) -> Transition {
        if self.settings_open {
            self.close_settings()
        } else {
            self.open_settings()
        }
    }

    /// The overlay's Resume or Start button: run, then close.
    pub fn start_from_settings(&mut self) -> Transition {
        self.set_running(true);
        self.close_settings()
    }

    /// A tap on the wheel surface. Closes the overlay when it is open,
    /// advances the turn otherwise.
    pub fn primary_tap(&mut self) -> Transition {
        if self.settings_open {
            self.close_settings()
        } else {
            self.advance_turn()
        }
    }
}
