//! The core engine that owns a game session and drives its clock.

use crate::components::ticker::{run_ticker, TickSlot};
use crate::config::{TimerConfiguration, WheelClockConfig};
use crate::events::{ClockEvent, SystemEvent, TurnRecord};
use crate::session::{ClockSnapshot, Session, Transition};
use chrono::Utc;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, trace};

/// The main Wheelclock engine.
///
/// This struct is the single owner of the game session. Every gesture the
/// presentation layer forwards becomes one call here; after each call the
/// engine publishes a fresh [`ClockSnapshot`], broadcasts what happened and
/// re-arms or cancels the tick task. The `Engine` is cheap to clone; all clones
/// drive the same session. When the last clone is dropped the tick task is
/// aborted.
#[derive(Clone)]
pub struct WheelClockEngine {
    shared: Arc<Shared>,
}

struct Shared {
    tick_interval: Duration,
    core: RwLock<Core>,
    snapshot_sender: watch::Sender<ClockSnapshot>,
    clock_event_sender: broadcast::Sender<ClockEvent>,
    system_event_sender: broadcast::Sender<SystemEvent>,
}

struct Core {
    session: Session,
    ticker: TickSlot,
    history: Vec<TurnRecord>,
    shut_down: bool,
}

// Core implementation block for internal logic.
impl Shared {
    async fn mutate(self: &Arc<Self>, op: impl FnOnce(&mut Session) -> Transition) -> Transition {
        let mut core = self.core.write().await;
        let transition = op(&mut core.session);
        self.commit(&mut core);
        transition
    }

    /// Publishes everything the last operation changed and fixes up the ticker.
    fn commit(self: &Arc<Self>, core: &mut Core) {
        let now = Utc::now();
        for transition in core.session.drain_transitions() {
            if matches!(
                transition,
                Transition::Reset | Transition::Reconfigured { .. }
            ) {
                core.history.clear();
            }
            if let Some(event) = ClockEvent::from_transition(transition, now) {
                if let ClockEvent::TurnPassed(record) = &event {
                    core.history.push(record.clone());
                }
                self.clock_event_sender.send(event).ok();
            }
        }

        let revision = core.session.revision();
        let session = &core.session;
        self.snapshot_sender.send_if_modified(|current| {
            if current.revision == revision {
                return false;
            }
            *current = session.snapshot();
            true
        });

        self.reschedule(core);
    }

    fn reschedule(self: &Arc<Self>, core: &mut Core) {
        if core.session.is_running() && !core.shut_down {
            let epoch = core.session.epoch();
            if core.ticker.armed_epoch() != Some(epoch) {
                let handle = tokio::spawn(run_ticker(
                    self.tick_interval,
                    tick_callback(Arc::downgrade(self), epoch),
                ));
                core.ticker.arm(epoch, handle);
                debug!(epoch, "Ticker armed");
                self.system_event_sender
                    .send(SystemEvent::TickerArmed { epoch })
                    .ok();
            }
        } else if core.ticker.disarm() {
            debug!("Ticker disarmed");
            self.system_event_sender
                .send(SystemEvent::TickerDisarmed)
                .ok();
        }
    }

    /// Applies one scheduled tick if `epoch` is still current.
    /// Returns whether the ticker should keep going.
    async fn apply_tick(self: &Arc<Self>, epoch: u64) -> bool {
        let mut core = self.core.write().await;
        if core.shut_down || core.session.epoch() != epoch || !core.session.is_running() {
            trace!(epoch, "Dropping stale tick");
            return false;
        }
        core.session.tick();
        let keep_going = core.session.is_running();
        self.commit(&mut core);
        keep_going
    }
}

fn tick_callback(
    shared: Weak<Shared>,
    epoch: u64,
) -> impl FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send>> {
    move || {
        let shared = shared.clone();
        Box::pin(async move {
            match shared.upgrade() {
                Some(shared) => shared.apply_tick(epoch).await,
                None => false,
            }
        })
    }
}

impl WheelClockEngine {
    /// Creates a new `WheelClockEngine` from the loaded configuration.
    pub fn new(config: WheelClockConfig) -> Self {
        Self::with_configuration(config.timer_configuration(), config.tick_interval())
    }

    /// Creates an engine for the given game parameters and tick period.
    pub fn with_configuration(timer: TimerConfiguration, tick_interval: Duration) -> Self {
        const CHANNEL_CAPACITY: usize = 256;
        let session = Session::new(timer);
        let (snapshot_sender, _) = watch::channel(session.snapshot());
        let (clock_event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(64);

        info!(config = ?session.config(), ?tick_interval, "WheelClockEngine created");
        Self {
            shared: Arc::new(Shared {
                tick_interval,
                core: RwLock::new(Core {
                    session,
                    ticker: TickSlot::new(),
                    history: Vec::new(),
                    shut_down: false,
                }),
                snapshot_sender,
                clock_event_sender,
                system_event_sender,
            }),
        }
    }

    /// Cancels the tick task for good. Later operations still update the
    /// session but never arm a new ticker.
    pub async fn shutdown(&self) {
        let mut core = self.shared.core.write().await;
        core.shut_down = true;
        core.ticker.disarm();
        info!("WheelClockEngine has shut down.");
        self.shared
            .system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
    }
}

// Public API implementation block.
impl WheelClockEngine {
    /// Applies one second of game time right away, outside the schedule.
    pub async fn tick(&self) -> Transition {
        self.shared.mutate(Session::tick).await
    }

    /// The "tap to advance" gesture.
    pub async fn advance_turn(&self) -> Transition {
        self.shared.mutate(Session::advance_turn).await
    }

    /// A tap on the wheel: closes the overlay if open, advances otherwise.
    pub async fn primary_tap(&self) -> Transition {
        self.shared.mutate(Session::primary_tap).await
    }

    pub async fn reset(&self) -> Transition {
        self.shared.mutate(Session::reset).await
    }

    pub async fn set_player_count(&self, requested: usize) -> Transition {
        self.shared
            .mutate(|session| session.set_player_count(requested))
            .await
    }

    pub async fn adjust_player_count(&self, up: bool) -> Transition {
        self.shared
            .mutate(|session| session.adjust_player_count(up))
            .await
    }

    pub async fn set_initial_time(&self, seconds: u64) -> Transition {
        self.shared
            .mutate(|session| session.set_initial_time(seconds))
            .await
    }

    pub async fn set_increment(&self, seconds: u64) -> Transition {
        self.shared
            .mutate(|session| session.set_increment(seconds))
            .await
    }

    pub async fn set_running(&self, running: bool) -> Transition {
        self.shared
            .mutate(|session| session.set_running(running))
            .await
    }

    pub async fn open_settings(&self) -> Transition {
        self.shared.mutate(Session::open_settings).await
    }

    pub async fn close_settings(&self) -> Transition {
        self.shared.mutate(Session::close_settings).await
    }

    pub async fn toggle_settings(&self) -> Transition {
        self.shared.mutate(Session::toggle_settings).await
    }

    /// The overlay's Resume/Start button.
    pub async fn start_from_settings(&self) -> Transition {
        self.shared.mutate(Session::start_from_settings).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> ClockSnapshot {
        self.shared.snapshot_sender.borrow().clone()
    }

    /// Turns completed since the last reset or reconfiguration.
    pub async fn history(&self) -> Vec<TurnRecord> {
        self.shared.core.read().await.history.clone()
    }

    /// Whether a tick task is currently scheduled.
    pub async fn is_ticking(&self) -> bool {
        self.shared.core.read().await.ticker.is_armed()
    }

    /// Subscribes to state snapshots. The receiver always holds the latest one.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<ClockSnapshot> {
        self.shared.snapshot_sender.subscribe()
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_clock_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.shared.clock_event_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.shared.system_event_sender.subscribe()
    }
}
