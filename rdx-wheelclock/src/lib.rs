//! # Wheelclock
//!
//! A turn-timer ("chess clock") engine for 2 to 12 players seated around a
//! wheel.
//!
//! Every player owns a countdown. Tapping passes the turn to the next seat,
//! optionally crediting a time increment to the player who just finished. A
//! settings overlay pauses the game while the player count, the initial time
//! or the increment are changed.
//!
//! ## Core Concepts
//!
//! - **Session**: the pure state machine. It holds the `TimerConfiguration` and
//!   the per-player clocks and implements every rule (ticking, passing turns,
//!   resets, the overlay's pause/resume contract).
//! - **Engine**: an async handle that owns one session, publishes a
//!   `ClockSnapshot` after every change and runs the one-second ticker only
//!   while a clock is running.
//! - **Event-Driven**: presentation code redraws from the snapshot channel and
//!   can react to `ClockEvent`s such as an expired clock.
//! - **Configuration-Driven**: defaults come from `WheelClockConfig`, usually
//!   loaded from `wheelclock.toml` and `WHEELCLOCK_*` variables.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use wheelclock::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Load the configuration.
//!     let config = WheelClockConfig::load(None)?;
//!
//!     // 2. Create the engine.
//!     let engine = WheelClockEngine::new(config);
//!
//!     // 3. Subscribe to events before driving the game.
//!     let mut events = engine.subscribe_clock_events();
//!     tokio::spawn(async move {
//!         while let Some(event) = next_event(&mut events).await {
//!             println!("Clock event: {:?}", event);
//!         }
//!     });
//!
//!     // 4. First tap arms the clock, the second passes the turn.
//!     engine.advance_turn().await;
//!     engine.advance_turn().await;
//!     println!("{:?}", engine.snapshot());
//!
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Wheelclock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod input;
pub mod session;

/// A prelude module for easy importing of the most common Wheelclock types.
pub mod prelude {
    pub use crate::common::{PlayerIndex, MAX_PLAYERS, MIN_PLAYERS};
    pub use crate::config::{TimerConfiguration, WheelClockConfig};
    pub use crate::engine::WheelClockEngine;
    pub use crate::events::{next_event, ClockEvent, SystemEvent, TurnRecord};
    pub use crate::input::InputError;
    pub use crate::session::{ClockSnapshot, ClockState, ControlAction, Session, Transition};
}
