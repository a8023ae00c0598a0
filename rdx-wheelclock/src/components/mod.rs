//! Contains the building blocks the engine uses to drive time.
//!
//! Right now that is the ticker: the single cancellable repeating task that
//! turns wall-clock time into game ticks while a clock is running.

pub mod ticker;
