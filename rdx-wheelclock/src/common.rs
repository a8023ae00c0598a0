//! Contains common, primitive types and bounds shared across the engine.
//!
//! The wheel always seats between [`MIN_PLAYERS`] and [`MAX_PLAYERS`] players.
//! Player positions are plain indices into the remaining-time sequence, wrapped
//! in [`PlayerIndex`] so they cannot be confused with second counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The smallest number of players the wheel supports.
pub const MIN_PLAYERS: usize = 2;

/// The largest number of players the wheel supports.
pub const MAX_PLAYERS: usize = 12;

pub const DEFAULT_PLAYERS: usize = 4;
pub const DEFAULT_INITIAL_TIME_SECONDS: u64 = 300;
pub const DEFAULT_INCREMENT_SECONDS: u64 = 0;

/// Identifies a seat on the wheel.
///
/// Seat `0` is the first player and the one that owns the clock after every
/// reset or reconfiguration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerIndex(pub usize);

impl PlayerIndex {
    /// The seat after this one, wrapping around a wheel of `player_count` seats.
    pub fn next(self, player_count: usize) -> Self {
        PlayerIndex((self.0 + 1) % player_count)
    }
}

impl fmt::Display for PlayerIndex {
    // Humans count seats from one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Clamps a requested player count into the supported range.
pub fn clamp_player_count(requested: i64) -> usize {
    requested.clamp(MIN_PLAYERS as i64, MAX_PLAYERS as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_around_the_wheel() {
        assert_eq!(PlayerIndex(0).next(4), PlayerIndex(1));
        assert_eq!(PlayerIndex(3).next(4), PlayerIndex(0));
        assert_eq!(PlayerIndex(1).next(2), PlayerIndex(0));
    }

    #[test]
    fn clamp_player_count_respects_bounds() {
        assert_eq!(clamp_player_count(-3), MIN_PLAYERS);
        assert_eq!(clamp_player_count(1), MIN_PLAYERS);
        assert_eq!(clamp_player_count(7), 7);
        assert_eq!(clamp_player_count(40), MAX_PLAYERS);
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(PlayerIndex(0).to_string(), "P1");
        assert_eq!(PlayerIndex(11).to_string(), "P12");
    }
}
