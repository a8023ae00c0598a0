//! Boundary parsing for values typed by the user.
//!
//! The settings overlay accepts free text for the custom time and increment
//! fields. Anything rejected here never reaches the session, so the current
//! configuration stays as it was.

use crate::common::clamp_player_count;
use thiserror::Error;

/// Why a typed value was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("value must be greater than zero")]
    NotPositive,
    #[error("value must not be negative")]
    Negative,
}

fn parse_integer(text: &str) -> Result<i64, InputError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))
}

/// Parses a custom initial time given in minutes and returns it in seconds.
pub fn parse_initial_minutes(text: &str) -> Result<u64, InputError> {
    let minutes = parse_integer(text)?;
    if minutes <= 0 {
        return Err(InputError::NotPositive);
    }
    Ok((minutes as u64).saturating_mul(60))
}

/// Parses a custom increment given in seconds.
pub fn parse_increment_seconds(text: &str) -> Result<u64, InputError> {
    let seconds = parse_integer(text)?;
    if seconds < 0 {
        return Err(InputError::Negative);
    }
    Ok(seconds as u64)
}

/// Parses a player count. Out-of-range numbers are clamped, not refused.
pub fn parse_player_count(text: &str) -> Result<usize, InputError> {
    parse_integer(text).map(clamp_player_count)
}
