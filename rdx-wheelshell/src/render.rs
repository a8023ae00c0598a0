//! Text rendering of the wheel and the settings overlay.

use colored::{Color, ColoredString, Colorize};
use wheelclock::prelude::*;

/// One colour per seat, in seating order.
const PALETTE: [(u8, u8, u8); MAX_PLAYERS] = [
    (0x3b, 0x82, 0xf6), // blue
    (0x22, 0xc5, 0x5e), // green
    (0xef, 0x44, 0x44), // red
    (0xf5, 0x9e, 0x0b), // amber
    (0xa8, 0x55, 0xf7), // purple
    (0xec, 0x48, 0x99), // pink
    (0x63, 0x66, 0xf1), // indigo
    (0x06, 0xb6, 0xd4), // cyan
    (0xf9, 0x73, 0x16), // orange
    (0x84, 0xcc, 0x16), // lime
    (0x10, 0xb9, 0x81), // emerald
    (0x8b, 0x5c, 0xf6), // violet
];

pub fn player_color(player: PlayerIndex) -> Color {
    let (r, g, b) = PALETTE[player.0 % PALETTE.len()];
    Color::TrueColor { r, g, b }
}

/// `m:ss`, minutes unpadded.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Angular extent of a seat, in degrees clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSegment {
    pub start_angle: f64,
    pub mid_angle: f64,
    pub end_angle: f64,
}

pub fn wheel_segment(player: PlayerIndex, player_count: usize) -> WheelSegment {
    let span = 360.0 / player_count as f64;
    let start_angle = span * player.0 as f64;
    let end_angle = start_angle + span;
    WheelSegment {
        start_angle,
        mid_angle: (start_angle + end_angle) / 2.0,
        end_angle,
    }
}

fn status_label(snapshot: &ClockSnapshot) -> ColoredString {
    if snapshot.is_expired() {
        "TIME UP".red().bold()
    } else if snapshot.is_running {
        "RUNNING".green().bold()
    } else {
        "PAUSED".yellow().bold()
    }
}

/// Renders every seat with its clock; the active seat is marked.
pub fn render_wheel(snapshot: &ClockSnapshot) -> String {
    let config = &snapshot.config;
    let mut out = format!(
        "{}  {} players | {} each | +{}s | {}\n",
        "Wheel".cyan().bold(),
        config.player_count,
        format_time(config.initial_time_seconds),
        config.increment_seconds,
        status_label(snapshot),
    );
    for (index, &remaining) in snapshot.remaining.iter().enumerate() {
        let player = PlayerIndex(index);
        let segment = wheel_segment(player, config.player_count);
        let marker = if player == snapshot.active_player { ">" } else { " " };
        let name = format!("{:<3}", player.to_string()).color(player_color(player));
        let clock = format_time(remaining);
        let clock = if remaining == 0 {
            clock.red().bold()
        } else if player == snapshot.active_player {
            clock.bold()
        } else {
            clock.normal()
        };
        out.push_str(&format!(
            "  {} {} {:>6}   {}\n",
            marker,
            name,
            clock,
            format!(
                "[{:>5.1}° .. {:>5.1}°]",
                segment.start_angle, segment.end_angle
            )
            .dimmed(),
        ));
    }
    out
}

fn render_presets(presets: &[u64], current: u64, unit: &str) -> String {
    presets
        .iter()
        .map(|&value| {
            let label = format!("{}{}", value, unit);
            if value == current {
                format!("[{}]", label).blue().bold().to_string()
            } else {
                format!(" {} ", label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the settings overlay.
pub fn render_settings(snapshot: &ClockSnapshot, config: &WheelClockConfig) -> String {
    let timer = &snapshot.config;
    let mut out = format!("{}\n", "Settings".bold());
    if snapshot.was_running_before_settings {
        out.push_str(&format!("  {}\n", "Game paused".yellow().bold()));
    }

    let control = match snapshot.control_action() {
        ControlAction::Resume => "resume".green(),
        ControlAction::Start => "start".green(),
        ControlAction::Pause => "pause".yellow(),
    };
    out.push_str(&format!("  controls : {} | {}\n", "reset".red(), control));

    let minus = if snapshot.can_remove_player() { "-" } else { " " };
    let plus = if snapshot.can_add_player() { "+" } else { " " };
    out.push_str(&format!(
        "  players  : {} {} {}   (supported range: {}-{})\n",
        minus, timer.player_count, plus, MIN_PLAYERS, MAX_PLAYERS
    ));
    out.push_str(&format!(
        "  time     : {}   (current: {} min)\n",
        render_presets(
            &config.time_presets_minutes,
            timer.initial_time_seconds / 60,
            "m"
        ),
        timer.initial_time_seconds / 60,
    ));
    out.push_str(&format!(
        "  increment: {}   (current: {} sec)\n",
        render_presets(
            &config.increment_presets_seconds,
            timer.increment_seconds,
            "s"
        ),
        timer.increment_seconds,
    ));
    out
}

pub fn render_history(history: &[TurnRecord]) -> String {
    if history.is_empty() {
        return "No turns played yet.\n".to_string();
    }
    let mut out = String::new();
    for (number, record) in history.iter().enumerate() {
        out.push_str(&format!(
            "  #{:<3} {} {} -> {}  +{}s  ({} left)\n",
            number + 1,
            record.at.with_timezone(&chrono::Local).format("%H:%M:%S"),
            record.from.to_string().color(player_color(record.from)),
            record.to.to_string().color(player_color(record.to)),
            record.credited,
            format_time(record.remaining_after),
        ));
    }
    out
}
