//! Parsing of shell input lines into commands.

/// Target of the `players` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerArg {
    Up,
    Down,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A tap on the wheel surface.
    Tap,
    /// The centre button: open or close the overlay.
    Settings,
    Players(PlayerArg),
    Time(String),
    Increment(String),
    Reset,
    Resume,
    Start,
    Pause,
    Status,
    History,
    Watch(bool),
    Help,
    Exit,
}

impl Command {
    /// Commands that only work while the settings overlay is open.
    pub fn needs_settings(&self) -> bool {
        matches!(
            self,
            Command::Players(_)
                | Command::Time(_)
                | Command::Increment(_)
                | Command::Reset
                | Command::Resume
                | Command::Start
                | Command::Pause
        )
    }
}

pub const COMMAND_NAMES: &[&str] = &[
    "tap", "settings", "players", "time", "increment", "reset", "resume", "start", "pause",
    "status", "wheel", "history", "watch", "help", "exit", "quit",
];

/// Parses one input line. An empty line is a tap.
pub fn parse(line: &str) -> Result<Command, String> {
    let args = line.split_whitespace().collect::<Vec<_>>();
    let Some(&command) = args.first() else {
        return Ok(Command::Tap);
    };
    let argument = |usage: &str| {
        args.get(1)
            .map(|value| value.to_string())
            .ok_or_else(|| format!("Usage: {}", usage))
    };

    let parsed = match command {
        "tap" | "t" => Command::Tap,
        "settings" | "s" => Command::Settings,
        "players" | "p" => match args.get(1) {
            Some(&"+") => Command::Players(PlayerArg::Up),
            Some(&"-") => Command::Players(PlayerArg::Down),
            Some(value) => Command::Players(PlayerArg::Exact(value.to_string())),
            None => return Err("Usage: players <N|+|->".to_string()),
        },
        "time" => Command::Time(argument("time <MINUTES>")?),
        "increment" | "inc" => Command::Increment(argument("increment <SECONDS>")?),
        "reset" => Command::Reset,
        "resume" => Command::Resume,
        "start" => Command::Start,
        "pause" => Command::Pause,
        "status" | "wheel" => Command::Status,
        "history" => Command::History,
        "watch" => match args.get(1) {
            Some(&"on") => Command::Watch(true),
            Some(&"off") => Command::Watch(false),
            _ => return Err("Usage: watch <on|off>".to_string()),
        },
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        _ => return Err(format!("Unknown command: '{}'. Type 'help'.", line.trim())),
    };
    Ok(parsed)
}

pub const HELP: &str = "\
Available commands:
  tap | <enter>          - Tap the wheel: start the clock, pass the turn, or close settings.
  settings               - Open or close the settings overlay (pauses the game).
  status                 - Show the wheel.
  history                - Show the turns played since the last reset.
  watch on|off           - Print every tick as it happens.
  exit                   - Quits the shell.
Inside settings:
  players <N> | + | -    - Change the number of players (2-12). Resets the game.
  time <MINUTES>         - Initial time per player. Resets the game.
  increment <SECONDS>    - Bonus per completed turn.
  reset                  - Reset every clock.
  resume | start | pause - The run control the overlay offers.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_a_tap() {
        assert_eq!(parse(""), Ok(Command::Tap));
        assert_eq!(parse("   "), Ok(Command::Tap));
        assert_eq!(parse("t"), Ok(Command::Tap));
    }

    #[test]
    fn player_arguments() {
        assert_eq!(parse("players +"), Ok(Command::Players(PlayerArg::Up)));
        assert_eq!(parse("p -"), Ok(Command::Players(PlayerArg::Down)));
        assert_eq!(
            parse("players 7"),
            Ok(Command::Players(PlayerArg::Exact("7".to_string())))
        );
        assert!(parse("players").is_err());
    }

    #[test]
    fn values_are_passed_through_unparsed() {
        assert_eq!(parse("time 10"), Ok(Command::Time("10".to_string())));
        assert_eq!(
            parse("increment abc"),
            Ok(Command::Increment("abc".to_string()))
        );
        assert!(parse("time").is_err());
    }

    #[test]
    fn watch_needs_on_or_off() {
        assert_eq!(parse("watch on"), Ok(Command::Watch(true)));
        assert_eq!(parse("watch off"), Ok(Command::Watch(false)));
        assert!(parse("watch").is_err());
    }

    #[test]
    fn overlay_commands_are_flagged() {
        assert!(Command::Reset.needs_settings());
        assert!(Command::Time("1".to_string()).needs_settings());
        assert!(!Command::Tap.needs_settings());
        assert!(!Command::Settings.needs_settings());
        assert!(!Command::Status.needs_settings());
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert!(parse("jump").unwrap_err().contains("jump"));
    }
}
