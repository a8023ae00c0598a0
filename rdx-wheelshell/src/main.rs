mod commands;
mod render;

use anyhow::Result;
use colored::Colorize;
use commands::{Command, PlayerArg, COMMAND_NAMES, HELP};
use render::{format_time, render_history, render_settings, render_wheel};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wheelclock::input::{parse_increment_seconds, parse_initial_minutes, parse_player_count};
use wheelclock::prelude::*;
use wheelclock::{ENGINE_NAME, VERSION as LIB_VERSION};

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Colours the command word: known commands green, anything else yellow.
#[derive(Completer, Helper, Hinter, Validator)]
struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let colored_command = if COMMAND_NAMES.contains(&command) {
            command.green().bold()
        } else {
            command.yellow()
        };
        if line.contains(' ') {
            Cow::Owned(format!("{} {}", colored_command, rest))
        } else {
            Cow::Owned(colored_command.to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", "wheelshell :: multiplayer turn timer".cyan().bold());
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!("{}", "-".repeat(60).dimmed());
}

/// Spawns a task that prints noteworthy clock events as they happen.
fn spawn_event_listeners(engine: &WheelClockEngine, is_watching_ticks: Arc<AtomicBool>) {
    let mut clock_rx = engine.subscribe_clock_events();
    tokio::spawn(async move {
        while let Some(event) = next_event(&mut clock_rx).await {
            match event {
                ClockEvent::Expired { player } => {
                    println!(
                        "\n<-- [TIME UP] {} has run out of time. Open settings to reset.\n>> ",
                        player
                    );
                }
                ClockEvent::Ticked { player, remaining } => {
                    if is_watching_ticks.load(Ordering::Relaxed) {
                        println!("<-- [TICK] {} {}", player, format_time(remaining));
                    }
                }
                ClockEvent::TurnPassed(record) => {
                    if is_watching_ticks.load(Ordering::Relaxed) {
                        println!(
                            "<-- [TURN] {} -> {} (+{}s)",
                            record.from, record.to, record.credited
                        );
                    }
                }
                _ => {}
            }
        }
    });
}

/// Runs one command. Returns `false` when the shell should exit.
async fn execute(
    engine: &WheelClockEngine,
    config: &WheelClockConfig,
    command: Command,
    is_watching_ticks: &AtomicBool,
) -> bool {
    let snapshot = engine.snapshot();
    if command.needs_settings() && !snapshot.settings_open {
        println!("Open the settings overlay first ('settings').");
        return true;
    }

    match command {
        Command::Tap => {
            if engine.primary_tap().await.is_ignored() && snapshot.is_expired() {
                println!(
                    "--> {} is out of time. Open settings to reset.",
                    snapshot.active_player
                );
            } else {
                print!("{}", render_wheel(&engine.snapshot()));
            }
        }
        Command::Settings => {
            if let Transition::SettingsOpened { .. } = engine.toggle_settings().await {
                print!("{}", render_settings(&engine.snapshot(), config));
            } else {
                print!("{}", render_wheel(&engine.snapshot()));
            }
        }
        Command::Players(arg) => {
            let transition = match arg {
                PlayerArg::Up => engine.adjust_player_count(true).await,
                PlayerArg::Down => engine.adjust_player_count(false).await,
                PlayerArg::Exact(text) => match parse_player_count(&text) {
                    Ok(count) => engine.set_player_count(count).await,
                    Err(e) => {
                        println!("Error: {}", e);
                        return true;
                    }
                },
            };
            if transition.is_ignored() {
                println!("--> Player count unchanged.");
            }
            print!("{}", render_settings(&engine.snapshot(), config));
        }
        Command::Time(text) => match parse_initial_minutes(&text) {
            Ok(seconds) => {
                engine.set_initial_time(seconds).await;
                print!("{}", render_settings(&engine.snapshot(), config));
            }
            Err(e) => println!("Error: {}", e),
        },
        Command::Increment(text) => match parse_increment_seconds(&text) {
            Ok(seconds) => {
                engine.set_increment(seconds).await;
                print!("{}", render_settings(&engine.snapshot(), config));
            }
            Err(e) => println!("Error: {}", e),
        },
        Command::Reset => {
            engine.reset().await;
            println!("--> All clocks reset.");
        }
        Command::Resume | Command::Start | Command::Pause => {
            let offered = snapshot.control_action();
            let requested = match command {
                Command::Resume => ControlAction::Resume,
                Command::Start => ControlAction::Start,
                _ => ControlAction::Pause,
            };
            if requested != offered {
                println!("--> The overlay offers '{:?}' right now.", offered);
                return true;
            }
            match offered {
                ControlAction::Resume | ControlAction::Start => {
                    engine.start_from_settings().await;
                    print!("{}", render_wheel(&engine.snapshot()));
                }
                ControlAction::Pause => {
                    engine.set_running(false).await;
                    print!("{}", render_settings(&engine.snapshot(), config));
                }
            }
        }
        Command::Status => {
            if snapshot.settings_open {
                print!("{}", render_settings(&snapshot, config));
            }
            print!("{}", render_wheel(&snapshot));
        }
        Command::History => print!("{}", render_history(&engine.history().await)),
        Command::Watch(on) => {
            is_watching_ticks.store(on, Ordering::Relaxed);
            println!(
                "--> {} the tick stream.",
                if on { "Started printing" } else { "Stopped printing" }
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Exit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    let config_path = env::var_os("WHEELCLOCK_CONFIG").map(PathBuf::from);
    let config = WheelClockConfig::load(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_target(false)
        .init();

    let engine = WheelClockEngine::new(config.clone());

    // Create the shared flag for the tick listener.
    let is_watching_ticks = Arc::new(AtomicBool::new(false));
    spawn_event_listeners(&engine, is_watching_ticks.clone());

    info!("{} v{} ready", ENGINE_NAME, LIB_VERSION);

    let mut rl = Editor::new()?;
    let helper = ShellHighlighter {};
    rl.set_helper(Some(helper));

    print!("{}", render_wheel(&engine.snapshot()));
    println!(
        "{} is ready. Press enter to tap, 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                match commands::parse(&line) {
                    Ok(command) => {
                        if !execute(&engine, &config, command, &is_watching_ticks).await {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }
            Err(_) => {
                println!("Exiting wheelshell...");
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
