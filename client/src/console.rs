//! Line-based command console on stdin.
//!
//! The headless binary has no window shell, so keyboard, gamepad, focus, and
//! chat events all arrive as console commands. A reader thread forwards
//! parsed commands over a channel; the frame loop drains it once per tick so
//! command handling never blocks the simulation.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use log::info;

use crate::game::Game;
use crate::input::GamepadButtons;
use crate::storage::{NAME_KEY, PreferenceStore};
use crate::transport::Transport;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `say <text>` — send a chat message.
    Say(String),
    /// `name <name>` — rename, persist, and broadcast.
    Name(String),
    /// `press <key>` / `release <key>` — raw key identifiers, same table as
    /// the browser shell (`w`, `ArrowUp`, `Space`, ...).
    Press(String),
    Release(String),
    /// `pad [left] [right] [up] [down] [a]` — a full gamepad snapshot;
    /// omitted buttons read as released.
    Pad(GamepadButtons),
    /// `focus on|off`.
    Focus(bool),
    /// `status` — log pose, camera, animation, and session counters.
    Status,
    /// `quit` / `exit`.
    Quit,
}

/// Parse one console line. Unknown or malformed lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "say" if !rest.is_empty() => Some(Command::Say(rest.to_string())),
        "name" if !rest.is_empty() => Some(Command::Name(rest.to_string())),
        "press" if !rest.is_empty() => Some(Command::Press(rest.to_string())),
        "release" if !rest.is_empty() => Some(Command::Release(rest.to_string())),
        "pad" => Some(Command::Pad(parse_pad(rest))),
        "focus" => match rest {
            "on" => Some(Command::Focus(true)),
            "off" => Some(Command::Focus(false)),
            _ => None,
        },
        "status" => Some(Command::Status),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_pad(flags: &str) -> GamepadButtons {
    let mut buttons = GamepadButtons::default();
    for flag in flags.split_whitespace() {
        match flag {
            "left" => buttons.left = true,
            "right" => buttons.right = true,
            "up" => buttons.up = true,
            "down" => buttons.down = true,
            "a" => buttons.a = true,
            _ => {}
        }
    }
    buttons
}

/// Apply one command to the running game. Returns `false` when the session
/// should end.
pub fn apply<T: Transport>(
    game: &mut Game<T>,
    store: &mut dyn PreferenceStore,
    command: Command,
) -> bool {
    match command {
        Command::Say(text) => game.send_message(text),
        Command::Name(name) => {
            store.set(NAME_KEY, &name);
            game.change_user_name(name);
        }
        Command::Press(key) => game.key_event(&key, true),
        Command::Release(key) => game.key_event(&key, false),
        Command::Pad(buttons) => game.gamepad_event(&buttons),
        Command::Focus(focused) => game.set_focused(focused),
        Command::Status => log_status(game),
        Command::Quit => return false,
    }
    true
}

fn log_status<T: Transport>(game: &Game<T>) {
    let (eye, target) = game.camera_pose();
    let mixer = &game.avatar.mixer;
    info!(
        "pos {:?} yaw {:.2} | camera {:?} -> {:?} | '{}' clip {} at {:.2}s | {} remote users, {} messages",
        game.avatar.transform.translation,
        game.avatar.transform.yaw,
        eye,
        target,
        mixer.clip_name(),
        if mixer.running { "playing" } else { "stopped" },
        mixer.time,
        game.session.users.len(),
        game.session.messages.len(),
    );
}

/// Spawn the stdin reader thread and return its command stream. The thread
/// exits when stdin closes or the receiver is dropped.
pub fn spawn_reader() -> Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = parse(&line) {
                if tx.send(command).is_err() {
                    break;
                }
            }
        }
    });
    rx
}
