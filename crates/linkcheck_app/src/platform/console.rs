use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use engine_logging::engine_warn;
use linkcheck_core::Msg;

/// Reads control commands from stdin: `p` toggles pause, `s` or `q` stops.
pub fn spawn_command_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                return;
            };
            let Some(msg) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    engine_warn!("Unknown command {:?}; use p (pause/resume) or s (stop)", line.trim());
                }
                continue;
            };
            if msg_tx.send(msg).is_err() {
                return;
            }
        }
    });
}

pub fn parse_command(line: &str) -> Option<Msg> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "resume" => Some(Msg::PauseToggled),
        "s" | "stop" | "q" | "quit" => Some(Msg::StopClicked),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command(" P \n"), Some(Msg::PauseToggled));
        assert_eq!(parse_command("stop"), Some(Msg::StopClicked));
        assert_eq!(parse_command("Q"), Some(Msg::StopClicked));
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command(""), None);
    }
}
