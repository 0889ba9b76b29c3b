//! Pipeline narration on stderr.
//!
//! Stdout is reserved for the JSON response, so everything a person watching
//! the deployment should see goes to stderr. Colors are only emitted when
//! stderr is a terminal.

use crossterm::style::Stylize;
use std::fmt::Display;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Step start messages.
    Info,
    /// Section headings.
    Heading,
    Success,
    /// Hard failures and skip warnings.
    Failure,
}

pub fn paint(tone: Tone, text: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Info => text.cyan().to_string(),
        Tone::Heading => text.blue().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Failure => text.red().to_string(),
    }
}

fn color_enabled() -> bool {
    std::io::stderr().is_terminal()
}

pub fn say(tone: Tone, message: impl Display) {
    eprintln!("{}", paint(tone, &message.to_string(), color_enabled()));
}

pub fn info(message: impl Display) {
    say(Tone::Info, message);
}

pub fn heading(message: impl Display) {
    say(Tone::Heading, message);
}

pub fn success(message: impl Display) {
    say(Tone::Success, message);
}

pub fn failure(message: impl Display) {
    say(Tone::Failure, message);
}

pub fn blank() {
    eprintln!();
}

/// Echo a command before it runs, e.g. `[web1] sudo: service app restart`.
pub fn command(host: &str, verb: &str, command: &str) {
    eprintln!("[{}] {}: {}", host, verb, command);
}

/// Echo captured command output line by line.
pub fn output(host: &str, text: &str) {
    for line in text.lines() {
        eprintln!("[{}] out: {}", host, line);
    }
}
