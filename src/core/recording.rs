//! A transport that records commands instead of running them.
//!
//! Backs `--dry-run` and the test suite. Responses are scripted by substring:
//! the first rule whose location matches and whose needle occurs in the
//! command decides the output. Unmatched commands succeed with no output.

use serde::Serialize;
use std::cell::RefCell;

use crate::executor::Transport;
use crate::ssh::CommandOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCommand {
    pub location: Location,
    pub privileged: bool,
    pub command: String,
}

struct Rule {
    location: Location,
    needle: String,
    output: CommandOutput,
}

pub struct RecordingTransport {
    host: String,
    rules: Vec<Rule>,
    calls: RefCell<Vec<RecordedCommand>>,
}

impl RecordingTransport {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            rules: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(mut self, location: Location, needle: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            location,
            needle: needle.to_string(),
            output,
        });
        self
    }

    pub fn on_local(self, needle: &str, stdout: &str) -> Self {
        self.respond(Location::Local, needle, CommandOutput::ok(stdout))
    }

    pub fn on_remote(self, needle: &str, stdout: &str) -> Self {
        self.respond(Location::Remote, needle, CommandOutput::ok(stdout))
    }

    pub fn fail_remote(self, needle: &str, exit_code: i32, stderr: &str) -> Self {
        self.respond(
            Location::Remote,
            needle,
            CommandOutput::failed(exit_code, stderr),
        )
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.borrow().clone()
    }

    pub fn remote_commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.location == Location::Remote)
            .map(|c| c.command.clone())
            .collect()
    }

    /// Number of recorded remote commands containing `needle`.
    pub fn count_remote(&self, needle: &str) -> usize {
        self.remote_commands()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }

    fn answer(&self, location: Location, privileged: bool, command: &str) -> CommandOutput {
        self.calls.borrow_mut().push(RecordedCommand {
            location,
            privileged,
            command: command.to_string(),
        });

        self.rules
            .iter()
            .find(|rule| rule.location == location && command.contains(&rule.needle))
            .map(|rule| rule.output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

impl Transport for RecordingTransport {
    fn host(&self) -> &str {
        &self.host
    }

    fn execute_local(&self, command: &str) -> CommandOutput {
        self.answer(Location::Local, false, command)
    }

    fn execute_remote(&self, command: &str, privileged: bool) -> CommandOutput {
        self.answer(Location::Remote, privileged, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins() {
        let transport = RecordingTransport::new("web1")
            .on_remote("status", "app start/running")
            .on_remote("service app", "unused");
        let out = transport.execute_remote("service app status", true);
        assert_eq!(out.stdout, "app start/running");
    }

    #[test]
    fn rules_are_scoped_by_location() {
        let transport = RecordingTransport::new("web1").on_local("git status", "?? new.txt");
        assert_eq!(transport.execute_remote("git status", false).stdout, "");
        assert_eq!(transport.execute_local("git status").stdout, "?? new.txt");
    }

    #[test]
    fn unmatched_commands_succeed_silently() {
        let transport = RecordingTransport::new("web1");
        let out = transport.execute_remote("git fetch", false);
        assert!(out.success);
        assert!(out.stdout.is_empty());
        assert_eq!(transport.count_remote("git fetch"), 1);
    }
}
