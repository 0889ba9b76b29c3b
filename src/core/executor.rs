//! Command execution against the deployment target.
//!
//! [`Transport`] is the boundary to whatever actually runs commands (SSH,
//! local shell, or a recording double). [`Shell`] sits on top of it and adds
//! working-directory and environment scoping plus the abort-on-failure
//! contract: a non-zero exit becomes an `Err` unless the call is quiet.

use crate::announce;
use crate::error::{CommandFailedDetails, Error, Result};
use crate::ssh::CommandOutput;
use crate::utils::shell;

pub trait Transport {
    /// Host name used in echo lines and error details.
    fn host(&self) -> &str;

    fn execute_local(&self, command: &str) -> CommandOutput;

    /// Run a composed command on the target, optionally with elevated privilege.
    fn execute_remote(&self, command: &str, privileged: bool) -> CommandOutput;

    /// Whether a failed remote call never reached the remote command.
    fn is_connection_failure(&self, _output: &CommandOutput) -> bool {
        false
    }
}

/// Scoped view of a transport.
///
/// `cd` and `prefix` return a new shell; the receiver keeps its own scope, so
/// leaving a nested scope is simply dropping the child.
#[derive(Clone)]
pub struct Shell<'a> {
    transport: &'a dyn Transport,
    dirs: Vec<String>,
    prefixes: Vec<String>,
}

impl<'a> Shell<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            dirs: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    /// Scope subsequent remote commands to `path`.
    pub fn cd(&self, path: &str) -> Shell<'a> {
        let mut scoped = self.clone();
        scoped.dirs.push(path.to_string());
        scoped
    }

    /// Run `command` before every subsequent remote command, e.g. `source activate`.
    pub fn prefix(&self, command: &str) -> Shell<'a> {
        let mut scoped = self.clone();
        scoped.prefixes.push(command.to_string());
        scoped
    }

    /// The command line that will be sent for `command` in this scope.
    pub fn compose(&self, command: &str) -> String {
        let mut parts: Vec<String> = self
            .dirs
            .iter()
            .map(|dir| format!("cd {}", shell::quote_path(dir)))
            .collect();
        parts.extend(self.prefixes.iter().cloned());
        parts.push(command.to_string());
        parts.join(" && ")
    }

    /// Run a command on the local machine. Remote scoping does not apply.
    pub fn local(&self, command: &str) -> Result<CommandOutput> {
        announce::command("localhost", "local", command);
        let output = self.transport.execute_local(command);
        if !output.success {
            return Err(Error::local_command_failed(failure_details(
                command,
                "localhost",
                output,
            )));
        }
        Ok(output)
    }

    pub fn run(&self, command: &str) -> Result<CommandOutput> {
        self.remote(command, false)
    }

    pub fn sudo(&self, command: &str) -> Result<CommandOutput> {
        self.remote(command, true)
    }

    /// Privileged command whose failure is tolerated and whose output is not echoed.
    pub fn sudo_quiet(&self, command: &str) -> CommandOutput {
        let composed = self.compose(command);
        self.transport.execute_remote(&composed, true)
    }

    fn remote(&self, command: &str, privileged: bool) -> Result<CommandOutput> {
        let composed = self.compose(command);
        let host = self.transport.host();
        announce::command(host, if privileged { "sudo" } else { "run" }, &composed);

        let output = self.transport.execute_remote(&composed, privileged);
        if !output.success {
            let connection = self.transport.is_connection_failure(&output);
            let details = failure_details(&composed, host, output);
            return Err(if connection {
                Error::ssh_connect_failed(details)
            } else {
                Error::remote_command_failed(details)
            });
        }

        announce::output(host, output.text());
        Ok(output)
    }
}

fn failure_details(command: &str, host: &str, output: CommandOutput) -> CommandFailedDetails {
    CommandFailedDetails {
        command: command.to_string(),
        exit_code: output.exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
        host: host.to_string(),
    }
}
