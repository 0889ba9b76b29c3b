use crate::error::{Error, Result};
use crate::executor::Transport;
use crate::settings::Settings;
use crate::utils::shell;
use serde::Serialize;
use std::process::Command;

pub struct SshClient {
    pub host: String,
    pub user: Option<String>,
    pub port: u16,
    pub identity_file: Option<String>,
    /// When true, all commands run locally instead of over SSH.
    /// Set automatically when the target host is localhost/127.0.0.1/::1.
    pub is_local: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            exit_code: 0,
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            exit_code,
        }
    }

    /// Captured stdout without trailing whitespace.
    pub fn text(&self) -> &str {
        self.stdout.trim_end()
    }

    /// Stdout followed by stderr, the way an interactive terminal shows them.
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end(), self.stderr.trim_end()) {
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

impl SshClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let host = settings.host()?.to_string();

        let identity_file = match &settings.identity_file {
            Some(path) if !path.is_empty() => {
                let expanded = shellexpand::tilde(path).to_string();
                if !std::path::Path::new(&expanded).exists() {
                    return Err(Error::ssh_identity_file_not_found(
                        settings.label().to_string(),
                        expanded,
                    ));
                }
                Some(expanded)
            }
            _ => None,
        };

        let is_local = is_local_host(&host);
        if is_local {
            log_status!("ssh", "Target '{}' is localhost, using local execution", settings.label());
        }

        Ok(Self {
            host,
            user: settings.ssh_user.clone().filter(|u| !u.is_empty()),
            port: settings.port,
            identity_file,
            is_local,
        })
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(identity_file) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity_file.clone());
        }

        if self.port != 22 {
            args.push("-p".to_string());
            args.push(self.port.to_string());
        }

        // Never prompt: a password or host-key prompt would block the pipeline.
        args.extend([
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ]);

        args.push(self.destination());
        args.push(command.to_string());

        args
    }

    fn execute(&self, command: &str) -> CommandOutput {
        if self.is_local {
            return execute_local_command(command);
        }

        let args = self.build_ssh_args(command);

        match Command::new("ssh").args(&args).output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput::failed(-1, format!("SSH error: {}", e)),
        }
    }
}

impl Transport for SshClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn execute_local(&self, command: &str) -> CommandOutput {
        execute_local_command(command)
    }

    fn execute_remote(&self, command: &str, privileged: bool) -> CommandOutput {
        self.execute(&wrap_remote_command(command, privileged))
    }

    fn is_connection_failure(&self, output: &CommandOutput) -> bool {
        !self.is_local && is_connection_error(output)
    }
}

/// Wrap a composed command in a login shell, optionally under sudo.
///
/// The login shell makes `source` and profile-provided PATH entries available
/// regardless of the remote user's default shell.
pub fn wrap_remote_command(command: &str, privileged: bool) -> String {
    let login = format!("bash -l -c {}", shell::escape_command_for_shell(command));
    if privileged {
        format!("sudo -n {}", login)
    } else {
        login
    }
}

pub fn execute_local_command(command: &str) -> CommandOutput {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };

    match cmd.output() {
        Ok(out) => CommandOutput {
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            success: out.status.success(),
            exit_code: out.status.code().unwrap_or(-1),
        },
        Err(e) => CommandOutput::failed(-1, format!("Command error: {}", e)),
    }
}

/// Check if a host address refers to the local machine.
pub fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// Check if an SSH failure is a connection problem rather than a remote command failure.
fn is_connection_error(output: &CommandOutput) -> bool {
    if output.success {
        return false;
    }

    let stderr = output.stderr.to_lowercase();
    // SSH exit code 255 = connection error (not a remote command failure)
    let is_connection_exit = output.exit_code == 255;

    let connection_patterns = [
        "connection refused",
        "connection reset",
        "connection timed out",
        "no route to host",
        "network is unreachable",
        "could not resolve hostname",
        "permission denied (publickey",
        "host key verification failed",
    ];

    is_connection_exit || connection_patterns.iter().any(|p| stderr.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsDecl;

    fn client(user: Option<&str>, port: u16) -> SshClient {
        SshClient {
            host: "web1.example.com".to_string(),
            user: user.map(|u| u.to_string()),
            port,
            identity_file: None,
            is_local: false,
        }
    }

    #[test]
    fn ssh_args_include_destination_and_batch_mode() {
        let args = client(Some("deploy"), 22).build_ssh_args("uptime");
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(!args.contains(&"-p".to_string()));
        assert_eq!(args[args.len() - 2], "deploy@web1.example.com");
        assert_eq!(args[args.len() - 1], "uptime");
    }

    #[test]
    fn combined_output_joins_both_streams() {
        let mut output = CommandOutput::ok("app start/running\n");
        assert_eq!(output.combined(), "app start/running");
        output.stderr = "warning: degraded\n".to_string();
        assert_eq!(output.combined(), "app start/running\nwarning: degraded");
        assert_eq!(CommandOutput::failed(3, "app stop/waiting").combined(), "app stop/waiting");
    }

    #[test]
    fn ssh_args_carry_non_default_port() {
        let args = client(None, 2222).build_ssh_args("uptime");
        let idx = args.iter().position(|a| a == "-p").unwrap();
        assert_eq!(args[idx + 1], "2222");
        assert_eq!(args[args.len() - 2], "web1.example.com");
    }

    #[test]
    fn privileged_commands_run_under_sudo_login_shell() {
        assert_eq!(
            wrap_remote_command("service web restart", true),
            "sudo -n bash -l -c 'service web restart'"
        );
        assert_eq!(
            wrap_remote_command("cd '/srv' && git pull", false),
            "bash -l -c 'cd '\\''/srv'\\'' && git pull'"
        );
    }

    #[test]
    fn localhost_targets_execute_locally() {
        let settings = Settings::new(SettingsDecl::new("localhost", "/srv/app"));
        let client = SshClient::from_settings(&settings).unwrap();
        assert!(client.is_local);
        assert!(!client.is_connection_failure(&CommandOutput::failed(255, "")));
    }

    #[test]
    fn missing_identity_file_is_reported() {
        let settings = Settings::new(SettingsDecl {
            identity_file: Some("/nonexistent/rollout_test_key".to_string()),
            ..SettingsDecl::new("web1", "/srv/app")
        });
        let err = SshClient::from_settings(&settings).err().unwrap();
        assert_eq!(err.code, crate::error::ErrorCode::SshIdentityFileNotFound);
    }

    #[test]
    fn exit_255_is_a_connection_error() {
        assert!(is_connection_error(&CommandOutput::failed(255, "")));
        assert!(is_connection_error(&CommandOutput::failed(
            1,
            "ssh: Could not resolve hostname web1"
        )));
        assert!(!is_connection_error(&CommandOutput::failed(1, "fatal: bad ref")));
    }

    #[cfg(not(windows))]
    #[test]
    fn local_command_captures_output() {
        let out = execute_local_command("printf hello");
        assert!(out.success);
        assert_eq!(out.text(), "hello");
    }
}
