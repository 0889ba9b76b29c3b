use clap::Args;

use rollout::options::RunOptions;
use rollout::recording::{RecordedCommand, RecordingTransport};
use rollout::ssh::SshClient;
use rollout::{config, Deployment, Settings};

pub type CmdResult<T> = rollout::Result<(T, i32)>;

/// Which target to act on and where its declaration lives.
#[derive(Args, Debug)]
pub struct TargetSelection {
    /// Target ID (declared in ~/.config/rollout/targets/<ID>.json)
    pub target: String,

    /// Read the declaration from this file instead of the targets directory
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
}

impl TargetSelection {
    pub fn load(&self) -> rollout::Result<Settings> {
        match &self.file {
            Some(path) => config::load_file(path, Some(&self.target)),
            None => config::load(&self.target),
        }
    }
}

/// Free-form per-run overrides.
///
/// Accepts `--key value`, `--key=value` or `key=value`, e.g.
/// `rollout deploy intranet --dry-run branch=release skip_migrate=yes`.
/// Flags of the command itself must come before the first override.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Overrides: branch, require_clean, skip_syncdb, skip_migrate,
    /// restart_nginx, bounce_services_only_if_running
    #[arg(
        value_name = "OVERRIDES",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub overrides: Vec<String>,
}

impl OverrideArgs {
    pub fn options(&self) -> rollout::Result<RunOptions> {
        RunOptions::from_args(&self.overrides)
    }
}

/// Run `f` against the selected target.
///
/// In dry-run mode nothing is executed; the commands that would have been
/// issued are returned alongside the result.
pub(crate) fn with_deployment<T>(
    settings: &Settings,
    options: RunOptions,
    dry_run: bool,
    f: impl FnOnce(&Deployment) -> rollout::Result<T>,
) -> rollout::Result<(T, Option<Vec<RecordedCommand>>)> {
    if dry_run {
        rollout::log_status!("dry-run", "Recording commands for '{}'", settings.label());
        let transport = RecordingTransport::new(settings.host()?);
        let deployment = Deployment::new(settings, &transport, options);
        let data = f(&deployment)?;
        return Ok((data, Some(transport.calls())));
    }

    let client = SshClient::from_settings(settings)?;
    let deployment = Deployment::new(settings, &client, options);
    Ok((f(&deployment)?, None))
}

pub mod deploy;
pub mod error;
pub mod plan;
pub mod run;
pub mod target;
pub mod tasks;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (rollout::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Deploy(args) => dispatch!(args, deploy),
        crate::Commands::Run(args) => dispatch!(args, run),
        crate::Commands::Plan(args) => dispatch!(args, plan),
        crate::Commands::Target(args) => dispatch!(args, target),
        crate::Commands::Error(args) => dispatch!(args, error),
        crate::Commands::Tasks => crate::output::map_cmd_result_to_json(tasks::run()),
    }
}
