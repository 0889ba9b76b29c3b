use clap::Args;
use serde::Serialize;

use rollout::recording::RecordedCommand;
use rollout::tasks::{Task, TaskOutput};

use super::{with_deployment, CmdResult, OverrideArgs, TargetSelection};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetSelection,

    /// Task name, e.g. bounce-services or sync_db (see `rollout tasks`)
    pub task: String,

    /// Record the commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Serialize)]
pub struct RunOutput {
    pub command: String,
    pub task: String,
    pub dry_run: bool,
    pub output: TaskOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<RecordedCommand>>,
}

pub fn run(args: RunArgs) -> CmdResult<RunOutput> {
    // Resolve the task first so a typo fails before any connection is made.
    let task = Task::parse(&args.task)?;
    let settings = args.target.load()?;
    let options = args.overrides.options()?;

    let (output, commands) =
        with_deployment(&settings, options, args.dry_run, |deployment| task.run(deployment))?;

    Ok((
        RunOutput {
            command: "run".to_string(),
            task: task.name().to_string(),
            dry_run: args.dry_run,
            output,
            commands,
        },
        0,
    ))
}
