use clap::Args;
use serde::Serialize;

use rollout::pipeline::{self, DeployReport};
use rollout::recording::RecordedCommand;

use super::{with_deployment, CmdResult, OverrideArgs, TargetSelection};

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetSelection,

    /// Run migrations even if skip_migrate is set
    #[arg(long)]
    pub with_migrate: bool,

    /// Record the commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Serialize)]
pub struct DeployOutput {
    pub command: String,
    pub dry_run: bool,
    pub report: DeployReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<RecordedCommand>>,
}

pub fn run(args: DeployArgs) -> CmdResult<DeployOutput> {
    let settings = args.target.load()?;
    let options = args.overrides.options()?;

    let (report, commands) = with_deployment(&settings, options, args.dry_run, |deployment| {
        if args.with_migrate {
            pipeline::full_deploy_with_migrate(deployment)
        } else {
            pipeline::full_deploy(deployment)
        }
    })?;

    Ok((
        DeployOutput {
            command: "deploy".to_string(),
            dry_run: args.dry_run,
            report,
            commands,
        },
        0,
    ))
}
