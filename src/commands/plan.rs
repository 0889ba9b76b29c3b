use clap::Args;
use serde::Serialize;

use rollout::options::RunOptions;
use rollout::pipeline::{self, PlannedStage};
use rollout::recording::RecordingTransport;
use rollout::Deployment;

use super::{CmdResult, OverrideArgs, TargetSelection};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetSelection,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Serialize)]
pub struct PlanOutput {
    pub command: String,
    pub target: String,
    pub branch: String,
    pub overrides: RunOptions,
    pub stages: Vec<PlannedStage>,
}

pub fn run(args: PlanArgs) -> CmdResult<PlanOutput> {
    let settings = args.target.load()?;
    let options = args.overrides.options()?;

    // Planning never touches the target.
    let transport = RecordingTransport::new(settings.host.clone().unwrap_or_default());
    let deployment = Deployment::new(&settings, &transport, options.clone());

    Ok((
        PlanOutput {
            command: "plan".to_string(),
            target: settings.label().to_string(),
            branch: deployment.branch().to_string(),
            overrides: options,
            stages: pipeline::plan(&deployment),
        },
        0,
    ))
}
