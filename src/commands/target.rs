use clap::{Args, Subcommand};
use serde::Serialize;

use rollout::config::{self, TargetSummary};
use rollout::Settings;

use super::{CmdResult, TargetSelection};

#[derive(Default, Serialize)]
pub struct TargetOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Vec<TargetSummary>>,
}

#[derive(Args)]
pub struct TargetArgs {
    #[command(subcommand)]
    command: TargetCommand,
}

#[derive(Subcommand)]
enum TargetCommand {
    /// List declared targets
    List,
    /// Display the resolved settings of a target
    Show {
        #[command(flatten)]
        selection: TargetSelection,
    },
}

pub fn run(args: TargetArgs) -> CmdResult<TargetOutput> {
    match args.command {
        TargetCommand::List => Ok((
            TargetOutput {
                command: "target.list".to_string(),
                targets: Some(config::list()?),
                ..Default::default()
            },
            0,
        )),
        TargetCommand::Show { selection } => {
            let settings = selection.load()?;
            Ok((
                TargetOutput {
                    command: "target.show".to_string(),
                    target_id: Some(selection.target),
                    settings: Some(settings),
                    ..Default::default()
                },
                0,
            ))
        }
    }
}
