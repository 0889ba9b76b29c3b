use clap::{Args, Subcommand};
use serde::Serialize;

use rollout::error::codes::{self, CodeSummary};
use rollout::Error;

use super::CmdResult;
use crate::output::exit_code_for_error;

#[derive(Args)]
pub struct ErrorArgs {
    #[command(subcommand)]
    command: ErrorCommand,
}

#[derive(Subcommand)]
enum ErrorCommand {
    /// List every error code rollout can report
    Codes,
    /// Explain an error code
    Explain {
        /// Error code (example: `precondition.remote_dirty`)
        code: String,
    },
}

#[derive(Default, Serialize)]
pub struct ErrorOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    codes: Option<Vec<CodeSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explain: Option<CodeExplanation>,
}

#[derive(Serialize)]
pub struct CodeExplanation {
    #[serde(flatten)]
    summary: CodeSummary,
    exit_code: i32,
}

pub fn run(args: ErrorArgs) -> CmdResult<ErrorOutput> {
    match args.command {
        ErrorCommand::Codes => Ok((
            ErrorOutput {
                command: "error.codes".to_string(),
                codes: Some(codes::list()),
                ..Default::default()
            },
            0,
        )),
        ErrorCommand::Explain { code } => {
            let Some(parsed) = codes::parse_code(&code) else {
                let accepted = codes::all_codes()
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect();
                return Err(Error::validation_invalid_argument(
                    "code",
                    format!("Unknown error code '{}'", code),
                    Some(code),
                    Some(accepted),
                ));
            };

            Ok((
                ErrorOutput {
                    command: "error.explain".to_string(),
                    explain: Some(CodeExplanation {
                        summary: CodeSummary {
                            code: parsed.as_str(),
                            summary: codes::summary(parsed),
                        },
                        exit_code: exit_code_for_error(parsed),
                    }),
                    ..Default::default()
                },
                0,
            ))
        }
    }
}
