use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{deploy, error, plan, run, target};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "rollout")]
#[command(version = VERSION)]
#[command(about = "Deploy a project to its host with a fixed, ordered task sequence")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full deployment sequence against a target
    Deploy(deploy::DeployArgs),
    /// Run a single task against a target
    Run(run::RunArgs),
    /// Show which stages a deployment would run, without running them
    Plan(plan::PlanArgs),
    /// List available tasks
    Tasks,
    /// Inspect declared targets
    Target(target::TargetArgs),
    /// List and explain error codes
    Error(error::ErrorArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
