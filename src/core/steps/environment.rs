use super::StepOutcome;
use crate::announce;
use crate::context::Deployment;
use crate::error::Result;
use crate::utils::shell::quote_arg;

pub fn fix_log_permissions(deployment: &Deployment) -> Result<StepOutcome> {
    let Some(logs) = deployment.settings().logs_path() else {
        return Ok(StepOutcome::skipped("no log path configured"));
    };
    let shell = deployment.project_shell()?;

    announce::info("Ensuring proper permissions on log files (-rw-rw-r--)");
    // Raw operand: `~` and globs are left for the remote shell to expand.
    shell.sudo(&format!(
        "chmod --preserve-root --changes a+r,ug+w -R {}",
        logs
    ))?;
    announce::blank();

    Ok(StepOutcome::Performed)
}

pub fn install_requirements(deployment: &Deployment) -> Result<StepOutcome> {
    let shell = deployment.env_shell()?;
    let requirements = &deployment.settings().requirements_file;

    announce::info(format!("Installing from {}", requirements));
    shell.run(&format!("pip install -r {}", quote_arg(requirements)))?;

    Ok(StepOutcome::Performed)
}

/// Run the target's extra commands verbatim, in declared order.
pub fn run_extras(deployment: &Deployment) -> Result<StepOutcome> {
    let extras = &deployment.settings().extra_commands;
    if extras.is_empty() {
        return Ok(StepOutcome::skipped("no extra commands configured"));
    }

    let shell = deployment.env_shell()?;
    for command in extras {
        announce::info(format!("Extra:  {}", command));
        shell.run(command)?;
    }

    Ok(StepOutcome::Performed)
}
