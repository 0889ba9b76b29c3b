use super::StepOutcome;
use crate::announce;
use crate::context::Deployment;
use crate::error::Result;
use crate::utils::shell::quote_arg;

/// Hand every file in the checkout back to the configured owner.
pub fn fix_owners(deployment: &Deployment) -> Result<StepOutcome> {
    let shell = deployment.project_shell()?;
    let owner = quote_arg(deployment.settings().chown_target()?);

    announce::info("Fixing project owners");
    shell.sudo(&format!("chown {} -R *", owner))?;
    shell.sudo(&format!("chown {} -R .git*", owner))?;
    // Virtualenv directories are optional.
    for dir in [".env", "env"] {
        shell.sudo(&format!(
            "if [ -e {dir} ]; then chown {owner} -R {dir}; fi",
            dir = dir,
            owner = owner
        ))?;
    }
    announce::blank();

    Ok(StepOutcome::Performed)
}

pub fn pull(deployment: &Deployment) -> Result<StepOutcome> {
    let shell = deployment.project_shell()?;
    let branch = deployment.branch();

    announce::info(format!("Pulling from {}", branch));
    shell.run("git fetch")?;
    shell.run(&format!("git checkout {}", quote_arg(branch)))?;
    shell.run("git pull")?;

    Ok(StepOutcome::Performed)
}

pub fn update_submodules(deployment: &Deployment) -> Result<StepOutcome> {
    let shell = deployment.project_shell()?;

    announce::info("Initializing submodules");
    shell.run("git submodule init")?;
    announce::blank();

    announce::info("Updating submodules");
    shell.run("git submodule update")?;
    announce::blank();

    Ok(StepOutcome::Performed)
}
