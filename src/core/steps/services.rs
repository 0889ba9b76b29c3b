use regex::Regex;
use serde::Serialize;

use super::StepOutcome;
use crate::announce::{self, Tone};
use crate::context::Deployment;
use crate::error::{Error, Result};
use crate::utils::shell::quote_arg;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BounceReport {
    pub restarted: Vec<String>,
    /// Services left alone because they were not running.
    pub not_running: Vec<String>,
    pub nginx_restarted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    pub running: bool,
}

/// Whether an init-system status line reports `service` as stopped.
pub fn is_stopped(service: &str, status: &str) -> Result<bool> {
    let pattern = Regex::new(&format!(r"{} stop/waiting", regex::escape(service)))
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;
    Ok(pattern.is_match(status))
}

pub fn restart_nginx(deployment: &Deployment) -> Result<StepOutcome> {
    announce::info("Restarting Nginx");
    deployment.shell().sudo("service nginx restart")?;
    Ok(StepOutcome::Performed)
}

pub fn bounce_services(deployment: &Deployment) -> Result<BounceReport> {
    announce::info("Bouncing processes...");
    let shell = deployment.shell();
    let only_if_running = deployment.bounce_only_if_running();
    let mut report = BounceReport::default();

    for service in &deployment.settings().bounce_services {
        let name = quote_arg(service);
        if only_if_running {
            let status = shell.sudo_quiet(&format!("service {} status", name));
            let combined = status.combined();
            if is_stopped(service, &combined)? {
                announce::failure(format!("{} NOT bouncing.", combined));
                report.not_running.push(service.clone());
                continue;
            }
        }
        shell.sudo(&format!("service {} restart", name))?;
        report.restarted.push(service.clone());
    }

    if deployment.restart_nginx() {
        restart_nginx(deployment)?;
        report.nginx_restarted = true;
    }

    Ok(report)
}

pub fn services_status(deployment: &Deployment) -> Result<Vec<ServiceStatus>> {
    let shell = deployment.shell();
    let mut statuses = Vec::new();

    for service in &deployment.settings().bounce_services {
        let output = shell.sudo_quiet(&format!("service {} status", quote_arg(service)));
        let status = output.combined();
        let running = !is_stopped(service, &status)?;

        announce::say(if running { Tone::Success } else { Tone::Failure }, &status);
        statuses.push(ServiceStatus {
            service: service.clone(),
            status,
            running,
        });
    }

    Ok(statuses)
}

pub fn update_crontab(deployment: &Deployment) -> Result<StepOutcome> {
    let Some((file, owner)) = deployment.settings().crontab() else {
        return Ok(StepOutcome::skipped("crontab file or owner not configured"));
    };

    announce::success("Updating crontab...");
    deployment
        .shell()
        .sudo(&format!("crontab -u {} {}", quote_arg(owner), file))?;
    announce::blank();

    Ok(StepOutcome::Performed)
}
