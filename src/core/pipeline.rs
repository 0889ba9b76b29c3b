use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::announce;
use crate::checks;
use crate::context::Deployment;
use crate::error::{Error, Result};
use crate::options::RunOptions;
use crate::steps::{self, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LocalCleanCheck,
    RemoteCleanCheck,
    FixOwners,
    Pull,
    UpdateSubmodules,
    FixLogPermissions,
    InstallRequirements,
    CollectStatic,
    SyncDb,
    RunMigrations,
    RunExtras,
    /// Pulls and migrations leave files owned by the remote login user.
    FixOwnersAgain,
    BounceServices,
    UpdateCrontab,
}

/// Stage order of a full deployment. Strictly linear.
pub const SEQUENCE: [Stage; 14] = [
    Stage::LocalCleanCheck,
    Stage::RemoteCleanCheck,
    Stage::FixOwners,
    Stage::Pull,
    Stage::UpdateSubmodules,
    Stage::FixLogPermissions,
    Stage::InstallRequirements,
    Stage::CollectStatic,
    Stage::SyncDb,
    Stage::RunMigrations,
    Stage::RunExtras,
    Stage::FixOwnersAgain,
    Stage::BounceServices,
    Stage::UpdateCrontab,
];

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::LocalCleanCheck => "local_clean_check",
            Stage::RemoteCleanCheck => "remote_clean_check",
            Stage::FixOwners => "fix_owners",
            Stage::Pull => "pull",
            Stage::UpdateSubmodules => "update_submodules",
            Stage::FixLogPermissions => "fix_log_permissions",
            Stage::InstallRequirements => "install_requirements",
            Stage::CollectStatic => "collect_static",
            Stage::SyncDb => "sync_db",
            Stage::RunMigrations => "run_migrations",
            Stage::RunExtras => "run_extras",
            Stage::FixOwnersAgain => "fix_owners_again",
            Stage::BounceServices => "bounce_services",
            Stage::UpdateCrontab => "update_crontab",
        }
    }

    /// Reason the stage is left out of this run, if it is.
    fn disabled_reason(&self, deployment: &Deployment) -> Option<String> {
        match self {
            Stage::LocalCleanCheck if !deployment.require_clean() => {
                Some("require_clean is false".to_string())
            }
            Stage::SyncDb if deployment.skip_syncdb() => Some("skip_syncdb is set".to_string()),
            Stage::RunMigrations if deployment.skip_migrate() => {
                Some("skip_migrate is set".to_string())
            }
            _ => None,
        }
    }

    fn execute(&self, deployment: &Deployment) -> Result<StepOutcome> {
        match self {
            Stage::LocalCleanCheck => {
                checks::local_clean_check(deployment)?;
                Ok(StepOutcome::Performed)
            }
            Stage::RemoteCleanCheck => {
                checks::remote_clean_check(deployment)?;
                Ok(StepOutcome::Performed)
            }
            Stage::FixOwners | Stage::FixOwnersAgain => steps::fix_owners(deployment),
            Stage::Pull => steps::pull(deployment),
            Stage::UpdateSubmodules => steps::update_submodules(deployment),
            Stage::FixLogPermissions => steps::fix_log_permissions(deployment),
            Stage::InstallRequirements => steps::install_requirements(deployment),
            Stage::CollectStatic => steps::collect_static(deployment),
            Stage::SyncDb => steps::sync_db(deployment),
            Stage::RunMigrations => steps::run_migrations(deployment),
            Stage::RunExtras => steps::run_extras(deployment),
            Stage::BounceServices => {
                steps::bounce_services(deployment)?;
                Ok(StepOutcome::Performed)
            }
            Stage::UpdateCrontab => steps::update_crontab(deployment),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStage {
    pub stage: Stage,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Done,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub target: String,
    pub host: String,
    pub branch: String,
    pub status: RunStatus,
    pub stages: Vec<StageRecord>,
    pub started_at: String,
    pub finished_at: String,
}

impl DeployReport {
    pub fn performed(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|record| record.outcome.is_performed())
            .map(|record| record.stage)
            .collect()
    }
}

/// Resolve which stages a full deployment would run. Executes nothing.
pub fn plan(deployment: &Deployment) -> Vec<PlannedStage> {
    SEQUENCE
        .iter()
        .map(|stage| {
            let reason = stage.disabled_reason(deployment);
            PlannedStage {
                stage: *stage,
                enabled: reason.is_none(),
                reason,
            }
        })
        .collect()
}

/// Run the whole sequence, stopping at the first hard failure.
///
/// Nothing is rolled back on failure. The returned error names the stage
/// that failed in its details under `stage`.
pub fn full_deploy(deployment: &Deployment) -> Result<DeployReport> {
    let started_at = timestamp();
    let mut stages = Vec::with_capacity(SEQUENCE.len());

    announce::success("Beginning deployment...");
    announce::blank();
    announce::heading("Checking pre-requisites...");

    for planned in plan(deployment) {
        if planned.stage == Stage::FixOwners {
            announce::blank();
            announce::success("Starting deployment...");
            announce::blank();
            announce::heading("Updating environment...");
        }

        let outcome = match planned.reason {
            Some(reason) => StepOutcome::Skipped { reason },
            None => planned
                .stage
                .execute(deployment)
                .map_err(|err| abort_context(err, planned.stage))?,
        };

        log_status!(
            "deploy",
            "stage {}: {}",
            planned.stage.as_str(),
            if outcome.is_performed() { "performed" } else { "skipped" }
        );
        stages.push(StageRecord {
            stage: planned.stage,
            outcome,
        });
    }

    announce::blank();
    announce::success("Done!");

    Ok(DeployReport {
        target: deployment.settings().label().to_string(),
        host: deployment.shell().host().to_string(),
        branch: deployment.branch().to_string(),
        status: RunStatus::Done,
        stages,
        started_at,
        finished_at: timestamp(),
    })
}

/// Full deployment with migrations forced on regardless of settings or overrides.
pub fn full_deploy_with_migrate(deployment: &Deployment) -> Result<DeployReport> {
    let options = RunOptions {
        skip_migrate: Some(false),
        ..deployment.options().clone()
    };
    full_deploy(&deployment.with_options(options))
}

fn abort_context(err: Error, stage: Stage) -> Error {
    let err = err.with_detail("stage", stage.as_str());
    if err.is_precondition() {
        return err;
    }
    err.with_hint("Every stage is safe to repeat; fix the cause and re-run the deployment")
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
