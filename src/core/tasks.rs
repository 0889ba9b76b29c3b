//! Name-addressable tasks: every step, both checks and the full sequence.

use serde::Serialize;

use crate::checks;
use crate::context::Deployment;
use crate::error::{Error, Result};
use crate::pipeline::{self, DeployReport};
use crate::steps::{self, BounceReport, ServiceStatus, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
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
    RestartNginx,
    BounceServices,
    ServicesStatus,
    UpdateCrontab,
    FullDeploy,
    FullDeployWithMigrate,
}

const ALL: [Task; 17] = [
    Task::LocalCleanCheck,
    Task::RemoteCleanCheck,
    Task::FixOwners,
    Task::Pull,
    Task::UpdateSubmodules,
    Task::FixLogPermissions,
    Task::InstallRequirements,
    Task::CollectStatic,
    Task::SyncDb,
    Task::RunMigrations,
    Task::RunExtras,
    Task::RestartNginx,
    Task::BounceServices,
    Task::ServicesStatus,
    Task::UpdateCrontab,
    Task::FullDeploy,
    Task::FullDeployWithMigrate,
];

#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// What a task hands back. Serialized without a wrapper tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Check { clean: bool },
    Step(StepOutcome),
    Bounce(BounceReport),
    Status(Vec<ServiceStatus>),
    Deploy(DeployReport),
}

impl Task {
    pub fn all() -> &'static [Task] {
        &ALL
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::LocalCleanCheck => "local-clean-check",
            Task::RemoteCleanCheck => "remote-clean-check",
            Task::FixOwners => "fix-owners",
            Task::Pull => "pull",
            Task::UpdateSubmodules => "update-submodules",
            Task::FixLogPermissions => "fix-log-permissions",
            Task::InstallRequirements => "install-requirements",
            Task::CollectStatic => "collect-static",
            Task::SyncDb => "sync-db",
            Task::RunMigrations => "run-migrations",
            Task::RunExtras => "run-extras",
            Task::RestartNginx => "restart-nginx",
            Task::BounceServices => "bounce-services",
            Task::ServicesStatus => "services-status",
            Task::UpdateCrontab => "update-crontab",
            Task::FullDeploy => "full-deploy",
            Task::FullDeployWithMigrate => "full-deploy-with-migrate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Task::LocalCleanCheck => "Abort if the local working tree has uncommitted changes",
            Task::RemoteCleanCheck => "Abort if the remote working tree has uncommitted changes",
            Task::FixOwners => "Reset ownership of the deployed tree to user:group",
            Task::Pull => "Fetch, check out and pull the deploy branch",
            Task::UpdateSubmodules => "Initialize and update git submodules",
            Task::FixLogPermissions => "Make log files group-writable and world-readable",
            Task::InstallRequirements => "Install dependencies from the requirements file",
            Task::CollectStatic => "Collect static assets through the manage command",
            Task::SyncDb => "Synchronize the database schema",
            Task::RunMigrations => "Apply database migrations",
            Task::RunExtras => "Run the target's extra commands in order",
            Task::RestartNginx => "Restart nginx",
            Task::BounceServices => "Restart the target's services",
            Task::ServicesStatus => "Report the status of the target's services",
            Task::UpdateCrontab => "Install the target's crontab file",
            Task::FullDeploy => "Run the full deployment sequence",
            Task::FullDeployWithMigrate => "Run the full deployment sequence with migrations",
        }
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            name: self.name(),
            description: self.description(),
        }
    }

    /// Look a task up by name. `sync_db` and `sync-db` are the same task.
    pub fn parse(name: &str) -> Result<Task> {
        let wanted = name.trim().to_lowercase().replace('_', "-");
        ALL.iter()
            .copied()
            .find(|task| task.name() == wanted)
            .ok_or_else(|| Error::task_not_found(name, names()))
    }

    pub fn run(&self, deployment: &Deployment) -> Result<TaskOutput> {
        let output = match self {
            Task::LocalCleanCheck => {
                checks::local_clean_check(deployment)?;
                TaskOutput::Check { clean: true }
            }
            Task::RemoteCleanCheck => {
                checks::remote_clean_check(deployment)?;
                TaskOutput::Check { clean: true }
            }
            Task::FixOwners => TaskOutput::Step(steps::fix_owners(deployment)?),
            Task::Pull => TaskOutput::Step(steps::pull(deployment)?),
            Task::UpdateSubmodules => TaskOutput::Step(steps::update_submodules(deployment)?),
            Task::FixLogPermissions => TaskOutput::Step(steps::fix_log_permissions(deployment)?),
            Task::InstallRequirements => {
                TaskOutput::Step(steps::install_requirements(deployment)?)
            }
            Task::CollectStatic => TaskOutput::Step(steps::collect_static(deployment)?),
            Task::SyncDb => TaskOutput::Step(steps::sync_db(deployment)?),
            Task::RunMigrations => TaskOutput::Step(steps::run_migrations(deployment)?),
            Task::RunExtras => TaskOutput::Step(steps::run_extras(deployment)?),
            Task::RestartNginx => TaskOutput::Step(steps::restart_nginx(deployment)?),
            Task::BounceServices => TaskOutput::Bounce(steps::bounce_services(deployment)?),
            Task::ServicesStatus => TaskOutput::Status(steps::services_status(deployment)?),
            Task::UpdateCrontab => TaskOutput::Step(steps::update_crontab(deployment)?),
            Task::FullDeploy => TaskOutput::Deploy(pipeline::full_deploy(deployment)?),
            Task::FullDeployWithMigrate => {
                TaskOutput::Deploy(pipeline::full_deploy_with_migrate(deployment)?)
            }
        };
        Ok(output)
    }
}

pub fn names() -> Vec<String> {
    ALL.iter().map(|task| task.name().to_string()).collect()
}

pub fn list() -> Vec<TaskInfo> {
    ALL.iter().map(Task::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::options::RunOptions;
    use crate::recording::RecordingTransport;
    use crate::settings::{Settings, SettingsDecl};

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!(Task::parse("sync_db").unwrap(), Task::SyncDb);
        assert_eq!(Task::parse("sync-db").unwrap(), Task::SyncDb);
        assert_eq!(
            Task::parse("Full_Deploy_With_Migrate").unwrap(),
            Task::FullDeployWithMigrate
        );
    }

    #[test]
    fn unknown_task_lists_available() {
        let err = Task::parse("deploy-everything").unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
        assert!(err.to_string().contains("deploy-everything"));
    }

    #[test]
    fn every_task_has_a_unique_name() {
        let mut names = names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Task::all().len());
    }

    #[test]
    fn restart_nginx_runs_alone() {
        let settings = Settings::new(SettingsDecl::new("web1", "/deploy/app"));
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        let output = Task::RestartNginx.run(&deployment).unwrap();
        assert!(matches!(output, TaskOutput::Step(StepOutcome::Performed)));
        assert_eq!(transport.remote_commands(), vec!["service nginx restart"]);
    }

    #[test]
    fn check_output_serializes_as_clean_flag() {
        let settings = Settings::new(SettingsDecl::new("web1", "/deploy/app"));
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        let output = Task::RemoteCleanCheck.run(&deployment).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json, serde_json::json!({ "clean": true }));
    }
}
