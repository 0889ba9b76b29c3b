//! Individually invokable deployment steps.
//!
//! Every step takes the [`Deployment`] it acts on and returns a
//! [`StepOutcome`]. A step that does not apply to the target (not a
//! framework project, optional setting absent, skip flag set) returns
//! [`StepOutcome::Skipped`]; only command failures and missing required
//! settings are errors.

use serde::Serialize;

use crate::announce;
use crate::context::Deployment;

mod environment;
mod framework;
mod repo;
mod services;

pub use environment::{fix_log_permissions, install_requirements, run_extras};
pub use framework::{collect_static, run_migrations, sync_db};
pub use repo::{fix_owners, pull, update_submodules};
pub use services::{
    bounce_services, is_stopped, restart_nginx, services_status, update_crontab, BounceReport,
    ServiceStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Performed,
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_performed(&self) -> bool {
        matches!(self, StepOutcome::Performed)
    }
}

/// Soft gate for steps that only make sense on a framework project.
fn framework_gate(deployment: &Deployment) -> Option<StepOutcome> {
    if deployment.settings().framework_project {
        return None;
    }
    announce::failure("This deployment is not configured as a framework project");
    Some(StepOutcome::skipped("not a framework project"))
}
