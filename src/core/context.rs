use crate::error::Result;
use crate::executor::{Shell, Transport};
use crate::options::{resolve_flag, RunOptions};
use crate::settings::Settings;

/// Everything one task invocation needs: the target's settings, the transport
/// that reaches it, and the caller's overrides.
///
/// Passed explicitly into every step; there is no process-wide current target.
#[derive(Clone)]
pub struct Deployment<'a> {
    settings: &'a Settings,
    transport: &'a dyn Transport,
    options: RunOptions,
}

impl<'a> Deployment<'a> {
    pub fn new(settings: &'a Settings, transport: &'a dyn Transport, options: RunOptions) -> Self {
        Self {
            settings,
            transport,
            options,
        }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Same target and transport with different overrides.
    pub fn with_options(&self, options: RunOptions) -> Deployment<'a> {
        Deployment {
            settings: self.settings,
            transport: self.transport,
            options,
        }
    }

    pub fn shell(&self) -> Shell<'a> {
        Shell::new(self.transport)
    }

    /// Shell scoped to the deploy path.
    pub fn project_shell(&self) -> Result<Shell<'a>> {
        Ok(self.shell().cd(self.settings.deploy_path()?))
    }

    /// Shell scoped to the deploy path with the runtime environment activated.
    pub fn env_shell(&self) -> Result<Shell<'a>> {
        Ok(self
            .project_shell()?
            .prefix(&self.settings.activate_command))
    }

    pub fn branch(&self) -> &str {
        self.options
            .branch
            .as_deref()
            .unwrap_or(&self.settings.branch_name)
    }

    pub fn require_clean(&self) -> bool {
        resolve_flag(self.options.require_clean, self.settings.require_clean)
    }

    pub fn skip_syncdb(&self) -> bool {
        resolve_flag(self.options.skip_syncdb, self.settings.skip_syncdb)
    }

    pub fn skip_migrate(&self) -> bool {
        resolve_flag(self.options.skip_migrate, self.settings.skip_migrate)
    }

    pub fn restart_nginx(&self) -> bool {
        resolve_flag(self.options.restart_nginx, self.settings.restart_nginx)
    }

    pub fn bounce_only_if_running(&self) -> bool {
        resolve_flag(
            self.options.bounce_services_only_if_running,
            self.settings.bounce_services_only_if_running,
        )
    }
}
