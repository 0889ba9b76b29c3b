//! Deployment target settings.
//!
//! A target is declared as a [`SettingsDecl`] (every field optional) and
//! resolved once into [`Settings`]. Resolution applies hard-coded defaults,
//! then fields derived from the declared user/group/deploy path, then the
//! declared values themselves, so an explicit value always wins.
//!
//! Fields a step cannot work without are still optional here. They are
//! checked where they are used and fail with `config.missing_key`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_ACTIVATE_COMMAND: &str = "source activate";
pub const DEFAULT_MANAGE_COMMAND: &str = "./manage.py";
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// Static declaration of a deployment target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_tree: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chown_target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_commands: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crontab_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_clean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_syncdb: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_migrate: Option<bool>,
    #[serde(default, alias = "django_project", skip_serializing_if = "Option::is_none")]
    pub framework_project: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_nginx: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_services_only_if_running: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activate_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_file: Option<String>,
}

impl SettingsDecl {
    pub fn new(host: impl Into<String>, deploy_path: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            deploy_path: Some(deploy_path.into()),
            ..Default::default()
        }
    }
}

/// Resolved, read-only settings for one deployment target.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_tree: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chown_target: Option<String>,

    pub bounce_services: Vec<String>,
    pub extra_commands: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crontab_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_path: Option<String>,

    pub branch_name: String,

    pub require_clean: bool,
    pub skip_syncdb: bool,
    pub skip_migrate: bool,
    pub framework_project: bool,
    pub restart_nginx: bool,
    pub bounce_services_only_if_running: bool,

    pub activate_command: String,
    pub manage_command: String,
    pub requirements_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: None,
            host: None,
            ssh_user: None,
            port: DEFAULT_SSH_PORT,
            identity_file: None,
            deploy_path: None,
            git_tree: None,
            user: None,
            group: None,
            chown_target: None,
            bounce_services: Vec::new(),
            extra_commands: Vec::new(),
            cron_file: None,
            crontab_owner: None,
            logs_path: None,
            branch_name: DEFAULT_BRANCH.to_string(),
            require_clean: true,
            skip_syncdb: false,
            skip_migrate: false,
            framework_project: true,
            restart_nginx: false,
            bounce_services_only_if_running: false,
            activate_command: DEFAULT_ACTIVATE_COMMAND.to_string(),
            manage_command: DEFAULT_MANAGE_COMMAND.to_string(),
            requirements_file: DEFAULT_REQUIREMENTS_FILE.to_string(),
        }
    }
}

/// Overwrite `slot` when the declaration carries a value.
fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn overlay_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl Settings {
    pub fn new(decl: SettingsDecl) -> Self {
        let mut settings = Settings::default();

        // Derived values
        if let Some(user) = &decl.user {
            settings.crontab_owner = Some(user.clone());
            if let Some(group) = &decl.group {
                settings.chown_target = Some(format!("{}:{}", user, group));
            }
        }
        if decl.git_tree.is_none() {
            settings.git_tree = decl.deploy_path.clone();
        }

        // Explicit values
        overlay_opt(&mut settings.name, decl.name);
        overlay_opt(&mut settings.host, decl.host);
        overlay_opt(&mut settings.ssh_user, decl.ssh_user);
        overlay(&mut settings.port, decl.port);
        overlay_opt(&mut settings.identity_file, decl.identity_file);
        overlay_opt(&mut settings.deploy_path, decl.deploy_path);
        overlay_opt(&mut settings.git_tree, decl.git_tree);
        overlay_opt(&mut settings.user, decl.user);
        overlay_opt(&mut settings.group, decl.group);
        overlay_opt(&mut settings.chown_target, decl.chown_target);
        overlay(&mut settings.bounce_services, decl.bounce_services);
        overlay(&mut settings.extra_commands, decl.extra_commands);
        overlay_opt(&mut settings.cron_file, decl.cron_file);
        overlay_opt(&mut settings.crontab_owner, decl.crontab_owner);
        overlay_opt(&mut settings.logs_path, decl.logs_path);
        overlay(&mut settings.branch_name, decl.branch_name);
        overlay(&mut settings.require_clean, decl.require_clean);
        overlay(&mut settings.skip_syncdb, decl.skip_syncdb);
        overlay(&mut settings.skip_migrate, decl.skip_migrate);
        overlay(&mut settings.framework_project, decl.framework_project);
        overlay(&mut settings.restart_nginx, decl.restart_nginx);
        overlay(
            &mut settings.bounce_services_only_if_running,
            decl.bounce_services_only_if_running,
        );
        overlay(&mut settings.activate_command, decl.activate_command);
        overlay(&mut settings.manage_command, decl.manage_command);
        overlay(&mut settings.requirements_file, decl.requirements_file);

        settings
    }

    /// Human label used in messages and error details.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.host.as_deref())
            .unwrap_or("unnamed target")
    }

    fn require<'a>(&self, key: &str, value: &'a Option<String>) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_missing_key(key, Some(self.label().to_string())))
    }

    pub fn host(&self) -> Result<&str> {
        self.require("host", &self.host)
    }

    pub fn deploy_path(&self) -> Result<&str> {
        self.require("deploy_path", &self.deploy_path)
    }

    pub fn chown_target(&self) -> Result<&str> {
        self.require("chown_target", &self.chown_target)
    }

    /// Crontab file and owner, when both are configured.
    pub fn crontab(&self) -> Option<(&str, &str)> {
        match (self.cron_file.as_deref(), self.crontab_owner.as_deref()) {
            (Some(file), Some(owner)) if !file.is_empty() && !owner.is_empty() => {
                Some((file, owner))
            }
            _ => None,
        }
    }

    pub fn logs_path(&self) -> Option<&str> {
        self.logs_path.as_deref().filter(|p| !p.is_empty())
    }
}
