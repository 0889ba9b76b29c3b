//! Clean-tree gates run before anything on the target is touched.
//!
//! Both checks are hard gates: any reported change is an `Err`, which aborts
//! the run. There is no boolean "dirty" result to inspect.

use crate::announce;
use crate::context::Deployment;
use crate::error::{Error, Result};
use crate::utils::shell;

pub fn local_clean_check(deployment: &Deployment) -> Result<()> {
    announce::info("Ensuring local working area is clean...");
    let output = deployment.shell().local("git status --porcelain")?;

    let changes = changed_paths(&output.stdout);
    if !changes.is_empty() {
        return Err(Error::local_tree_dirty(changes));
    }
    Ok(())
}

pub fn remote_clean_check(deployment: &Deployment) -> Result<()> {
    announce::info("Ensuring remote working area is clean...");
    let tree = deployment.settings().deploy_path()?;
    let command = format!(
        "git --work-tree={} --git-dir={} status --porcelain",
        shell::quote_path(tree),
        shell::quote_path(&format!("{}/.git", tree.trim_end_matches('/'))),
    );
    let output = deployment.shell().run(&command)?;

    let changes = changed_paths(&output.stdout);
    if !changes.is_empty() {
        return Err(Error::remote_tree_dirty(tree, changes));
    }
    Ok(())
}

fn changed_paths(porcelain: &str) -> Vec<String> {
    porcelain
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::options::RunOptions;
    use crate::recording::RecordingTransport;
    use crate::settings::{Settings, SettingsDecl};

    fn settings() -> Settings {
        Settings::new(SettingsDecl::new("web1", "/deploy/app"))
    }

    #[test]
    fn empty_local_status_is_clean() {
        let settings = settings();
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());
        assert!(local_clean_check(&deployment).is_ok());
    }

    #[test]
    fn whitespace_only_status_is_clean() {
        let settings = settings();
        let transport = RecordingTransport::new("web1").on_local("git status", "\n\n");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());
        assert!(local_clean_check(&deployment).is_ok());
    }

    #[test]
    fn local_changes_abort() {
        let settings = settings();
        let transport =
            RecordingTransport::new("web1").on_local("git status", " M src/app.py\n?? notes.txt\n");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        let err = local_clean_check(&deployment).unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionLocalDirty);
        assert_eq!(err.details["changes"].as_array().unwrap().len(), 2);
        assert!(transport.remote_commands().is_empty());
    }

    #[test]
    fn remote_check_inspects_deploy_path_not_git_tree() {
        let settings = Settings::new(SettingsDecl {
            git_tree: Some("/srv/tree/".to_string()),
            ..SettingsDecl::new("web1", "/deploy/app/")
        });
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        remote_clean_check(&deployment).unwrap();
        assert_eq!(
            transport.remote_commands(),
            vec!["git --work-tree='/deploy/app/' --git-dir='/deploy/app/.git' status --porcelain"]
        );
        assert_eq!(transport.count_remote("/srv/tree"), 0);
    }

    #[test]
    fn remote_changes_abort() {
        let settings = settings();
        let transport = RecordingTransport::new("web1").on_remote("status --porcelain", " M settings.py");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        let err = remote_clean_check(&deployment).unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionRemoteDirty);
        assert_eq!(err.details["location"], "/deploy/app");
    }

    #[test]
    fn remote_check_needs_a_tree() {
        let settings = Settings::new(SettingsDecl {
            host: Some("web1".to_string()),
            ..Default::default()
        });
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        let err = remote_clean_check(&deployment).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
        assert!(transport.calls().is_empty());
    }
}
