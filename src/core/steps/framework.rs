use super::{framework_gate, StepOutcome};
use crate::announce;
use crate::context::Deployment;
use crate::error::Result;

fn manage(deployment: &Deployment, args: &str) -> Result<()> {
    let shell = deployment.env_shell()?;
    shell.run(&format!("{} {}", deployment.settings().manage_command, args))?;
    Ok(())
}

pub fn collect_static(deployment: &Deployment) -> Result<StepOutcome> {
    announce::info("Collecting static resources");
    if let Some(skipped) = framework_gate(deployment) {
        return Ok(skipped);
    }
    // Minimal verbosity, never prompt.
    manage(deployment, "collectstatic -v0 --noinput")?;
    Ok(StepOutcome::Performed)
}

pub fn run_migrations(deployment: &Deployment) -> Result<StepOutcome> {
    announce::info("Running migrations");
    if let Some(skipped) = framework_gate(deployment) {
        return Ok(skipped);
    }
    manage(deployment, "migrate")?;
    Ok(StepOutcome::Performed)
}

pub fn sync_db(deployment: &Deployment) -> Result<StepOutcome> {
    announce::info("Sync DB");
    if let Some(skipped) = framework_gate(deployment) {
        return Ok(skipped);
    }
    if deployment.skip_syncdb() {
        return Ok(StepOutcome::skipped("skip_syncdb is set"));
    }
    manage(deployment, "syncdb")?;
    Ok(StepOutcome::Performed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RunOptions;
    use crate::recording::RecordingTransport;
    use crate::settings::{Settings, SettingsDecl};

    fn settings(framework: bool, skip_syncdb: bool) -> Settings {
        Settings::new(SettingsDecl {
            framework_project: Some(framework),
            skip_syncdb: Some(skip_syncdb),
            ..SettingsDecl::new("web1", "/deploy/app")
        })
    }

    #[test]
    fn framework_steps_issue_manage_commands() {
        let settings = settings(true, false);
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        collect_static(&deployment).unwrap();
        sync_db(&deployment).unwrap();
        run_migrations(&deployment).unwrap();

        assert_eq!(
            transport.remote_commands(),
            vec![
                "cd '/deploy/app' && source activate && ./manage.py collectstatic -v0 --noinput",
                "cd '/deploy/app' && source activate && ./manage.py syncdb",
                "cd '/deploy/app' && source activate && ./manage.py migrate",
            ]
        );
    }

    #[test]
    fn non_framework_project_soft_skips_every_framework_step() {
        let settings = settings(false, false);
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        for outcome in [
            collect_static(&deployment).unwrap(),
            run_migrations(&deployment).unwrap(),
            sync_db(&deployment).unwrap(),
        ] {
            assert_eq!(outcome, StepOutcome::skipped("not a framework project"));
        }
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn sync_db_respects_skip_flag_from_settings() {
        let settings = settings(true, true);
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        assert!(!sync_db(&deployment).unwrap().is_performed());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn sync_db_respects_skip_flag_from_override() {
        let settings = settings(true, false);
        let transport = RecordingTransport::new("web1");
        let options = RunOptions {
            skip_syncdb: Some(true),
            ..Default::default()
        };
        let deployment = Deployment::new(&settings, &transport, options);

        assert!(!sync_db(&deployment).unwrap().is_performed());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn custom_manage_command_is_used() {
        let settings = Settings::new(SettingsDecl {
            manage_command: Some("python manage.py".to_string()),
            ..SettingsDecl::new("web1", "/deploy/app")
        });
        let transport = RecordingTransport::new("web1");
        let deployment = Deployment::new(&settings, &transport, RunOptions::default());

        run_migrations(&deployment).unwrap();
        assert!(transport.remote_commands()[0].ends_with("python manage.py migrate"));
    }
}
