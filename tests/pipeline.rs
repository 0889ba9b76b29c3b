use rollout::options::RunOptions;
use rollout::pipeline::{self, Stage};
use rollout::recording::{Location, RecordingTransport};
use rollout::steps::StepOutcome;
use rollout::tasks::{Task, TaskOutput};
use rollout::{Deployment, ErrorCode, Settings, SettingsDecl};

fn intranet() -> Settings {
    Settings::new(SettingsDecl {
        name: Some("intranet".to_string()),
        user: Some("intranet".to_string()),
        group: Some("www-data".to_string()),
        bounce_services: Some(vec![
            "intranet".to_string(),
            "intranet_celery".to_string(),
        ]),
        extra_commands: Some(vec!["./manage.py compress".to_string()]),
        cron_file: Some("/deploy/intranet/crons/intranet".to_string()),
        logs_path: Some("logs".to_string()),
        ..SettingsDecl::new("web1.example.com", "/deploy/intranet")
    })
}

fn overrides(pairs: &[(&str, &str)]) -> RunOptions {
    RunOptions::from_pairs(pairs.iter().copied()).unwrap()
}

#[test]
fn clean_trees_run_through_syncdb_and_skip_migrate() {
    let settings = intranet();
    let transport = RecordingTransport::new("web1.example.com");
    let options = overrides(&[
        ("require_clean", "true"),
        ("skip_syncdb", "false"),
        ("skip_migrate", "true"),
    ]);
    let deployment = Deployment::new(&settings, &transport, options);

    let report = pipeline::full_deploy(&deployment).unwrap();

    let performed = report.performed();
    assert!(performed.contains(&Stage::LocalCleanCheck));
    assert!(performed.contains(&Stage::SyncDb));
    assert!(!performed.contains(&Stage::RunMigrations));
    assert_eq!(
        serde_json::to_value(&report).unwrap()["status"],
        serde_json::json!("done")
    );

    let local: Vec<_> = transport
        .calls()
        .into_iter()
        .filter(|c| c.location == Location::Local)
        .collect();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].command, "git status --porcelain");

    assert_eq!(transport.count_remote("manage.py syncdb"), 1);
    assert_eq!(transport.count_remote("manage.py migrate"), 0);
}

#[test]
fn full_sequence_issues_commands_in_order() {
    let settings = intranet();
    let transport = RecordingTransport::new("web1.example.com");
    let deployment = Deployment::new(&settings, &transport, RunOptions::default());

    pipeline::full_deploy(&deployment).unwrap();

    let commands = transport.remote_commands();
    let expected_order = [
        "status --porcelain",
        "chown intranet:www-data -R *",
        "git fetch",
        "git checkout master",
        "git pull",
        "git submodule init",
        "git submodule update",
        "chmod --preserve-root --changes a+r,ug+w -R logs",
        "pip install -r requirements.txt",
        "collectstatic -v0 --noinput",
        "manage.py syncdb",
        "manage.py migrate",
        "manage.py compress",
        "service intranet restart",
        "service intranet_celery restart",
        "crontab -u intranet /deploy/intranet/crons/intranet",
    ];
    let mut cursor = 0;
    for needle in expected_order {
        let found = commands[cursor..]
            .iter()
            .position(|c| c.contains(needle))
            .unwrap_or_else(|| panic!("'{}' missing or out of order", needle));
        cursor += found + 1;
    }

    // Owners are fixed before the pull and again after the extras.
    assert_eq!(transport.count_remote("chown intranet:www-data -R *"), 2);
}

#[test]
fn dirty_local_tree_touches_nothing_remote() {
    let settings = intranet();
    let transport = RecordingTransport::new("web1.example.com")
        .on_local("git status --porcelain", " M intranet/settings.py\n");
    let options = overrides(&[("require_clean", "yes")]);
    let deployment = Deployment::new(&settings, &transport, options);

    let err = pipeline::full_deploy(&deployment).unwrap_err();
    assert_eq!(err.code, ErrorCode::PreconditionLocalDirty);
    assert_eq!(err.details["stage"], "local_clean_check");
    assert!(transport.remote_commands().is_empty());
}

#[test]
fn require_clean_off_skips_local_check_only() {
    let settings = intranet();
    let transport = RecordingTransport::new("web1.example.com")
        .on_local("git status", " M dirty.py\n");
    let options = overrides(&[("--require-clean", "off")]);
    let deployment = Deployment::new(&settings, &transport, options);

    let report = pipeline::full_deploy(&deployment).unwrap();
    assert!(!report.performed().contains(&Stage::LocalCleanCheck));
    assert!(report.performed().contains(&Stage::RemoteCleanCheck));
    assert!(transport
        .calls()
        .iter()
        .all(|c| c.location == Location::Remote));
}

#[test]
fn failed_pull_halts_without_rollback() {
    let settings = intranet();
    let transport =
        RecordingTransport::new("web1.example.com").fail_remote("git pull", 1, "merge conflict");
    let deployment = Deployment::new(&settings, &transport, RunOptions::default());

    let err = pipeline::full_deploy(&deployment).unwrap_err();
    assert_eq!(err.code, ErrorCode::RemoteCommandFailed);
    assert_eq!(err.details["stage"], "pull");
    assert_eq!(err.details["stderr"], "merge conflict");

    // Ownership was already changed and stays changed.
    assert_eq!(transport.count_remote("chown intranet:www-data -R *"), 1);
    assert_eq!(transport.count_remote("git submodule"), 0);
    assert_eq!(transport.count_remote("service"), 0);
}

#[test]
fn bounce_only_if_running_via_override() {
    let settings = intranet();
    let transport = RecordingTransport::new("web1.example.com")
        .on_remote("service intranet_celery status", "intranet_celery stop/waiting")
        .on_remote("service intranet status", "intranet start/running, process 42");
    let options = overrides(&[
        ("bounce_services_only_if_running", "t"),
        ("restart_nginx", "1"),
    ]);
    let deployment = Deployment::new(&settings, &transport, options);

    let report = match Task::BounceServices.run(&deployment).unwrap() {
        TaskOutput::Bounce(report) => report,
        other => panic!("bounce-services returned {:?}", other),
    };
    assert_eq!(report.restarted, vec!["intranet"]);
    assert_eq!(report.not_running, vec!["intranet_celery"]);
    assert!(report.nginx_restarted);
    assert_eq!(transport.count_remote("service nginx restart"), 1);
}

#[test]
fn non_framework_target_soft_skips_framework_stages() {
    let settings = Settings::new(SettingsDecl {
        user: Some("site".to_string()),
        group: Some("www-data".to_string()),
        framework_project: Some(false),
        ..SettingsDecl::new("web2", "/srv/site")
    });
    let transport = RecordingTransport::new("web2");
    let deployment = Deployment::new(&settings, &transport, RunOptions::default());

    let report = pipeline::full_deploy(&deployment).unwrap();
    let collect = report
        .stages
        .iter()
        .find(|record| record.stage == Stage::CollectStatic)
        .unwrap();
    assert_eq!(
        collect.outcome,
        StepOutcome::skipped("not a framework project")
    );
    assert_eq!(transport.count_remote("manage.py"), 0);
    assert_eq!(transport.count_remote("pip install"), 1);
}

#[test]
fn missing_deploy_path_fails_at_first_use() {
    let settings = Settings::new(SettingsDecl {
        host: Some("web1".to_string()),
        user: Some("app".to_string()),
        group: Some("app".to_string()),
        ..Default::default()
    });
    let transport = RecordingTransport::new("web1");
    let options = overrides(&[("require_clean", "n")]);
    let deployment = Deployment::new(&settings, &transport, options);

    let err = pipeline::full_deploy(&deployment).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissingKey);
    assert_eq!(err.details["stage"], "remote_clean_check");
    assert!(transport.calls().is_empty());
}

#[test]
fn invalid_boolean_override_is_rejected() {
    let err = RunOptions::from_pairs([("skip_migrate", "maybe")]).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
}
