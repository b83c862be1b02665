#[path = "common/mod.rs"]
mod common;

use common::{ConfigDir, SAMPLE};
use initconf::{
    diagnostics::Verdict, error::ConfigError, integrity::NonInteractive, reload::ConfigManager,
};

fn loaded(config: &ConfigDir) -> ConfigManager {
    let mut manager = ConfigManager::new(config.path());
    let report = manager.load(&mut NonInteractive).expect("initial load failed");
    assert_eq!(report.verdict, Verdict::Ok, "{:?}", report.diagnostics);
    manager
}

#[test]
fn runtime_fields_carry_forward_by_id() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);
    let model = manager.model_mut().unwrap();
    assert!(model.set_runtime("sshd", true, 812));
    assert!(model.set_runtime("getty", true, 977));

    // Drop getty, add a new service and change sshd's description.
    let getty = SAMPLE.find("ObjectID getty").unwrap();
    let source = format!(
        "{}ObjectID cron\n\
         ObjectDescription Scheduler\n\
         ObjectStartCommand /usr/sbin/crond\n\
         ObjectEnabled true\n\
         ObjectRunlevels default\n",
        &SAMPLE[..getty]
    )
    .replace("OpenSSH server", "Secure shell");
    config.rewrite(&source);

    let report = manager.reload().unwrap();
    assert_eq!(report.verdict, Verdict::Ok, "{:?}", report.diagnostics);

    let model = manager.model().unwrap();
    let sshd = model.lookup("sshd").unwrap();
    assert_eq!(sshd.description, "Secure shell");
    assert!(sshd.started);
    assert_eq!(sshd.process_id, 812);
    assert!(model.lookup("getty").is_none());
    let cron = model.lookup("cron").unwrap();
    assert!(!cron.started);
    assert_eq!(cron.process_id, 0);
}

#[test]
fn failed_reload_leaves_model_identical() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);
    manager.model_mut().unwrap().set_runtime("getty", true, 55);
    let before = manager.model().cloned().unwrap();

    config.rewrite(&SAMPLE.replace("\tObjectRunlevels default single\n", ""));
    let report = manager.reload().unwrap();

    assert_eq!(report.verdict, Verdict::Fatal);
    let after = manager.model().unwrap();
    assert_eq!(after, &before);
    assert_eq!(after.lookup("getty").unwrap().runlevels, vec!["default", "single"]);
    assert_eq!(after.runlevel(), "default");
}

#[test]
fn reload_keeps_running_runlevel() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);
    manager.model_mut().unwrap().settings.runlevel = "single".into();

    config.rewrite(&SAMPLE.replace("DefaultRunlevel default", "DefaultRunlevel other"));
    let report = manager.reload().unwrap();

    assert_eq!(report.verdict, Verdict::Ok);
    assert_eq!(manager.model().unwrap().runlevel(), "single");
}

#[test]
fn reload_into_vanished_runlevel_is_rejected() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);
    manager.model_mut().unwrap().settings.runlevel = "single".into();

    // Without mounts and getty nothing is left in "single".
    let sshd = SAMPLE.find("ObjectID sshd").unwrap();
    let comment = SAMPLE.find(">!>").unwrap();
    let mut source = SAMPLE[..SAMPLE.find("ObjectID mounts").unwrap()].to_string();
    source.push_str(&SAMPLE[sshd..comment]);
    config.rewrite(&source);

    let report = manager.reload().unwrap();
    assert_eq!(report.verdict, Verdict::Fatal);
    assert!(report.mentions("\"single\" does not exist"));
    assert!(manager.model().unwrap().lookup("getty").is_some());
}

#[test]
fn pinned_flags_keep_running_values() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);

    config.rewrite(
        &SAMPLE
            .replace("DisableCAD true", "DisableCAD false")
            .replace("EnableLogging true", "EnableLogging false")
            .replace("AlignStatusReports false", "AlignStatusReports true")
            .replace("Hostname testbox", "Hostname renamed"),
    );
    manager.reload().unwrap();

    let settings = &manager.model().unwrap().settings;
    assert!(settings.disable_cad);
    assert!(settings.enable_logging);
    assert!(!settings.align_status_reports);
    assert_eq!(settings.hostname, "renamed");
}

#[test]
fn unreadable_source_rolls_back() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = loaded(&config);
    let before = manager.model().cloned();

    std::fs::remove_file(config.path()).unwrap();
    assert!(matches!(manager.reload(), Err(ConfigError::Read { .. })));
    assert_eq!(manager.model().cloned(), before);
}
