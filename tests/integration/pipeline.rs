#[path = "common/mod.rs"]
mod common;

use std::collections::HashSet;

use common::{ConfigDir, SAMPLE};
use initconf::{
    diagnostics::Verdict,
    error::ConfigError,
    integrity::NonInteractive,
    parser::parse_source,
    reload::ConfigManager,
    service::{Direction, StopMode},
};

fn ids(services: Vec<&initconf::service::ServiceDescriptor>) -> Vec<&str> {
    services.into_iter().map(|s| s.id.as_str()).collect()
}

#[test]
fn sample_configuration_loads_cleanly() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = ConfigManager::new(config.path());
    let report = manager.load(&mut NonInteractive).expect("load failed");

    assert_eq!(report.verdict, Verdict::Ok, "{:?}", report.diagnostics);
    let model = manager.model().expect("model adopted");
    assert_eq!(model.runlevel(), "default");
    assert_eq!(model.settings.hostname, "testbox");
    assert_eq!(model.services.len(), 3);
    assert!(model.lookup("disabled").is_none());

    let sshd = model.lookup("sshd").unwrap();
    assert_eq!(sshd.description, "OpenSSH server");
    assert_eq!(sshd.stop_mode, StopMode::PidFile);
    assert!(sshd.options.is_service);
}

#[test]
fn start_and_stop_orders_follow_inheritance() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = ConfigManager::new(config.path());
    manager.load(&mut NonInteractive).unwrap();
    let model = manager.model().unwrap();

    assert_eq!(
        ids(model.ordered("default", Direction::Start)),
        vec!["mounts", "sshd", "getty"]
    );
    assert_eq!(ids(model.ordered("default", Direction::Stop)), vec!["sshd", "getty"]);
    assert_eq!(ids(model.ordered("single", Direction::Start)), vec!["mounts", "getty"]);
    assert_eq!(model.highest_priority(Direction::Start), 4);
    assert_eq!(
        model
            .find_by_priority(Some("default"), Direction::Start, 1)
            .map(|s| s.id.as_str()),
        Some("mounts")
    );
}

#[test]
fn priorities_are_unique_after_parse() {
    let sources = [
        "ObjectID a\nObjectStartPriority 2\nObjectStopPriority 2\n\
         ObjectID b\nObjectStartPriority 2\nObjectStopPriority 1\n\
         ObjectID c\nObjectStartPriority 1\nObjectStopPriority 1\n\
         ObjectID d\nObjectStartPriority 0\nObjectStopPriority 1\n",
        "ObjectID a\nObjectStartPriority 5\n\
         ObjectID b\nObjectStartPriority 5\n\
         ObjectID c\nObjectStartPriority 5\n\
         ObjectID d\nObjectStartPriority 6\n\
         ObjectID e\nObjectStartPriority 9\n",
    ];

    for source in sources {
        let parsed = parse_source(source, None);
        for direction in [Direction::Start, Direction::Stop] {
            let values: Vec<u32> = parsed
                .model
                .services
                .iter()
                .map(|s| s.priority(direction))
                .filter(|p| *p != 0)
                .collect();
            let unique: HashSet<_> = values.iter().collect();
            assert_eq!(unique.len(), values.len(), "{direction:?}: {values:?}");
        }
    }
}

#[test]
fn warnings_do_not_block_adoption() {
    let source = SAMPLE.replace("Hostname testbox", "Hostname test box\nBogusDirective 1");
    let config = ConfigDir::new(&source);
    let mut manager = ConfigManager::new(config.path());
    let report = manager.load(&mut NonInteractive).unwrap();

    assert_eq!(report.verdict, Verdict::Warning);
    assert!(report.mentions("Unidentified attribute"));
    assert_eq!(manager.model().unwrap().settings.hostname, "");
}

#[test]
fn integrity_failure_rejects_model() {
    let source = SAMPLE.replace("\tObjectRunlevels default\n", "");
    let config = ConfigDir::new(&source);
    let mut manager = ConfigManager::new(config.path());
    let report = manager.load(&mut NonInteractive).unwrap();

    assert_eq!(report.verdict, Verdict::Fatal);
    assert!(report.mentions("has no attribute ObjectRunlevels"));
    assert!(manager.model().is_none());
}

#[test]
fn empty_and_missing_sources_fail_before_parsing() {
    let config = ConfigDir::new("");
    let mut manager = ConfigManager::new(config.path());
    assert!(matches!(
        manager.load(&mut NonInteractive),
        Err(ConfigError::Empty { .. })
    ));
    assert!(manager.model().is_none());

    let mut manager = ConfigManager::new(config.dir().join("absent.conf"));
    assert!(matches!(
        manager.load(&mut NonInteractive),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn only_comments_is_fatal() {
    let config = ConfigDir::new("# nothing here\n>!>\nObjectID hidden\n<!<\n");
    let mut manager = ConfigManager::new(config.path());
    let report = manager.load(&mut NonInteractive).unwrap();

    assert_eq!(report.verdict, Verdict::Fatal);
    assert!(report.mentions("No objects found"));
}
