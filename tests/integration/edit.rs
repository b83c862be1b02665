#[path = "common/mod.rs"]
mod common;

use common::{ConfigDir, SAMPLE};
use initconf::{
    editor::edit_attribute,
    error::EditError,
    integrity::NonInteractive,
    parser::{Directive, parse_source},
    reload::ConfigManager,
};

#[test]
fn edit_changes_only_the_value_segment() {
    let source = SAMPLE.replace("Login prompt", "old");
    let config = ConfigDir::new(&source);

    edit_attribute(config.path(), "getty", Directive::ObjectDescription, "new text").unwrap();

    let edited = config.read();
    assert_eq!(edited.len(), source.len() + "new text".len() - "old".len());
    assert_eq!(edited, source.replace("ObjectDescription old", "ObjectDescription new text"));

    let parsed = parse_source(&edited, None);
    assert_eq!(parsed.model.lookup("getty").unwrap().description, "new text");
}

#[test]
fn edit_preserves_equals_delimiter() {
    let config = ConfigDir::new(SAMPLE);
    edit_attribute(config.path(), "sshd", Directive::ObjectDescription, "Secure shell").unwrap();

    assert!(config.read().contains("\tObjectDescription=Secure shell\n"));
}

#[test]
fn edited_file_reloads_into_live_model() {
    let config = ConfigDir::new(SAMPLE);
    let mut manager = ConfigManager::new(config.path());
    manager.load(&mut NonInteractive).unwrap();

    // sshd and getty settle on 3 and 4, so 2 stays clear of the collision cascade.
    edit_attribute(config.path(), "mounts", Directive::ObjectStartPriority, "2").unwrap();
    // The editor never touches the live model.
    assert_eq!(manager.model().unwrap().lookup("mounts").unwrap().start_priority, 1);

    manager.reload().unwrap();
    assert_eq!(manager.model().unwrap().lookup("mounts").unwrap().start_priority, 2);
}

#[test]
fn failed_edits_leave_file_untouched() {
    let config = ConfigDir::new(SAMPLE);

    let err = edit_attribute(config.path(), "nginx", Directive::ObjectDescription, "x").unwrap_err();
    assert!(matches!(err, EditError::ServiceNotFound(_)));

    let err = edit_attribute(config.path(), "mounts", Directive::ObjectOptions, "SERVICE").unwrap_err();
    assert!(matches!(err, EditError::AttributeNotFound { .. }));

    assert_eq!(config.read(), SAMPLE);
}

#[test]
fn missing_file_is_a_read_error() {
    let config = ConfigDir::new(SAMPLE);
    let missing = config.dir().join("absent.conf");

    let err = edit_attribute(&missing, "sshd", Directive::ObjectDescription, "x").unwrap_err();
    assert!(matches!(err, EditError::Read(_)));
    assert!(!missing.exists());
}
