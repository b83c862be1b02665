#[path = "common/mod.rs"]
mod common;

use assert_cmd::Command;
use common::{ConfigDir, SAMPLE};
use predicates::prelude::*;

fn initconf() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("initconf"))
}

#[test]
fn check_reports_ok_verdict() {
    let config = ConfigDir::new(SAMPLE);

    initconf()
        .arg("--config")
        .arg(config.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict: ok"));
}

#[test]
fn check_fails_on_fatal_configuration() {
    let config = ConfigDir::new(&SAMPLE.replace("\tObjectEnabled true\n", ""));

    initconf()
        .args(["--log-level", "off", "check", "-c"])
        .arg(config.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("has no attribute ObjectEnabled"))
        .stdout(predicate::str::contains("verdict: fatal"));
}

#[test]
fn check_prints_line_numbers_for_warnings() {
    let config = ConfigDir::new(&format!("Nonsense here\n{SAMPLE}"));

    initconf()
        .arg("-c")
        .arg(config.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: line 1: Unidentified attribute."))
        .stdout(predicate::str::contains("verdict: warning"));
}

#[test]
fn list_prints_start_order() {
    let config = ConfigDir::new(SAMPLE);

    let output = initconf()
        .arg("-c")
        .arg(config.path())
        .arg("list")
        .output()
        .expect("failed to run list");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let order: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .collect();
    assert_eq!(order, vec!["mounts", "sshd", "getty"]);
}

#[test]
fn list_json_honours_runlevel_and_stop() {
    let config = ConfigDir::new(SAMPLE);

    let output = initconf()
        .arg("-c")
        .arg(config.path())
        .args(["list", "--runlevel", "single", "--stop", "--json"])
        .output()
        .expect("failed to run list");
    assert!(output.status.success());

    let services: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = services
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["getty"]);
}

#[test]
fn show_json_exposes_descriptor() {
    let config = ConfigDir::new(SAMPLE);

    let output = initconf()
        .arg("-c")
        .arg(config.path())
        .args(["show", "sshd", "--json"])
        .output()
        .expect("failed to run show");
    assert!(output.status.success());

    let sshd: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sshd["stop_mode"], "pid_file");
    assert_eq!(sshd["pid_file"], "/run/sshd.pid");
    assert_eq!(sshd["options"]["auto_restart"], true);
}

#[test]
fn show_unknown_service_fails() {
    let config = ConfigDir::new(SAMPLE);

    initconf()
        .arg("-c")
        .arg(config.path())
        .args(["show", "nginx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Service 'nginx' not found"));
}

#[test]
fn set_rewrites_attribute() {
    let config = ConfigDir::new(SAMPLE);

    initconf()
        .arg("-c")
        .arg(config.path())
        .args(["set", "getty", "ObjectDescription", "Serial console"])
        .assert()
        .success();

    assert!(config.read().contains("\tObjectDescription Serial console\n"));
}

#[test]
fn missing_config_is_an_error() {
    let config = ConfigDir::new(SAMPLE);

    initconf()
        .arg("-c")
        .arg(config.dir().join("absent.conf"))
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.conf"));
}
