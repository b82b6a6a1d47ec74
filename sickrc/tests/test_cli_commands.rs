mod common;

use common::*;
use serial_test::serial;
use sickrc::cli_commands::{self, DaemonState};
use sickrc::{PidFile, Settings};

fn start_stopped(settings: &Settings) {
    install_fake_daemon(settings);
    cli_commands::start_daemon(settings, false).unwrap();
}

#[test]
#[serial]
fn test_start_status_stop_cycle() {
    let root = tempfile::tempdir().unwrap();
    let settings = test_settings(root.path());
    start_stopped(&settings);

    assert!(settings.pidfile.exists());
    let state = DaemonState::probe(&settings).unwrap();
    assert_eq!(state.status, "running");
    let pid = state.pid.expect("running daemon reports a pid");
    assert!(pid > 0);
    assert!(state.since.is_some());

    cli_commands::stop_daemon(&settings).unwrap();
    assert!(!settings.pidfile.exists());
    let state = DaemonState::probe(&settings).unwrap();
    assert_eq!(state.status, "stopped");
    assert_eq!(state.pid, None);
}

#[test]
#[serial]
fn test_start_refused_when_disabled() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = test_settings(root.path());
    settings.enable = "NO".to_string();
    install_fake_daemon(&settings);

    let err = cli_commands::start_daemon(&settings, false).unwrap_err();
    assert!(err.to_string().contains("not enabled"), "{err}");
    assert!(!settings.pidfile.exists());
}

#[test]
#[serial]
fn test_force_start_bypasses_enable() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = test_settings(root.path());
    settings.enable = "NO".to_string();
    install_fake_daemon(&settings);

    cli_commands::start_daemon(&settings, true).unwrap();
    assert!(settings.pidfile.exists());
    cli_commands::stop_daemon(&settings).unwrap();
}

#[test]
#[serial]
fn test_start_twice_fails() {
    let root = tempfile::tempdir().unwrap();
    let settings = test_settings(root.path());
    start_stopped(&settings);

    let err = cli_commands::start_daemon(&settings, false).unwrap_err();
    assert!(err.to_string().contains("already running"), "{err}");

    cli_commands::stop_daemon(&settings).unwrap();
}

#[test]
#[serial]
fn test_restart_changes_pid() {
    let root = tempfile::tempdir().unwrap();
    let settings = test_settings(root.path());
    start_stopped(&settings);

    let pidfile = PidFile::new(&settings.pidfile);
    let first = pidfile.live_pid().unwrap().unwrap();

    cli_commands::restart_daemon(&settings, false).unwrap();
    let second = pidfile.live_pid().unwrap().unwrap();
    assert_ne!(first, second);

    cli_commands::stop_daemon(&settings).unwrap();
}

#[test]
#[serial]
fn test_stop_when_not_running() {
    let root = tempfile::tempdir().unwrap();
    let settings = test_settings(root.path());
    let err = cli_commands::stop_daemon(&settings).unwrap_err();
    assert!(err.to_string().contains("not running"), "{err}");
}

#[test]
#[serial]
fn test_restart_from_stopped() {
    let root = tempfile::tempdir().unwrap();
    let settings = test_settings(root.path());
    install_fake_daemon(&settings);

    // restart with nothing running behaves like start
    cli_commands::restart_daemon(&settings, false).unwrap();
    assert!(settings.pidfile.exists());
    cli_commands::stop_daemon(&settings).unwrap();
}
