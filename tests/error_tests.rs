//! Error scenario integration tests

use std::path::Path;
use std::process::Command;

fn voice_recorder_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_voice-recorder"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("VOICE_RECORDER_SERVER");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown key") && stderr.contains("server_url"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_format() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["config", "set", "format", "flac"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid format"),
        "Expected error about invalid format, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_server_url() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["config", "set", "server_url", "localhost:5000"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("http://"),
        "Expected error about URL scheme, got: {}",
        stderr
    );
}

#[test]
fn config_set_zero_timeslice() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["config", "set", "timeslice_ms", "0"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("positive"),
        "Expected error about positive number, got: {}",
        stderr
    );
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();

    let set = voice_recorder_bin(home.path())
        .args(["config", "set", "quality", "320kbps"])
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success());

    let get = voice_recorder_bin(home.path())
        .args(["config", "get", "quality"])
        .output()
        .expect("Failed to execute command");
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "320");
}

#[test]
fn config_init_twice_fails() {
    let home = tempfile::tempdir().unwrap();

    let first = voice_recorder_bin(home.path())
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = voice_recorder_bin(home.path())
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"), "got: {}", stderr);
}

#[test]
fn config_list_with_no_file() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["config", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("server_url") && stdout.contains("not set"),
        "Expected config list output, got: {}",
        stdout
    );
}

#[test]
fn debug_against_unreachable_server() {
    let home = tempfile::tempdir().unwrap();
    let output = voice_recorder_bin(home.path())
        .args(["--server", "http://127.0.0.1:1", "debug"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to connect") || stderr.contains("Network error"),
        "Expected network error, got: {}",
        stderr
    );
}
