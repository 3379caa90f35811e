use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_roxy_manager_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("roxy-manager")
}

fn roxy_manager(root: &std::path::Path) -> Command {
    let mut cmd = Command::new(get_roxy_manager_bin());
    cmd.env("ROXY_MANAGER_HOME", root.join("home"))
        .env("ROXY_BROWSER_DATA", root.join("roxy"))
        .env("ROXY_MANAGER_SETTINGS", root.join("settings.json"));
    cmd
}

#[test]
fn test_settings_show_defaults() {
    let temp = tempfile::tempdir().unwrap();

    roxy_manager(temp.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains("Poll interval:     5s"));
}

#[test]
fn test_settings_show_json() {
    let temp = tempfile::tempdir().unwrap();

    roxy_manager(temp.path())
        .args(["settings", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"autoDetectEnabled\": true"));
}

#[test]
fn test_set_path_rejects_invalid_executable() {
    let temp = tempfile::tempdir().unwrap();
    let bogus = temp.path().join("notepad.exe");
    fs::write(&bogus, "").unwrap();

    roxy_manager(temp.path())
        .args(["settings", "set-path"])
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid RoxyBrowser path"));

    assert!(!temp.path().join("settings.json").exists());
}

#[cfg(unix)]
#[test]
fn test_set_path_then_clear() {
    use std::os::unix::fs::PermissionsExt;
    let temp = tempfile::tempdir().unwrap();
    let exe = temp.path().join("RoxyBrowser");
    fs::write(&exe, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    roxy_manager(temp.path())
        .args(["settings", "set-path"])
        .arg(&exe)
        .assert()
        .success();
    let saved = fs::read_to_string(temp.path().join("settings.json")).unwrap();
    assert!(saved.contains("RoxyBrowser"));

    roxy_manager(temp.path())
        .args(["settings", "clear-path"])
        .assert()
        .success();
    let saved = fs::read_to_string(temp.path().join("settings.json")).unwrap();
    assert!(saved.contains("\"roxyExePath\": null"));
}
