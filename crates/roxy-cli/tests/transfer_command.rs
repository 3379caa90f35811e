use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

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

fn seeded() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("home");
    let profile = home.join("profiles/a@x.com");
    fs::create_dir_all(&profile).unwrap();
    fs::write(profile.join("Cookies"), "a").unwrap();
    fs::write(
        home.join("config.json"),
        r#"{"version":1,"currentUser":"a@x.com","users":[{"email":"a@x.com","displayName":"a","createdAt":"2025-01-01T00:00:00Z","lastUsed":"2025-01-01T00:00:00Z","note":""}]}"#,
    )
    .unwrap();
    temp
}

#[test]
fn test_export_with_no_profiles_fails() {
    let temp = tempfile::tempdir().unwrap();

    roxy_manager(temp.path())
        .arg("export")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profiles to export"));
}

#[test]
fn test_export_then_import_into_empty_vault() {
    let source = seeded();
    let out = source.path().join("out");

    roxy_manager(source.path())
        .arg("export")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 profiles"));
    assert!(out.join("profiles/a@x.com/Cookies").exists());

    let target = tempfile::tempdir().unwrap();
    roxy_manager(target.path())
        .arg("import")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 profiles"));

    roxy_manager(target.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("a@x.com"));
}

#[test]
fn test_import_skips_known_profiles() {
    let source = seeded();
    let out = source.path().join("out");
    roxy_manager(source.path()).arg("export").arg(&out).assert().success();

    roxy_manager(source.path())
        .arg("import")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 profiles"));
}

#[test]
fn test_import_missing_directory_fails() {
    let temp = tempfile::tempdir().unwrap();

    roxy_manager(temp.path())
        .arg("import")
        .arg(temp.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
