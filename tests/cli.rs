use assert_cmd::Command;
use predicates::prelude::*;

fn setup_cmd() -> Command {
    Command::cargo_bin("kodegen_bundler_setup").unwrap()
}

#[test]
fn help_lists_options() {
    setup_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--tool"));
}

#[test]
fn missing_setup_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    setup_cmd()
        .current_dir(dir.path())
        .args(["--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Setup file not found"));
}

#[test]
fn unknown_tool_is_rejected() {
    setup_cmd()
        .args(["--tool", "msi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("msi"));
}

#[test]
fn malformed_setup_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("setup.toml"), "[setup]\nvendor = \"x\"\n").unwrap();
    setup_cmd()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}
