#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(state: &Path) -> Command {
    let mut cmd = Command::cargo_bin("astreinte-cal").unwrap();
    cmd.arg("--state").arg(state);
    cmd
}

#[test]
fn lists_holidays() {
    let dir = tempdir().unwrap();
    cli(&dir.path().join("state.json"))
        .args(["holidays", "--year", "2026"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-04-05 Sun EASTER"))
        .stdout(predicate::str::contains("2026-12-26 Sat 12-26"));
}

#[test]
fn generate_check_and_patch() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state.json");
    let out = dir.path().join("calendrier.csv");

    cli(&state)
        .args([
            "roster",
            "--technicians",
            "Likaj,Ferraris,Zanotto,Casazza,Mancin,Dardha,Franchini,Giraldin,Terazzi",
        ])
        .assert()
        .success();

    cli(&state)
        .args(["generate", "--year", "2026", "--out-csv"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Year 2026: 365 date(s) assigned"));
    assert!(out.exists());

    cli(&state)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));

    cli(&state)
        .args(["patch", "--from", "2026-03-11", "--to", "2026-03-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patched 2026-03-11"));
}

#[test]
fn patch_without_cache_fails() {
    let dir = tempdir().unwrap();
    cli(&dir.path().join("state.json"))
        .args(["patch", "--from", "2026-03-11", "--to", "2026-03-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cached calendar"));
}

#[test]
fn leave_add_and_list() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state.json");

    cli(&state)
        .args(["roster", "--technicians", "Likaj,Ferraris"])
        .assert()
        .success();

    cli(&state)
        .args([
            "leave", "add", "--name", "Likaj", "--from", "2026-03-01", "--to", "2026-03-31",
        ])
        .assert()
        .success();

    cli(&state)
        .args(["leave", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("technician Likaj | 2026-03-01 → 2026-03-31"));

    cli(&state)
        .args([
            "leave", "add", "--name", "Inconnu", "--from", "2026-03-01", "--to", "2026-03-02",
        ])
        .assert()
        .failure();
}
