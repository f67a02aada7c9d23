use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn backoff_cmd() -> Command {
    let mut cmd = Command::cargo_bin("backoff").unwrap();
    // keep the user's environment out of the picture
    for var in ["BACKOFF_MIN", "BACKOFF_MAX", "BACKOFF_FACTOR", "BACKOFF_JITTER"] {
        cmd.env_remove(var);
    }
    cmd.env("BACKOFF_CONFIG", std::env::temp_dir().join("backoff-cli-missing.yaml"));
    cmd
}

#[test]
fn schedule_default_yaml() {
    backoff_cmd()
        .arg("schedule")
        .assert()
        .success()
        .stdout(predicate::str::contains("delay: 100ms"))
        .stdout(predicate::str::contains("delay: 6400ms"))
        .stdout(predicate::str::contains("delay: 10s"))
        .stdout(predicate::str::contains("capped: true"));
}

#[test]
fn schedule_json_matches_documented_sequence() {
    let out = backoff_cmd()
        .args(["--min", "100ms", "--max", "10s", "--factor", "2", "--json", "schedule", "-n", "9"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let delays: Vec<&str> = v["delays"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["delay"].as_str().unwrap())
        .collect();
    assert_eq!(
        delays,
        vec!["100ms", "200ms", "400ms", "800ms", "1600ms", "3200ms", "6400ms", "10s", "10s"]
    );
    assert_eq!(v["delays"][8]["attempt"], 7);
    assert_eq!(v["delays"][8]["capped"], true);
}

#[test]
fn schedule_raw_lines() {
    backoff_cmd()
        .args(["--min", "1s", "--max", "1s", "--jitter", "--raw", "schedule", "--count", "3"])
        .assert()
        .success()
        .stdout("1s\n1s\n1s\n");
}

#[test]
fn seeded_jitter_repeats() {
    let run = || {
        backoff_cmd()
            .args(["--jitter", "--seed", "42", "--raw", "schedule"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn rejects_min_over_max() {
    backoff_cmd()
        .args(["--min", "5s", "--max", "1s", "schedule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds max delay"));
}

#[test]
fn rejects_bad_duration_flag() {
    backoff_cmd()
        .args(["--min", "soon", "schedule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}

#[test]
fn config_view_applies_env() {
    backoff_cmd()
        .env("BACKOFF_MAX", "1m")
        .args(["--json", "config", "view"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max\": \"1m\""))
        .stdout(predicate::str::contains("\"min\": \"100ms\""));
}

#[test]
fn config_path_honors_env() {
    backoff_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backoff-cli-missing.yaml"));
}

#[test]
fn rejects_oversized_count() {
    backoff_cmd()
        .args(["schedule", "-n", "18446744073709551615"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn schedule_at_count_limit() {
    let out = backoff_cmd()
        .args(["--raw", "schedule", "-n", "100000"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 100_000);
}

#[test]
fn no_jitter_flag_overrides_env() {
    backoff_cmd()
        .env("BACKOFF_JITTER", "1")
        .args(["--no-jitter", "config", "view"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jitter: false"));
}
